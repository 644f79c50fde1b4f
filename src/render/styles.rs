//! Style table shared by the `<style>` block and the inline `style` attributes.
//!
//! Many mail clients strip `<style>` elements, so every styled element
//! carries its declarations inline as well. Both copies come from the
//! constants below.

pub const BODY: &str = "margin:0;padding:0;background-color:#f3f4f6;font-family:Arial,Helvetica,sans-serif;color:#1f2937;";
pub const WRAPPER: &str = "max-width:600px;margin:0 auto;background-color:#ffffff;";
pub const WRAPPER_CELL: &str = "padding:24px;background-color:#ffffff;";
pub const HEADER: &str = "margin:0 0 4px 0;font-size:26px;line-height:32px;color:#111827;";
pub const LEAD: &str = "margin:0 0 20px 0;font-size:14px;line-height:20px;color:#6b7280;";
pub const ANNOUNCEMENT: &str = "margin:0 0 12px 0;font-size:15px;line-height:22px;color:#1f2937;";
pub const SECTION_TITLE: &str = "margin:28px 0 4px 0;font-size:20px;line-height:26px;color:#111827;";
pub const SECTION_META: &str = "margin:0 0 12px 0;font-size:13px;line-height:18px;color:#6b7280;";
pub const EMPTY_STATE: &str = "margin:0 0 16px 0;font-size:15px;line-height:22px;font-style:italic;color:#6b7280;";
pub const CARD: &str = "margin:0 0 16px 0;padding:16px;border:1px solid #e5e7eb;border-radius:8px;background-color:#f9fafb;";
pub const CARD_CELL: &str = "padding:16px;border:1px solid #e5e7eb;background-color:#f9fafb;";
pub const CARD_SPACER: &str = "height:16px;line-height:16px;font-size:16px;";
pub const EVENT_TITLE: &str = "margin:0 0 4px 0;font-size:17px;line-height:22px;color:#111827;";
pub const EVENT_SUBTITLE: &str = "margin:0 0 8px 0;font-size:14px;line-height:20px;font-style:italic;color:#4b5563;";
pub const EVENT_META: &str = "margin:0 0 2px 0;font-size:14px;line-height:20px;color:#374151;";
pub const EVENT_DESCRIPTION: &str = "margin:8px 0 0 0;font-size:14px;line-height:21px;color:#1f2937;";
pub const LINK: &str = "color:#2563eb;text-decoration:underline;";
pub const FOOTER: &str = "margin:32px 0 0 0;padding-top:16px;border-top:1px solid #e5e7eb;";
pub const FOOTER_TITLE: &str = "margin:0 0 8px 0;font-size:16px;line-height:22px;color:#111827;";
pub const ROSTER_ITEM: &str = "margin:0 0 4px 0;font-size:13px;line-height:18px;color:#374151;";
pub const FOOTER_TEXT: &str = "margin:12px 0 0 0;font-size:12px;line-height:18px;color:#6b7280;";

/// Selector/declaration pairs emitted into the `<style>` block.
const RULES: &[(&str, &str)] = &[
    ("body", BODY),
    (".wrapper", WRAPPER),
    (".wrapper-cell", WRAPPER_CELL),
    (".header", HEADER),
    (".lead", LEAD),
    (".announcement", ANNOUNCEMENT),
    (".section-title", SECTION_TITLE),
    (".section-meta", SECTION_META),
    (".empty-state", EMPTY_STATE),
    ("div.event-card", CARD),
    (".event-card-cell", CARD_CELL),
    (".event-title", EVENT_TITLE),
    (".event-subtitle", EVENT_SUBTITLE),
    (".event-meta", EVENT_META),
    (".event-description", EVENT_DESCRIPTION),
    ("a", LINK),
    (".footer", FOOTER),
    (".footer-title", FOOTER_TITLE),
    (".roster-item", ROSTER_ITEM),
    (".footer-text", FOOTER_TEXT),
];

/// Rules only Outlook's Word engine needs.
pub const MSO_STYLE: &str = "table,td{border-collapse:collapse;mso-table-lspace:0pt;mso-table-rspace:0pt;}";

/// Render the shared rules as the body of a `<style>` element.
pub fn style_block() -> String {
    let mut css = String::from(
        "@media only screen and (max-width:620px){.wrapper{width:100% !important;}}\n",
    );
    for (selector, declarations) in RULES {
        css.push_str(selector);
        css.push('{');
        css.push_str(declarations);
        css.push_str("}\n");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_block_contains_every_rule() {
        let css = style_block();
        for (selector, declarations) in RULES {
            assert!(css.contains(&format!("{selector}{{{declarations}}}")));
        }
    }

    #[test]
    fn test_declarations_are_attribute_safe() {
        for (_, declarations) in RULES {
            assert!(!declarations.contains('"'));
            assert!(!declarations.contains('<'));
        }
    }
}
