//! HTML newsletter template.
//!
//! [`render`] turns a [`NewsletterBundle`] into a complete, self-contained
//! HTML mail body. The document is built in three layers:
//!
//! 1. **Content**: headings, paragraphs and event card bodies. Produced once
//!    per element and identical for every [`RenderTarget`].
//! 2. **Layout**: the containers around that content. Modern clients get
//!    `div` blocks, Outlook's Word engine gets nested presentation tables.
//! 3. **Styles**: every styled element carries its declarations inline and
//!    the same rules are repeated in a `<style>` block (see [`styles`]).
//!
//! Because content is generated before it is wrapped, switching the target
//! only changes markup, never the visible text.
//!
//! # Escaping
//!
//! All text from events, organizers and the announcement goes through
//! [`escape_html`]. Link targets are taken only from URL-typed fields that
//! parse as absolute http(s) URLs; their serialized form percent-encodes
//! quotes and angle brackets, so they are inserted into `href` as is.

use super::escape::escape_html;
use super::format::{date_line, short_date, time_line, week_heading};
use super::styles;
use super::{RenderOptions, RenderTarget};
use crate::models::{EventWithOrganizer, NewsletterBundle, Organizer};
use crate::utils::non_blank;
use chrono::Days;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;
use url::Url;

/// Placeholder for a primary week without events.
pub const EMPTY_PRIMARY_WEEK: &str = "Für diese Woche sind keine Veranstaltungen eingetragen.";
/// Placeholder for an outlook week without events.
pub const EMPTY_OUTLOOK_WEEK: &str =
    "Für die kommende Woche sind noch keine Veranstaltungen eingetragen.";

const PRIMARY_SECTION_TITLE: &str = "Veranstaltungen dieser Woche";
const OUTLOOK_SECTION_TITLE: &str = "Ausblick auf die nächste Woche";
const UNSUBSCRIBE_SUBJECT: &str = "Abmelden";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^@\s<>"'&?#]+@[^@\s<>"'&?#]+\.[^@\s<>"'&?#]+$"#).unwrap());

/// Render a bundle and optional announcement text into an HTML document.
///
/// Total for every well-formed bundle: missing optional fields drop their
/// markup fragment.
pub fn render(bundle: &NewsletterBundle, custom_text: Option<&str>, options: &RenderOptions) -> String {
    let layout = Layout(options.target);
    let mut html = String::with_capacity(16 * 1024);

    write_head(&mut html, &bundle.subject, options.target);

    let _ = write!(html, r#"<body class="body" style="{}">"#, styles::BODY);
    html.push('\n');
    layout.open_wrapper(&mut html);

    write_header(&mut html, bundle, options);
    write_announcement(&mut html, custom_text);

    write_week_section(
        &mut html,
        &layout,
        PRIMARY_SECTION_TITLE,
        bundle.primary_week_start,
        &bundle.primary_week_events,
        EMPTY_PRIMARY_WEEK,
        options,
    );
    write_week_section(
        &mut html,
        &layout,
        OUTLOOK_SECTION_TITLE,
        bundle.secondary_week_start,
        &bundle.secondary_week_events,
        EMPTY_OUTLOOK_WEEK,
        options,
    );

    write_footer(&mut html, &bundle.all_organizers, options);

    layout.close_wrapper(&mut html);
    html.push_str("</body>\n</html>\n");
    html
}

fn write_head(html: &mut String, subject: &str, target: RenderTarget) {
    html.push_str("<!DOCTYPE html>\n");
    if target == RenderTarget::Modern {
        html.push_str("<html lang=\"de\">\n");
    } else {
        html.push_str(
            "<html lang=\"de\" xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:v=\"urn:schemas-microsoft-com:vml\" xmlns:o=\"urn:schemas-microsoft-com:office:office\">\n",
        );
    }
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<meta http-equiv=\"X-UA-Compatible\" content=\"IE=edge\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(subject));
    match target {
        RenderTarget::Modern => {}
        RenderTarget::Legacy => {
            let _ = writeln!(html, "<style>{}</style>", styles::MSO_STYLE);
        }
        RenderTarget::Universal => {
            html.push_str("<!--[if mso]><xml><o:OfficeDocumentSettings><o:PixelsPerInch>96</o:PixelsPerInch></o:OfficeDocumentSettings></xml>");
            let _ = write!(html, "<style>{}</style>", styles::MSO_STYLE);
            html.push_str("<![endif]-->\n");
        }
    }
    let _ = writeln!(html, "<style>\n{}</style>", styles::style_block());
    html.push_str("</head>\n");
}

fn write_header(html: &mut String, bundle: &NewsletterBundle, options: &RenderOptions) {
    let tz = options.timezone;
    let last_day = bundle.secondary_week_start + Days::new(6);
    let _ = writeln!(
        html,
        r#"<h1 class="header" style="{}">{}</h1>"#,
        styles::HEADER,
        escape_html(&bundle.subject)
    );
    let _ = writeln!(
        html,
        r#"<p class="lead" style="{}">Veranstaltungen vom {} bis {}</p>"#,
        styles::LEAD,
        short_date(bundle.primary_week_start, tz),
        short_date(last_day, tz)
    );
}

/// Non-blank, trimmed lines of the announcement text.
pub fn announcement_lines(custom_text: Option<&str>) -> Vec<&str> {
    custom_text
        .map(|text| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn write_announcement(html: &mut String, custom_text: Option<&str>) {
    let lines = announcement_lines(custom_text);
    if lines.is_empty() {
        return;
    }
    html.push_str("<div class=\"announcement-block\">\n");
    for line in lines {
        let _ = writeln!(
            html,
            r#"<p class="announcement" style="{}">{}</p>"#,
            styles::ANNOUNCEMENT,
            escape_html(line)
        );
    }
    html.push_str("</div>\n");
}

#[allow(clippy::too_many_arguments)]
fn write_week_section(
    html: &mut String,
    layout: &Layout,
    title: &str,
    week_start: chrono::DateTime<chrono::Utc>,
    events: &[EventWithOrganizer],
    empty_state: &str,
    options: &RenderOptions,
) {
    let _ = writeln!(
        html,
        r#"<h2 class="section-title" style="{}">{}</h2>"#,
        styles::SECTION_TITLE,
        title
    );
    let _ = writeln!(
        html,
        r#"<p class="section-meta" style="{}">{}</p>"#,
        styles::SECTION_META,
        week_heading(week_start, options.timezone)
    );

    if events.is_empty() {
        let _ = writeln!(
            html,
            r#"<p class="empty-state" style="{}">{}</p>"#,
            styles::EMPTY_STATE,
            empty_state
        );
        return;
    }

    for event in events {
        let body = card_body(event, options);
        layout.card(html, &body);
    }
}

/// Inner markup of one event card, shared by every layout.
fn card_body(item: &EventWithOrganizer, options: &RenderOptions) -> String {
    let tz = options.timezone;
    let event = &item.event;
    let link = event.link();
    let mut body = String::new();

    let title = escape_html(event.title_de.trim());
    match &link {
        Some(url) => {
            let _ = writeln!(
                body,
                r#"<h3 class="event-title" style="{}"><a href="{}" style="{}">{}</a></h3>"#,
                styles::EVENT_TITLE,
                url.as_str(),
                styles::LINK,
                title
            );
        }
        None => {
            let _ = writeln!(
                body,
                r#"<h3 class="event-title" style="{}">{}</h3>"#,
                styles::EVENT_TITLE,
                title
            );
        }
    }

    if let Some(title_en) = non_blank(Some(event.title_en.as_str())).filter(|t| *t != event.title_de.trim()) {
        let _ = writeln!(
            body,
            r#"<p class="event-subtitle" style="{}">{}</p>"#,
            styles::EVENT_SUBTITLE,
            escape_html(title_en)
        );
    }

    meta_line(&mut body, &escape_html(&date_line(event, tz)));
    if let Some(time) = time_line(event, tz) {
        meta_line(&mut body, &escape_html(&time));
    }
    if let Some(location) = non_blank(event.location.as_deref()) {
        meta_line(&mut body, &format!("Ort: {}", escape_html(location)));
    }
    if let Some(name) = non_blank(item.organizer_name.as_deref()) {
        let organizer = match item.organizer_link() {
            Some(url) => anchor(&url, &escape_html(name)),
            None => escape_html(name).into_owned(),
        };
        meta_line(&mut body, &format!("Veranstalter: {organizer}"));
    }

    let description_de = non_blank(event.description_de.as_deref());
    if let Some(text) = description_de {
        description(&mut body, text, "event-description");
    }
    if let Some(text) = non_blank(event.description_en.as_deref()).filter(|t| Some(*t) != description_de) {
        description(&mut body, text, "event-description event-description-en");
    }

    if let Some(url) = &link {
        let _ = writeln!(
            body,
            r#"<p class="event-meta" style="{}">Mehr Infos: {}</p>"#,
            styles::EVENT_META,
            anchor(url, &escape_html(url.as_str()))
        );
    }

    body
}

fn meta_line(body: &mut String, content: &str) {
    let _ = writeln!(
        body,
        r#"<p class="event-meta" style="{}">{}</p>"#,
        styles::EVENT_META,
        content
    );
}

fn description(body: &mut String, text: &str, class: &str) {
    let escaped: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| escape_html(line).into_owned())
        .collect();
    let _ = writeln!(
        body,
        r#"<p class="{}" style="{}">{}</p>"#,
        class,
        styles::EVENT_DESCRIPTION,
        escaped.join("<br>\n")
    );
}

/// An anchor around already escaped link text.
fn anchor(url: &Url, text: &str) -> String {
    format!(r#"<a href="{}" style="{}">{}</a>"#, url.as_str(), styles::LINK, text)
}

fn mailto(address: &str, subject: Option<&str>) -> String {
    let text = escape_html(address);
    if !EMAIL_RE.is_match(address) {
        return text.into_owned();
    }
    let href = match subject {
        Some(subject) => format!("mailto:{address}?subject={}", urlencoding::encode(subject)),
        None => format!("mailto:{address}"),
    };
    format!(r#"<a href="{href}" style="{}">{text}</a>"#, styles::LINK)
}

fn write_footer(html: &mut String, organizers: &[Organizer], options: &RenderOptions) {
    let _ = writeln!(html, r#"<div class="footer" style="{}">"#, styles::FOOTER);

    if !organizers.is_empty() {
        let _ = writeln!(
            html,
            r#"<h2 class="footer-title" style="{}">Unsere Veranstalter</h2>"#,
            styles::FOOTER_TITLE
        );
        for organizer in organizers {
            let name = escape_html(organizer.name.trim());
            let mut entry = match organizer.website() {
                Some(url) => anchor(&url, &name),
                None => name.into_owned(),
            };
            if let Some(url) = organizer.instagram() {
                let _ = write!(entry, " · {}", anchor(&url, "Instagram"));
            }
            let _ = writeln!(
                html,
                r#"<p class="roster-item" style="{}">{}</p>"#,
                styles::ROSTER_ITEM,
                entry
            );
        }
    }

    let _ = writeln!(
        html,
        r#"<p class="footer-text" style="{}">Fragen, Anregungen oder eine Veranstaltung, die fehlt? Schreib uns an {}.</p>"#,
        styles::FOOTER_TEXT,
        mailto(&options.contact_email, None)
    );
    let _ = writeln!(
        html,
        r#"<p class="footer-text" style="{}">Du möchtest diesen Newsletter nicht mehr erhalten? Schick eine E-Mail mit dem Betreff „{}“ an {}.</p>"#,
        styles::FOOTER_TEXT,
        UNSUBSCRIBE_SUBJECT,
        mailto(&options.unsubscribe_email, Some(UNSUBSCRIBE_SUBJECT))
    );
    html.push_str("</div>\n");
}

/// Container markup for one [`RenderTarget`].
struct Layout(RenderTarget);

impl Layout {
    fn open_wrapper(&self, html: &mut String) {
        match self.0 {
            RenderTarget::Modern => modern_wrapper_open(html),
            RenderTarget::Legacy => legacy_wrapper_open(html),
            RenderTarget::Universal => {
                html.push_str("<!--[if mso]>");
                legacy_wrapper_open(html);
                html.push_str("<![endif]-->\n<!--[if !mso]><!-->");
                modern_wrapper_open(html);
                html.push_str("<!--<![endif]-->\n");
            }
        }
    }

    fn close_wrapper(&self, html: &mut String) {
        match self.0 {
            RenderTarget::Modern => html.push_str("</div></div>\n"),
            RenderTarget::Legacy => html.push_str("</td></tr></table>\n"),
            RenderTarget::Universal => {
                html.push_str("<!--[if mso]></td></tr></table><![endif]-->\n");
                html.push_str("<!--[if !mso]><!--></div></div><!--<![endif]-->\n");
            }
        }
    }

    fn card(&self, html: &mut String, body: &str) {
        match self.0 {
            RenderTarget::Modern => modern_card(html, body),
            RenderTarget::Legacy => legacy_card(html, body),
            RenderTarget::Universal => {
                html.push_str("<!--[if mso]>\n");
                legacy_card(html, body);
                html.push_str("<![endif]-->\n<!--[if !mso]><!-->\n");
                modern_card(html, body);
                html.push_str("<!--<![endif]-->\n");
            }
        }
    }
}

fn modern_wrapper_open(html: &mut String) {
    let _ = write!(
        html,
        r#"<div class="wrapper" style="{}"><div class="wrapper-cell" style="{}">"#,
        styles::WRAPPER,
        styles::WRAPPER_CELL
    );
}

fn legacy_wrapper_open(html: &mut String) {
    let _ = write!(
        html,
        r#"<table role="presentation" class="wrapper" width="600" align="center" cellpadding="0" cellspacing="0" border="0" style="{}"><tr><td class="wrapper-cell" style="{}">"#,
        styles::WRAPPER,
        styles::WRAPPER_CELL
    );
}

fn modern_card(html: &mut String, body: &str) {
    let _ = write!(
        html,
        "<div class=\"event-card\" style=\"{}\">\n{}</div>\n",
        styles::CARD,
        body
    );
}

fn legacy_card(html: &mut String, body: &str) {
    let _ = write!(
        html,
        "<table role=\"presentation\" class=\"event-card\" width=\"100%\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\"><tr><td class=\"event-card-cell\" style=\"{}\">\n{}</td></tr><tr><td style=\"{}\">&nbsp;</td></tr></table>\n",
        styles::CARD_CELL,
        body,
        styles::CARD_SPACER
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{bundle, event, joined, organizer, utc};
    use crate::render::to_plain_text;
    use chrono_tz::Tz;

    const TARGETS: [RenderTarget; 3] = [
        RenderTarget::Modern,
        RenderTarget::Legacy,
        RenderTarget::Universal,
    ];

    fn options(target: RenderTarget) -> RenderOptions {
        RenderOptions {
            target,
            ..RenderOptions::default()
        }
    }

    fn utc_options(target: RenderTarget) -> RenderOptions {
        RenderOptions {
            target,
            timezone: Tz::UTC,
            ..RenderOptions::default()
        }
    }

    fn sample_bundle() -> NewsletterBundle {
        let mut talk = event(1, "Vortrag: Rust im Alltag", utc(2025, 10, 21, 16, 0));
        talk.title_en = "Talk: Rust in practice".to_string();
        talk.location = Some("Raum A001".to_string());
        talk.description_de = Some("Erste Zeile\nZweite Zeile".to_string());
        talk.event_url = Some("https://neuland-ingolstadt.de/events/1".to_string());

        let party = event(2, "Semesterparty", utc(2025, 10, 24, 19, 0));
        let board_games = event(3, "Spieleabend", utc(2025, 10, 29, 17, 0));

        let mut b = bundle(
            vec![joined(talk, "Neuland Ingolstadt"), joined(party, "Fachschaft")],
            vec![joined(board_games, "Spielegruppe")],
        );
        b.all_organizers[0].website_url = Some("https://neuland-ingolstadt.de".to_string());
        b.all_organizers[0].instagram_url = Some("https://instagram.com/neuland".to_string());
        b
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_document_skeleton() {
        for target in TARGETS {
            let html = render(&sample_bundle(), None, &options(target));
            assert!(html.starts_with("<!DOCTYPE html>"));
            assert!(html.contains("<meta charset=\"utf-8\">"));
            assert!(html.contains("<title>Campus Life Newsletter - KW 43</title>"));
            assert!(html.contains("div.event-card{"));
            assert!(html.trim_end().ends_with("</html>"));
        }
    }

    #[test]
    fn test_user_content_is_escaped() {
        let mut nasty = event(1, r#"<script>alert("x")</script> & 'Co'"#, utc(2025, 10, 21, 16, 0));
        nasty.title_en = "<img src=x onerror=alert(1)>".to_string();
        nasty.description_de = Some("<b>fett</b>".to_string());
        nasty.location = Some("<Hörsaal> \"B\"".to_string());
        let mut b = bundle(vec![joined(nasty, "<Fachschaft & Co>")], vec![]);
        b.all_organizers[0].name = "O'Neil <Club>".to_string();

        for target in TARGETS {
            let html = render(&b, Some("<i>Hallo</i>"), &options(target));
            assert!(!html.contains("<script"));
            assert!(!html.contains("<img"));
            assert!(!html.contains("<b>"));
            assert!(!html.contains("<i>"));
            assert!(!html.contains("<Hörsaal>"));
            assert!(!html.contains("<Fachschaft"));
            assert!(!html.contains("<Club>"));
            assert!(html.contains(
                "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;Co&#39;"
            ));
            assert!(html.contains("Ort: &lt;Hörsaal&gt; &quot;B&quot;"));
            assert!(html.contains("O&#39;Neil &lt;Club&gt;"));
            assert!(html.contains("&lt;i&gt;Hallo&lt;/i&gt;"));
        }
    }

    #[test]
    fn test_escaped_content_survives_plain_text() {
        let b = bundle(
            vec![joined(event(1, "Tom & Jerry <live>", utc(2025, 10, 21, 16, 0)), "x")],
            vec![],
        );
        let text = to_plain_text(&render(&b, None, &options(RenderTarget::Modern)));
        assert!(text.contains("Tom & Jerry <live>"));
    }

    #[test]
    fn test_empty_weeks_render_both_placeholders_and_no_cards() {
        let b = bundle(vec![], vec![]);
        for target in TARGETS {
            let html = render(&b, None, &options(target));
            assert!(html.contains(EMPTY_PRIMARY_WEEK));
            assert!(html.contains(EMPTY_OUTLOOK_WEEK));
            assert_eq!(count(&html, "class=\"event-card\""), 0);
        }
        assert_ne!(EMPTY_PRIMARY_WEEK, EMPTY_OUTLOOK_WEEK);
    }

    #[test]
    fn test_single_empty_week_keeps_other_cards() {
        let b = bundle(vec![], vec![joined(event(1, "Später", utc(2025, 10, 28, 10, 0)), "x")]);
        let html = render(&b, None, &options(RenderTarget::Modern));
        assert!(html.contains(EMPTY_PRIMARY_WEEK));
        assert!(!html.contains(EMPTY_OUTLOOK_WEEK));
        assert_eq!(count(&html, "class=\"event-card\""), 1);
    }

    #[test]
    fn test_card_count_per_target() {
        let b = sample_bundle();
        assert_eq!(count(&render(&b, None, &options(RenderTarget::Modern)), "class=\"event-card\""), 3);
        assert_eq!(count(&render(&b, None, &options(RenderTarget::Legacy)), "class=\"event-card\""), 3);
        // Universal carries each card once per branch.
        assert_eq!(count(&render(&b, None, &options(RenderTarget::Universal)), "class=\"event-card\""), 6);
    }

    #[test]
    fn test_custom_text_renders_one_paragraph_per_line() {
        let html = render(&bundle(vec![], vec![]), Some("Line one\n\nLine two\n"), &options(RenderTarget::Modern));
        assert_eq!(count(&html, "class=\"announcement\""), 2);
        assert!(html.contains(">Line one</p>"));
        assert!(html.contains(">Line two</p>"));

        let text = to_plain_text(&html);
        assert!(text.contains("Line one\n\nLine two"));
    }

    #[test]
    fn test_blank_custom_text_omits_block() {
        for custom in [None, Some(""), Some("  \n\t\n ")] {
            let html = render(&bundle(vec![], vec![]), custom, &options(RenderTarget::Modern));
            assert!(!html.contains("announcement-block"));
            assert_eq!(count(&html, "class=\"announcement\""), 0);
        }
    }

    #[test]
    fn test_announcement_lines_trims_and_drops_blanks() {
        assert_eq!(announcement_lines(Some("  a \r\n\r\n b\n")), vec!["a", "b"]);
        assert!(announcement_lines(None).is_empty());
    }

    #[test]
    fn test_all_day_card_omits_time_line() {
        let mut holiday = event(1, "Feiertag", utc(2025, 10, 21, 0, 0));
        holiday.end_date_time = Some(utc(2025, 10, 21, 0, 0));
        let b = bundle(vec![joined(holiday, "Hochschule")], vec![]);

        let html = render(&b, None, &utc_options(RenderTarget::Modern));
        assert!(html.contains("Dienstag, 21.10.2025"));
        assert!(!html.contains(" Uhr"));
    }

    #[test]
    fn test_timed_card_shows_local_time() {
        let html = render(&sample_bundle(), None, &options(RenderTarget::Modern));
        // 16:00 UTC is 18:00 in Berlin summer time.
        assert!(html.contains("18:00 – 20:00 Uhr"));
        assert!(html.contains("Dienstag, 21.10.2025"));
    }

    #[test]
    fn test_section_headings_and_lead() {
        let html = render(&sample_bundle(), None, &utc_options(RenderTarget::Modern));
        assert!(html.contains("KW 43 · 20.10.2025 – 26.10.2025"));
        assert!(html.contains("KW 44 · 27.10.2025 – 02.11.2025"));
        assert!(html.contains("Veranstaltungen vom 20.10.2025 bis 02.11.2025"));
    }

    #[test]
    fn test_card_details() {
        let html = render(&sample_bundle(), None, &options(RenderTarget::Modern));
        assert!(html.contains(r#"<a href="https://neuland-ingolstadt.de/events/1""#));
        assert!(html.contains("Talk: Rust in practice"));
        assert!(html.contains("Ort: Raum A001"));
        assert!(html.contains("Veranstalter: Neuland Ingolstadt"));
        assert!(html.contains("Erste Zeile<br>\nZweite Zeile"));
    }

    #[test]
    fn test_unsafe_urls_are_not_linked() {
        let mut e = event(1, "Klick", utc(2025, 10, 21, 16, 0));
        e.event_url = Some("javascript:alert(1)".to_string());
        let mut item = joined(e, "x");
        item.organizer_website = Some("data:text/html,<b>".to_string());
        let mut b = bundle(vec![item], vec![]);
        b.all_organizers[0].website_url = Some("vbscript:msgbox".to_string());

        let html = render(&b, None, &options(RenderTarget::Universal));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("data:text"));
        assert!(!html.contains("vbscript:"));
        assert!(!html.contains("Mehr Infos"));
    }

    #[test]
    fn test_missing_optionals_degrade_to_omission() {
        let mut bare = event(1, "Nur ein Titel", utc(2025, 10, 21, 16, 0));
        bare.end_date_time = None;
        let item = EventWithOrganizer {
            event: bare,
            organizer_name: None,
            organizer_website: None,
        };
        let mut b = bundle(vec![item], vec![]);
        b.all_organizers.clear();

        let html = render(&b, None, &options(RenderTarget::Legacy));
        assert!(html.contains("Nur ein Titel"));
        assert!(html.contains("18:00 Uhr"));
        assert!(!html.contains("Ort:"));
        assert!(!html.contains("Veranstalter:"));
        assert!(!html.contains("class=\"event-description"));
        assert!(!html.contains("Unsere Veranstalter"));
    }

    #[test]
    fn test_footer_roster_and_contact() {
        let mut b = sample_bundle();
        b.all_organizers.push(organizer(2, "Fachschaft"));
        let html = render(&b, None, &options(RenderTarget::Modern));

        assert!(html.contains(r#"<a href="https://neuland-ingolstadt.de/" style="color:#2563eb;text-decoration:underline;">Neuland Ingolstadt</a>"#));
        assert!(html.contains(r#"<a href="https://instagram.com/neuland" "#));
        assert!(html.contains(">Fachschaft</p>"));
        assert!(html.contains(r#"href="mailto:info@neuland-ingolstadt.de""#));
        assert!(html.contains(r#"href="mailto:info@neuland-ingolstadt.de?subject=Abmelden""#));
    }

    #[test]
    fn test_invalid_contact_address_is_not_linked() {
        let opts = RenderOptions {
            contact_email: "\"><script>@x".to_string(),
            ..options(RenderTarget::Modern)
        };
        let html = render(&bundle(vec![], vec![]), None, &opts);
        assert!(!html.contains("mailto:\""));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_targets_have_identical_visible_text() {
        let b = sample_bundle();
        let custom = Some("Willkommen im Wintersemester!\nViel Spaß.");
        let modern = to_plain_text(&render(&b, custom, &options(RenderTarget::Modern)));
        let legacy = to_plain_text(&render(&b, custom, &options(RenderTarget::Legacy)));
        let universal = to_plain_text(&render(&b, custom, &options(RenderTarget::Universal)));
        assert_eq!(modern, legacy);
        assert_eq!(modern, universal);
    }

    #[test]
    fn test_targets_have_identical_visible_text_when_empty() {
        let b = bundle(vec![], vec![]);
        let modern = to_plain_text(&render(&b, None, &options(RenderTarget::Modern)));
        let legacy = to_plain_text(&render(&b, None, &options(RenderTarget::Legacy)));
        assert_eq!(modern, legacy);
    }

    #[test]
    fn test_plain_text_contains_every_title() {
        let b = sample_bundle();
        for target in TARGETS {
            let text = to_plain_text(&render(&b, None, &options(target)));
            for item in b.events() {
                assert!(text.contains(&item.event.title_de), "missing {}", item.event.title_de);
            }
            assert!(!text.contains('<'));
            assert!(!text.contains("style="));
        }
    }

    #[test]
    fn test_plain_text_contains_titles_with_whitespace_runs_normalized() {
        let mut film = event(7, "Kino:  Der  Film", utc(2025, 10, 22, 18, 0));
        film.title_en = "Cinema:\tThe   Film".to_string();
        let b = bundle(vec![joined(film, "Filmclub")], vec![]);
        for target in TARGETS {
            let text = to_plain_text(&render(&b, None, &options(target)));
            assert!(text.contains("Kino: Der Film"), "{target}: {text}");
            assert!(text.contains("Cinema: The Film"));
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let b = sample_bundle();
        let opts = options(RenderTarget::Universal);
        assert_eq!(render(&b, Some("x"), &opts), render(&b, Some("x"), &opts));
    }
}
