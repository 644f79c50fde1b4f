//! HTML entity escaping for user-authored text.
//!
//! Every string that comes from the event or organizer store, or from the
//! free-text announcement, passes through [`escape_html`] before it is
//! interpolated into the document. The output is safe in element content and
//! in double- or single-quoted attribute values.

use std::borrow::Cow;

/// Escape `&`, `<`, `>`, `"` and `'` as HTML entities.
///
/// Returns the input unchanged (borrowed) when nothing needs escaping.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
