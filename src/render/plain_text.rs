//! Plain-text projection of a rendered newsletter.
//!
//! The clipboard sink writes HTML and plain text side by side, so recipients
//! whose client ignores the HTML part still get readable content. The
//! projection walks the parsed document and:
//!
//! - skips `<head>`, `<style>`, `<script>` and comments (which removes the
//!   Outlook-only conditional branches)
//! - separates paragraphs and headings with a blank line and other block
//!   elements with a single line break
//! - collapses whitespace runs inside a line
//! - appends the target of a link in parentheses when it differs from the
//!   link text
//!
//! Entities are decoded by the parser, so no markup syntax survives.

use crate::utils::collapse_whitespace;
use itertools::Itertools;
use scraper::{ElementRef, Html, Node};

/// Flatten an HTML document into readable plain text.
pub fn to_plain_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut sink = TextSink::default();
    walk(document.root_element(), &mut sink);
    sink.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
enum Break {
    #[default]
    None,
    Line,
    Paragraph,
}

#[derive(Debug, Default)]
struct TextSink {
    out: String,
    pending: Break,
}

impl TextSink {
    fn request(&mut self, kind: Break) {
        self.pending = self.pending.max(kind);
    }

    fn push_text(&mut self, raw: &str) {
        let text = collapse_whitespace(raw);
        if text.trim().is_empty() {
            if !self.out.is_empty() && self.pending == Break::None && !self.out.ends_with(' ') {
                self.out.push(' ');
            }
            return;
        }
        if !self.out.is_empty() {
            match self.pending {
                Break::None => {}
                Break::Line => self.out.push('\n'),
                Break::Paragraph => self.out.push_str("\n\n"),
            }
        }
        self.pending = Break::None;
        self.out.push_str(&text);
    }

    fn finish(self) -> String {
        self.out
            .lines()
            .map(str::trim)
            .join("\n")
            .trim()
            .to_string()
    }
}

fn block_kind(tag: &str) -> Option<Break> {
    match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" => {
            Some(Break::Paragraph)
        }
        "div" | "table" | "tr" | "td" | "th" | "li" | "section" | "header" | "footer"
        | "article" | "body" => Some(Break::Line),
        _ => None,
    }
}

fn walk(element: ElementRef<'_>, sink: &mut TextSink) {
    let tag = element.value().name();
    match tag {
        "head" | "style" | "script" | "title" | "template" => return,
        "br" => {
            sink.request(Break::Line);
            return;
        }
        _ => {}
    }

    let block = block_kind(tag);
    if let Some(kind) = block {
        sink.request(kind);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => sink.push_text(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    walk(child, sink);
                }
            }
            _ => {}
        }
    }

    if tag == "a" {
        let text: String = element.text().collect();
        if let Some(target) = element
            .value()
            .attr("href")
            .and_then(|href| link_target(href, &text))
        {
            sink.push_text(&format!(" ({target})"));
        }
    }

    if let Some(kind) = block {
        sink.request(kind);
    }
}

/// The readable link target to append after a link, if it adds anything.
fn link_target(href: &str, text: &str) -> Option<String> {
    let target = if let Some(mail) = href.strip_prefix("mailto:") {
        mail.split('?').next().unwrap_or(mail).to_string()
    } else if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        return None;
    };
    let text = text.trim();
    let same = text == target || text.trim_end_matches('/') == target.trim_end_matches('/');
    (!same).then_some(target)
}
