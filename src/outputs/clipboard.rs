//! Clipboard sink.
//!
//! Writes one rendering pass as a dual-format clipboard payload: the HTML
//! document as `text/html` and its plain-text projection as `text/plain`.
//! Paste targets pick the richest format they understand.

use super::{SinkKind, SinkReceipt};
use crate::error::{NewsletterError, Result};
use crate::models::RenderedDocument;
use arboard::Clipboard;
use tracing::{error, info, instrument};

/// A clipboard that accepts HTML with a plain-text alternative.
pub trait ClipboardSink {
    fn set_html(&mut self, html: &str, plain_text: &str) -> Result<()>;
}

/// The operating system clipboard, via `arboard`.
///
/// The clipboard handle is opened lazily on first use and kept for the
/// lifetime of the value; on X11 and Wayland the contents are served by
/// that handle, so keep it alive until the paste has happened.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_html(&mut self, html: &str, plain_text: &str) -> Result<()> {
        if self.handle.is_none() {
            let clipboard =
                Clipboard::new().map_err(|e| NewsletterError::Clipboard(e.to_string()))?;
            self.handle = Some(clipboard);
        }
        let Some(clipboard) = self.handle.as_mut() else {
            return Err(NewsletterError::Clipboard("clipboard unavailable".into()));
        };
        clipboard
            .set_html(html, Some(plain_text))
            .map_err(|e| NewsletterError::Clipboard(e.to_string()))
    }
}

/// Copy `doc` to `clipboard` as HTML plus plain text.
///
/// # Errors
///
/// Clipboard failures are returned as [`NewsletterError::Clipboard`]; `doc`
/// is untouched and may be handed to another sink.
#[instrument(level = "info", skip_all, fields(subject = %doc.subject))]
pub fn copy_to_clipboard(
    clipboard: &mut impl ClipboardSink,
    doc: &RenderedDocument,
) -> Result<SinkReceipt> {
    match clipboard.set_html(&doc.html, &doc.plain_text) {
        Ok(()) => {
            info!(
                html_bytes = doc.html.len(),
                text_bytes = doc.plain_text.len(),
                "Copied newsletter to clipboard"
            );
            Ok(SinkReceipt {
                sink: SinkKind::Clipboard,
                location: "text/html + text/plain".to_string(),
                mime_type: super::download::HTML_MIME_TYPE,
                bytes: doc.html.len() + doc.plain_text.len(),
            })
        }
        Err(e) => {
            error!(error = %e, "Clipboard write failed");
            Err(match e {
                NewsletterError::Clipboard(_) => e,
                other => NewsletterError::Clipboard(other.to_string()),
            })
        }
    }
}
