//! Output sinks for rendered newsletters.
//!
//! Each sink takes a finished [`RenderedDocument`](crate::models::RenderedDocument)
//! and delivers it somewhere:
//!
//! # Submodules
//!
//! - [`download`]: Writes the HTML file (and optionally a plain-text copy)
//! - [`clipboard`]: Places HTML plus a plain-text alternative on the clipboard
//! - [`preview`]: Sends the document as a preview mail through the API
//!
//! Sinks never modify the document. A failed sink leaves it valid for a
//! retry or for any other sink.

pub mod clipboard;
pub mod download;
pub mod preview;

use std::fmt;

/// Which sink handled a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Download,
    Clipboard,
    Preview,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SinkKind::Download => "download",
            SinkKind::Clipboard => "clipboard",
            SinkKind::Preview => "preview",
        })
    }
}

/// What a sink did with a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    pub sink: SinkKind,
    /// File path, clipboard formats, or preview subject.
    pub location: String,
    pub mime_type: &'static str,
    pub bytes: usize,
}
