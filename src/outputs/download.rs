//! File download sink.
//!
//! Writes the full HTML document to
//! `<output_dir>/campus-life-newsletter-<YYYY-MM-DD>.html`, where the date is
//! the first day of the primary week in the display timezone.

use super::{SinkKind, SinkReceipt};
use crate::error::{NewsletterError, Result};
use crate::models::RenderedDocument;
use crate::utils::ensure_writable_dir;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const HTML_MIME_TYPE: &str = "text/html; charset=utf-8";

const FILE_PREFIX: &str = "campus-life-newsletter";

/// `campus-life-newsletter-2025-10-20.html`
pub fn download_filename(primary_week_start: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "{FILE_PREFIX}-{}.html",
        primary_week_start.with_timezone(&tz).format("%Y-%m-%d")
    )
}

/// Writes rendered documents into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    timezone: Tz,
    plain_text: bool,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            output_dir: output_dir.into(),
            timezone,
            plain_text: false,
        }
    }

    /// Also write the plain-text projection next to the HTML file, with a
    /// `.txt` extension.
    pub fn with_plain_text(mut self, enabled: bool) -> Self {
        self.plain_text = enabled;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the HTML file for `doc` is written to.
    pub fn path_for(&self, doc: &RenderedDocument) -> PathBuf {
        self.output_dir
            .join(download_filename(doc.primary_week_start, self.timezone))
    }

    /// Write `doc` to disk, replacing an existing file for the same week.
    ///
    /// # Errors
    ///
    /// Returns [`NewsletterError::Io`] when the directory is not writable or
    /// a write fails.
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir.display()))]
    pub async fn write(&self, doc: &RenderedDocument) -> Result<SinkReceipt> {
        ensure_writable_dir(&self.output_dir).await?;

        let path = self.path_for(doc);
        info!(path = %path.display(), bytes = doc.html.len(), "Writing HTML");
        if let Err(e) = fs::write(&path, &doc.html).await {
            error!(path = %path.display(), error = %e, "Failed to write HTML");
            return Err(NewsletterError::io(&path, e));
        }

        if self.plain_text {
            let text_path = path.with_extension("txt");
            fs::write(&text_path, &doc.plain_text)
                .await
                .map_err(|e| NewsletterError::io(&text_path, e))?;
            info!(path = %text_path.display(), "Wrote plain-text copy");
        }

        Ok(SinkReceipt {
            sink: SinkKind::Download,
            location: path.display().to_string(),
            mime_type: HTML_MIME_TYPE,
            bytes: doc.html.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::utc;

    fn doc(primary_week_start: DateTime<Utc>) -> RenderedDocument {
        RenderedDocument {
            subject: "Campus Life Newsletter - KW 43".to_string(),
            primary_week_start,
            html: "<!DOCTYPE html><html><body><p>Hallo</p></body></html>".to_string(),
            plain_text: "Hallo".to_string(),
        }
    }

    #[test]
    fn test_filename_uses_display_timezone_date() {
        // Monday 00:00 in Berlin is Sunday 22:00 UTC.
        let start = utc(2025, 10, 19, 22, 0);
        assert_eq!(
            download_filename(start, chrono_tz::Europe::Berlin),
            "campus-life-newsletter-2025-10-20.html"
        );
        assert_eq!(
            download_filename(start, Tz::UTC),
            "campus-life-newsletter-2025-10-19.html"
        );
    }

    #[tokio::test]
    async fn test_write_creates_file_with_full_document() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested/out");
        let sink = FileSink::new(&out, Tz::UTC);
        let document = doc(utc(2025, 10, 20, 0, 0));

        let receipt = sink.write(&document).await.unwrap();

        let path = out.join("campus-life-newsletter-2025-10-20.html");
        assert_eq!(receipt.location, path.display().to_string());
        assert_eq!(receipt.sink, SinkKind::Download);
        assert_eq!(receipt.mime_type, "text/html; charset=utf-8");
        assert_eq!(receipt.bytes, document.html.len());
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), document.html);
        assert!(!out.join("campus-life-newsletter-2025-10-20.txt").exists());
    }

    #[tokio::test]
    async fn test_write_plain_text_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = FileSink::new(tmp.path(), Tz::UTC).with_plain_text(true);
        sink.write(&doc(utc(2025, 10, 20, 0, 0))).await.unwrap();

        let text = tokio::fs::read_to_string(tmp.path().join("campus-life-newsletter-2025-10-20.txt"))
            .await
            .unwrap();
        assert_eq!(text, "Hallo");
    }

    #[tokio::test]
    async fn test_unwritable_target_is_io_error_and_document_survives() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        tokio::fs::write(&blocker, b"x").await.unwrap();

        let sink = FileSink::new(blocker.join("sub"), Tz::UTC);
        let document = doc(utc(2025, 10, 20, 0, 0));
        let err = sink.write(&document).await.unwrap_err();

        assert!(matches!(err, NewsletterError::Io { .. }));
        assert!(err.is_recoverable());
        assert_eq!(document.plain_text, "Hallo");
    }
}
