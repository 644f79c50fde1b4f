//! Preview-send sink: mails the rendered document through the API.

use super::{SinkKind, SinkReceipt};
use crate::api::PreviewMailer;
use crate::error::{NewsletterError, Result};
use crate::models::RenderedDocument;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Send `doc` as a preview mail.
///
/// Any failure of the mailer is reported as [`NewsletterError::Preview`]
/// so callers can treat it as a recoverable sink error.
#[instrument(level = "info", skip_all, fields(subject = %doc.subject))]
pub async fn send_preview(mailer: &impl PreviewMailer, doc: &RenderedDocument) -> Result<SinkReceipt> {
    let t0 = Instant::now();
    match mailer.send_preview(&doc.subject, &doc.html).await {
        Ok(()) => {
            info!(elapsed_ms = t0.elapsed().as_millis() as u64, "Preview sent");
            Ok(SinkReceipt {
                sink: SinkKind::Preview,
                location: doc.subject.clone(),
                mime_type: super::download::HTML_MIME_TYPE,
                bytes: doc.html.len(),
            })
        }
        Err(e) => {
            error!(
                elapsed_ms = t0.elapsed().as_millis() as u64,
                error = %e,
                "Preview send failed"
            );
            Err(match e {
                NewsletterError::Preview(_) => e,
                other => NewsletterError::Preview(other.to_string()),
            })
        }
    }
}
