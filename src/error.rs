//! Error types for the newsletter engine.
//!
//! Every fallible operation in the library returns [`NewsletterError`]. The
//! variants map onto the stages of the pipeline: fetching the bundle,
//! resolving the week window, and dispatching to a sink. Sink errors are
//! recoverable; the rendered document they were handed stays valid.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling or dispatching a newsletter.
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// A read from the event or organizer store failed.
    ///
    /// `transient` is set for failures worth retrying: connection errors,
    /// timeouts, HTTP 5xx and 429.
    #[error("failed to fetch {resource}: {message}")]
    Fetch {
        resource: String,
        message: String,
        transient: bool,
    },

    /// The API rejected the session credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested week window cannot be represented.
    #[error("invalid week window: {0}")]
    InvalidWindow(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// The preview mail could not be sent.
    #[error("preview send failed: {0}")]
    Preview(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl NewsletterError {
    /// A transient fetch failure.
    pub fn fetch(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            resource: resource.into(),
            message: message.into(),
            transient: true,
        }
    }

    /// A fetch failure that will not go away on retry (bad request, malformed body).
    pub fn fetch_rejected(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            resource: resource.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// Whether a failed read may succeed when repeated unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, NewsletterError::Fetch { transient: true, .. })
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller may retry the failed operation with the same input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NewsletterError::Clipboard(_) | NewsletterError::Preview(_) | NewsletterError::Io { .. }
        )
    }
}

/// Result type alias for newsletter operations.
pub type Result<T> = std::result::Result<T, NewsletterError>;
