//! Newsletter rendering.
//!
//! - [`html`]: the mail template
//! - [`plain_text`]: the plain-text projection of a rendered document
//! - [`format`]: German date/time strings
//! - [`escape`]: HTML escaping for untrusted text
//! - [`styles`]: CSS shared by the `<style>` block and inline attributes

pub mod escape;
pub mod format;
pub mod html;
pub mod plain_text;
pub mod styles;

pub use escape::escape_html;
pub use html::render;
pub use plain_text::to_plain_text;

use crate::config::DEFAULT_CONTACT_EMAIL;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mail-client family the HTML layout is built for.
///
/// The visible text is the same for every target; only the container
/// markup differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    /// `div` based layout for standards-compliant clients.
    Modern,
    /// Nested presentation tables for Outlook's Word engine.
    Legacy,
    /// Both layouts, switched with Outlook conditional comments.
    #[default]
    Universal,
}

impl RenderTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderTarget::Modern => "modern",
            RenderTarget::Legacy => "legacy",
            RenderTarget::Universal => "universal",
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(RenderTarget::Modern),
            "legacy" | "outlook" => Ok(RenderTarget::Legacy),
            "universal" => Ok(RenderTarget::Universal),
            other => Err(format!(
                "unknown render target `{other}` (expected modern, legacy or universal)"
            )),
        }
    }
}

/// Presentation parameters that are not part of the bundle itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub target: RenderTarget,
    /// Timezone for displayed dates, times and the all-day check.
    pub timezone: Tz,
    pub contact_email: String,
    pub unsubscribe_email: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            target: RenderTarget::default(),
            timezone: chrono_tz::Europe::Berlin,
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            unsubscribe_email: DEFAULT_CONTACT_EMAIL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_target_parse() {
        assert_eq!("modern".parse::<RenderTarget>().unwrap(), RenderTarget::Modern);
        assert_eq!(" Legacy ".parse::<RenderTarget>().unwrap(), RenderTarget::Legacy);
        assert_eq!("outlook".parse::<RenderTarget>().unwrap(), RenderTarget::Legacy);
        assert!("fancy".parse::<RenderTarget>().is_err());
    }

    #[test]
    fn test_render_target_display_roundtrips_through_parse() {
        for target in [RenderTarget::Modern, RenderTarget::Legacy, RenderTarget::Universal] {
            assert_eq!(target.to_string().parse::<RenderTarget>().unwrap(), target);
        }
    }
}
