//! Runtime configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags and environment variables (applied by [`crate::cli`]).
//!
//! ```yaml
//! api_base_url: https://api.campus-life.example
//! newsletter_name: Campus Life Newsletter
//! display_timezone: Europe/Berlin
//! contact_email: info@neuland-ingolstadt.de
//! debounce_ms: 300
//! render_target: universal
//! retry:
//!   max_retries: 3
//!   base_delay_ms: 500
//! ```

use crate::error::{NewsletterError, Result};
use crate::render::{RenderOptions, RenderTarget};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_NEWSLETTER_NAME: &str = "Campus Life Newsletter";
pub const DEFAULT_CONTACT_EMAIL: &str = "info@neuland-ingolstadt.de";

/// All tunable settings of the newsletter engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the Campus Life Events API, without the `/api/v1` suffix.
    pub api_base_url: String,
    /// Value of the `session_id` cookie used to authenticate API calls.
    pub session_token: Option<String>,
    pub newsletter_name: String,
    /// IANA timezone used for week boundaries and displayed dates/times.
    pub display_timezone: Tz,
    pub contact_email: String,
    /// Address that receives unsubscribe requests.
    pub unsubscribe_email: String,
    /// Quiet period before an interactive re-render starts.
    pub debounce_ms: u64,
    pub render_target: RenderTarget,
    pub retry: RetrySettings,
}

/// Backoff parameters for API reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetrySettings {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_token: None,
            newsletter_name: DEFAULT_NEWSLETTER_NAME.to_string(),
            display_timezone: chrono_tz::Europe::Berlin,
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            unsubscribe_email: DEFAULT_CONTACT_EMAIL.to_string(),
            debounce_ms: 300,
            render_target: RenderTarget::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML, filling unspecified fields with defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| NewsletterError::Config(e.to_string()))
    }

    /// Load settings from an optional YAML file.
    ///
    /// Without a path the defaults are returned. A path that cannot be read is
    /// an error: an explicitly requested config file must exist.
    #[instrument(level = "info", skip_all, fields(path = ?path))]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| NewsletterError::io(path, e))?;
        let settings = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(settings)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            target: self.render_target,
            timezone: self.display_timezone,
            contact_email: self.contact_email.clone(),
            unsubscribe_email: self.unsubscribe_email.clone(),
        }
    }
}
