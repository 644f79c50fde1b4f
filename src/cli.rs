//! Command-line interface definitions for the newsletter compiler.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Connection settings can also come from environment variables, and
//! everything not given on the command line falls back to the YAML config
//! file and then to built-in defaults.

use campus_newsletter::config::Settings;
use campus_newsletter::error::{NewsletterError, Result};
use campus_newsletter::render::RenderTarget;
use campus_newsletter::utils::non_blank;
use campus_newsletter::week::WindowSelector;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Command-line arguments for the newsletter compiler.
///
/// # Examples
///
/// ```sh
/// # Write next week's newsletter to ./out
/// campus_newsletter render -o ./out
///
/// # Issue of 2025-W42 with an announcement, copied to the clipboard
/// campus_newsletter copy --year 2025 --week 42 --custom-text "Frohes Semester!"
///
/// # Re-render whenever announcement.txt changes
/// campus_newsletter watch --custom-text-file announcement.txt -o ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "NEWSLETTER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the Campus Life Events API
    #[arg(long, env = "CAMPUS_LIFE_API_URL", global = true)]
    pub api_base_url: Option<String>,

    /// Value of the `session_id` cookie for the API
    #[arg(long, env = "CAMPUS_LIFE_SESSION_TOKEN", hide_env_values = true, global = true)]
    pub session_token: Option<String>,

    /// IANA timezone for week boundaries and displayed times
    #[arg(long, env = "NEWSLETTER_TIMEZONE", global = true)]
    pub timezone: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the newsletter and write it as an HTML file
    Render {
        #[command(flatten)]
        issue: IssueArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render the newsletter and copy it to the clipboard as HTML and plain text
    Copy {
        #[command(flatten)]
        issue: IssueArgs,
    },
    /// Render the newsletter and send it as a preview mail
    Preview {
        #[command(flatten)]
        issue: IssueArgs,
    },
    /// Re-render into the output directory whenever the custom-text file changes
    Watch {
        #[command(flatten)]
        issue: IssueArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// How often to check the custom-text file, in milliseconds
        #[arg(long, default_value_t = 500)]
        poll_ms: u64,
    },
}

/// Options selecting and customizing one issue.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct IssueArgs {
    /// ISO year of the issue week (defaults to the current year when only --week is given)
    #[arg(short, long)]
    pub year: Option<i32>,

    /// ISO week in which the issue is sent; it covers the following two weeks
    #[arg(short, long)]
    pub week: Option<u32>,

    /// Announcement text shown above the events
    #[arg(long, conflicts_with = "custom_text_file")]
    pub custom_text: Option<String>,

    /// Read the announcement text from a file
    #[arg(long)]
    pub custom_text_file: Option<PathBuf>,

    /// Mail client layout: modern, legacy or universal
    #[arg(short, long)]
    pub target: Option<RenderTarget>,
}

/// Where rendered files go.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct OutputArgs {
    /// Output directory for the HTML file
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write a plain-text `.txt` copy next to the HTML file
    #[arg(long)]
    pub plain_text: bool,
}

impl Cli {
    /// The issue options of whichever subcommand was given.
    pub fn issue(&self) -> &IssueArgs {
        match &self.command {
            Command::Render { issue, .. }
            | Command::Copy { issue }
            | Command::Preview { issue }
            | Command::Watch { issue, .. } => issue,
        }
    }

    /// Load the config file and apply command-line overrides on top.
    pub async fn load_settings(&self) -> Result<Settings> {
        let settings = Settings::load(self.config.as_deref()).await?;
        self.apply_overrides(settings)
    }

    /// Apply flags and environment values over file settings.
    pub fn apply_overrides(&self, mut settings: Settings) -> Result<Settings> {
        if let Some(url) = non_blank(self.api_base_url.as_deref()) {
            settings.api_base_url = url.to_string();
        }
        if let Some(token) = non_blank(self.session_token.as_deref()) {
            settings.session_token = Some(token.to_string());
        }
        if let Some(name) = non_blank(self.timezone.as_deref()) {
            settings.display_timezone = name
                .parse::<Tz>()
                .map_err(|e| NewsletterError::Config(format!("unknown timezone `{name}`: {e}")))?;
        }
        if let Some(target) = self.issue().target {
            settings.render_target = target;
        }
        Ok(settings)
    }
}

impl IssueArgs {
    pub fn selector(&self, now: DateTime<Utc>, tz: Tz) -> Result<WindowSelector> {
        WindowSelector::from_parts(self.year, self.week, now, tz)
    }

    /// The announcement text, read from `--custom-text-file` when given.
    pub async fn custom_text(&self) -> Result<Option<String>> {
        if let Some(path) = &self.custom_text_file {
            return read_custom_text(path).await.map(Some);
        }
        Ok(self.custom_text.clone())
    }
}

pub async fn read_custom_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NewsletterError::io(path, e))
}
