//! Data models for events, organizers, and the compiled newsletter.
//!
//! This module defines the core data structures used throughout the engine:
//! - [`Event`]: A campus event as returned by the events API
//! - [`Organizer`]: An organizer account as returned by the organizers API
//! - [`EventWithOrganizer`]: An event joined to its organizer for rendering
//! - [`NewsletterBundle`]: The snapshot of two week windows ready to render
//! - [`RenderedDocument`]: The HTML and plain-text output of one render pass
//!
//! Field names follow the snake_case JSON schema of the Campus Life Events API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A campus event as stored by the external event store.
///
/// Events are immutable once fetched; the engine never writes them back.
/// Titles and descriptions come in German and English. The German variant is
/// the primary one in the newsletter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub title_de: String,
    pub title_en: String,
    #[serde(default)]
    pub description_de: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub event_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub publish_app: bool,
    /// Gates inclusion in the newsletter.
    #[serde(default)]
    pub publish_newsletter: bool,
    #[serde(default)]
    pub publish_in_ical: bool,
    #[serde(default)]
    pub publish_web: bool,
}

impl Event {
    /// The end timestamp, falling back to the start when the event has none.
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end_date_time.unwrap_or(self.start_date_time)
    }

    /// The event link, if it is a usable absolute web URL.
    pub fn link(&self) -> Option<Url> {
        parse_web_url(self.event_url.as_deref())
    }
}

/// An organizer account (student group, department, initiative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    /// Whether the organizer may use the newsletter tooling.
    #[serde(default)]
    pub newsletter: bool,
}

impl Organizer {
    pub fn website(&self) -> Option<Url> {
        parse_web_url(self.website_url.as_deref())
    }

    pub fn instagram(&self) -> Option<Url> {
        parse_web_url(self.instagram_url.as_deref())
    }
}

/// An event joined to its organizer's display data.
///
/// The organizer fields are `None` when the event references an organizer
/// that was not returned by the organizer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithOrganizer {
    #[serde(flatten)]
    pub event: Event,
    pub organizer_name: Option<String>,
    pub organizer_website: Option<String>,
}

impl EventWithOrganizer {
    pub fn organizer_link(&self) -> Option<Url> {
        parse_web_url(self.organizer_website.as_deref())
    }
}

/// The normalized, read-only snapshot handed to the renderer.
///
/// # Invariants
///
/// - `secondary_week_start == primary_week_start + 7 days`
/// - every event in a week list starts inside that week and has
///   `publish_newsletter` set
/// - both lists are sorted by ascending start time, ties broken by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterBundle {
    pub subject: String,
    pub primary_week_events: Vec<EventWithOrganizer>,
    pub secondary_week_events: Vec<EventWithOrganizer>,
    pub all_organizers: Vec<Organizer>,
    pub primary_week_start: DateTime<Utc>,
    pub secondary_week_start: DateTime<Utc>,
}

impl NewsletterBundle {
    /// All bundled events, primary week first.
    pub fn events(&self) -> impl Iterator<Item = &EventWithOrganizer> {
        self.primary_week_events
            .iter()
            .chain(self.secondary_week_events.iter())
    }
}

/// One render pass: the HTML document and its plain-text projection.
///
/// Never persisted. The subject and primary week start travel with it because
/// the sinks need them for the mail subject and the download filename.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub subject: String,
    pub primary_week_start: DateTime<Utc>,
    pub html: String,
    pub plain_text: String,
}

/// Parse an optional user-supplied URL, accepting only absolute http(s) URLs.
pub fn parse_web_url(raw: Option<&str>) -> Option<Url> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Url::parse(raw)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}
