//! # Campus Newsletter
//!
//! Compiles the weekly Campus Life events newsletter: resolves the ISO week
//! window of an issue, assembles the events of that week and the following
//! one from the Campus Life Events API, renders them into an email-ready HTML
//! document with a plain-text twin, and delivers the result to a file, the
//! clipboard, or a preview mail.
//!
//! ## Pipeline
//!
//! 1. **Window**: [`week::resolve_window`] turns an optional `(year, week)`
//!    selector into the primary and outlook week starts
//! 2. **Bundle**: [`bundle::assemble_bundle`] reads events and organizers
//!    concurrently, filters, splits and sorts them
//! 3. **Render**: [`render::render`] builds the HTML document and
//!    [`render::to_plain_text`] flattens it
//! 4. **Output**: one of the sinks in [`outputs`]
//!
//! [`render_newsletter_document`] runs steps 1-3.

pub mod api;
pub mod bundle;
pub mod config;
pub mod debounce;
pub mod error;
pub mod models;
pub mod outputs;
pub mod render;
pub mod utils;
pub mod week;

use api::{EventSource, OrganizerSource};
use chrono::{DateTime, Utc};
use config::Settings;
use error::Result;
use models::{NewsletterBundle, RenderedDocument};
use render::RenderOptions;
use tracing::{info, instrument};
use week::{WindowSelector, resolve_window};

/// Render a bundle into HTML and its plain-text projection in one pass.
pub fn render_document(
    bundle: &NewsletterBundle,
    custom_text: Option<&str>,
    options: &RenderOptions,
) -> RenderedDocument {
    let html = render::render(bundle, custom_text, options);
    let plain_text = render::to_plain_text(&html);
    RenderedDocument {
        subject: bundle.subject.clone(),
        primary_week_start: bundle.primary_week_start,
        html,
        plain_text,
    }
}

/// Resolve, assemble and render one newsletter issue.
///
/// # Arguments
///
/// * `selector` - Issue week, or [`WindowSelector::Next`] for the upcoming week
/// * `custom_text` - Optional announcement shown above the events
/// * `settings` - Newsletter name, timezone and render options
/// * `events` / `organizers` - The stores to read from
/// * `now` - Reference instant for the default selector
///
/// # Errors
///
/// [`error::NewsletterError::InvalidWindow`] for an unrepresentable
/// selector, or the first error of either store read.
#[instrument(level = "info", skip_all, fields(selector = %selector))]
pub async fn render_newsletter_document(
    selector: WindowSelector,
    custom_text: Option<&str>,
    settings: &Settings,
    events: &impl EventSource,
    organizers: &impl OrganizerSource,
    now: DateTime<Utc>,
) -> Result<RenderedDocument> {
    let window = resolve_window(selector, now, settings.display_timezone)?;
    let bundle = bundle::assemble_bundle(&window, events, organizers, settings).await?;
    let doc = render_document(&bundle, custom_text, &settings.render_options());
    info!(
        subject = %doc.subject,
        html_bytes = doc.html.len(),
        text_bytes = doc.plain_text.len(),
        "Rendered newsletter"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fakes::InMemoryStore;
    use crate::error::NewsletterError;
    use crate::models::fixtures::{event, organizer, utc};
    use chrono_tz::Tz;

    fn store() -> InMemoryStore {
        let mut late = event(2, "Hackathon", utc(2025, 10, 29, 16, 0));
        late.organizer_id = 2;
        let mut draft = event(3, "Entwurf", utc(2025, 10, 22, 16, 0));
        draft.publish_newsletter = false;
        InMemoryStore {
            events: vec![
                event(1, "Erstsemester-Grillen", utc(2025, 10, 21, 15, 0)),
                late,
                draft,
                event(4, "Letzte Woche", utc(2025, 10, 14, 15, 0)),
            ],
            organizers: vec![organizer(1, "Neuland"), organizer(2, "Fachschaft")],
        }
    }

    #[tokio::test]
    async fn test_render_newsletter_document_end_to_end() {
        let store = store();
        let settings = Settings::default();
        let doc = render_newsletter_document(
            WindowSelector::IsoWeek { year: 2025, week: 42 },
            Some("Willkommen zurück!\n\nViel Spaß"),
            &settings,
            &store,
            &store,
            utc(2025, 10, 15, 9, 0),
        )
        .await
        .unwrap();

        assert_eq!(doc.subject, "Campus Life Newsletter - KW 43");
        assert_eq!(doc.primary_week_start, utc(2025, 10, 19, 22, 0));
        assert!(doc.plain_text.contains("Erstsemester-Grillen"));
        assert!(doc.plain_text.contains("Hackathon"));
        assert!(doc.plain_text.contains("Willkommen zurück!\n\nViel Spaß"));
        assert!(!doc.plain_text.contains("Entwurf"));
        assert!(!doc.plain_text.contains("Letzte Woche"));
        assert!(doc.html.contains("Veranstalter: Fachschaft"));
    }

    #[tokio::test]
    async fn test_default_selector_matches_current_issue_week() {
        let store = store();
        let settings = Settings::default();
        let now = utc(2025, 10, 15, 9, 0);
        let explicit = render_newsletter_document(
            WindowSelector::IsoWeek { year: 2025, week: 42 },
            None,
            &settings,
            &store,
            &store,
            now,
        )
        .await
        .unwrap();
        let default = render_newsletter_document(WindowSelector::Next, None, &settings, &store, &store, now)
            .await
            .unwrap();
        assert_eq!(explicit, default);
    }

    #[tokio::test]
    async fn test_unrepresentable_week_is_invalid_window() {
        let store = store();
        let err = render_newsletter_document(
            WindowSelector::IsoWeek { year: 300_000, week: 1 },
            None,
            &Settings::default(),
            &store,
            &store,
            utc(2025, 10, 15, 9, 0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, NewsletterError::InvalidWindow(_)));
    }

    #[test]
    fn test_render_document_projects_plain_text_from_same_pass() {
        let bundle = crate::models::fixtures::bundle(vec![], vec![]);
        let options = RenderOptions {
            timezone: Tz::UTC,
            ..RenderOptions::default()
        };
        let doc = render_document(&bundle, None, &options);
        assert_eq!(doc.plain_text, render::to_plain_text(&doc.html));
        assert_eq!(doc.subject, bundle.subject);
        assert!(doc.plain_text.contains(render::html::EMPTY_PRIMARY_WEEK));
    }
}
