//! Bundle assembly: selecting, filtering and ordering events for one issue.
//!
//! [`assemble_bundle`] issues the two store reads concurrently, then turns
//! their results into a [`NewsletterBundle`]:
//!
//! 1. events outside both week windows are dropped (sources may over-fetch)
//! 2. events without the `publish_newsletter` flag are dropped
//! 3. the rest are split into the primary and outlook weeks
//! 4. each list is sorted by start time, ties broken by id
//! 5. every event is joined to its organizer's name and website
//!
//! Either read failing fails the whole assembly. No partial bundle is ever
//! returned.

use crate::api::{EventSource, OrganizerSource};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{Event, EventWithOrganizer, NewsletterBundle, Organizer};
use crate::week::{WeekWindow, iso_week_number};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Fetch events and organizers for `window` and build the bundle.
///
/// # Arguments
///
/// * `window` - The resolved primary and outlook weeks
/// * `events` - Event store to read from
/// * `organizers` - Organizer store to read from
/// * `settings` - Supplies the newsletter name and display timezone
///
/// # Errors
///
/// Propagates the first failure of either read.
#[instrument(level = "info", skip_all, fields(primary = %window.primary_start))]
pub async fn assemble_bundle(
    window: &WeekWindow,
    events: &impl EventSource,
    organizers: &impl OrganizerSource,
    settings: &Settings,
) -> Result<NewsletterBundle> {
    let t0 = Instant::now();
    let (events, organizers) = futures::try_join!(
        events.list_events_for_window(window.primary_start, window.secondary_end),
        organizers.list_organizers(),
    )?;
    let fetched = events.len();

    let bundle = build_bundle(
        window,
        events,
        organizers,
        &settings.newsletter_name,
        settings.display_timezone,
    );

    info!(
        fetched,
        primary = bundle.primary_week_events.len(),
        secondary = bundle.secondary_week_events.len(),
        organizers = bundle.all_organizers.len(),
        subject = %bundle.subject,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Assembled newsletter bundle"
    );
    Ok(bundle)
}

/// The subject line of the issue whose primary week starts at `primary_start`.
pub fn subject_line(newsletter_name: &str, primary_start: DateTime<Utc>, tz: Tz) -> String {
    let week = iso_week_number(primary_start, tz);
    format!("{} - KW {week}", newsletter_name.trim())
}

/// Pure part of assembly, separated from the reads.
pub fn build_bundle(
    window: &WeekWindow,
    events: Vec<Event>,
    mut organizers: Vec<Organizer>,
    newsletter_name: &str,
    tz: Tz,
) -> NewsletterBundle {
    let by_id: HashMap<i64, &Organizer> = organizers.iter().map(|o| (o.id, o)).collect();

    let mut primary = Vec::new();
    let mut secondary = Vec::new();
    for event in events {
        if !event.publish_newsletter {
            debug!(event_id = event.id, "Skipping event not published to newsletter");
            continue;
        }
        let start = event.start_date_time;
        let target = if window.contains_primary(start) {
            &mut primary
        } else if window.contains_secondary(start) {
            &mut secondary
        } else {
            continue;
        };
        target.push(join_organizer(event, &by_id));
    }

    for list in [&mut primary, &mut secondary] {
        list.sort_by_key(|e| (e.event.start_date_time, e.event.id));
    }

    organizers = organizers
        .into_iter()
        .sorted_by_cached_key(|o| (o.name.trim().to_lowercase(), o.id))
        .collect();

    NewsletterBundle {
        subject: subject_line(newsletter_name, window.primary_start, tz),
        primary_week_events: primary,
        secondary_week_events: secondary,
        all_organizers: organizers,
        primary_week_start: window.primary_start,
        secondary_week_start: window.secondary_start,
    }
}

fn join_organizer(event: Event, by_id: &HashMap<i64, &Organizer>) -> EventWithOrganizer {
    let organizer = by_id.get(&event.organizer_id);
    if organizer.is_none() {
        warn!(
            event_id = event.id,
            organizer_id = event.organizer_id,
            "Event references an unknown organizer"
        );
    }
    EventWithOrganizer {
        organizer_name: organizer.map(|o| o.name.clone()),
        organizer_website: organizer.and_then(|o| o.website_url.clone()),
        event,
    }
}
