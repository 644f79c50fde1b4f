//! German date and time formatting for event cards and section headings.

use crate::models::Event;
use crate::week::iso_week_number;
use chrono::{DateTime, Days, Locale, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

const LOCALE: Locale = Locale::de_DE;

/// Whether an event starts and ends exactly at midnight in `tz`.
///
/// An event without an end timestamp is judged by its start alone.
pub fn is_all_day(event: &Event, tz: Tz) -> bool {
    is_midnight(event.start_date_time, tz) && is_midnight(event.end_or_start(), tz)
}

fn is_midnight(instant: DateTime<Utc>, tz: Tz) -> bool {
    let local = instant.with_timezone(&tz);
    local.hour() == 0 && local.minute() == 0
}

/// `Dienstag, 21.10.2025`
fn long_day(date: NaiveDate) -> String {
    date.format_localized("%A, %d.%m.%Y", LOCALE).to_string()
}

/// `21.10.2025`
pub fn short_date(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%d.%m.%Y").to_string()
}

fn clock(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// Last calendar day an event occupies, in `tz`.
///
/// All-day events store an exclusive midnight end, so an all-day event
/// ending at midnight on a later day really ends the day before.
fn last_day(event: &Event, tz: Tz, all_day: bool) -> NaiveDate {
    let start = event.start_date_time.with_timezone(&tz).date_naive();
    let end = event.end_or_start().with_timezone(&tz).date_naive();
    if all_day && end > start {
        end - Days::new(1)
    } else {
        end.max(start)
    }
}

/// The date line of an event card.
///
/// Single-day events show one long date; events spanning several days show
/// the first and last day.
pub fn date_line(event: &Event, tz: Tz) -> String {
    let all_day = is_all_day(event, tz);
    let first = event.start_date_time.with_timezone(&tz).date_naive();
    let last = last_day(event, tz, all_day);
    if last == first {
        long_day(first)
    } else {
        format!("{} – {}", long_day(first), long_day(last))
    }
}

/// The time-of-day line of an event card, or `None` for all-day events.
///
/// `18:00 – 20:00 Uhr`, or `18:00 Uhr` when the event has no duration.
pub fn time_line(event: &Event, tz: Tz) -> Option<String> {
    if is_all_day(event, tz) {
        return None;
    }
    let start = clock(event.start_date_time, tz);
    let end = event.end_or_start();
    if end <= event.start_date_time {
        Some(format!("{start} Uhr"))
    } else {
        Some(format!("{start} – {} Uhr", clock(end, tz)))
    }
}

/// Heading of a week section: `KW 43 · 20.10.2025 – 26.10.2025`.
pub fn week_heading(week_start: DateTime<Utc>, tz: Tz) -> String {
    let sunday = week_start + Days::new(6);
    format!(
        "KW {} · {} – {}",
        iso_week_number(week_start, tz),
        short_date(week_start, tz),
        short_date(sunday, tz)
    )
}
