//! ISO-8601 week arithmetic and newsletter window resolution.
//!
//! A newsletter covers two consecutive calendar weeks: the *primary* week
//! (the one the issue is about) and the *outlook* week that follows it.
//! This module turns a [`WindowSelector`] into the two week start instants.
//!
//! The selector names the *issue week*, the week in which the newsletter is
//! compiled and sent. The primary window is the week after it, so the
//! default selector (the current week) and an explicit selector for the
//! current week resolve to the same window: the next full calendar week.
//!
//! All week numbering in the crate goes through this module. The subject
//! line and the section headings in the rendered document call
//! [`iso_week_number`] rather than re-deriving week numbers themselves.
//!
//! # Week boundaries
//!
//! Weeks run Monday 00:00 to the following Monday 00:00 in the display
//! timezone. Week 1 of a year is the week containing the year's first
//! Thursday, so a year has either 52 or 53 weeks.
//!
//! # Out-of-range week numbers
//!
//! Issue week numbers past the end of the year roll over into the next year:
//! week `w` of year `y` is week 1 of `y` plus `w - 1` weeks. Asking for week
//! 53 of a 52-week year therefore yields week 1 of the following year, and
//! week 0 yields the last week of the previous year.

use crate::error::{NewsletterError, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use std::fmt;

/// Which issue a newsletter is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowSelector {
    /// This week's issue, covering the next full calendar week after today.
    #[default]
    Next,
    /// The issue sent in an explicit ISO year and week.
    IsoWeek { year: i32, week: u32 },
}

impl WindowSelector {
    /// Build a selector from optional CLI values.
    ///
    /// A week without a year refers to the current ISO year; a year without a
    /// week is rejected.
    pub fn from_parts(
        year: Option<i32>,
        week: Option<u32>,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Self> {
        match (year, week) {
            (None, None) => Ok(WindowSelector::Next),
            (Some(year), Some(week)) => Ok(WindowSelector::IsoWeek { year, week }),
            (None, Some(week)) => {
                let year = now.with_timezone(&tz).date_naive().iso_week().year();
                Ok(WindowSelector::IsoWeek { year, week })
            }
            (Some(year), None) => Err(NewsletterError::InvalidWindow(format!(
                "year {year} given without a week number"
            ))),
        }
    }
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSelector::Next => write!(f, "next week"),
            WindowSelector::IsoWeek { year, week } => write!(f, "{year}-W{week:02}"),
        }
    }
}

/// The two contiguous week windows of one newsletter issue.
///
/// `primary_start` and `secondary_start` are both Monday 00:00 in the display
/// timezone, seven calendar days apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub primary_start: DateTime<Utc>,
    pub secondary_start: DateTime<Utc>,
    /// Exclusive end of the outlook week.
    pub secondary_end: DateTime<Utc>,
}

impl WeekWindow {
    pub fn contains_primary(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.primary_start && instant < self.secondary_start
    }

    pub fn contains_secondary(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.secondary_start && instant < self.secondary_end
    }
}

/// Number of ISO weeks in `year` (52 or 53).
pub fn weeks_in_year(year: i32) -> u32 {
    // Dec 28 always falls in the last ISO week of its year.
    NaiveDate::from_ymd_opt(year, 12, 28)
        .map(|d| d.iso_week().week())
        .unwrap_or(52)
}

/// ISO week number of an instant, seen in the display timezone.
pub fn iso_week_number(instant: DateTime<Utc>, tz: Tz) -> u32 {
    instant.with_timezone(&tz).date_naive().iso_week().week()
}

/// Monday of ISO week `week` in `year`, rolling over out-of-range weeks.
pub fn monday_of_iso_week(year: i32, week: u32) -> Option<NaiveDate> {
    let week_one = NaiveDate::from_isoywd_opt(year, 1, Weekday::Mon)?;
    if week >= 1 {
        week_one.checked_add_days(Days::new(u64::from(week - 1) * 7))
    } else {
        week_one.checked_sub_days(Days::new(7))
    }
}

/// The first Monday strictly after `today`.
pub fn next_monday_after(today: NaiveDate) -> NaiveDate {
    let offset = 7 - u64::from(today.weekday().num_days_from_monday());
    today + Days::new(offset)
}

/// Resolve a selector into the two week windows of an issue.
///
/// The primary window starts on the Monday after the issue week. Pure: the
/// same selector, `now` and timezone always give the same window.
pub fn resolve_window(selector: WindowSelector, now: DateTime<Utc>, tz: Tz) -> Result<WeekWindow> {
    let monday = match selector {
        WindowSelector::Next => next_monday_after(now.with_timezone(&tz).date_naive()),
        WindowSelector::IsoWeek { year, week } => {
            if week > weeks_in_year(year) || week == 0 {
                tracing::debug!(year, week, "week number outside year; rolling over");
            }
            monday_of_iso_week(year, week)
                .and_then(|issue_monday| issue_monday.checked_add_days(Days::new(7)))
                .ok_or_else(|| {
                    NewsletterError::InvalidWindow(format!("{year}-W{week:02} is out of range"))
                })?
        }
    };

    let next_monday = monday
        .checked_add_days(Days::new(7))
        .ok_or_else(|| NewsletterError::InvalidWindow(format!("{monday} is out of range")))?;
    let following_monday = next_monday
        .checked_add_days(Days::new(7))
        .ok_or_else(|| NewsletterError::InvalidWindow(format!("{next_monday} is out of range")))?;

    Ok(WeekWindow {
        primary_start: local_midnight(monday, tz)?,
        secondary_start: local_midnight(next_monday, tz)?,
        secondary_end: local_midnight(following_monday, tz)?,
    })
}

/// Midnight at the start of `date` in `tz`, as a UTC instant.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| NewsletterError::InvalidWindow(format!("midnight of {date} does not exist in {tz}")))
}
