//! Resolves a notification payload into concrete start and end instants.
//!
//! This is a narrow heuristic, not a date parser: the only relative day it
//! understands is "tomorrow", and the hour is the first number in the time
//! text adjusted by an am/pm marker.

use chrono::{DateTime, Days, Duration, NaiveTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::payload::NotificationPayload;
use crate::types::ResolvedCalendarEvent;

/// Hour used when the time text contains no number.
pub const DEFAULT_HOUR: u32 = 9;

/// Length of every created event.
pub const EVENT_DURATION_SECS: i64 = 3600;

lazy_static! {
    static ref FIRST_NUMBER: Regex = Regex::new(r"[0-9]+").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Could not construct the event date: {0}")]
    DateConstruction(String),
}

/// Whether the date text points at the next day.
pub fn is_tomorrow(date_text: &str) -> bool {
    date_text.to_lowercase().contains("tomorrow")
}

/// Hour of day (before validation) described by `time_text`.
///
/// Takes the first run of digits (default 9), then adds 12 for "pm" below
/// noon and maps "12am" to midnight. Values already past 12 pass through.
pub fn resolve_hour(time_text: &str) -> u32 {
    let mut hour = FIRST_NUMBER
        .find(time_text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(DEFAULT_HOUR);

    let lowered = time_text.to_lowercase();
    if lowered.contains("pm") && hour < 12 {
        hour += 12;
    }
    if lowered.contains("am") && hour == 12 {
        hour = 0;
    }
    hour
}

/// Resolve `payload` against the current time `now`.
///
/// The start is the base day (today, or tomorrow) at the resolved hour with
/// zero minutes and seconds, in `now`'s time zone. The end is one hour later.
///
/// # Errors
///
/// `ResolveError::DateConstruction` when the hour is not a valid hour of the
/// day, the base day overflows, or the local time does not exist (a DST gap).
pub fn resolve<Tz: TimeZone>(
    payload: &NotificationPayload,
    now: &DateTime<Tz>,
) -> Result<ResolvedCalendarEvent<Tz>, ResolveError> {
    let today = now.date_naive();
    let base_day = if is_tomorrow(&payload.date_text) {
        today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| ResolveError::DateConstruction(format!("no day after {}", today)))?
    } else {
        today
    };

    let hour = resolve_hour(&payload.time_text);
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| ResolveError::DateConstruction(format!("hour {} is out of range", hour)))?;

    let local = base_day.and_time(time);
    let start = now
        .timezone()
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| ResolveError::DateConstruction(format!("{} does not exist locally", local)))?;

    let end = start
        .clone()
        .checked_add_signed(Duration::seconds(EVENT_DURATION_SECS))
        .ok_or_else(|| ResolveError::DateConstruction(format!("no end time after {}", local)))?;

    Ok(ResolvedCalendarEvent {
        title: payload.title.clone(),
        start,
        end,
    })
}
