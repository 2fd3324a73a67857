//! Writing confirmed events to the user's calendar.
//!
//! On macOS the write is an AppleScript `make new event` sent to Calendar.
//! The start date is assembled field by field inside the script so the
//! result does not depend on the system's date format.

use chrono::{Datelike, Timelike};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};

use crate::applescript::{self, ScriptError, NOT_AUTHORIZED};
use crate::types::ResolvedCalendarEvent;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Calendar access denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to write calendar event: {0}")]
    WriteFailed(String),

    #[error("Calendar writes are not supported on this platform")]
    Unsupported,
}

impl From<ScriptError> for CalendarError {
    fn from(err: ScriptError) -> Self {
        if err.code() == Some(NOT_AUTHORIZED) {
            CalendarError::PermissionDenied(err.to_string())
        } else {
            CalendarError::WriteFailed(err.to_string())
        }
    }
}

/// Destination for confirmed events.
#[async_trait::async_trait]
pub trait CalendarWriter: Send + Sync {
    /// Make sure the calendar can be written, asking for access if needed.
    async fn ensure_access(&self) -> Result<(), CalendarError>;

    /// Create `event` (title, start, end) in the chosen calendar.
    async fn create_event(&self, event: &ResolvedCalendarEvent) -> Result<(), CalendarError>;
}

/// Script that touches Calendar so the system asks for (or reports) access.
pub fn access_script() -> String {
    "tell application \"Calendar\" to get name of first calendar".to_string()
}

/// Script creating `event` in `calendar_name`, or in the first writable
/// calendar when no name is given.
pub fn create_event_script(event: &ResolvedCalendarEvent, calendar_name: Option<&str>) -> String {
    let start = &event.start;
    let duration = (event.end.clone() - event.start.clone()).num_seconds();
    let target = match calendar_name {
        Some(name) => format!("calendar {}", applescript::quote(name)),
        None => "first calendar whose writable is true".to_string(),
    };

    // Day goes to 1 first so setting the month never overflows.
    format!(
        "set startDate to current date\n\
         set day of startDate to 1\n\
         set year of startDate to {year}\n\
         set month of startDate to {month}\n\
         set day of startDate to {day}\n\
         set hours of startDate to {hour}\n\
         set minutes of startDate to {minute}\n\
         set seconds of startDate to {second}\n\
         set endDate to startDate + {duration}\n\
         tell application \"Calendar\"\n\
         tell {target}\n\
         make new event at end of events with properties {{summary:{title}, start date:startDate, end date:endDate}}\n\
         end tell\n\
         end tell",
        year = start.year(),
        month = start.month(),
        day = start.day(),
        hour = start.hour(),
        minute = start.minute(),
        second = start.second(),
        duration = duration,
        target = target,
        title = applescript::quote(&event.title),
    )
}

/// Calendar writer backed by AppleScript (macOS).
pub struct AppleScriptCalendar {
    calendar_name: Option<String>,
    access_granted: AtomicBool,
}

impl AppleScriptCalendar {
    pub fn new(calendar_name: Option<String>) -> Self {
        Self {
            calendar_name,
            access_granted: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl CalendarWriter for AppleScriptCalendar {
    async fn ensure_access(&self) -> Result<(), CalendarError> {
        if self.access_granted.load(Ordering::Acquire) {
            return Ok(());
        }

        debug!("Checking calendar access");
        tokio::task::spawn_blocking(|| applescript::run(&access_script()))
            .await
            .map_err(|e| CalendarError::WriteFailed(e.to_string()))??;

        self.access_granted.store(true, Ordering::Release);
        info!("Calendar access granted");
        Ok(())
    }

    async fn create_event(&self, event: &ResolvedCalendarEvent) -> Result<(), CalendarError> {
        self.ensure_access().await?;

        let script = create_event_script(event, self.calendar_name.as_deref());
        tokio::task::spawn_blocking(move || applescript::run(&script))
            .await
            .map_err(|e| CalendarError::WriteFailed(e.to_string()))??;

        info!("Added '{}' at {}", event.title, event.start);
        Ok(())
    }
}

/// Calendar writer for platforms without a calendar integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedCalendar;

#[async_trait::async_trait]
impl CalendarWriter for UnsupportedCalendar {
    async fn ensure_access(&self) -> Result<(), CalendarError> {
        Err(CalendarError::Unsupported)
    }

    async fn create_event(&self, _event: &ResolvedCalendarEvent) -> Result<(), CalendarError> {
        Err(CalendarError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn event() -> ResolvedCalendarEvent {
        let start = Local.with_ymd_and_hms(2026, 10, 17, 15, 0, 0).earliest().unwrap();
        ResolvedCalendarEvent {
            title: "Team \"Sync\"".to_string(),
            end: start + chrono::Duration::seconds(3600),
            start,
        }
    }

    #[test]
    fn test_script_sets_every_date_field() {
        let script = create_event_script(&event(), None);
        assert!(script.contains("set year of startDate to 2026\n"));
        assert!(script.contains("set month of startDate to 10\n"));
        assert!(script.contains("set day of startDate to 17\n"));
        assert!(script.contains("set hours of startDate to 15\n"));
        assert!(script.contains("set minutes of startDate to 0\n"));
        assert!(script.contains("set endDate to startDate + 3600\n"));
    }

    #[test]
    fn test_script_resets_day_before_month() {
        let script = create_event_script(&event(), None);
        let reset = script.find("set day of startDate to 1\n").unwrap();
        let month = script.find("set month of startDate").unwrap();
        assert!(reset < month);
    }

    #[test]
    fn test_script_quotes_title() {
        let script = create_event_script(&event(), None);
        assert!(script.contains(r#"summary:"Team \"Sync\"""#));
    }

    #[test]
    fn test_script_targets_named_or_first_writable_calendar() {
        assert!(create_event_script(&event(), None).contains("tell first calendar whose writable is true\n"));
        assert!(create_event_script(&event(), Some("Work")).contains("tell calendar \"Work\"\n"));
    }

    #[test]
    fn test_not_authorized_maps_to_permission_denied() {
        let err = CalendarError::from(ScriptError::Failed {
            code: Some(NOT_AUTHORIZED),
            message: "Not authorized to send Apple events to Calendar. (-1743)".to_string(),
        });
        assert!(matches!(err, CalendarError::PermissionDenied(_)));
    }

    #[test]
    fn test_other_script_errors_are_write_failures() {
        let err = CalendarError::from(ScriptError::Failed {
            code: Some(-2700),
            message: "boom".to_string(),
        });
        assert!(matches!(err, CalendarError::WriteFailed(_)));
    }

    #[tokio::test]
    async fn test_unsupported_calendar_refuses() {
        assert!(matches!(
            UnsupportedCalendar.ensure_access().await,
            Err(CalendarError::Unsupported)
        ));
        assert!(matches!(
            UnsupportedCalendar.create_event(&event()).await,
            Err(CalendarError::Unsupported)
        ));
    }
}
