//! Handling the user's answer to a notification.

use chrono::Local;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar::{CalendarError, CalendarWriter};
use crate::payload::{NotificationPayload, PayloadError};
use crate::resolver::{self, ResolveError};
use crate::types::{ActionEvent, ResolvedCalendarEvent};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Turns confirmed notifications into calendar events.
pub struct ActionHandler {
    calendar: Arc<dyn CalendarWriter>,
}

impl ActionHandler {
    pub fn new(calendar: Arc<dyn CalendarWriter>) -> Self {
        Self { calendar }
    }

    /// Handle one action.
    ///
    /// Returns the created event for "Add to Calendar", `None` for any other
    /// action (dismissal).
    pub async fn handle(&self, action: &ActionEvent) -> Result<Option<ResolvedCalendarEvent>, ActionError> {
        if !action.is_add_to_calendar() {
            debug!("Ignoring action {}", action.action_id);
            return Ok(None);
        }

        let payload = NotificationPayload::from_user_info(&action.user_info)?;
        let event = resolver::resolve(&payload, &Local::now())?;
        info!(
            "Adding '{}' ({} to {})",
            event.title, event.start, event.end
        );

        self.calendar.create_event(&event).await?;
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateEvent, ADD_TO_CALENDAR_ACTION, DISMISS_ACTION};
    use chrono::{Duration, Timelike};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCalendar {
        events: Mutex<Vec<ResolvedCalendarEvent>>,
        deny: bool,
    }

    #[async_trait::async_trait]
    impl CalendarWriter for RecordingCalendar {
        async fn ensure_access(&self) -> Result<(), CalendarError> {
            if self.deny {
                Err(CalendarError::PermissionDenied("denied".to_string()))
            } else {
                Ok(())
            }
        }

        async fn create_event(&self, event: &ResolvedCalendarEvent) -> Result<(), CalendarError> {
            self.ensure_access().await?;
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn user_info(time_text: &str) -> BTreeMap<String, String> {
        NotificationPayload::from(&CandidateEvent {
            title: "Team Sync".to_string(),
            date_text: "tomorrow".to_string(),
            time_text: time_text.to_string(),
            location_text: "Room 4".to_string(),
        })
        .to_user_info()
    }

    fn action(action_id: &str, user_info: BTreeMap<String, String>) -> ActionEvent {
        ActionEvent {
            action_id: action_id.to_string(),
            user_info,
        }
    }

    #[tokio::test]
    async fn test_add_writes_resolved_event() {
        let calendar = Arc::new(RecordingCalendar::default());
        let handler = ActionHandler::new(calendar.clone());

        let event = handler
            .handle(&action(ADD_TO_CALENDAR_ACTION, user_info("at 3pm")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.title, "Team Sync");
        assert_eq!(event.start.hour(), 15);
        assert_eq!(event.end - event.start, Duration::seconds(3600));
        assert_eq!(calendar.events.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_is_ignored() {
        let calendar = Arc::new(RecordingCalendar::default());
        let handler = ActionHandler::new(calendar.clone());

        let result = handler.handle(&action(DISMISS_ACTION, user_info("3pm"))).await.unwrap();
        assert!(result.is_none());
        assert!(calendar.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_payload_field_is_reported() {
        let calendar = Arc::new(RecordingCalendar::default());
        let handler = ActionHandler::new(calendar.clone());
        let mut info = user_info("3pm");
        info.remove("title");

        let err = handler.handle(&action(ADD_TO_CALENDAR_ACTION, info)).await.unwrap_err();
        assert!(matches!(err, ActionError::Payload(PayloadError::MissingField("title"))));
        assert!(calendar.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_hour_creates_nothing() {
        let calendar = Arc::new(RecordingCalendar::default());
        let handler = ActionHandler::new(calendar.clone());

        let err = handler
            .handle(&action(ADD_TO_CALENDAR_ACTION, user_info("at 31")))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Resolve(_)));
        assert!(calendar.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_denied_calendar_is_reported() {
        let calendar = Arc::new(RecordingCalendar {
            deny: true,
            ..Default::default()
        });
        let handler = ActionHandler::new(calendar);

        let err = handler
            .handle(&action(ADD_TO_CALENDAR_ACTION, user_info("3pm")))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Calendar(CalendarError::PermissionDenied(_))));
    }
}
