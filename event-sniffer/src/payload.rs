//! Notification payload carried across the notification boundary.
//!
//! The payload is attached to a notification as a flat string map and read
//! back, unchanged, when the user acts on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::types::CandidateEvent;

pub const KEY_TITLE: &str = "title";
pub const KEY_DATE_TEXT: &str = "dateText";
pub const KEY_TIME_TEXT: &str = "timeText";
pub const KEY_LOCATION_TEXT: &str = "locationText";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Notification payload is missing '{0}'")]
    MissingField(&'static str),
}

/// The candidate event fields, keyed as they appear on the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub date_text: String,
    pub time_text: String,
    pub location_text: String,
}

impl NotificationPayload {
    /// Flatten into the string map attached to a notification.
    pub fn to_user_info(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(KEY_TITLE.to_string(), self.title.clone());
        map.insert(KEY_DATE_TEXT.to_string(), self.date_text.clone());
        map.insert(KEY_TIME_TEXT.to_string(), self.time_text.clone());
        map.insert(KEY_LOCATION_TEXT.to_string(), self.location_text.clone());
        map
    }

    /// Rebuild a payload from a notification's string map.
    ///
    /// Extra keys are ignored. Every expected key must be present; values are
    /// taken verbatim (empty strings included).
    pub fn from_user_info(user_info: &BTreeMap<String, String>) -> Result<Self, PayloadError> {
        let field = |key: &'static str| {
            user_info
                .get(key)
                .cloned()
                .ok_or(PayloadError::MissingField(key))
        };

        Ok(Self {
            title: field(KEY_TITLE)?,
            date_text: field(KEY_DATE_TEXT)?,
            time_text: field(KEY_TIME_TEXT)?,
            location_text: field(KEY_LOCATION_TEXT)?,
        })
    }
}

impl From<&CandidateEvent> for NotificationPayload {
    fn from(candidate: &CandidateEvent) -> Self {
        Self {
            title: candidate.title.clone(),
            date_text: candidate.date_text.clone(),
            time_text: candidate.time_text.clone(),
            location_text: candidate.location_text.clone(),
        }
    }
}

impl From<NotificationPayload> for CandidateEvent {
    fn from(payload: NotificationPayload) -> Self {
        Self {
            title: payload.title,
            date_text: payload.date_text,
            time_text: payload.time_text,
            location_text: payload.location_text,
        }
    }
}
