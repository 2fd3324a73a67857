//! Core types shared across the scan pipeline and the action flow.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Title used when no EVENT entity was found.
pub const DEFAULT_EVENT_TITLE: &str = "New Event";

/// Action identifier of the "Add to Calendar" button.
pub const ADD_TO_CALENDAR_ACTION: &str = "ADD_TO_CALENDAR";

/// Action identifier reported when a notification is dismissed.
pub const DISMISS_ACTION: &str = "DISMISS";

/// Label attached to an entity by the extraction service.
///
/// Any label string outside the four known ones becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityLabel {
    Event,
    Date,
    Time,
    Location,
    Other,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Event => "EVENT",
            EntityLabel::Date => "DATE",
            EntityLabel::Time => "TIME",
            EntityLabel::Location => "LOCATION",
            EntityLabel::Other => "OTHER",
        }
    }
}

impl From<String> for EntityLabel {
    fn from(label: String) -> Self {
        match label.as_str() {
            "EVENT" => EntityLabel::Event,
            "DATE" => EntityLabel::Date,
            "TIME" => EntityLabel::Time,
            "LOCATION" => EntityLabel::Location,
            _ => EntityLabel::Other,
        }
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled span of text returned by the extraction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Best-guess event assembled from one scan's entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEvent {
    pub title: String,
    pub date_text: String,
    pub time_text: String,
    pub location_text: String,
}

/// Text shown to the user plus the payload to hand back on confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    /// Flat string map carried by the notification (see `NotificationPayload`).
    pub user_info: BTreeMap<String, String>,
}

/// A user action on a notification, delivered back from the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub action_id: String,
    pub user_info: BTreeMap<String, String>,
}

impl ActionEvent {
    pub fn is_add_to_calendar(&self) -> bool {
        self.action_id == ADD_TO_CALENDAR_ACTION
    }
}

/// A concrete calendar entry ready to be written.
#[derive(Debug, Clone)]
pub struct ResolvedCalendarEvent<Tz: TimeZone = Local> {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// What started a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    /// Fixed-interval timer tick
    Timer,
    /// Explicit user request (`--once`)
    Manual,
}

impl ScanTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanTrigger::Timer => "timer",
            ScanTrigger::Manual => "manual",
        }
    }
}

/// What one scan did. Every variant except `Notified` means "nothing this cycle".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Another scan was still running
    Busy,
    /// Our own dialog is open and holds focus
    AwaitingAnswer,
    /// No foreground app, no focused window, or no text
    NoText,
    /// Same text as the previous scan
    Unchanged,
    /// The service returned nothing (or could not be reached)
    NoEntities,
    /// Entities found, but neither an EVENT nor a DATE
    InsufficientEntities,
    /// A notification was handed to the notifier
    Notified(CandidateEvent),
    /// The notifier failed to show the notification
    NotifyFailed(String),
}
