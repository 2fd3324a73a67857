//! Event Sniffer - calendar suggestions from the text on screen
//!
//! Watches the text of the focused window, sends new text to an entity
//! extraction service and, when the entities describe an event, offers to add
//! it to the calendar.
//!
//! # Architecture
//!
//! - [`pipeline`]: one scan (read text, dedupe, extract entities, decide, notify)
//! - [`extractors`]: focused-text source and the extraction service client
//! - [`decision`]: entities to candidate event, notification text
//! - [`resolver`]: candidate event text to concrete start and end times
//! - [`notifier`], [`actions`], [`calendar`]: the confirm flow
//! - [`config`]: TOML configuration

pub mod actions;
pub mod applescript;
pub mod calendar;
pub mod change_detector;
pub mod config;
pub mod decision;
pub mod extractors;
pub mod notifier;
pub mod payload;
pub mod pipeline;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use actions::{ActionError, ActionHandler};
pub use calendar::{AppleScriptCalendar, CalendarError, CalendarWriter, UnsupportedCalendar};
pub use change_detector::{compute_hash, ChangeDetector};
pub use config::{Config, ConfigError};
pub use decision::{decide, notification_for};
pub use extractors::{EntityClient, EntitySource, FocusedTextSource, TextSource};
pub use notifier::{AppleScriptNotifier, LogNotifier, Notifier, NotifyError};
pub use payload::{NotificationPayload, PayloadError};
pub use pipeline::ScanPipeline;
pub use resolver::{resolve, ResolveError};
pub use types::{
    ActionEvent, CandidateEvent, Entity, EntityLabel, NotificationContent,
    ResolvedCalendarEvent, ScanOutcome, ScanTrigger,
};
