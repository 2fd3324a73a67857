//! Turns extracted entities into a candidate calendar event.

use crate::payload::NotificationPayload;
use crate::types::{CandidateEvent, Entity, EntityLabel, NotificationContent, DEFAULT_EVENT_TITLE};

/// Text of the first entity carrying `label`, if any.
fn first_with_label(entities: &[Entity], label: EntityLabel) -> Option<&str> {
    entities
        .iter()
        .find(|entity| entity.label == label)
        .map(|entity| entity.text.as_str())
}

/// Assemble a candidate event and decide whether it is worth surfacing.
///
/// Each field comes from the first entity with the matching label. The
/// candidate is surfaced only when a real EVENT title or a DATE was found;
/// LOCATION or TIME on their own are not enough.
pub fn decide(entities: &[Entity]) -> Option<CandidateEvent> {
    let title = first_with_label(entities, EntityLabel::Event).unwrap_or(DEFAULT_EVENT_TITLE);
    let date_text = first_with_label(entities, EntityLabel::Date).unwrap_or_default();
    let time_text = first_with_label(entities, EntityLabel::Time).unwrap_or_default();
    let location_text = first_with_label(entities, EntityLabel::Location).unwrap_or_default();

    if title == DEFAULT_EVENT_TITLE && date_text.is_empty() {
        return None;
    }

    Some(CandidateEvent {
        title: title.to_string(),
        date_text: date_text.to_string(),
        time_text: time_text.to_string(),
        location_text: location_text.to_string(),
    })
}

/// Build the notification for a candidate event.
pub fn notification_for(candidate: &CandidateEvent) -> NotificationContent {
    NotificationContent {
        title: format!("Found Event: {}", candidate.title),
        body: format!(
            "On: {} at {}. Location: {}",
            candidate.date_text, candidate.time_text, candidate.location_text
        ),
        user_info: NotificationPayload::from(candidate).to_user_info(),
    }
}
