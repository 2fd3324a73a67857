//! The scan pipeline.
//!
//! One scan: read the focused text, skip it if it matches the previous scan,
//! send it to the extraction service, decide whether the entities describe an
//! event, and hand a notification to the notifier.
//!
//! # Concurrency
//!
//! A trigger that fires while a scan is still running is skipped
//! (`ScanOutcome::Busy`). The last-text check and update happen as one step
//! under a lock, so identical consecutive text never produces two
//! notifications, whatever the trigger.
//!
//! While the notifier's own dialog is waiting for an answer it holds focus,
//! so scans stop short (`ScanOutcome::AwaitingAnswer`) instead of reading it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::change_detector::ChangeDetector;
use crate::decision;
use crate::extractors::{EntitySource, TextSource};
use crate::notifier::Notifier;
use crate::types::{ScanOutcome, ScanTrigger};

/// Clears the in-flight flag when the scan ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs scans against a text source, an entity source and a notifier.
pub struct ScanPipeline {
    text_source: Arc<dyn TextSource>,
    entity_source: Arc<dyn EntitySource>,
    notifier: Arc<dyn Notifier>,
    change_detector: Mutex<ChangeDetector>,
    in_flight: AtomicBool,
}

impl ScanPipeline {
    pub fn new(
        text_source: Arc<dyn TextSource>,
        entity_source: Arc<dyn EntitySource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            text_source,
            entity_source,
            notifier,
            change_detector: Mutex::new(ChangeDetector::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one scan.
    pub async fn scan(&self, trigger: ScanTrigger) -> ScanOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Skipping {} scan, previous scan still running", trigger.as_str());
            return ScanOutcome::Busy;
        }
        let _in_flight = InFlight(&self.in_flight);

        let outcome = self.run(trigger).await;
        debug!("{} scan finished: {:?}", trigger.as_str(), outcome);
        outcome
    }

    async fn run(&self, trigger: ScanTrigger) -> ScanOutcome {
        if self.notifier.is_prompting() {
            return ScanOutcome::AwaitingAnswer;
        }

        let source = Arc::clone(&self.text_source);
        let text = match tokio::task::spawn_blocking(move || source.focused_text()).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => return ScanOutcome::NoText,
            Err(e) => {
                warn!("Text extraction task failed: {}", e);
                return ScanOutcome::NoText;
            }
        };

        if !self.change_detector.lock().await.has_changed(&text) {
            return ScanOutcome::Unchanged;
        }
        info!("New text from {} scan ({} chars)", trigger.as_str(), text.len());

        let entities = self.entity_source.extract_entities(&text).await;
        if entities.is_empty() {
            return ScanOutcome::NoEntities;
        }

        let Some(candidate) = decision::decide(&entities) else {
            info!("Found {} entities, but not enough for an event", entities.len());
            return ScanOutcome::InsufficientEntities;
        };

        let content = decision::notification_for(&candidate);
        match self.notifier.present(&content).await {
            Ok(()) => ScanOutcome::Notified(candidate),
            Err(e) => {
                warn!("Failed to present notification: {}", e);
                ScanOutcome::NotifyFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::NotifyError;
    use crate::types::{Entity, EntityLabel, NotificationContent};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    struct FixedText(StdMutex<Option<String>>);

    impl FixedText {
        fn new(text: Option<&str>) -> Arc<Self> {
            Arc::new(Self(StdMutex::new(text.map(str::to_string))))
        }

        fn set(&self, text: &str) {
            *self.0.lock().unwrap() = Some(text.to_string());
        }
    }

    impl TextSource for FixedText {
        fn focused_text(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct CannedEntities {
        entities: Vec<Entity>,
        calls: AtomicUsize,
    }

    impl CannedEntities {
        fn new(entities: Vec<Entity>) -> Arc<Self> {
            Arc::new(Self {
                entities,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl EntitySource for CannedEntities {
        async fn extract_entities(&self, _text: &str) -> Vec<Entity> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entities.clone()
        }
    }

    /// Holds the scan inside the service call until released.
    struct GatedEntities {
        started: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl EntitySource for GatedEntities {
        async fn extract_entities(&self, _text: &str) -> Vec<Entity> {
            self.started.notify_one();
            self.release.notified().await;
            vec![Entity::new("Lunch", EntityLabel::Event)]
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        presented: StdMutex<Vec<NotificationContent>>,
        fail: bool,
        prompting: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn present(&self, content: &NotificationContent) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::ChannelClosed);
            }
            self.presented.lock().unwrap().push(content.clone());
            Ok(())
        }

        async fn report(&self, _title: &str, _message: &str) {}

        fn is_prompting(&self) -> bool {
            self.prompting
        }
    }

    fn event_entities() -> Vec<Entity> {
        vec![
            Entity::new("Team Sync", EntityLabel::Event),
            Entity::new("tomorrow", EntityLabel::Date),
            Entity::new("at 3pm", EntityLabel::Time),
        ]
    }

    #[tokio::test]
    async fn test_event_text_is_notified() {
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("Team Sync tomorrow at 3pm")),
            CannedEntities::new(event_entities()),
            notifier.clone(),
        );

        let outcome = pipeline.scan(ScanTrigger::Timer).await;
        assert!(matches!(outcome, ScanOutcome::Notified(ref c) if c.title == "Team Sync"));

        let presented = notifier.presented.lock().unwrap();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].title, "Found Event: Team Sync");
        assert_eq!(presented[0].user_info["timeText"], "at 3pm");
    }

    #[tokio::test]
    async fn test_identical_text_notifies_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let entities = CannedEntities::new(event_entities());
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("Team Sync tomorrow at 3pm")),
            entities.clone(),
            notifier.clone(),
        );

        assert!(matches!(pipeline.scan(ScanTrigger::Timer).await, ScanOutcome::Notified(_)));
        assert_eq!(pipeline.scan(ScanTrigger::Timer).await, ScanOutcome::Unchanged);
        assert_eq!(pipeline.scan(ScanTrigger::Manual).await, ScanOutcome::Unchanged);

        assert_eq!(notifier.presented.lock().unwrap().len(), 1);
        assert_eq!(entities.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_changed_text_is_sent_again() {
        let notifier = Arc::new(RecordingNotifier::default());
        let text = FixedText::new(Some("first"));
        let pipeline = ScanPipeline::new(
            text.clone(),
            CannedEntities::new(event_entities()),
            notifier.clone(),
        );

        pipeline.scan(ScanTrigger::Timer).await;
        text.set("second");
        pipeline.scan(ScanTrigger::Timer).await;

        assert_eq!(notifier.presented.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_text_skips_service() {
        let entities = CannedEntities::new(event_entities());
        let pipeline = ScanPipeline::new(
            FixedText::new(None),
            entities.clone(),
            Arc::new(RecordingNotifier::default()),
        );

        assert_eq!(pipeline.scan(ScanTrigger::Timer).await, ScanOutcome::NoText);
        assert_eq!(entities.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_no_entities() {
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("hello")),
            CannedEntities::new(Vec::new()),
            notifier.clone(),
        );

        assert_eq!(pipeline.scan(ScanTrigger::Timer).await, ScanOutcome::NoEntities);
        assert!(notifier.presented.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_location_only_is_insufficient() {
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("Room 4")),
            CannedEntities::new(vec![Entity::new("Room 4", EntityLabel::Location)]),
            notifier.clone(),
        );

        assert_eq!(
            pipeline.scan(ScanTrigger::Timer).await,
            ScanOutcome::InsufficientEntities
        );
        assert!(notifier.presented.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifier_failure_is_reported_in_outcome() {
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("Team Sync")),
            CannedEntities::new(event_entities()),
            Arc::new(RecordingNotifier {
                fail: true,
                ..Default::default()
            }),
        );

        assert!(matches!(
            pipeline.scan(ScanTrigger::Timer).await,
            ScanOutcome::NotifyFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_open_dialog_pauses_scanning() {
        let entities = CannedEntities::new(event_entities());
        let pipeline = ScanPipeline::new(
            FixedText::new(Some("Found Event: Team Sync")),
            entities.clone(),
            Arc::new(RecordingNotifier {
                prompting: true,
                ..Default::default()
            }),
        );

        assert_eq!(pipeline.scan(ScanTrigger::Timer).await, ScanOutcome::AwaitingAnswer);
        assert_eq!(pipeline.scan(ScanTrigger::Manual).await, ScanOutcome::AwaitingAnswer);
        assert_eq!(entities.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let gate = Arc::new(GatedEntities {
            started: Notify::new(),
            release: Notify::new(),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let pipeline = Arc::new(ScanPipeline::new(
            FixedText::new(Some("Lunch tomorrow")),
            gate.clone(),
            notifier.clone(),
        ));

        let first = tokio::spawn({
            let pipeline = Arc::clone(&pipeline);
            async move { pipeline.scan(ScanTrigger::Timer).await }
        });

        gate.started.notified().await;
        assert_eq!(pipeline.scan(ScanTrigger::Manual).await, ScanOutcome::Busy);

        gate.release.notify_one();
        assert!(matches!(first.await.unwrap(), ScanOutcome::Notified(_)));
        assert_eq!(pipeline.scan(ScanTrigger::Manual).await, ScanOutcome::Unchanged);
        assert_eq!(notifier.presented.lock().unwrap().len(), 1);
    }
}
