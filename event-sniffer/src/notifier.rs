//! Presenting candidate events to the user.
//!
//! A notifier shows one notification per candidate with an "Add to Calendar"
//! action. Whatever the user picks comes back as an [`ActionEvent`] on the
//! action channel handed to the notifier at construction.
//!
//! At most one dialog is open at a time. While it is up it holds focus, so
//! the scan pipeline asks [`Notifier::is_prompting`] and skips scanning
//! rather than reading the dialog's own text.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::applescript::{self, ScriptError, USER_CANCELED};
use crate::types::{ActionEvent, NotificationContent, ADD_TO_CALENDAR_ACTION, DISMISS_ACTION};

/// Label of the confirming dialog button.
pub const ADD_BUTTON: &str = "Add to Calendar";

/// Label of the dismissing dialog button.
pub const IGNORE_BUTTON: &str = "Ignore";

/// Seconds before an unanswered dialog closes itself (counts as dismissal).
pub const DIALOG_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Action channel is closed")]
    ChannelClosed,
}

/// Shows notifications and user-visible messages.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Show `content` with an "Add to Calendar" action.
    ///
    /// Returns once the notification is on its way; the user's answer
    /// arrives later on the action channel.
    async fn present(&self, content: &NotificationContent) -> Result<(), NotifyError>;

    /// Show a one-off message (failures of the confirm action, confirmations).
    async fn report(&self, title: &str, message: &str);

    /// Whether a notification is waiting for the user's answer.
    fn is_prompting(&self) -> bool {
        false
    }
}

/// Dialog script for `content`. Returns the clicked button's label.
pub fn dialog_script(content: &NotificationContent) -> String {
    format!(
        "display dialog {body} with title {title} buttons {{{ignore}, {add}}} \
         default button {add} giving up after {timeout}\n\
         return button returned of result",
        body = applescript::quote(&content.body),
        title = applescript::quote(&content.title),
        ignore = applescript::quote(IGNORE_BUTTON),
        add = applescript::quote(ADD_BUTTON),
        timeout = DIALOG_TIMEOUT_SECS,
    )
}

/// Script posting a plain banner notification.
pub fn report_script(title: &str, message: &str) -> String {
    format!(
        "display notification {} with title {}",
        applescript::quote(message),
        applescript::quote(title)
    )
}

/// Map the dialog's answer to an action. Anything but the add button
/// (including a timed-out dialog) is a dismissal.
pub fn action_for_button(button: &str, user_info: BTreeMap<String, String>) -> ActionEvent {
    let action_id = if button == ADD_BUTTON {
        ADD_TO_CALENDAR_ACTION
    } else {
        DISMISS_ACTION
    };

    ActionEvent {
        action_id: action_id.to_string(),
        user_info,
    }
}

/// Runs one AppleScript and returns its output.
pub type ScriptRunner = Arc<dyn Fn(&str) -> Result<String, ScriptError> + Send + Sync>;

/// Notifier backed by AppleScript dialogs (macOS).
pub struct AppleScriptNotifier {
    actions: mpsc::Sender<ActionEvent>,
    runner: ScriptRunner,
    prompting: Arc<AtomicBool>,
}

impl AppleScriptNotifier {
    pub fn new(actions: mpsc::Sender<ActionEvent>) -> Self {
        Self::with_runner(actions, applescript::run)
    }

    /// Use `runner` instead of `osascript`.
    pub fn with_runner<F>(actions: mpsc::Sender<ActionEvent>, runner: F) -> Self
    where
        F: Fn(&str) -> Result<String, ScriptError> + Send + Sync + 'static,
    {
        Self {
            actions,
            runner: Arc::new(runner),
            prompting: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for AppleScriptNotifier {
    async fn present(&self, content: &NotificationContent) -> Result<(), NotifyError> {
        if self.actions.is_closed() {
            return Err(NotifyError::ChannelClosed);
        }

        if self
            .prompting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("A dialog is already open, not showing: {}", content.title);
            return Ok(());
        }

        let script = dialog_script(content);
        let user_info = content.user_info.clone();
        let actions = self.actions.clone();
        let runner = Arc::clone(&self.runner);
        let prompting = Arc::clone(&self.prompting);
        info!("Presenting: {}", content.title);

        // The dialog blocks until answered; the action loop keeps running.
        tokio::task::spawn_blocking(move || {
            let answer = runner(&script);
            prompting.store(false, Ordering::Release);

            let action = match answer {
                Ok(button) => action_for_button(&button, user_info),
                Err(e) if e.code() == Some(USER_CANCELED) => action_for_button("", user_info),
                Err(e) => {
                    warn!("Notification dialog failed: {}", e);
                    return;
                }
            };

            debug!("Dialog answered with {}", action.action_id);
            if actions.blocking_send(action).is_err() {
                debug!("Action channel closed before the dialog was answered");
            }
        });

        Ok(())
    }

    async fn report(&self, title: &str, message: &str) {
        let script = report_script(title, message);
        let runner = Arc::clone(&self.runner);
        match tokio::task::spawn_blocking(move || runner(&script)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Failed to show message: {}", e),
            Err(e) => warn!("Message task failed: {}", e),
        }
    }

    fn is_prompting(&self) -> bool {
        self.prompting.load(Ordering::Acquire)
    }
}

/// Notifier that only logs. Used where no dialog is available; it never
/// produces actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn present(&self, content: &NotificationContent) -> Result<(), NotifyError> {
        info!("{} | {}", content.title, content.body);
        Ok(())
    }

    async fn report(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
    }
}
