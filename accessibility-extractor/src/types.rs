//! Core data types for the accessibility-extractor crate.
//!
//! - `FocusedText`: text read from the frontmost application, tagged with the
//!   path that produced it
//! - `TextOrigin`: surgical focused-element read or whole-window scan
//! - `ExtractionError`: why a read produced nothing

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which extraction path produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// The value of the element currently holding input focus.
    FocusedElement,
    /// Values and titles collected from every element of the focused window.
    WindowScan,
}

impl TextOrigin {
    /// Returns the string representation used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextOrigin::FocusedElement => "focused_element",
            TextOrigin::WindowScan => "window_scan",
        }
    }
}

/// Text gathered from one scan pass of the frontmost application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedText {
    /// The gathered text. Never empty.
    pub text: String,

    /// The path that produced `text`.
    pub origin: TextOrigin,
}

/// Reasons a scan produced no text.
///
/// Callers that only care about "text or nothing" use
/// [`AccessibilityExtractor::extract_focused_text`](crate::AccessibilityExtractor::extract_focused_text),
/// which folds every variant into `None`.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Accessibility permissions have not been granted.
    #[error("Accessibility permission denied: {0}")]
    PermissionDenied(String),

    /// No frontmost application could be resolved.
    #[error("Application not found: {0}")]
    AppNotFound(String),

    /// The application has no focused window.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The tree walk completed without collecting any text.
    #[error("No content found: {0}")]
    NoContentFound(String),

    /// Running on a platform without accessibility support.
    #[error("Platform error: {0}")]
    PlatformError(String),
}
