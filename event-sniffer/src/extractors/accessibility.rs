//! Accessibility text source.
//!
//! Bridges the `accessibility-extractor` crate into the scan pipeline.

use accessibility_extractor::{AccessibilityExtractor, ExtractionError};
use tracing::{debug, warn};

use super::TextSource;

/// Reads the focused text of the frontmost application.
#[derive(Debug, Default, Clone, Copy)]
pub struct FocusedTextSource;

impl FocusedTextSource {
    pub fn new() -> Self {
        Self
    }

    /// Whether the process is trusted for accessibility.
    pub fn is_enabled(&self) -> bool {
        AccessibilityExtractor::is_enabled()
    }

    /// Ask the system for accessibility trust, prompting the user if needed.
    pub fn request_permissions(&self) -> bool {
        AccessibilityExtractor::request_permissions()
    }
}

impl TextSource for FocusedTextSource {
    fn focused_text(&self) -> Option<String> {
        match AccessibilityExtractor::extract_focused() {
            Ok(focused) => {
                debug!(
                    "Read {} chars from {}",
                    focused.text.len(),
                    focused.origin.as_str()
                );
                Some(focused.text)
            }
            Err(ExtractionError::PermissionDenied(msg)) => {
                warn!("Accessibility permission missing: {}", msg);
                None
            }
            Err(e) => {
                debug!("No focused text: {}", e);
                None
            }
        }
    }
}

#[cfg(all(test, not(target_os = "macos")))]
mod tests {
    use super::*;

    #[test]
    fn test_no_text_off_macos() {
        let source = FocusedTextSource::new();
        assert!(!source.is_enabled());
        assert_eq!(source.focused_text(), None);
    }
}
