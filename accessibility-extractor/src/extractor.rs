//! Cross-platform accessibility extractor API.
//!
//! On macOS the calls delegate to
//! [`MacOSExtractor`](crate::platform::macos::MacOSExtractor). On other
//! platforms permission checks report `false` and reads report no text.
//!
//! # Example
//!
//! ```no_run
//! use accessibility_extractor::AccessibilityExtractor;
//!
//! if AccessibilityExtractor::is_enabled() {
//!     if let Some(text) = AccessibilityExtractor::extract_focused_text() {
//!         println!("{}", text);
//!     }
//! } else {
//!     AccessibilityExtractor::request_permissions();
//! }
//! ```

use crate::types::{ExtractionError, FocusedText};

#[cfg(target_os = "macos")]
use crate::platform::macos::MacOSExtractor;

/// Cross-platform accessibility extractor.
pub struct AccessibilityExtractor;

impl AccessibilityExtractor {
    /// Check if accessibility features are enabled.
    ///
    /// # Platform Behavior
    ///
    /// - **macOS**: whether the process is trusted for accessibility
    /// - **Other platforms**: always `false`
    pub fn is_enabled() -> bool {
        #[cfg(target_os = "macos")]
        {
            MacOSExtractor::is_accessibility_enabled()
        }

        #[cfg(not(target_os = "macos"))]
        {
            false
        }
    }

    /// Request accessibility permissions, prompting the user if needed.
    ///
    /// Returns whether the process is trusted at the time of the call.
    pub fn request_permissions() -> bool {
        #[cfg(target_os = "macos")]
        {
            MacOSExtractor::request_accessibility()
        }

        #[cfg(not(target_os = "macos"))]
        {
            false
        }
    }

    /// Read the focused text of the frontmost application, keeping the reason
    /// for an empty result.
    ///
    /// # Errors
    ///
    /// See [`ExtractionError`]. On unsupported platforms this is always
    /// `ExtractionError::PlatformError`.
    pub fn extract_focused() -> Result<FocusedText, ExtractionError> {
        #[cfg(target_os = "macos")]
        {
            MacOSExtractor::extract_focused()
        }

        #[cfg(not(target_os = "macos"))]
        {
            Err(ExtractionError::PlatformError("Unsupported platform".into()))
        }
    }

    /// Read the focused text of the frontmost application.
    ///
    /// Every failure (no frontmost app, no focused window, no text, missing
    /// permissions) is the same `None`. The reason is logged at debug level.
    pub fn extract_focused_text() -> Option<String> {
        match Self::extract_focused() {
            Ok(focused) => Some(focused.text),
            Err(e) => {
                log::debug!("[AX-EXTRACTOR] No text: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "macos")]
    #[test]
    fn test_untrusted_process_reads_nothing() {
        if !AccessibilityExtractor::is_enabled() {
            assert!(matches!(
                AccessibilityExtractor::extract_focused(),
                Err(ExtractionError::PermissionDenied(_))
            ));
            assert_eq!(AccessibilityExtractor::extract_focused_text(), None);
        }
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_unsupported_platform_reports_platform_error() {
        assert!(matches!(
            AccessibilityExtractor::extract_focused(),
            Err(ExtractionError::PlatformError(_))
        ));
        assert!(!AccessibilityExtractor::is_enabled());
        assert_eq!(AccessibilityExtractor::extract_focused_text(), None);
    }
}
