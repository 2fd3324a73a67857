//! Platform-specific implementations for focused-text extraction.
//!
//! Only macOS is supported. On other targets
//! [`AccessibilityExtractor`](crate::AccessibilityExtractor) reports no text
//! and no permission.

/// macOS implementation on top of `AXUIElement`.
#[cfg(target_os = "macos")]
pub mod macos;
