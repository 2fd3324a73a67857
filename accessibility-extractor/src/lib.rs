//! Accessibility Extractor - read the text the user is looking at.
//!
//! This crate reads the focused text of the frontmost macOS application
//! through the native Accessibility API (AXUIElement).
//!
//! # Overview
//!
//! A read first tries the element that holds keyboard focus (a text field,
//! a message composer) and returns its value on its own. When nothing is
//! focused or the focused element is empty, it falls back to scanning the
//! whole focused window and joins every value and title it finds.
//!
//! # Quick Start
//!
//! ```no_run
//! use accessibility_extractor::AccessibilityExtractor;
//!
//! if AccessibilityExtractor::is_enabled() {
//!     match AccessibilityExtractor::extract_focused() {
//!         Ok(focused) => println!("{} ({})", focused.text, focused.origin.as_str()),
//!         Err(e) => eprintln!("Nothing to read: {}", e),
//!     }
//! } else {
//!     AccessibilityExtractor::request_permissions();
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: FocusedText, TextOrigin, ExtractionError
//! - [`tree`]: platform-independent tree walk and surgical-read logic
//! - [`extractor`]: cross-platform API wrapper (AccessibilityExtractor)
//! - `platform`: macOS implementation, only compiled on macOS

pub mod extractor;
pub mod tree;
pub mod types;

#[cfg(target_os = "macos")]
pub mod platform;

pub use extractor::AccessibilityExtractor;
pub use tree::{collect_text, read_focused_text, AccessibilityApp, AccessibilityNode};
pub use types::{ExtractionError, FocusedText, TextOrigin};
