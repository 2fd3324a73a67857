//! macOS implementation of focused-text extraction.
//!
//! Resolves the frontmost application through the system-wide
//! `AXFocusedApplication` attribute and hands its `AXUIElement` to the
//! platform-independent read in [`tree`](crate::tree). The attribute is read
//! live on every call, so no run loop is needed to follow app switches.

pub mod element;
pub mod permissions;

pub use element::{cftype_to_element, cftype_to_string, MacOSElement};
pub use permissions::{
    is_trusted, is_trusted_with_prompt, open_accessibility_preferences, permission_instructions,
};

use accessibility::{AXUIElement, AXUIElementAttributes};
use core_foundation::base::TCFType;

use crate::tree::{read_focused_text, AccessibilityApp};
use crate::types::{ExtractionError, FocusedText};

/// Seconds an accessibility call may block on an unresponsive application.
pub const MESSAGING_TIMEOUT_SECS: f32 = 1.0;

/// System-wide attribute holding the application that owns keyboard focus.
pub const FOCUSED_APPLICATION_ATTRIBUTE: &str = "AXFocusedApplication";

/// The frontmost application, viewed through its accessibility element.
pub struct MacOSApp {
    pid: i32,
    element: MacOSElement,
}

impl MacOSApp {
    /// The application that currently owns keyboard focus.
    ///
    /// Returns `None` when no application is in focus (for example while the
    /// login window is up) or its process cannot be identified.
    pub fn frontmost() -> Option<Self> {
        let system_wide = MacOSElement::new(AXUIElement::system_wide());
        let app = system_wide.element_attribute(FOCUSED_APPLICATION_ATTRIBUTE)?;

        let mut pid: i32 = 0;
        let status =
            unsafe { accessibility_sys::AXUIElementGetPid(app.as_ax().as_concrete_TypeRef(), &mut pid) };
        if status != accessibility_sys::kAXErrorSuccess {
            log::debug!("[AX-EXTRACTOR] Focused application has no pid (AXError {})", status);
            return None;
        }

        unsafe {
            accessibility_sys::AXUIElementSetMessagingTimeout(
                app.as_ax().as_concrete_TypeRef(),
                MESSAGING_TIMEOUT_SECS,
            );
        }
        Some(Self { pid, element: app })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }
}

impl AccessibilityApp for MacOSApp {
    type Node = MacOSElement;

    fn focused_element(&self) -> Option<MacOSElement> {
        self.element
            .element_attribute(element::FOCUSED_UI_ELEMENT_ATTRIBUTE)
    }

    fn focused_window(&self) -> Option<MacOSElement> {
        self.element
            .as_ax()
            .focused_window()
            .ok()
            .map(MacOSElement::new)
    }
}

/// macOS entry points used by [`AccessibilityExtractor`](crate::AccessibilityExtractor).
pub struct MacOSExtractor;

impl MacOSExtractor {
    /// Check if accessibility permissions are granted without prompting.
    pub fn is_accessibility_enabled() -> bool {
        permissions::is_trusted()
    }

    /// Show the system accessibility prompt if permissions are missing.
    pub fn request_accessibility() -> bool {
        permissions::is_trusted_with_prompt()
    }

    /// Read the focused text of the frontmost application.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::PermissionDenied` - accessibility permissions not granted
    /// - `ExtractionError::AppNotFound` - no frontmost application
    /// - `ExtractionError::ElementNotFound` - no focused window to scan
    /// - `ExtractionError::NoContentFound` - nothing readable in the window
    pub fn extract_focused() -> Result<FocusedText, ExtractionError> {
        if !Self::is_accessibility_enabled() {
            return Err(ExtractionError::PermissionDenied(
                "Accessibility permissions are not granted".into(),
            ));
        }

        let app = MacOSApp::frontmost()
            .ok_or_else(|| ExtractionError::AppNotFound("No frontmost application".into()))?;
        log::debug!("[AX-EXTRACTOR] Frontmost application pid: {}", app.pid());

        read_focused_text(&app)
    }
}

