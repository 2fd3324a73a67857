//! Platform-independent traversal of an accessibility tree.
//!
//! The macOS implementation wraps `AXUIElement`, but the read logic only needs
//! three questions answered per element: its value, its title, and its
//! children. Expressing that as the [`AccessibilityNode`] trait keeps the
//! surgical-read / window-scan decision testable without a live UI.

use log::debug;

use crate::types::{ExtractionError, FocusedText, TextOrigin};

/// Separator placed between snippets collected by the window scan.
pub const SNIPPET_SEPARATOR: &str = "\n";

/// A single element of an accessibility tree.
///
/// Attribute lookups that fail on the platform side are reported as `None`
/// (or an empty child list), never as an error, so a broken element cannot
/// abort a walk.
pub trait AccessibilityNode: Sized {
    /// The element's direct text value (`AXValue`), if it is a string.
    fn value(&self) -> Option<String>;

    /// The element's title or label (`AXTitle`).
    fn title(&self) -> Option<String>;

    /// The element's children in native order.
    fn children(&self) -> Vec<Self>;
}

/// An application whose focused element and focused window can be queried.
pub trait AccessibilityApp {
    type Node: AccessibilityNode;

    /// The element currently holding input focus, if any.
    fn focused_element(&self) -> Option<Self::Node>;

    /// The application's focused window, if any.
    fn focused_window(&self) -> Option<Self::Node>;
}

/// Collect every non-empty value and title below `root`.
///
/// Elements are visited pre-order with children in native order; within an
/// element the value comes before the title. The walk uses an explicit stack
/// so very deep trees cannot overflow the call stack.
pub fn collect_text<N: AccessibilityNode>(root: N) -> Vec<String> {
    let mut snippets = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(value) = node.value().filter(|v| !v.is_empty()) {
            snippets.push(value);
        }
        if let Some(title) = node.title().filter(|t| !t.is_empty()) {
            snippets.push(title);
        }

        // Reverse so the first child is popped next.
        let mut children = node.children();
        children.reverse();
        stack.extend(children);
    }

    snippets
}

/// Read the text the user is most likely looking at.
///
/// 1. If an element holds focus and its value is non-empty, return that value
///    alone (surgical read).
/// 2. Otherwise scan the whole focused window and join every collected
///    snippet with a newline.
///
/// # Errors
///
/// - `ExtractionError::ElementNotFound` - no focused element text and no focused window
/// - `ExtractionError::NoContentFound` - the window scan collected nothing
pub fn read_focused_text<A: AccessibilityApp>(app: &A) -> Result<FocusedText, ExtractionError> {
    if let Some(element) = app.focused_element() {
        if let Some(text) = element.value().filter(|t| !t.is_empty()) {
            debug!("[AX-EXTRACTOR] Surgical read: {} chars from focused element", text.len());
            return Ok(FocusedText {
                text,
                origin: TextOrigin::FocusedElement,
            });
        }
        debug!("[AX-EXTRACTOR] Focused element has no text, falling back to window scan");
    } else {
        debug!("[AX-EXTRACTOR] No focused element, falling back to window scan");
    }

    let window = app
        .focused_window()
        .ok_or_else(|| ExtractionError::ElementNotFound("No focused window".into()))?;

    let snippets = collect_text(window);
    if snippets.is_empty() {
        return Err(ExtractionError::NoContentFound(
            "Focused window contains no text".into(),
        ));
    }

    debug!("[AX-EXTRACTOR] Window scan collected {} snippets", snippets.len());
    Ok(FocusedText {
        text: snippets.join(SNIPPET_SEPARATOR),
        origin: TextOrigin::WindowScan,
    })
}

/// In-memory tree used by the tests in this crate.
#[cfg(test)]
pub(crate) mod fake {
    use super::{AccessibilityApp, AccessibilityNode};

    #[derive(Debug, Clone, Default)]
    pub struct FakeNode {
        pub value: Option<String>,
        pub title: Option<String>,
        pub children: Vec<FakeNode>,
    }

    impl FakeNode {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn value(mut self, value: &str) -> Self {
            self.value = Some(value.to_string());
            self
        }

        pub fn title(mut self, title: &str) -> Self {
            self.title = Some(title.to_string());
            self
        }

        pub fn child(mut self, child: FakeNode) -> Self {
            self.children.push(child);
            self
        }
    }

    impl AccessibilityNode for FakeNode {
        fn value(&self) -> Option<String> {
            self.value.clone()
        }

        fn title(&self) -> Option<String> {
            self.title.clone()
        }

        fn children(&self) -> Vec<Self> {
            self.children.clone()
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeApp {
        pub focused: Option<FakeNode>,
        pub window: Option<FakeNode>,
    }

    impl AccessibilityApp for FakeApp {
        type Node = FakeNode;

        fn focused_element(&self) -> Option<FakeNode> {
            self.focused.clone()
        }

        fn focused_window(&self) -> Option<FakeNode> {
            self.window.clone()
        }
    }
}
