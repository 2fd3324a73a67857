//! `AXUIElement` adapter for the platform-independent tree walk.
//!
//! Wraps an `AXUIElement` so it can be walked by
//! [`collect_text`](crate::tree::collect_text). Every attribute read goes
//! through the accessibility crate and any platform error is turned into
//! "no value".

use accessibility::attribute::AXAttribute;
use accessibility::{AXUIElement, AXUIElementAttributes};
use core_foundation::base::{CFType, TCFType};
use core_foundation::string::CFString;

use crate::tree::AccessibilityNode;

/// Attribute holding the element that currently has keyboard focus.
pub const FOCUSED_UI_ELEMENT_ATTRIBUTE: &str = "AXFocusedUIElement";

/// A node of a live accessibility tree.
#[derive(Clone)]
pub struct MacOSElement {
    element: AXUIElement,
}

impl MacOSElement {
    pub fn new(element: AXUIElement) -> Self {
        Self { element }
    }

    pub fn as_ax(&self) -> &AXUIElement {
        &self.element
    }

    /// Read an attribute that is expected to hold another element.
    ///
    /// Returns `None` if the lookup fails or the value is not an `AXUIElement`.
    pub fn element_attribute(&self, name: &str) -> Option<MacOSElement> {
        let attr = AXAttribute::<CFType>::new(&CFString::new(name));
        let value = self.element.attribute(&attr).ok()?;
        cftype_to_element(&value).map(MacOSElement::new)
    }
}

impl AccessibilityNode for MacOSElement {
    fn value(&self) -> Option<String> {
        self.element
            .value()
            .ok()
            .and_then(|value| cftype_to_string(&value))
    }

    fn title(&self) -> Option<String> {
        self.element.title().ok().map(|title| title.to_string())
    }

    fn children(&self) -> Vec<Self> {
        let Ok(children) = self.element.children() else {
            return Vec::new();
        };

        let mut result = Vec::with_capacity(children.len() as usize);
        for i in 0..children.len() {
            if let Some(child) = children.get(i) {
                result.push(MacOSElement::new(AXUIElement::clone(&child)));
            }
        }
        result
    }
}

/// Convert a `CFType` holding a `CFString` into a Rust string.
///
/// Numbers, booleans and other value types are not text and yield `None`.
pub fn cftype_to_string(value: &CFType) -> Option<String> {
    if value.type_of() != CFString::type_id() {
        return None;
    }

    let ptr = value.as_CFTypeRef();
    let cf_string: CFString =
        unsafe { CFString::wrap_under_get_rule(ptr as core_foundation::string::CFStringRef) };
    Some(cf_string.to_string())
}

/// Downcast a `CFType` to an `AXUIElement` after checking its type id.
pub fn cftype_to_element(value: &CFType) -> Option<AXUIElement> {
    if value.type_of() != AXUIElement::type_id() {
        return None;
    }

    let ptr = value.as_CFTypeRef();
    // Retained under the get rule since `value` keeps its own reference.
    Some(unsafe { AXUIElement::wrap_under_get_rule(ptr as accessibility_sys::AXUIElementRef) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_foundation::number::CFNumber;

    #[test]
    fn test_cftype_to_string_accepts_cfstring() {
        let value = CFString::new("Standup at 10am").as_CFType();
        assert_eq!(cftype_to_string(&value), Some("Standup at 10am".to_string()));
    }

    #[test]
    fn test_cftype_to_string_rejects_numbers() {
        let value = CFNumber::from(42i32).as_CFType();
        assert_eq!(cftype_to_string(&value), None);
    }

    #[test]
    fn test_cftype_to_element_rejects_strings() {
        let value = CFString::new("not an element").as_CFType();
        assert!(cftype_to_element(&value).is_none());
    }
}
