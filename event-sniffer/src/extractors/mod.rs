//! Sources the scan pipeline reads from.
//!
//! - Accessibility: text of the focused element (or window) in the frontmost app
//! - Entities: labeled spans from the extraction service

pub mod accessibility;
pub mod entities;

use crate::types::Entity;

pub use accessibility::FocusedTextSource;
pub use entities::EntityClient;

/// Produces the text currently visible to the user.
///
/// Blocking; the pipeline calls it from the blocking pool.
pub trait TextSource: Send + Sync {
    /// Text gathered in one pass, or `None` when there is nothing to read.
    fn focused_text(&self) -> Option<String>;
}

/// Turns text into labeled entities.
#[async_trait::async_trait]
pub trait EntitySource: Send + Sync {
    /// Entities in service order. Any failure yields an empty vector.
    async fn extract_entities(&self, text: &str) -> Vec<Entity>;
}
