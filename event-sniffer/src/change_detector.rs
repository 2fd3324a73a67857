//! Change detection for extracted text.
//!
//! Keeps a SHA-256 digest of the last processed text so identical
//! consecutive scans are skipped without holding the text itself.

use sha2::{Digest, Sha256};
use tracing::trace;

/// Text digest (hex-encoded SHA-256)
pub type TextHash = String;

/// Compute the digest used to compare scans.
pub fn compute_hash(text: &str) -> TextHash {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Remembers the last processed text.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_hash: Option<TextHash>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `text` with the last processed text and record it.
    ///
    /// Returns `true` if the text differs from the previous call (or this is
    /// the first call). Comparison and replacement happen in one step, so
    /// callers only need exclusive access to the detector.
    pub fn has_changed(&mut self, text: &str) -> bool {
        let hash = compute_hash(text);
        if self.last_hash.as_deref() == Some(hash.as_str()) {
            trace!("Text unchanged ({} chars)", text.len());
            return false;
        }

        trace!("Text changed ({} chars)", text.len());
        self.last_hash = Some(hash);
        true
    }
}
