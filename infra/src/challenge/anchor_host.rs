//! In-memory anchor elements

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use pv_core::services::verification::AnchorHost;

/// Set of element ids standing in for a page
#[derive(Debug, Default)]
pub struct InMemoryAnchorHost {
    anchors: RwLock<HashSet<String>>,
}

impl InMemoryAnchorHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page that already contains the given anchors
    pub fn with_anchors<I, S>(anchors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            anchors: RwLock::new(anchors.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.anchors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnchorHost for InMemoryAnchorHost {
    fn contains(&self, anchor_id: &str) -> bool {
        self.anchors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(anchor_id)
    }

    fn create(&self, anchor_id: &str) -> Result<(), String> {
        if anchor_id.trim().is_empty() {
            return Err("Anchor id must not be empty".to_string());
        }
        self.anchors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(anchor_id.to_string());
        Ok(())
    }

    fn remove(&self, anchor_id: &str) {
        self.anchors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(anchor_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let host = InMemoryAnchorHost::new();
        assert!(host.is_empty());

        host.create("recaptcha-container").unwrap();
        assert!(host.contains("recaptcha-container"));

        host.remove("recaptcha-container");
        host.remove("recaptcha-container");
        assert!(host.is_empty());
    }

    #[test]
    fn test_preexisting_anchors() {
        let host = InMemoryAnchorHost::with_anchors(["a", "b"]);
        assert_eq!(host.len(), 2);
        assert!(host.contains("b"));
        assert!(host.create("  ").is_err());
    }
}
