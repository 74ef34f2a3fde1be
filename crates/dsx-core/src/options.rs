//! Load options.

use serde::{Deserialize, Serialize};

use crate::errors::LoadError;

/// What to do when an id is declared twice in the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the most recent definition and warn.
    #[default]
    Replace,
    /// Keep both; the newer one is re-keyed as `id#2`, `id#3`, ... and a warning is emitted.
    Rename,
    /// Keep the first definition; the newer element is dropped as an error.
    Reject,
}

/// Options for loading a scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Duplicate-id handling, applied to every symbol table.
    pub duplicate_ids: DuplicatePolicy,
    /// Treat any dropped element as a fatal load error.
    pub strict: bool,
    /// Maximum traversal depth before a subtree is cut off.
    pub max_depth: usize,
    /// Report sections and component children outside their canonical slot.
    pub ordering_warnings: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            duplicate_ids: DuplicatePolicy::Replace,
            strict: false,
            max_depth: 64,
            ordering_warnings: true,
        }
    }
}

impl LoadOptions {
    /// Create default load options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let mut options: Self = serde_json::from_str(json)?;
        options.max_depth = options.max_depth.max(1);
        Ok(options)
    }

    /// Set the duplicate-id policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_ids = policy;
        self
    }

    /// Fail the load on the first dropped element.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set the traversal depth cap.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Silence ordering notes.
    pub fn without_ordering_warnings(mut self) -> Self {
        self.ordering_warnings = false;
        self
    }
}
