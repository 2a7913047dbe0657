//! Model configuration.

use serde::{Deserialize, Serialize};

/// Per-model policies. Both are off by default and compose independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSettings {
    /// Stamp `createdAt` on first persist and `updatedAt` on every rewrite.
    pub timestamps: bool,

    /// Turn deletes into a `deletedAt` marker instead of removing the record.
    pub soft_delete: bool,
}

impl ModelSettings {
    /// Creates settings with every policy disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn timestamps(mut self, value: bool) -> Self {
        self.timestamps = value;
        self
    }

    #[must_use]
    pub const fn soft_delete(mut self, value: bool) -> Self {
        self.soft_delete = value;
        self
    }

    /// Parse settings from JSON such as `{"timestamps": true, "softDelete": true}`.
    /// Missing keys fall back to `false`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
