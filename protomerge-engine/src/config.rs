use crate::error::EngineResult;
use serde::{Deserialize, Serialize};

/// Configuration for a [`MergeEngine`](crate::MergeEngine).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Emit a `trace` event for every field visited.
    pub trace_fields: bool,
    /// Deepest message nesting a single call may visit. `None` leaves the
    /// traversal unbounded.
    pub max_depth: Option<usize>,
}

impl EngineConfig {
    /// Parses a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Caps message nesting at `limit` levels below the root.
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    /// Turns on per-field trace events.
    #[must_use]
    pub fn with_field_tracing(mut self) -> Self {
        self.trace_fields = true;
        self
    }
}
