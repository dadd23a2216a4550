//! Graph rendering options supplied by the host.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
    /// Append ` (finished/total)` to labels when step counts are known.
    pub step_progress: bool,
    /// Append the humanized elapsed time to labels of started tasks.
    pub elapsed_time: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            step_progress: true,
            elapsed_time: true,
        }
    }
}

impl GraphOptions {
    /// Options from host JSON. Empty or malformed input gives the defaults.
    pub fn from_json(json: &str) -> Self {
        if json.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(json).unwrap_or_else(|err| {
            warn!(%err, "invalid graph options, using defaults");
            Self::default()
        })
    }
}
