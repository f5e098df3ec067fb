//! Run configuration

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Result};

/// Options for one interpreter run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Upper bound on iterations of a single `para` loop; `None` is unbounded
    pub max_iterations: Option<u64>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Load from a JSON document such as `{"max_iterations": 1000}`
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Io(format!("invalid run config: {}", e)))
    }
}
