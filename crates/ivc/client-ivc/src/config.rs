//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Parameters for a [`ClientIvc`](crate::ClientIvc) chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IvcConfig {
    /// Upper bound on the number of accumulated instances, if any
    pub max_steps: Option<u64>,
    /// Run vector arithmetic inside each step on the rayon pool.
    ///
    /// Results are bit-identical either way.
    pub enable_parallel: bool,
}

impl Default for IvcConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            enable_parallel: true,
        }
    }
}

impl IvcConfig {
    /// Sets the step bound
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Enables or disables intra-step parallelism
    pub fn with_parallel(mut self, enable_parallel: bool) -> Self {
        self.enable_parallel = enable_parallel;
        self
    }
}
