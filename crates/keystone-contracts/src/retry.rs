//! Retry policy and outcome types.

use serde::{Deserialize, Serialize};

/// Bounded-retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first. Values below 1 act as 1.
    pub max_retries: u32,
    /// Per-attempt budget. Advisory only: the executor never enforces it.
    pub timeout_seconds: f64,
    /// Constant pause between attempts.
    pub backoff_seconds: f64,
    /// Error kinds that stop retrying immediately.
    pub abort_on: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_seconds: 30.0,
            backoff_seconds: 0.0,
            abort_on: Vec::new(),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff_seconds: f64) -> Self {
        self.backoff_seconds = backoff_seconds;
        self
    }

    pub fn abort_on<I, T>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.abort_on = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// True if an error of `kind` must not be retried.
    pub fn aborts_on(&self, kind: &str) -> bool {
        self.abort_on.iter().any(|k| k == kind)
    }
}

/// Outcome of a retried operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryResult<T> {
    pub success: bool,
    pub attempts: u32,
    pub result: Option<T>,
    pub error: Option<String>,
}
