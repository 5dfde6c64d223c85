//! Bounded retry executor.
//!
//! `run_with_retry` calls an operation up to `max_retries` times with a
//! constant backoff. Errors whose kind is listed in `abort_on` stop the loop
//! immediately. `timeout_seconds` is carried as metadata only; an operation
//! that never returns blocks the caller.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use keystone_contracts::{
    error::HandlerError,
    retry::{RetryPolicy, RetryResult},
};

/// Prefix attached to the error of an aborted run.
pub const ABORTED_PREFIX: &str = "Aborted: ";

/// Execute `op` under `policy`. Failures are returned, never raised.
pub fn run_with_retry<T, F>(mut op: F, policy: &RetryPolicy) -> RetryResult<T>
where
    F: FnMut() -> Result<T, HandlerError>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match op() {
            Ok(value) => {
                debug!(attempt, "operation succeeded");
                return RetryResult {
                    success: true,
                    attempts: attempt,
                    result: Some(value),
                    error: None,
                };
            }
            Err(e) if policy.aborts_on(&e.kind) => {
                warn!(attempt, kind = %e.kind, error = %e.message, "operation aborted");
                return RetryResult {
                    success: false,
                    attempts: attempt,
                    result: None,
                    error: Some(format!("{ABORTED_PREFIX}{}", e.message)),
                };
            }
            Err(e) => {
                warn!(attempt, max_attempts, kind = %e.kind, error = %e.message, "attempt failed");
                last_error = Some(e.message);
                if attempt < max_attempts {
                    pause(policy.backoff_seconds);
                }
            }
        }
    }

    RetryResult {
        success: false,
        attempts: max_attempts,
        result: None,
        error: last_error,
    }
}

/// Sleep for `backoff_seconds`. Values `Duration` cannot hold are skipped.
fn pause(backoff_seconds: f64) {
    if backoff_seconds <= 0.0 {
        return;
    }
    match Duration::try_from_secs_f64(backoff_seconds) {
        Ok(delay) => thread::sleep(delay),
        Err(e) => warn!(backoff_seconds, error = %e, "unrepresentable backoff, not sleeping"),
    }
}
