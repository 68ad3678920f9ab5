//! Deadline-bounded execution of a single attempt.

use std::future::Future;
use std::time::Duration;

use crate::errors::AttemptError;

/// Runs one attempt under a deadline.
///
/// The timer is owned by this call and dropped on every exit path. When the
/// deadline expires first, the in-flight operation future is dropped —
/// cancelling it — and [`AttemptError::DeadlineExceeded`] is returned. A
/// failure raised by the operation itself surfaces unmodified; classification
/// happens upstream.
///
/// A zero deadline is invalid configuration and expires immediately, without
/// polling the operation.
pub async fn bounded<T, F>(operation: F, deadline: Duration) -> Result<T, AttemptError>
where
    F: Future<Output = Result<T, AttemptError>>,
{
    if deadline.is_zero() {
        return Err(AttemptError::DeadlineExceeded(deadline));
    }
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(AttemptError::DeadlineExceeded(deadline)),
    }
}
