//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap store calls with a deadline
//! - Turn an elapsed deadline into the caller's own error type
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Dropping the inner future on expiry cancels it

use std::future::Future;
use std::time::Duration;

/// Await `fut` for at most `limit`.
///
/// The inner result is passed through unchanged; expiry yields `on_elapsed()`.
pub async fn with_deadline<F, T, E>(
    limit: Duration,
    fut: F,
    on_elapsed: impl FnOnce() -> E,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_elapsed()),
    }
}
