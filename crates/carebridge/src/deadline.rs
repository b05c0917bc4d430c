//! Deadline enforcement around blocking external calls.
//!
//! The work runs on a tokio blocking task and the caller waits at most `limit`. On expiry
//! the join handle is dropped, which detaches the task: it keeps running to completion in
//! the background and its result is discarded. Nothing is cancelled and no cleanup is
//! guaranteed, so the closure must own everything it touches (cloned inputs plus `Arc`
//! handles) and must not write to any state the pipeline reads afterwards.

use std::time::Duration;

use tracing::warn;

/// Why a bounded call produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abandoned {
    TimedOut,
    Panicked,
}

/// Run `work` on the blocking pool and wait for it until `limit` elapses.
pub async fn run_blocking<T, F>(
    label: &'static str,
    limit: Duration,
    work: F,
) -> Result<T, Abandoned>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(work);

    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_error)) => {
            warn!(call = label, error = %join_error, "blocking call failed; using placeholder");
            Err(Abandoned::Panicked)
        }
        Err(_) => {
            warn!(
                call = label,
                timeout_secs = limit.as_secs_f32(),
                "blocking call exceeded deadline; result abandoned"
            );
            Err(Abandoned::TimedOut)
        }
    }
}
