// ── Deadline guard ──
//
// Races an operation against a hard deadline. The operation runs as its own
// task; if the deadline wins, the guard stops waiting and the task keeps
// going on its own until it has released its session. Tasks are spawned on
// a `TaskTracker` so the owner can wait for abandoned ones before the
// runtime goes away.

use std::future::Future;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{error, warn};

use crate::result::GuardFallback;

/// Run `operation` to completion or until `deadline` elapses, whichever
/// comes first.
///
/// On timeout the spawned task is detached, not aborted; it stays
/// registered with `tasks` until it finishes. A task that panics yields
/// [`GuardFallback::aborted`].
pub async fn run_with_deadline<T, F>(tasks: &TaskTracker, deadline: Duration, operation: F) -> T
where
    T: GuardFallback + Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let task = tasks.spawn(operation);

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            error!(error = %join_err, "operation task failed");
            T::aborted(&join_err.to_string())
        }
        Err(_) => {
            warn!(
                deadline_ms = deadline.as_millis(),
                "operation exceeded its deadline, no longer waiting"
            );
            T::timed_out()
        }
    }
}
