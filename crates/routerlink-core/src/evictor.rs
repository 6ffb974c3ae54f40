// ── Active session evictor ──

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::OperationTimeouts;
use crate::error::{CoreError, ErrorKind};
use crate::guard::run_with_deadline;
use crate::result::{NO_ACCOUNT, OperationResult};
use crate::session::{Connector, RouterSession, SessionAcquirer, release};

/// Tally of one eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub found: usize,
    pub removed: usize,
    pub failed: usize,
}

/// Remove every live session of `account`, one at a time.
///
/// A failed removal is logged and the loop moves on. Only the lookup itself
/// can fail the pass.
pub(crate) async fn evict_sessions<S: RouterSession>(
    session: &mut S,
    account: &str,
) -> Result<EvictionReport, CoreError> {
    let live = session.live_sessions(account).await?;
    let mut report = EvictionReport {
        found: live.len(),
        ..EvictionReport::default()
    };

    for record in live {
        match session.evict(&record.id).await {
            Ok(()) => {
                report.removed += 1;
                info!(account, id = %record.id, "evicted active session");
            }
            Err(e) => {
                report.failed += 1;
                warn!(account, id = %record.id, error = %e, "failed to evict active session");
            }
        }
    }
    Ok(report)
}

/// Force-closes live sessions for an account.
pub struct SessionEvictor<C> {
    acquirer: Arc<SessionAcquirer<C>>,
    timeouts: OperationTimeouts,
    tasks: TaskTracker,
}

impl<C: Connector> SessionEvictor<C> {
    /// Operations are spawned on `tasks`, including ones abandoned at their
    /// deadline.
    pub fn new(
        acquirer: Arc<SessionAcquirer<C>>,
        timeouts: OperationTimeouts,
        tasks: TaskTracker,
    ) -> Self {
        Self {
            acquirer,
            timeouts,
            tasks,
        }
    }

    /// Evict all live sessions of `account` on `router`.
    ///
    /// Succeeds when the session opened and the loop ran to the end, even if
    /// individual removals failed; those are flagged with
    /// [`ErrorKind::PartialCleanupFailure`].
    pub async fn evict_all(&self, router: &str, account: &str) -> OperationResult {
        if account.is_empty() {
            return OperationResult::ok(NO_ACCOUNT);
        }

        let acquirer = Arc::clone(&self.acquirer);
        let router = router.to_owned();
        let account = account.to_owned();

        run_with_deadline(&self.tasks, self.timeouts.mutate, async move {
            let mut session = match acquirer.acquire(&router).await {
                Ok(session) => session,
                Err(e) => return OperationResult::from_error(&e),
            };
            let outcome = evict_sessions(&mut session, &account).await;
            release(session, &router).await;

            match outcome {
                Ok(report) if report.found == 0 => OperationResult::ok("No active sessions"),
                Ok(report) => {
                    let result = OperationResult::ok(format!(
                        "Evicted {} of {} active sessions",
                        report.removed, report.found
                    ));
                    if report.failed == 0 {
                        result
                    } else {
                        result.with_error(ErrorKind::PartialCleanupFailure)
                    }
                }
                Err(e) => OperationResult::from_error(&e),
            }
        })
        .await
    }
}
