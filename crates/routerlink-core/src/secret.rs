// ── PPP secret controller ──
//
// disable / enable / check_status for one account's access-control record.
// Each call acquires its own session, runs under the deadline guard and
// releases the session before its task ends.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::OperationTimeouts;
use crate::error::{CoreError, ErrorKind};
use crate::evictor::evict_sessions;
use crate::guard::run_with_deadline;
use crate::model::AccessState;
use crate::result::{NO_ACCOUNT, OperationResult, StatusReport};
use crate::session::{Connector, RouterSession, SessionAcquirer, release};

const SECRET_FIELDS: &[&str] = &[".id", "name", "disabled"];
const STATUS_FIELDS: &[&str] = &[".id", "name", "disabled", "profile", "service"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Disable,
    Enable,
}

impl Transition {
    fn disabled(self) -> bool {
        matches!(self, Self::Disable)
    }

    /// State the secret is in once the transition has been applied.
    fn target(self) -> AccessState {
        match self {
            Self::Disable => AccessState::Disabled,
            Self::Enable => AccessState::Enabled,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Disable => "disable",
            Self::Enable => "enable",
        }
    }

    fn unchanged_message(self) -> &'static str {
        match self {
            Self::Disable => "Already disabled",
            Self::Enable => "Already enabled",
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            Self::Disable => "PPP Secret disabled successfully",
            Self::Enable => "PPP Secret enabled successfully",
        }
    }
}

/// Idempotent enable/disable and status reads for PPP secrets.
pub struct SecretController<C> {
    acquirer: Arc<SessionAcquirer<C>>,
    timeouts: OperationTimeouts,
    tasks: TaskTracker,
}

impl<C: Connector> SecretController<C> {
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

    /// Disable `account` on `router`, then evict its live sessions.
    ///
    /// Eviction is best effort: when it is incomplete the result stays
    /// successful and carries [`ErrorKind::PartialCleanupFailure`].
    pub async fn disable(&self, router: &str, account: &str) -> OperationResult {
        self.transition(router, account, Transition::Disable).await
    }

    /// Enable `account` on `router`. No eviction.
    pub async fn enable(&self, router: &str, account: &str) -> OperationResult {
        self.transition(router, account, Transition::Enable).await
    }

    /// Read the current state of `account` without changing anything.
    pub async fn check_status(&self, router: &str, account: &str) -> StatusReport {
        if account.is_empty() {
            return StatusReport::no_account();
        }

        let acquirer = Arc::clone(&self.acquirer);
        let router = router.to_owned();
        let account = account.to_owned();

        run_with_deadline(&self.tasks, self.timeouts.status, async move {
            let mut session = match acquirer.acquire(&router).await {
                Ok(session) => session,
                Err(e) => return StatusReport::from_error(&e),
            };
            let snapshot = session.find_secret(&account, STATUS_FIELDS).await;
            release(session, &router).await;

            match snapshot {
                Ok(Some(record)) => StatusReport::found(record),
                Ok(None) => StatusReport::not_found(),
                Err(e) => StatusReport::from_error(&e),
            }
        })
        .await
    }

    async fn transition(
        &self,
        router: &str,
        account: &str,
        transition: Transition,
    ) -> OperationResult {
        if account.is_empty() {
            return OperationResult::ok(NO_ACCOUNT);
        }

        let acquirer = Arc::clone(&self.acquirer);
        let router = router.to_owned();
        let account = account.to_owned();

        run_with_deadline(&self.tasks, self.timeouts.mutate, async move {
            let mut session = match acquirer.acquire(&router).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(%router, %account, error = %e, "cannot reach router");
                    return OperationResult::from_error(&e);
                }
            };
            let result = apply(&mut session, &router, &account, transition).await;
            release(session, &router).await;
            result
        })
        .await
    }
}

/// One snapshot, at most one write, then cleanup for disables.
async fn apply<S: RouterSession>(
    session: &mut S,
    router: &str,
    account: &str,
    transition: Transition,
) -> OperationResult {
    let record = match session.find_secret(account, SECRET_FIELDS).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!(router, account, "no PPP secret for account");
            return OperationResult::from_error(&CoreError::SecretNotFound {
                account: account.to_owned(),
            });
        }
        Err(e) => return OperationResult::from_error(&e),
    };

    if record.state() == transition.target() {
        info!(router, account, state = %record.state(), "PPP secret already in requested state");
        return OperationResult::ok(transition.unchanged_message());
    }

    if let Err(e) = session.set_disabled(&record.id, transition.disabled()).await {
        let err = CoreError::WriteFailed {
            action: transition.verb(),
            message: e.to_string(),
        };
        warn!(router, account, id = %record.id, error = %e, "PPP secret write failed");
        return OperationResult::from_error(&err);
    }
    info!(router, account, id = %record.id, action = transition.verb(), "PPP secret updated");

    let result = OperationResult::ok(transition.done_message());
    if transition == Transition::Enable {
        return result;
    }

    match evict_sessions(session, account).await {
        Ok(report) if report.failed == 0 => result,
        Ok(report) => {
            let err = CoreError::PartialCleanup {
                failed: report.failed,
                total: report.found,
            };
            warn!(router, account, "{err}");
            result.with_error(ErrorKind::PartialCleanupFailure)
        }
        Err(e) => {
            warn!(router, account, error = %e, "could not list active sessions after disable");
            result.with_error(ErrorKind::PartialCleanupFailure)
        }
    }
}
