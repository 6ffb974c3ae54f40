// ── Gateway ──
//
// The value upstream workflows hold: one acquirer shared by the controller
// and the evictor. Cheap to share behind an `Arc`; holds no connections.
// Every operation task, including those abandoned at their deadline, is
// tracked so a process can drain them before exiting.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::{LinkConfig, OperationTimeouts};
use crate::evictor::SessionEvictor;
use crate::registry::RouterRegistry;
use crate::result::{OperationResult, StatusReport};
use crate::secret::SecretController;
use crate::session::{Connector, SessionAcquirer, TcpConnector};

pub struct Gateway<C = TcpConnector> {
    acquirer: Arc<SessionAcquirer<C>>,
    secrets: SecretController<C>,
    evictor: SessionEvictor<C>,
    tasks: TaskTracker,
}

impl Gateway<TcpConnector> {
    /// Gateway that talks to real routers over TCP.
    pub fn new(registry: Arc<dyn RouterRegistry>, config: LinkConfig) -> Self {
        Self::with_connector(
            registry,
            TcpConnector::new(config.connect_timeout),
            config.timeouts,
        )
    }
}

impl<C: Connector> Gateway<C> {
    pub fn with_connector(
        registry: Arc<dyn RouterRegistry>,
        connector: C,
        timeouts: OperationTimeouts,
    ) -> Self {
        let acquirer = Arc::new(SessionAcquirer::new(registry, connector));
        let tasks = TaskTracker::new();
        Self {
            secrets: SecretController::new(Arc::clone(&acquirer), timeouts, tasks.clone()),
            evictor: SessionEvictor::new(Arc::clone(&acquirer), timeouts, tasks.clone()),
            acquirer,
            tasks,
        }
    }

    pub fn registry(&self) -> &Arc<dyn RouterRegistry> {
        self.acquirer.registry()
    }

    pub async fn disable(&self, router: &str, account: &str) -> OperationResult {
        self.secrets.disable(router, account).await
    }

    pub async fn enable(&self, router: &str, account: &str) -> OperationResult {
        self.secrets.enable(router, account).await
    }

    pub async fn check_status(&self, router: &str, account: &str) -> StatusReport {
        self.secrets.check_status(router, account).await
    }

    pub async fn evict_all(&self, router: &str, account: &str) -> OperationResult {
        self.evictor.evict_all(router, account).await
    }

    /// Operation tasks still running, abandoned ones included.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Stop accepting work and wait up to `grace` for running operation
    /// tasks to release their sessions. Returns `false` if some were still
    /// running when `grace` ran out.
    pub async fn drain(&self, grace: Duration) -> bool {
        self.tasks.close();
        if self.tasks.is_empty() {
            return true;
        }

        debug!(pending = self.tasks.len(), "waiting for abandoned operations");
        if tokio::time::timeout(grace, self.tasks.wait()).await.is_ok() {
            true
        } else {
            warn!(
                pending = self.tasks.len(),
                grace_ms = grace.as_millis(),
                "abandoned operations still running at shutdown"
            );
            false
        }
    }
}

impl<C> std::fmt::Debug for Gateway<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("acquirer", &self.acquirer)
            .field("pending", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::RouterTarget;
    use crate::error::ErrorKind;
    use crate::registry::StaticRegistry;
    use crate::testing::FakeRouter;

    fn gateway(router: &FakeRouter) -> Arc<Gateway<FakeRouter>> {
        let registry = StaticRegistry::new().with(RouterTarget::new(
            "r1",
            "10.0.0.1",
            "billing",
            SecretString::from("pw"),
        ));
        Arc::new(Gateway::with_connector(
            Arc::new(registry),
            router.clone(),
            OperationTimeouts::default(),
        ))
    }

    #[tokio::test]
    async fn suspend_then_restore_cycle() {
        let router = FakeRouter::new()
            .with_secret("u1", "*A", "false")
            .with_active("u1", "*1");
        let gateway = gateway(&router);

        assert!(gateway.disable("r1", "u1").await.success);
        assert_eq!(gateway.check_status("r1", "u1").await.disabled, Some(true));
        assert!(gateway.enable("r1", "u1").await.success);
        assert_eq!(gateway.check_status("r1", "u1").await.disabled, Some(false));

        assert_eq!(router.connects(), 4);
        assert_eq!(router.closes(), 4);
        assert_eq!(router.writes(), 2);
    }

    #[tokio::test]
    async fn concurrent_operations_use_separate_sessions() {
        let router = FakeRouter::new()
            .with_secret("u1", "*A", "false")
            .with_secret("u2", "*B", "false")
            .with_active("u2", "*9");
        let gateway = gateway(&router);

        let (a, b, c) = tokio::join!(
            gateway.disable("r1", "u1"),
            gateway.check_status("r1", "u2"),
            gateway.evict_all("r1", "u2"),
        );

        assert!(a.success && b.success && c.success);
        assert_eq!(router.connects(), 3);
        assert_eq!(router.closes(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_timed_out_disable_to_finish() {
        let router = FakeRouter::new()
            .with_secret("u1", "*A", "false")
            .with_active("u1", "*1");
        router.configure(|s| s.delay = Some(Duration::from_secs(20)));
        let gateway = gateway(&router);

        let result = gateway.disable("r1", "u1").await;
        assert_eq!(result.error, Some(ErrorKind::Timeout));
        assert_eq!(gateway.pending(), 1);
        assert_eq!(router.closes(), 0);

        assert!(gateway.drain(Duration::from_secs(120)).await);

        assert_eq!(gateway.pending(), 0);
        assert_eq!(router.disabled_value("u1").as_deref(), Some("true"));
        assert_eq!(router.active_ids(), Vec::<String>::new());
        assert_eq!(router.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_grace() {
        let router = FakeRouter::new().with_secret("u1", "*A", "false");
        router.configure(|s| s.delay = Some(Duration::from_secs(600)));
        let gateway = gateway(&router);

        let result = gateway.check_status("r1", "u1").await;
        assert_eq!(result.error, Some(ErrorKind::Timeout));

        assert!(!gateway.drain(Duration::from_secs(30)).await);
        assert_eq!(gateway.pending(), 1);
    }

    #[tokio::test]
    async fn drain_with_nothing_pending_returns_at_once() {
        let gateway = gateway(&FakeRouter::new());
        assert!(gateway.drain(Duration::ZERO).await);
    }

    #[test]
    fn lists_registry_names() {
        let gateway = gateway(&FakeRouter::new());
        assert_eq!(gateway.registry().names(), ["r1"]);
    }
}
