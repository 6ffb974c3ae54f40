// ── Session acquisition ──
//
// One fresh, logged-in device session per operation. Sessions are owned by
// the operation that acquired them and released through `release`, which
// swallows close failures after logging them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use routerlink_api::{ApiClient, SessionObserver, TracingObserver, TransportConfig};

use crate::config::{DEFAULT_CONNECT_TIMEOUT, RouterTarget};
use crate::error::CoreError;
use crate::model::{AccessRecord, LiveSessionRecord};
use crate::registry::RouterRegistry;

/// The PPP exchanges the controller and evictor need from a device session.
pub trait RouterSession: Send + 'static {
    /// First PPP secret named `account`, reading only `fields`.
    fn find_secret(
        &mut self,
        account: &str,
        fields: &[&str],
    ) -> impl Future<Output = Result<Option<AccessRecord>, CoreError>> + Send;

    fn set_disabled(
        &mut self,
        id: &str,
        disabled: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Live sessions for `account`, ids only.
    fn live_sessions(
        &mut self,
        account: &str,
    ) -> impl Future<Output = Result<Vec<LiveSessionRecord>, CoreError>> + Send;

    fn evict(&mut self, id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// End the session. Consumes it, so a session closes at most once.
    fn close(self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Opens sessions for resolved targets.
pub trait Connector: Send + Sync + 'static {
    type Session: RouterSession;

    fn connect(
        &self,
        target: &RouterTarget,
    ) -> impl Future<Output = Result<Self::Session, CoreError>> + Send;
}

// ── RouterOS API sessions ────────────────────────────────────────────

const ACTIVE_FIELDS: &[&str] = &[".id"];

impl<S> RouterSession for ApiClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn find_secret(
        &mut self,
        account: &str,
        fields: &[&str],
    ) -> Result<Option<AccessRecord>, CoreError> {
        let secrets = self.find_secrets(account, fields).await?;
        Ok(secrets.into_iter().next().map(AccessRecord::from))
    }

    async fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<(), CoreError> {
        self.set_secret_disabled(id, disabled).await?;
        Ok(())
    }

    async fn live_sessions(&mut self, account: &str) -> Result<Vec<LiveSessionRecord>, CoreError> {
        let active = self.find_active(account, ACTIVE_FIELDS).await?;
        Ok(active
            .into_iter()
            .map(|a| LiveSessionRecord::from_active(a, account))
            .collect())
    }

    async fn evict(&mut self, id: &str) -> Result<(), CoreError> {
        self.remove_active(id).await?;
        Ok(())
    }

    async fn close(self) -> Result<(), CoreError> {
        ApiClient::close(self).await?;
        Ok(())
    }
}

/// Connects over TCP and logs in with the target's credentials.
///
/// Keep-alive is always off: every session is opened for one operation and
/// closed right after it.
#[derive(Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
    observer: Arc<dyn SessionObserver>,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the default tracing observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl std::fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnector")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl Connector for TcpConnector {
    type Session = ApiClient;

    async fn connect(&self, target: &RouterTarget) -> Result<ApiClient, CoreError> {
        let transport = TransportConfig {
            connect_timeout: self.connect_timeout,
            read_timeout: target.read_timeout,
            keepalive: false,
        };

        let mut client = ApiClient::connect(&target.endpoint(), &transport).await?;
        client.set_label(target.name.clone());
        client.observe(Arc::clone(&self.observer));

        if let Err(e) = client.login(&target.username, &target.password).await {
            if e.is_auth() {
                warn!(router = %target.name, user = %target.username, error = %e, "login refused");
            } else {
                debug!(router = %target.name, error = %e, "login did not complete");
            }
            release(client, &target.name).await;
            return Err(e.into());
        }
        Ok(client)
    }
}

// ── Acquirer ─────────────────────────────────────────────────────────

/// Resolves router names and opens sessions to them.
pub struct SessionAcquirer<C> {
    registry: Arc<dyn RouterRegistry>,
    connector: C,
}

impl<C: Connector> SessionAcquirer<C> {
    pub fn new(registry: Arc<dyn RouterRegistry>, connector: C) -> Self {
        Self {
            registry,
            connector,
        }
    }

    pub fn registry(&self) -> &Arc<dyn RouterRegistry> {
        &self.registry
    }

    /// Resolve `router` and open a logged-in session.
    ///
    /// Registry failures come back unchanged. Everything that goes wrong
    /// while connecting becomes a connection error naming the router;
    /// authentication failures keep their own variant.
    pub async fn acquire(&self, router: &str) -> Result<C::Session, CoreError> {
        let target = self.registry.resolve(router)?;
        debug!(router, host = %target.host, port = target.port, "acquiring session");

        self.connector.connect(&target).await.map_err(|e| match e {
            e @ (CoreError::RouterNotFound { .. }
            | CoreError::Config { .. }
            | CoreError::AuthenticationFailed { .. }
            | CoreError::ConnectionFailed { .. }) => e,
            other => CoreError::ConnectionFailed {
                router: target.name.clone(),
                reason: other.to_string(),
            },
        })
    }
}

impl<C> std::fmt::Debug for SessionAcquirer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAcquirer")
            .field("routers", &self.registry.names())
            .finish_non_exhaustive()
    }
}

/// Close `session`, logging (never returning) a failure.
pub async fn release<S: RouterSession>(session: S, router: &str) {
    match session.close().await {
        Ok(()) => debug!(router, "session released"),
        Err(e) => warn!(router, error = %e, "failed to close router session"),
    }
}
