// ── Runtime connection configuration ──
//
// These types describe *how* to reach a router and how long each operation
// may take. They carry credentials and tuning, but never touch disk.
// The CLI (or any embedding service) builds them and hands them in.

use std::time::Duration;

use secrecy::SecretString;

use routerlink_api::Endpoint;

pub const DEFAULT_PORT: u16 = routerlink_api::DEFAULT_PORT;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MUTATE_DEADLINE: Duration = Duration::from_secs(15);
pub const DEFAULT_STATUS_DEADLINE: Duration = Duration::from_secs(10);

/// Connection parameters for one named router.
///
/// Resolved from a [`RouterRegistry`](crate::RouterRegistry) at the start of
/// every operation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RouterTarget {
    /// Registry key.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Upper bound on each reply from the router.
    pub read_timeout: Duration,
}

impl RouterTarget {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Hard deadlines for whole operations (connect + every exchange + close).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationTimeouts {
    /// disable / enable / evict.
    pub mutate: Duration,
    /// Read-only status checks.
    pub status: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            mutate: DEFAULT_MUTATE_DEADLINE,
            status: DEFAULT_STATUS_DEADLINE,
        }
    }
}

/// Everything the core needs besides the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// TCP connect bound for each fresh session.
    pub connect_timeout: Duration,
    pub timeouts: OperationTimeouts,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeouts: OperationTimeouts::default(),
        }
    }
}
