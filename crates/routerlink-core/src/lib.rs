// routerlink-core: PPP access control and session eviction for RouterOS
//
// Every public operation opens its own session, runs under a deadline and
// returns a result value; errors never escape the operation boundary.

pub mod config;
pub mod error;
pub mod evictor;
pub mod gateway;
pub mod guard;
pub mod model;
pub mod registry;
pub mod result;
pub mod secret;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{LinkConfig, OperationTimeouts, RouterTarget};
pub use error::{CoreError, ErrorKind};
pub use evictor::{EvictionReport, SessionEvictor};
pub use gateway::Gateway;
pub use guard::run_with_deadline;
pub use model::{AccessRecord, AccessState, LiveSessionRecord};
pub use registry::{RouterRegistry, StaticRegistry};
pub use result::{GuardFallback, OperationResult, StatusReport};
pub use secret::SecretController;
pub use session::{Connector, RouterSession, SessionAcquirer, TcpConnector, release};
