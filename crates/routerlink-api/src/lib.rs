// routerlink-api: Async Rust client for the MikroTik RouterOS API protocol

pub mod client;
pub mod error;
pub mod models;
pub mod ppp;
pub mod protocol;
pub mod transport;

pub use client::{ApiClient, SessionObserver, TracingObserver};
pub use error::Error;
pub use models::{PppActive, PppSecret};
pub use protocol::{Command, Record, Reply, Sentence};
pub use transport::{DEFAULT_PORT, Endpoint, TransportConfig};
