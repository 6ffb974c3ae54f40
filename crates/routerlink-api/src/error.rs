use thiserror::Error;

/// Top-level error type for the `routerlink-api` crate.
///
/// Covers every failure mode of a RouterOS API session:
/// connection setup, login, framing, device replies, and payload decoding.
/// `routerlink-core` maps these into domain diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// Socket-level I/O error (connection refused, reset, broken pipe, etc.)
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Host name resolved to no usable address.
    #[error("Could not resolve {host}")]
    Resolve { host: String },

    /// TCP connect did not complete in time.
    #[error("Connecting to {address} timed out after {timeout_secs}s")]
    ConnectTimeout { address: String, timeout_secs: u64 },

    /// No reply arrived within the read timeout.
    #[error("Router did not answer within {timeout_secs}s")]
    ReadTimeout { timeout_secs: u64 },

    /// The peer closed the socket without a `!fatal` reply.
    #[error("Connection closed by router")]
    ConnectionClosed,

    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, disabled user, API service policy).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Router answered `/login` with a pre-6.43 challenge.
    #[error("Router requires the legacy challenge login (RouterOS < 6.43)")]
    UnsupportedLogin,

    // ── Device replies ──────────────────────────────────────────────
    /// `!trap` reply: the router refused or failed the command.
    #[error("Router rejected command: {message}")]
    Trap {
        message: String,
        category: Option<u32>,
    },

    /// `!fatal` reply: the router terminated the session.
    #[error("Router terminated the session: {message}")]
    Fatal { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Malformed framing or an unexpected reply word.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A reply record did not match the expected shape.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the login itself was refused.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::UnsupportedLogin)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_)
            | Self::ConnectTimeout { .. }
            | Self::ReadTimeout { .. }
            | Self::ConnectionClosed
            | Self::Fatal { .. } => true,
            Self::Resolve { .. }
            | Self::Authentication { .. }
            | Self::UnsupportedLogin
            | Self::Trap { .. }
            | Self::Protocol(_)
            | Self::Deserialization { .. } => false,
        }
    }

    /// Returns `true` if the session can no longer carry commands.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::ConnectionClosed
                | Self::Fatal { .. }
                | Self::ReadTimeout { .. }
                | Self::Protocol(_)
        )
    }
}
