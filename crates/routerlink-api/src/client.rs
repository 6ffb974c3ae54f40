// RouterOS API session client
//
// Wraps a framed byte stream with login, request/response exchange, and
// orderly shutdown. One command is in flight at a time: `execute` writes a
// sentence and reads replies until `!done`. Endpoint helpers (PPP secrets,
// active connections) live in separate files as inherent methods.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, trace};

use crate::error::Error;
use crate::protocol::{ApiCodec, Command, Record, Reply};
use crate::transport::{Endpoint, TransportConfig};

/// How long `close` waits for the `/quit` acknowledgement.
const QUIT_GRACE: Duration = Duration::from_secs(1);

// ── Observers ────────────────────────────────────────────────────────

/// Passive listener for session-level transport events.
///
/// Observers are told about failures and closure; they cannot influence the
/// session and must not panic.
pub trait SessionObserver: Send + Sync {
    /// A transport or protocol error ended (or damaged) the session.
    fn on_error(&self, _label: &str, _error: &Error) {}

    /// The session is gone: closed locally, by `!fatal`, or by EOF.
    fn on_close(&self, _label: &str) {}
}

/// Observer that records events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_error(&self, label: &str, error: &Error) {
        tracing::warn!(router = label, error = %error, "API session error");
    }

    fn on_close(&self, label: &str) {
        debug!(router = label, "API session closed");
    }
}

// ── ApiClient ────────────────────────────────────────────────────────

/// A single RouterOS API session.
///
/// Generic over the byte stream so tests can drive it over an in-memory
/// duplex; production code uses [`TcpStream`] via [`ApiClient::connect`].
pub struct ApiClient<S = TcpStream> {
    framed: Framed<S, ApiCodec>,
    label: String,
    read_timeout: Duration,
    observers: Vec<Arc<dyn SessionObserver>>,
    terminated: bool,
}

impl ApiClient<TcpStream> {
    /// Open a TCP connection to `endpoint`. Does NOT log in; call
    /// [`login`](Self::login) before issuing commands.
    pub async fn connect(endpoint: &Endpoint, transport: &TransportConfig) -> Result<Self, Error> {
        let stream = transport.open(endpoint).await?;
        debug!(%endpoint, "API socket connected");
        Ok(Self::from_stream(
            stream,
            endpoint.to_string(),
            transport.read_timeout,
        ))
    }
}

impl<S> ApiClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-open stream.
    pub fn from_stream(stream: S, label: impl Into<String>, read_timeout: Duration) -> Self {
        Self {
            framed: Framed::new(stream, ApiCodec::new()),
            label: label.into(),
            read_timeout,
            observers: Vec::new(),
            terminated: false,
        }
    }

    /// Register a passive observer for errors and closure.
    pub fn observe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Label used in logs (usually `host:port` or the router name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rename the session for logging.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// `true` once the router has ended the session or a fatal transport
    /// error occurred.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Log in with the post-6.43 plain-text method.
    ///
    /// A `!done` carrying `=ret=` means the router only speaks the legacy
    /// challenge login, which is reported as [`Error::UnsupportedLogin`].
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(router = %self.label, username, "logging in");

        let cmd = Command::new("/login")
            .attr("name", username)
            .attr("password", password.expose_secret());

        match self.exchange(cmd).await {
            Ok((_, done)) if done.contains_key("ret") => Err(Error::UnsupportedLogin),
            Ok(_) => {
                debug!(router = %self.label, "login successful");
                Ok(())
            }
            Err(Error::Trap { message, .. }) => Err(Error::Authentication { message }),
            Err(e) => Err(e),
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a command and collect its `!re` records.
    pub async fn execute(&mut self, cmd: Command) -> Result<Vec<Record>, Error> {
        self.exchange(cmd).await.map(|(records, _)| records)
    }

    /// Send a command and read replies through `!done`.
    ///
    /// A `!trap` does not end the reply; the router still sends `!done`
    /// afterwards, so the trap is held until then.
    async fn exchange(&mut self, cmd: Command) -> Result<(Vec<Record>, Record), Error> {
        if self.terminated {
            return Err(Error::ConnectionClosed);
        }

        debug!(router = %self.label, path = cmd.path(), "sending command");
        let result = self.exchange_inner(cmd).await;

        if let Err(ref e) = result {
            if e.is_terminal() {
                self.mark_terminated(Some(e));
            }
        }
        result
    }

    async fn exchange_inner(&mut self, cmd: Command) -> Result<(Vec<Record>, Record), Error> {
        self.framed.send(cmd.into_sentence()).await?;

        let mut records = Vec::new();
        let mut trap = None;

        loop {
            match self.read_reply().await? {
                Reply::Re(record) => {
                    trace!(router = %self.label, ?record, "!re");
                    records.push(record);
                }
                Reply::Trap { message, category } => {
                    debug!(router = %self.label, %message, ?category, "!trap");
                    if trap.is_none() {
                        trap = Some(Error::Trap { message, category });
                    }
                }
                Reply::Empty => {}
                Reply::Done(done) => {
                    return match trap {
                        Some(err) => Err(err),
                        None => Ok((records, done)),
                    };
                }
                Reply::Fatal(message) => return Err(Error::Fatal { message }),
            }
        }
    }

    /// Read and parse one reply sentence, bounded by the read timeout.
    async fn read_reply(&mut self) -> Result<Reply, Error> {
        let next = tokio::time::timeout(self.read_timeout, self.framed.next())
            .await
            .map_err(|_| Error::ReadTimeout {
                timeout_secs: self.read_timeout.as_secs(),
            })?;

        match next {
            Some(sentence) => Reply::try_from(sentence?),
            None => Err(Error::ConnectionClosed),
        }
    }

    fn mark_terminated(&mut self, error: Option<&Error>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        for observer in &self.observers {
            if let Some(e) = error {
                observer.on_error(&self.label, e);
            }
            observer.on_close(&self.label);
        }
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// End the session: send `/quit`, wait briefly for the router's
    /// `!fatal` acknowledgement, then shut the socket down.
    ///
    /// Closing a session the router already terminated is a no-op.
    pub async fn close(mut self) -> Result<(), Error> {
        if self.terminated {
            return Ok(());
        }

        debug!(router = %self.label, "closing API session");
        let quit = self
            .framed
            .send(Command::new("/quit").into_sentence())
            .await;

        if quit.is_ok() {
            // The acknowledgement is courtesy; its absence is not an error.
            let _ = tokio::time::timeout(QUIT_GRACE, self.framed.next()).await;
        }

        let shutdown = self.framed.get_mut().shutdown().await;
        self.mark_terminated(None);

        quit?;
        // Peer already gone after `/quit` is the expected outcome.
        match shutdown {
            Err(e) if e.kind() != std::io::ErrorKind::NotConnected => Err(Error::Transport(e)),
            _ => Ok(()),
        }
    }
}

impl<S> std::fmt::Debug for ApiClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("label", &self.label)
            .field("read_timeout", &self.read_timeout)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}
