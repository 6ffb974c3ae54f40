//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use routerlink_config::ConfigError;
use routerlink_core::ErrorKind;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Router selection ─────────────────────────────────────────────
    #[error("No router selected")]
    #[diagnostic(
        code(routerlink::no_router),
        help(
            "Pass --router <NAME> or set default_router in the config file.\n\
             Configured routers: {available}"
        )
    )]
    NoRouterSelected { available: String },

    #[error("Router '{name}' not found in configuration")]
    #[diagnostic(
        code(routerlink::router_not_found),
        help(
            "Configured routers: {available}\n\
             Run: routerlink routers list"
        )
    )]
    RouterNotFound { name: String, available: String },

    #[error("No routers configured")]
    #[diagnostic(
        code(routerlink::no_config),
        help("Add a [routers.<name>] table to {path}")
    )]
    NoConfig { path: String },

    // ── Credentials ──────────────────────────────────────────────────
    #[error("No password configured for router '{router}'")]
    #[diagnostic(
        code(routerlink::no_credentials),
        help(
            "Store one with: routerlink config set-password {router}\n\
             Or set password_env in the router's config table."
        )
    )]
    NoCredentials { router: String },

    // ── Operations ───────────────────────────────────────────────────
    #[error("{failed} of {total} operations failed")]
    #[diagnostic(
        code(routerlink::operation_failed),
        help("First failure: {kind}. See the per-account messages above.")
    )]
    OperationsFailed {
        failed: usize,
        total: usize,
        kind: ErrorKind,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(routerlink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(routerlink::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { router } => Self::NoCredentials { router },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::RouterNotFound { .. } => exit_code::NOT_FOUND,
            Self::NoRouterSelected { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::OperationsFailed { kind, .. } => kind_exit_code(*kind),
            _ => exit_code::GENERAL,
        }
    }
}

/// Exit code for the first failed operation's classification.
pub fn kind_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NotFound => exit_code::NOT_FOUND,
        ErrorKind::ConnectionError => exit_code::CONNECTION,
        ErrorKind::Timeout => exit_code::TIMEOUT,
        ErrorKind::Configuration => exit_code::AUTH,
        ErrorKind::WriteFailure
        | ErrorKind::PartialCleanupFailure
        | ErrorKind::Rejected
        | ErrorKind::Internal => exit_code::GENERAL,
    }
}
