//! Configuration for the routerlink CLI and embedding services.
//!
//! TOML router profiles, credential resolution (env + keyring + plaintext),
//! and translation to `routerlink_core::RouterTarget` / `LinkConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use routerlink_core::{CoreError, LinkConfig, OperationTimeouts, RouterRegistry, RouterTarget};

pub const KEYRING_SERVICE: &str = "routerlink";
pub const ENV_PREFIX: &str = "ROUTERLINK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for router '{router}'")]
    NoCredentials { router: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Router used when `--router` is not given.
    pub default_router: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named routers.
    #[serde(default)]
    pub routers: BTreeMap<String, RouterProfile>,
}

/// Global defaults. Times are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout: u64,

    /// Deadline for disable / enable / evict.
    #[serde(default = "default_mutate_deadline")]
    pub mutate_deadline: u64,

    /// Deadline for status checks.
    #[serde(default = "default_status_deadline")]
    pub status_deadline: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            mutate_deadline: default_mutate_deadline(),
            status_deadline: default_status_deadline(),
        }
    }
}

fn default_port() -> u16 {
    8728
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_read_timeout() -> u64 {
    10
}
fn default_mutate_deadline() -> u64 {
    15
}
fn default_status_deadline() -> u64 {
    10
}

/// A named router.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouterProfile {
    /// Host name or IP of the RouterOS API service.
    pub host: String,

    /// Override the default API port.
    pub port: Option<u16>,

    /// API user.
    pub username: String,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override the default read timeout.
    pub read_timeout: Option<u64>,
}

impl Config {
    /// Connect timeout and operation deadlines from `[defaults]`.
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            connect_timeout: Duration::from_secs(self.defaults.connect_timeout),
            timeouts: OperationTimeouts {
                mutate: Duration::from_secs(self.defaults.mutate_deadline),
                status: Duration::from_secs(self.defaults.status_deadline),
            },
        }
    }

    /// `explicit` if given, else `default_router`, else the only router.
    pub fn select_router(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(name) = explicit {
            return Some(name.to_owned());
        }
        if let Some(ref name) = self.default_router {
            return Some(name.clone());
        }
        match self.routers.keys().collect::<Vec<_>>().as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "routerlink", "routerlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("routerlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment overrides use the `ROUTERLINK_` prefix with `__` between
/// keys, e.g. `ROUTERLINK_DEFAULTS__MUTATE_DEADLINE=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(router: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{router}/password"),
    )?)
}

/// Resolve the API password for `router`.
///
/// Order: the profile's `password_env` variable, the system keyring
/// (`routerlink`, `<router>/password`), then plaintext `password`.
pub fn resolve_password(profile: &RouterProfile, router: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, router, |name| std::env::var(name).ok())
}

fn resolve_password_with(
    profile: &RouterProfile,
    router: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Env var named by the profile
    if let Some(ref env_name) = profile.password_env {
        if let Some(val) = env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(router) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        router: router.into(),
    })
}

/// Store `password` for `router` in the system keyring.
pub fn store_password(router: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(router)?.set_password(password.expose_secret())?;
    Ok(())
}

/// Build a `RouterTarget` from a profile, filling gaps from `defaults`.
pub fn profile_to_target(
    profile: &RouterProfile,
    router: &str,
    defaults: &Defaults,
) -> Result<RouterTarget, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("routers.{router}.host"),
            reason: "must not be empty".into(),
        });
    }
    if profile.username.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("routers.{router}.username"),
            reason: "must not be empty".into(),
        });
    }

    let password = resolve_password(profile, router)?;
    let read_timeout = profile.read_timeout.unwrap_or(defaults.read_timeout);

    Ok(
        RouterTarget::new(router, profile.host.clone(), profile.username.clone(), password)
            .with_port(profile.port.unwrap_or(defaults.port))
            .with_read_timeout(Duration::from_secs(read_timeout)),
    )
}

// ── Registry ────────────────────────────────────────────────────────

/// `RouterRegistry` backed by a loaded [`Config`].
///
/// Credentials are resolved on every lookup, so a password rotated in the
/// keyring is picked up by the next operation.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    config: Config,
}

impl ConfigRegistry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl RouterRegistry for ConfigRegistry {
    fn resolve(&self, name: &str) -> Result<RouterTarget, CoreError> {
        let profile = self
            .config
            .routers
            .get(name)
            .ok_or_else(|| CoreError::RouterNotFound { name: name.into() })?;

        profile_to_target(profile, name, &self.config.defaults).map_err(|e| CoreError::Config {
            message: e.to_string(),
        })
    }

    fn names(&self) -> Vec<String> {
        self.config.routers.keys().cloned().collect()
    }
}
