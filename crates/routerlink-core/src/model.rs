// ── Domain model ──
//
// Read-once snapshots of router state. Nothing here is cached: every
// operation takes its own snapshot and discards it when done. Record ids
// are only meaningful inside the session that produced them.

use serde::Serialize;
use strum::Display;
use tracing::warn;

use routerlink_api::{PppActive, PppSecret};

/// Access state of one account, as seen by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum AccessState {
    Enabled,
    Disabled,
    /// No PPP secret exists for the account.
    Unknown,
}

impl AccessState {
    pub fn of(record: Option<&AccessRecord>) -> Self {
        match record {
            Some(r) if r.disabled => Self::Disabled,
            Some(_) => Self::Enabled,
            None => Self::Unknown,
        }
    }
}

/// Snapshot of a PPP secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRecord {
    pub id: String,
    pub account: String,
    pub disabled: bool,
    pub profile: Option<String>,
    pub service: Option<String>,
}

impl AccessRecord {
    pub fn state(&self) -> AccessState {
        AccessState::of(Some(self))
    }
}

impl From<PppSecret> for AccessRecord {
    fn from(secret: PppSecret) -> Self {
        let disabled = parse_disabled(&secret.id, secret.disabled.as_deref());
        Self {
            id: secret.id,
            account: secret.name.unwrap_or_default(),
            disabled,
            profile: secret.profile,
            service: secret.service,
        }
    }
}

/// Interpret the router's `disabled` string.
///
/// Only the exact string `"true"` counts as disabled. Anything else,
/// including a missing or malformed value, reads as enabled; such values
/// are logged because a suspension check built on them fails open.
pub fn parse_disabled(id: &str, raw: Option<&str>) -> bool {
    match raw {
        Some("true") => true,
        Some("false") => false,
        other => {
            warn!(
                id,
                value = ?other,
                "ambiguous 'disabled' value from router, treating as enabled"
            );
            false
        }
    }
}

/// A live PPP connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveSessionRecord {
    pub id: String,
    pub account: String,
}

impl LiveSessionRecord {
    /// Build from a `/ppp/active` entry. The query usually asks only for
    /// `.id`, so the account falls back to the name that was queried.
    pub fn from_active(active: PppActive, queried: &str) -> Self {
        Self {
            id: active.id,
            account: active.name.unwrap_or_else(|| queried.to_owned()),
        }
    }
}
