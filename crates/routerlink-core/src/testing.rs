// In-memory router for unit tests.
//
// `FakeRouter` is a `Connector`; each connect hands out a `FakeSession`
// sharing one state, so tests can inspect every exchange after the fact and
// inject failures or latency into individual steps.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use routerlink_api::PppSecret;

use crate::config::RouterTarget;
use crate::error::CoreError;
use crate::model::{AccessRecord, LiveSessionRecord};
use crate::session::{Connector, RouterSession};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub secrets: Vec<PppSecret>,
    pub active: Vec<LiveSessionRecord>,
    /// Every call, in order: `connect r1`, `find u1`, `set *1 yes`, ...
    pub log: Vec<String>,
    pub fail_connect: bool,
    pub fail_find: bool,
    pub fail_set: bool,
    pub fail_active_lookup: bool,
    pub fail_remove: HashSet<String>,
    pub fail_close: bool,
    pub panic_on_set: bool,
    /// Latency added before every exchange (not connect or close).
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRouter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(self, account: &str, id: &str, disabled: &str) -> Self {
        self.configure(|s| {
            s.secrets.push(PppSecret {
                id: id.into(),
                name: Some(account.into()),
                disabled: Some(disabled.into()),
                profile: Some("default".into()),
                service: Some("pppoe".into()),
            });
        });
        self
    }

    pub fn with_active(self, account: &str, id: &str) -> Self {
        self.configure(|s| {
            s.active.push(LiveSessionRecord {
                id: id.into(),
                account: account.into(),
            });
        });
        self
    }

    pub fn configure(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut lock(&self.state));
    }

    pub fn log(&self) -> Vec<String> {
        lock(&self.state).log.clone()
    }

    fn count(&self, prefix: &str) -> usize {
        lock(&self.state)
            .log
            .iter()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    pub fn connects(&self) -> usize {
        self.count("connect")
    }

    pub fn closes(&self) -> usize {
        self.count("close")
    }

    pub fn writes(&self) -> usize {
        self.count("set")
    }

    pub fn removals(&self) -> usize {
        self.count("remove")
    }

    pub fn disabled_value(&self, account: &str) -> Option<String> {
        lock(&self.state)
            .secrets
            .iter()
            .find(|s| s.name.as_deref() == Some(account))
            .and_then(|s| s.disabled.clone())
    }

    pub fn active_ids(&self) -> Vec<String> {
        lock(&self.state)
            .active
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }
}

fn lock(state: &Mutex<FakeState>) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Connector for FakeRouter {
    type Session = FakeSession;

    async fn connect(&self, target: &RouterTarget) -> Result<FakeSession, CoreError> {
        let mut state = lock(&self.state);
        state.log.push(format!("connect {}", target.name));
        if state.fail_connect {
            return Err(CoreError::Disconnected {
                reason: "connection refused".into(),
            });
        }
        Ok(FakeSession {
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub(crate) struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    async fn pause(&self) {
        let delay = lock(&self.state).delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn rejected(message: &str) -> CoreError {
        CoreError::Rejected {
            message: message.into(),
        }
    }
}

impl RouterSession for FakeSession {
    async fn find_secret(
        &mut self,
        account: &str,
        _fields: &[&str],
    ) -> Result<Option<AccessRecord>, CoreError> {
        self.pause().await;
        let mut state = lock(&self.state);
        state.log.push(format!("find {account}"));
        if state.fail_find {
            return Err(CoreError::Disconnected {
                reason: "connection reset".into(),
            });
        }
        Ok(state
            .secrets
            .iter()
            .find(|s| s.name.as_deref() == Some(account))
            .cloned()
            .map(AccessRecord::from))
    }

    async fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<(), CoreError> {
        self.pause().await;
        let panic_on_set = {
            let mut state = lock(&self.state);
            state
                .log
                .push(format!("set {id} {}", if disabled { "yes" } else { "no" }));
            if state.fail_set {
                return Err(Self::rejected("failure: item is read-only"));
            }
            match state.secrets.iter_mut().find(|s| s.id == id) {
                Some(secret) => secret.disabled = Some(disabled.to_string()),
                None => return Err(Self::rejected("no such item")),
            }
            state.panic_on_set
        };
        assert!(!panic_on_set, "injected panic after write");
        Ok(())
    }

    async fn live_sessions(&mut self, account: &str) -> Result<Vec<LiveSessionRecord>, CoreError> {
        self.pause().await;
        let mut state = lock(&self.state);
        state.log.push(format!("active {account}"));
        if state.fail_active_lookup {
            return Err(Self::rejected("interrupted"));
        }
        Ok(state
            .active
            .iter()
            .filter(|a| a.account == account)
            .cloned()
            .collect())
    }

    async fn evict(&mut self, id: &str) -> Result<(), CoreError> {
        self.pause().await;
        let mut state = lock(&self.state);
        state.log.push(format!("remove {id}"));
        if state.fail_remove.contains(id) {
            return Err(Self::rejected("no such item"));
        }
        state.active.retain(|a| a.id != id);
        Ok(())
    }

    async fn close(self) -> Result<(), CoreError> {
        let mut state = lock(&self.state);
        state.log.push("close".into());
        if state.fail_close {
            return Err(CoreError::Disconnected {
                reason: "broken pipe".into(),
            });
        }
        Ok(())
    }
}
