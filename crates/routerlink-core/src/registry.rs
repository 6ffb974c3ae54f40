// ── Router registry ──
//
// Name to connection-parameter lookup. The core only reads from it; where
// the entries come from (config file, database, tests) is the caller's
// business.

use std::collections::HashMap;

use crate::config::RouterTarget;
use crate::error::CoreError;

/// Lookup of router connection parameters by name.
pub trait RouterRegistry: Send + Sync {
    /// Resolve `name`. An unconfigured name is [`CoreError::RouterNotFound`],
    /// never a connection error.
    fn resolve(&self, name: &str) -> Result<RouterTarget, CoreError>;

    /// Configured router names, sorted.
    fn names(&self) -> Vec<String>;
}

/// In-memory registry.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    routers: HashMap<String, RouterTarget>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `target.name`.
    pub fn insert(&mut self, target: RouterTarget) {
        self.routers.insert(target.name.clone(), target);
    }

    #[must_use]
    pub fn with(mut self, target: RouterTarget) -> Self {
        self.insert(target);
        self
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl FromIterator<RouterTarget> for StaticRegistry {
    fn from_iter<I: IntoIterator<Item = RouterTarget>>(iter: I) -> Self {
        let mut registry = Self::new();
        for target in iter {
            registry.insert(target);
        }
        registry
    }
}

impl RouterRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Result<RouterTarget, CoreError> {
        self.routers
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::RouterNotFound {
                name: name.to_owned(),
            })
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routers.keys().cloned().collect();
        names.sort();
        names
    }
}
