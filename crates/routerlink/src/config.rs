//! `GlobalOpts`-aware wrappers over `routerlink_config`.

use std::path::PathBuf;
use std::time::Duration;

use routerlink_config::{Config, load_config_from, resolve_password};
use routerlink_core::{LinkConfig, OperationTimeouts};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// `--config` if given, otherwise the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(routerlink_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_path(global))?)
}

fn available(cfg: &Config) -> String {
    if cfg.routers.is_empty() {
        "(none)".into()
    } else {
        cfg.routers.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Pick the router for this invocation and make sure it can be used.
///
/// Checked up front so a missing router or password is reported once with
/// a hint, instead of once per account.
pub fn select_router(cfg: &Config, global: &GlobalOpts) -> Result<String, CliError> {
    if cfg.routers.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path(global).display().to_string(),
        });
    }

    let name = cfg
        .select_router(global.router.as_deref())
        .ok_or_else(|| CliError::NoRouterSelected {
            available: available(cfg),
        })?;

    let profile = cfg
        .routers
        .get(&name)
        .ok_or_else(|| CliError::RouterNotFound {
            name: name.clone(),
            available: available(cfg),
        })?;

    resolve_password(profile, &name)?;
    Ok(name)
}

/// Link settings from the file, with `--deadline` applied to both deadlines.
pub fn link_config(cfg: &Config, global: &GlobalOpts) -> Result<LinkConfig, CliError> {
    let mut link = cfg.link_config();
    if let Some(secs) = global.deadline {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "--deadline".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        let deadline = Duration::from_secs(secs);
        link.timeouts = OperationTimeouts {
            mutate: deadline,
            status: deadline,
        };
    }
    Ok(link)
}
