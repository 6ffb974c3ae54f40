//! Config subcommand handlers.

use secrecy::SecretString;

use routerlink_config::{Config, store_password};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of `cfg` with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.routers.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "password".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, |c| {
                Ok(toml::to_string_pretty(c)?)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { router } => {
            let cfg = config::load(global)?;
            if !cfg.routers.contains_key(&router) {
                return Err(CliError::RouterNotFound {
                    name: router,
                    available: cfg.routers.keys().cloned().collect::<Vec<_>>().join(", "),
                });
            }

            let password = rpassword::prompt_password(format!("Password for '{router}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            store_password(&router, &SecretString::from(password))?;
            if !global.quiet {
                eprintln!("Stored password for '{router}' in the system keyring");
            }
            Ok(())
        }
    }
}
