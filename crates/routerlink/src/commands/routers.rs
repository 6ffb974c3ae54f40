//! Router listing.

use serde::Serialize;
use tabled::Tabled;

use routerlink_config::{Config, RouterProfile};

use crate::cli::{GlobalOpts, RoutersArgs, RoutersCommand};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct RouterSummary {
    name: String,
    host: String,
    port: u16,
    username: String,
    password_source: String,
    default: bool,
}

#[derive(Tabled)]
struct RouterRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "HOST")]
    host: String,
    #[tabled(rename = "PORT")]
    port: u16,
    #[tabled(rename = "USER")]
    username: String,
    #[tabled(rename = "PASSWORD")]
    password_source: String,
    #[tabled(rename = "DEFAULT")]
    default: String,
}

/// Where the password would come from, without reading it.
fn password_source(profile: &RouterProfile) -> String {
    match (&profile.password_env, &profile.password) {
        (Some(var), _) => format!("env:{var}"),
        (None, Some(_)) => "plaintext".into(),
        (None, None) => "keyring".into(),
    }
}

fn summaries(cfg: &Config) -> Vec<RouterSummary> {
    cfg.routers
        .iter()
        .map(|(name, profile)| RouterSummary {
            name: name.clone(),
            host: profile.host.clone(),
            port: profile.port.unwrap_or(cfg.defaults.port),
            username: profile.username.clone(),
            password_source: password_source(profile),
            default: cfg.default_router.as_deref() == Some(name.as_str()),
        })
        .collect()
}

pub fn handle(cfg: &Config, args: RoutersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RoutersCommand::List => {
            let routers = summaries(cfg);
            let out = output::render_list(
                &global.output,
                &routers,
                |r| RouterRow {
                    name: r.name.clone(),
                    host: r.host.clone(),
                    port: r.port,
                    username: r.username.clone(),
                    password_source: r.password_source.clone(),
                    default: if r.default { "*".into() } else { String::new() },
                },
                |r| r.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_fill_default_port() {
        let mut cfg = Config {
            default_router: Some("b".into()),
            ..Config::default()
        };
        cfg.routers.insert(
            "a".into(),
            RouterProfile {
                host: "10.0.0.1".into(),
                username: "api".into(),
                password_env: Some("A_PW".into()),
                ..RouterProfile::default()
            },
        );
        cfg.routers.insert(
            "b".into(),
            RouterProfile {
                host: "10.0.0.2".into(),
                port: Some(18728),
                username: "api".into(),
                ..RouterProfile::default()
            },
        );

        let list = summaries(&cfg);

        assert_eq!(list[0].port, 8728);
        assert_eq!(list[0].password_source, "env:A_PW");
        assert!(!list[0].default);
        assert_eq!(list[1].port, 18728);
        assert_eq!(list[1].password_source, "keyring");
        assert!(list[1].default);
    }
}
