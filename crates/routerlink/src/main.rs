mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use routerlink_config::ConfigRegistry;
use routerlink_core::Gateway;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// How long to let operations abandoned at their deadline finish and
/// release their sessions before the process exits.
const DRAIN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_json);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a router
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "routerlink", &mut std::io::stdout());
            Ok(())
        }

        Command::Routers(args) => {
            let cfg = config::load(&cli.global)?;
            commands::routers::handle(&cfg, args, &cli.global)
        }

        // Everything else talks to a router
        cmd => {
            let cfg = config::load(&cli.global)?;
            let router = config::select_router(&cfg, &cli.global)?;
            let link = config::link_config(&cfg, &cli.global)?;
            let gateway = Gateway::new(Arc::new(ConfigRegistry::new(cfg)), link);

            tracing::debug!(command = ?cmd, %router, "dispatching command");
            let result = commands::dispatch(cmd, &gateway, &router, &cli.global).await;
            gateway.drain(DRAIN_GRACE).await;
            result
        }
    }
}
