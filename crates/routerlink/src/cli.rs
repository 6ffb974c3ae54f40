//! Clap derive structures for the `routerlink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// routerlink -- PPP subscriber control for RouterOS routers
#[derive(Debug, Parser)]
#[command(
    name = "routerlink",
    version,
    about = "Suspend, restore, and inspect PPP subscribers on RouterOS routers",
    long_about = "Talks to MikroTik routers over the RouterOS API (port 8728).\n\n\
        Each operation opens its own session, runs under a hard deadline,\n\
        and closes the session before returning.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router to operate on (defaults to `default_router`)
    #[arg(long, short = 'r', env = "ROUTERLINK_ROUTER", global = true)]
    pub router: Option<String>,

    /// Path to the config file
    #[arg(long, env = "ROUTERLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROUTERLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Override the per-operation deadline in seconds
    #[arg(long, env = "ROUTERLINK_DEADLINE", global = true)]
    pub deadline: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one line per account (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enable, disable, or inspect PPP secrets
    #[command(alias = "s")]
    Secret(SecretArgs),

    /// Manage live PPP sessions
    #[command(alias = "a")]
    Active(ActiveArgs),

    /// Inspect configured routers
    Routers(RoutersArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// One or more PPP account names.
#[derive(Debug, Args)]
pub struct AccountsArg {
    /// PPP account names, processed in order
    #[arg(required = true, num_args = 1..)]
    pub accounts: Vec<String>,
}

// ── Secret ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SecretArgs {
    #[command(subcommand)]
    pub command: SecretCommand,
}

#[derive(Debug, Subcommand)]
pub enum SecretCommand {
    /// Disable accounts and evict their live sessions
    #[command(alias = "suspend")]
    Disable(AccountsArg),

    /// Re-enable accounts
    #[command(alias = "restore")]
    Enable(AccountsArg),

    /// Show whether accounts exist and are disabled
    #[command(alias = "show")]
    Status(AccountsArg),
}

// ── Active ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActiveArgs {
    #[command(subcommand)]
    pub command: ActiveCommand,
}

#[derive(Debug, Subcommand)]
pub enum ActiveCommand {
    /// Force-close every live session of the given accounts
    #[command(alias = "kick")]
    Evict(AccountsArg),
}

// ── Routers ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RoutersArgs {
    #[command(subcommand)]
    pub command: RoutersCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutersCommand {
    /// List configured routers
    #[command(alias = "ls")]
    List,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the resolved configuration (passwords redacted)
    Show,

    /// Store a router password in the system keyring
    SetPassword {
        /// Router name from the config file
        router: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
