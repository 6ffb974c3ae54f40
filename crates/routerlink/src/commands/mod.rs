//! Command dispatch: bridges CLI args -> gateway operations -> output.

pub mod active;
pub mod config_cmd;
pub mod routers;
pub mod secret;

use serde::Serialize;
use tabled::Tabled;

use routerlink_core::{ErrorKind, Gateway, OperationResult};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    gateway: &Gateway,
    router: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Secret(args) => secret::handle(gateway, router, args, global).await,
        Command::Active(args) => active::handle(gateway, router, args, global).await,
        // Handled before a gateway is built
        Command::Routers(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

// ── Shared per-account results ───────────────────────────────────────

/// One account's outcome, flattened for structured output.
#[derive(Debug, Serialize)]
pub struct AccountResult<T> {
    pub account: String,
    #[serde(flatten)]
    pub result: T,
}

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "ACCOUNT")]
    account: String,
    #[tabled(rename = "RESULT")]
    result: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
}

/// Print operation results and fail if any of them failed.
pub fn report_operations(
    outcomes: &[AccountResult<OperationResult>],
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    let out = output::render_list(
        &global.output,
        outcomes,
        |o| {
            let (word, tone) = match (o.result.success, o.result.error) {
                (false, _) => ("failed", Tone::Bad),
                (true, Some(_)) => ("partial", Tone::Warn),
                (true, None) => ("ok", Tone::Good),
            };
            OperationRow {
                account: o.account.clone(),
                result: output::status_cell(word, tone, color),
                message: o.result.message.clone(),
            }
        },
        |o| format!("{}\t{}", o.account, o.result.message),
    )?;
    output::print_output(&out, global.quiet);

    summarize(outcomes.iter().map(|o| (o.result.success, o.result.error)))
}

/// `Err` describing the first failure, if any.
pub fn summarize(
    outcomes: impl Iterator<Item = (bool, Option<ErrorKind>)>,
) -> Result<(), CliError> {
    let mut total = 0;
    let mut failed = 0;
    let mut first = None;

    for (success, error) in outcomes {
        total += 1;
        if !success {
            failed += 1;
            if first.is_none() {
                first = Some(error.unwrap_or(ErrorKind::Internal));
            }
        }
    }

    match first {
        Some(kind) => Err(CliError::OperationsFailed {
            failed,
            total,
            kind,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn all_successful() {
        let outcomes = [(true, None), (true, Some(ErrorKind::PartialCleanupFailure))];
        assert!(summarize(outcomes.into_iter()).is_ok());
    }

    #[test]
    fn first_failure_decides_kind() {
        let outcomes = [
            (true, None),
            (false, Some(ErrorKind::Timeout)),
            (false, Some(ErrorKind::NotFound)),
        ];

        let err = summarize(outcomes.into_iter()).unwrap_err();

        assert!(matches!(
            err,
            CliError::OperationsFailed {
                failed: 2,
                total: 3,
                kind: ErrorKind::Timeout
            }
        ));
    }
}
