//! PPP secret command handlers.

use tabled::Tabled;

use routerlink_core::{Gateway, StatusReport};

use crate::cli::{GlobalOpts, SecretArgs, SecretCommand};
use crate::commands::{AccountResult, report_operations, summarize};
use crate::error::CliError;
use crate::output::{self, Tone};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "ACCOUNT")]
    account: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "PROFILE")]
    profile: String,
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
}

fn state_word(report: &StatusReport) -> (&'static str, Tone) {
    match (report.success, report.found, report.disabled) {
        (false, _, _) => ("error", Tone::Bad),
        (true, false, _) => ("missing", Tone::Warn),
        (true, true, Some(true)) => ("disabled", Tone::Bad),
        (true, true, _) => ("enabled", Tone::Good),
    }
}

pub async fn handle(
    gateway: &Gateway,
    router: &str,
    args: SecretArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SecretCommand::Disable(a) => {
            let mut outcomes = Vec::with_capacity(a.accounts.len());
            for account in a.accounts {
                let result = gateway.disable(router, &account).await;
                outcomes.push(AccountResult { account, result });
            }
            report_operations(&outcomes, global)
        }

        SecretCommand::Enable(a) => {
            let mut outcomes = Vec::with_capacity(a.accounts.len());
            for account in a.accounts {
                let result = gateway.enable(router, &account).await;
                outcomes.push(AccountResult { account, result });
            }
            report_operations(&outcomes, global)
        }

        SecretCommand::Status(a) => {
            let mut reports = Vec::with_capacity(a.accounts.len());
            for account in a.accounts {
                let result = gateway.check_status(router, &account).await;
                reports.push(AccountResult { account, result });
            }

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &reports,
                |r| {
                    let (word, tone) = state_word(&r.result);
                    StatusRow {
                        account: r.account.clone(),
                        state: output::status_cell(word, tone, color),
                        profile: r.result.profile.clone().unwrap_or_default(),
                        service: r.result.service.clone().unwrap_or_default(),
                        message: r.result.message.clone(),
                    }
                },
                |r| format!("{}\t{}", r.account, state_word(&r.result).0),
            )?;
            output::print_output(&out, global.quiet);

            summarize(reports.iter().map(|r| (r.result.success, r.result.error)))
        }
    }
}
