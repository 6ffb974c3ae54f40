//! Live-session command handlers.

use routerlink_core::Gateway;

use crate::cli::{ActiveArgs, ActiveCommand, GlobalOpts};
use crate::commands::{AccountResult, report_operations};
use crate::error::CliError;

pub async fn handle(
    gateway: &Gateway,
    router: &str,
    args: ActiveArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ActiveCommand::Evict(a) => {
            let mut outcomes = Vec::with_capacity(a.accounts.len());
            for account in a.accounts {
                let result = gateway.evict_all(router, &account).await;
                outcomes.push(AccountResult { account, result });
            }
            report_operations(&outcomes, global)
        }
    }
}
