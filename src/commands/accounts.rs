use crate::args::AccountsArgs;
use crate::commands::{api_client, Out};
use crate::error::Result;
use crate::model::Account;
use crate::store::LocalStore;
use crate::Config;
use anyhow::Context;
use rust_decimal::Decimal;

/// Handles the `updash accounts` command. Lists every account with its kind, ownership and
/// balance, plus saver-goal progress for accounts that have a goal saved.
pub async fn accounts(config: &Config, args: &AccountsArgs) -> Result<Out<Vec<Account>>> {
    let client = api_client(config, args.credentials()).await?;
    if args.refresh() {
        client.clear_cache();
    }
    let accounts = client
        .fetch_accounts()
        .await
        .context("Unable to fetch accounts from the Up API")?;
    let store = LocalStore::load(config.store_path()).await?;
    let message = render_accounts(&accounts, &store);
    Ok(Out::new(message, accounts))
}

/// Formats the account list. Widths are padded on the rendered strings because the model types
/// format themselves without honoring alignment flags.
pub(crate) fn render_accounts(accounts: &[Account], store: &LocalStore) -> String {
    let mut lines = vec!["Accounts:".to_string()];
    for account in accounts {
        let kind = if account.is_maybe_buy() {
            format!("{} (maybe buy)", account.kind())
        } else {
            account.kind().to_string()
        };
        let mut line = format!(
            "  {:<28} {:<18} {:<11} {:>14}",
            account.display_name(),
            kind,
            account.ownership().to_string(),
            account.balance().to_string(),
        );
        if let Some(target) = store.goal_for(account.id()) {
            if target.is_positive() {
                let percent =
                    (account.balance().value() * Decimal::from(100) / target.value()).round();
                line.push_str(&format!("  ({percent}% of {target})"));
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{demo_credentials, TestEnv};

    fn demo_args() -> AccountsArgs {
        AccountsArgs::new(demo_credentials(), false)
    }

    #[tokio::test]
    async fn test_accounts_lists_demo_accounts() {
        let env = TestEnv::new().await;
        let out = accounts(env.config(), &demo_args()).await.unwrap();
        let message = out.message();
        assert!(message.starts_with("Accounts:"));
        assert!(message.contains("Spending"));
        assert!(message.contains("TRANSACTIONAL"));
        assert!(message.contains("$8,250.00"));
        assert!(message.contains("(maybe buy)"));
        assert_eq!(out.structure().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_accounts_shows_goal_progress() {
        let env = TestEnv::new().await;
        let mut store = LocalStore::load(env.config().store_path()).await.unwrap();
        store.set_goal("demo-acc-savings", "$20,000.00".parse().unwrap());
        store.save(env.config().store_path()).await.unwrap();

        let out = accounts(env.config(), &demo_args()).await.unwrap();
        assert!(out.message().contains("(41% of $20,000.00)"));
    }
}
