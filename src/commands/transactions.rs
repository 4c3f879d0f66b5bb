use crate::api::UpClient;
use crate::args::TransactionsArgs;
use crate::coalesce::daily_feed;
use crate::commands::{api_client, Out};
use crate::error::Result;
use crate::merchant::HttpProbe;
use crate::model::{Transaction, TransactionStatus};
use crate::store::LocalStore;
use crate::Config;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use std::time::Duration;

/// Timeout for each logo probe request when `--verify-logos` is given.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handles the `updash transactions` command. Fetches the requested window, applies account and
/// month filters, optionally verifies logo URLs, then renders a day-grouped, transfer-coalesced
/// feed.
pub async fn transactions(
    config: &Config,
    args: &TransactionsArgs,
) -> Result<Out<Vec<Transaction>>> {
    let client = api_client(config, args.credentials()).await?;
    if args.refresh() {
        client.clear_cache();
    }
    let count = args.count().unwrap_or_else(|| config.transaction_count());
    let mut transactions = client
        .fetch_transactions(count)
        .await
        .context("Unable to fetch transactions from the Up API")?;
    if let Some(account) = args.account() {
        transactions = filter_account(transactions, account);
    }
    if let Some(month) = args.month() {
        let month = parse_month(month)?;
        transactions
            .retain(|txn| txn.date().year() == month.year() && txn.date().month() == month.month());
    }
    if args.verify_logos() {
        verify_logos(&client, &mut transactions).await?;
    }
    let store = LocalStore::load(config.store_path()).await?;
    let feed = daily_feed(transactions);
    let message = render_feed(&feed, store.debug_logos());
    let rows = feed
        .into_iter()
        .flat_map(|(_, rows)| rows)
        .collect::<Vec<_>>();
    Ok(Out::new(message, rows))
}

/// Keeps transactions belonging to the given account, matched by exact id or by a
/// case-insensitive substring of the account's display name.
pub(crate) fn filter_account(transactions: Vec<Transaction>, account: &str) -> Vec<Transaction> {
    let needle = account.to_lowercase();
    transactions
        .into_iter()
        .filter(|txn| {
            txn.account_id.as_deref() == Some(account)
                || txn
                    .account_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Parses a `YYYY-MM` month argument.
pub(crate) fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .with_context(|| format!("Unable to parse the month '{month}', expected YYYY-MM"))
}

/// Formats a day-grouped feed, newest day first.
pub(crate) fn render_feed(feed: &[(NaiveDate, Vec<Transaction>)], debug_logos: bool) -> String {
    if feed.is_empty() {
        return "No transactions matched".to_string();
    }
    let mut lines = vec!["Transactions:".to_string()];
    for (date, rows) in feed {
        lines.push(String::new());
        lines.push(date.format("%A %-d %B %Y").to_string());
        for txn in rows {
            let mut line = format!(
                "  {:>7}  {:>12}  {} ({})",
                txn.time,
                txn.display_amount(),
                txn.description(),
                txn.raw_text_display(),
            );
            if txn.status() == TransactionStatus::Pending {
                line.push_str(" [pending]");
            }
            lines.push(line);
            if debug_logos {
                lines.push(format!(
                    "           logo: {}",
                    txn.logo_url().unwrap_or("none")
                ));
            }
        }
    }
    lines.join("\n")
}

/// Probes logo sources for every distinct resolved domain in the window and rewrites each
/// transaction's logo URL with the verified verdict.
async fn verify_logos(client: &UpClient, transactions: &mut [Transaction]) -> Result<()> {
    let probe = Arc::new(HttpProbe::new(PROBE_TIMEOUT)?);
    let inputs = transactions
        .iter()
        .map(|txn| {
            (
                txn.description().to_string(),
                txn.raw_text.clone().unwrap_or_default(),
            )
        })
        .collect::<Vec<_>>();
    let verdicts = client.logos().resolve_verified_batch(probe, &inputs).await;
    for txn in transactions.iter_mut() {
        let raw = txn.raw_text.clone().unwrap_or_default();
        if let Some(domain) = client.logos().domains().resolve(&txn.description, &raw) {
            txn.logo_url = verdicts.get(&domain).cloned().flatten();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{demo_credentials, TestEnv};

    fn demo_args() -> TransactionsArgs {
        TransactionsArgs::new(demo_credentials(), None, None, None, false, false)
    }

    #[tokio::test]
    async fn test_transactions_renders_coalesced_feed() {
        let env = TestEnv::new().await;
        let out = transactions(env.config(), &demo_args()).await.unwrap();

        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 9);
        let merged = rows
            .iter()
            .filter(|txn| txn.description() == "Transfer")
            .count();
        assert_eq!(merged, 2);
        assert_eq!(rows[0].date(), NaiveDate::from_ymd_opt(2025, 7, 18).unwrap());
        assert_eq!(
            rows.last().unwrap().date(),
            NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
        );

        let message = out.message();
        assert!(message.contains("Friday 18 July 2025"));
        assert!(message.contains("Monday 14 July 2025"));
        assert!(message.contains("Spending → Savings"));
        assert!(message.contains("[pending]"));
    }

    #[tokio::test]
    async fn test_transactions_month_filter() {
        let env = TestEnv::new().await;
        let args = TransactionsArgs::new(
            demo_credentials(),
            None,
            None,
            Some("2025-06".to_string()),
            false,
            false,
        );
        let out = transactions(env.config(), &args).await.unwrap();
        assert_eq!(out.message(), "No transactions matched");
        assert!(out.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transactions_account_filter_keeps_legs_unmerged() {
        let env = TestEnv::new().await;
        let args = TransactionsArgs::new(
            demo_credentials(),
            None,
            Some("demo-acc-spending".to_string()),
            None,
            false,
            false,
        );
        let out = transactions(env.config(), &args).await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|txn| txn.description() != "Transfer"));
        assert!(rows
            .iter()
            .any(|txn| txn.description() == "Transfer to Savings"));
    }

    #[tokio::test]
    async fn test_transactions_rejects_bad_month() {
        let env = TestEnv::new().await;
        let args = TransactionsArgs::new(
            demo_credentials(),
            None,
            None,
            Some("July".to_string()),
            false,
            false,
        );
        let err = transactions(env.config(), &args).await.unwrap_err();
        assert!(err.to_string().contains("expected YYYY-MM"));
    }

    #[test]
    fn test_filter_account_matches_id_and_name() {
        fn row(id: &str, account_id: &str, account_name: &str) -> Transaction {
            Transaction {
                id: id.to_string(),
                description: "Woolworths".to_string(),
                raw_text: None,
                message: None,
                amount: crate::model::Amount::default(),
                kind: crate::model::EntryKind::Debit,
                status: TransactionStatus::Settled,
                date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
                time: "9:00am".to_string(),
                round_up: false,
                tags: Vec::new(),
                logo_url: None,
                account_id: Some(account_id.to_string()),
                account_name: Some(account_name.to_string()),
            }
        }
        let rows = vec![
            row("t1", "acc-1", "Spending"),
            row("t2", "acc-2", "Savings"),
            row("t3", "acc-3", "🛍️ Maybe Buy"),
        ];

        let by_id = filter_account(rows.clone(), "acc-2");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id(), "t2");

        let by_name = filter_account(rows.clone(), "savings");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id(), "t2");

        assert!(filter_account(rows, "home loan").is_empty());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2025-07").unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
        assert!(parse_month("2025").is_err());
        assert!(parse_month("2025-13").is_err());
    }
}
