use crate::args::StatsArgs;
use crate::commands::{api_client, transactions::filter_account, Out};
use crate::error::Result;
use crate::stats::{spending_stats, SpendingStats};
use crate::Config;
use anyhow::Context;

/// Handles the `updash stats` command. Computes spending statistics over the fetched window
/// before any coalescing, so both legs of internal transfers are visible for exclusion.
pub async fn stats(config: &Config, args: &StatsArgs) -> Result<Out<SpendingStats>> {
    let client = api_client(config, args.credentials()).await?;
    let count = args.count().unwrap_or_else(|| config.transaction_count());
    let mut transactions = client
        .fetch_transactions(count)
        .await
        .context("Unable to fetch transactions from the Up API")?;
    if let Some(account) = args.account() {
        transactions = filter_account(transactions, account);
    }
    let stats = spending_stats(&transactions);
    let message = render_stats(transactions.len(), &stats);
    Ok(Out::new(message, stats))
}

/// Formats the stats block for a window of the given size.
pub(crate) fn render_stats(window: usize, stats: &SpendingStats) -> String {
    format!(
        "Spending over the last {window} transactions:\n  \
         Total spent:      {}\n  \
         Days covered:     {}\n  \
         Average per day:  {}\n  \
         Unique merchants: {}",
        stats.total_spent(),
        stats.days_spanned(),
        stats.average_daily(),
        stats.unique_merchants(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{demo_credentials, TestEnv};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_stats_over_the_demo_window() {
        let env = TestEnv::new().await;
        let args = StatsArgs::new(demo_credentials(), None, None);
        let out = stats(env.config(), &args).await.unwrap();

        let stats = out.structure().unwrap();
        assert_eq!(stats.total_spent().value(), Decimal::new(17814, 2));
        assert_eq!(stats.days_spanned(), 5);
        assert_eq!(stats.average_daily().value(), Decimal::new(35628, 3));
        assert_eq!(stats.unique_merchants(), 7);

        let message = out.message();
        assert!(message.contains("Spending over the last 11 transactions:"));
        assert!(message.contains("$178.14"));
        assert!(message.contains("$35.63"));
    }

    #[tokio::test]
    async fn test_stats_with_account_filter() {
        let env = TestEnv::new().await;
        let args = StatsArgs::new(demo_credentials(), None, Some("Savings".to_string()));
        let out = stats(env.config(), &args).await.unwrap();

        // The savings account only received a transfer leg, which is excluded from spend.
        let stats = out.structure().unwrap();
        assert!(stats.total_spent().is_zero());
        assert_eq!(stats.days_spanned(), 1);
        assert_eq!(stats.unique_merchants(), 0);
    }
}
