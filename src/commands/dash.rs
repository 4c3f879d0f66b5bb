use crate::args::DashArgs;
use crate::coalesce::daily_feed;
use crate::commands::accounts::render_accounts;
use crate::commands::stats::render_stats;
use crate::commands::transactions::render_feed;
use crate::commands::{api_client, Out};
use crate::error::Result;
use crate::model::DashboardData;
use crate::stats::spending_stats;
use crate::store::LocalStore;
use crate::Config;
use anyhow::Context;

/// Handles the `updash dash` command. Fetches accounts and transactions concurrently and
/// renders the full dashboard: account balances, the coalesced feed and the stats block.
/// Both fetches must succeed; a dashboard with half its data is worse than an error.
pub async fn dash(config: &Config, args: &DashArgs) -> Result<Out<DashboardData>> {
    let client = api_client(config, args.credentials()).await?;
    if args.refresh() {
        client.clear_cache();
    }
    let count = args.count().unwrap_or_else(|| config.transaction_count());
    let fetched = client.fetch_all(count).await;
    let accounts = fetched
        .accounts
        .context("Unable to fetch accounts from the Up API")?;
    let transactions = fetched
        .transactions
        .context("Unable to fetch transactions from the Up API")?;

    let store = LocalStore::load(config.store_path()).await?;
    let stats = spending_stats(&transactions);
    let window = transactions.len();
    let feed = daily_feed(transactions);

    let message = format!(
        "{}\n\n{}\n\n{}",
        render_accounts(&accounts, &store),
        render_feed(&feed, store.debug_logos()),
        render_stats(window, &stats),
    );
    let rows = feed.into_iter().flat_map(|(_, rows)| rows).collect();
    Ok(Out::new(message, DashboardData::new(accounts, rows)))
}
