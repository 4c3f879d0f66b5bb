use crate::args::{ClearGoalArgs, SetGoalArgs};
use crate::commands::Out;
use crate::error::Result;
use crate::model::Amount;
use crate::store::LocalStore;
use crate::Config;
use std::collections::BTreeMap;

/// Handles `updash goal set`. Saves a savings target for an account, shown as progress in the
/// account listing.
pub async fn goal_set(config: &Config, args: &SetGoalArgs) -> Result<Out<()>> {
    let mut store = LocalStore::load(config.store_path()).await?;
    store.set_goal(args.account(), args.target());
    store.save(config.store_path()).await?;
    Ok(format!("The goal for '{}' is now {}", args.account(), args.target()).into())
}

/// Handles `updash goal clear`.
pub async fn goal_clear(config: &Config, args: &ClearGoalArgs) -> Result<Out<()>> {
    let mut store = LocalStore::load(config.store_path()).await?;
    if store.clear_goal(args.account()) {
        store.save(config.store_path()).await?;
        Ok(format!("The goal for '{}' was removed", args.account()).into())
    } else {
        Ok(format!("There is no goal for '{}'", args.account()).into())
    }
}

/// Handles `updash goal list`.
pub async fn goal_list(config: &Config) -> Result<Out<BTreeMap<String, Amount>>> {
    let store = LocalStore::load(config.store_path()).await?;
    let goals = store.saver_goals().clone();
    let message = if goals.is_empty() {
        "No saver goals are set".to_string()
    } else {
        let mut lines = vec!["Saver goals:".to_string()];
        for (account, target) in &goals {
            lines.push(format!("  {account} → {target}"));
        }
        lines.join("\n")
    };
    Ok(Out::new(message, goals))
}
