use crate::args::{ClearOverrideArgs, SetOverrideArgs};
use crate::commands::Out;
use crate::error::Result;
use crate::store::LocalStore;
use crate::Config;
use std::collections::BTreeMap;

/// Handles `updash override set`. Saves a merchant-label to domain mapping that takes priority
/// over the curated tables on the next resolution.
pub async fn override_set(config: &Config, args: &SetOverrideArgs) -> Result<Out<()>> {
    let mut store = LocalStore::load(config.store_path()).await?;
    store.set_override(args.label(), args.domain());
    store.save(config.store_path()).await?;
    Ok(format!(
        "The logo for '{}' now resolves via '{}'",
        args.label(),
        args.domain()
    )
    .into())
}

/// Handles `updash override clear`.
pub async fn override_clear(config: &Config, args: &ClearOverrideArgs) -> Result<Out<()>> {
    let mut store = LocalStore::load(config.store_path()).await?;
    if store.clear_override(args.label()) {
        store.save(config.store_path()).await?;
        Ok(format!("The override for '{}' was removed", args.label()).into())
    } else {
        Ok(format!("There is no override for '{}'", args.label()).into())
    }
}

/// Handles `updash override list`.
pub async fn override_list(config: &Config) -> Result<Out<BTreeMap<String, String>>> {
    let store = LocalStore::load(config.store_path()).await?;
    let overrides = store.merchant_overrides().clone();
    let message = if overrides.is_empty() {
        "No merchant overrides are set".to_string()
    } else {
        let mut lines = vec!["Merchant overrides:".to_string()];
        for (label, domain) in &overrides {
            lines.push(format!("  {label} → {domain}"));
        }
        lines.join("\n")
    };
    Ok(Out::new(message, overrides))
}
