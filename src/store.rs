//! The local settings store.
//!
//! `$UPDASH_HOME/store.json` holds the user-editable state that is not a secret: the merchant
//! logo override table, per-account saver goals and the logo debug toggle. A missing file
//! reads as defaults so a fresh home directory needs no setup step.

use crate::model::Amount;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Represents the serialization and deserialization format of `store.json`.
///
/// Example:
/// ```json
/// {
///   "merchant_overrides": {
///     "corner store 4000": "cornerstore.example"
///   },
///   "saver_goals": {
///     "acc-2": "$5,000.00"
///   },
///   "debug_logos": false
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct LocalStore {
    /// Merchant label to domain (or logo URL), consulted before any built-in table.
    #[serde(default)]
    merchant_overrides: BTreeMap<String, String>,

    /// Savings target per account id.
    #[serde(default)]
    saver_goals: BTreeMap<String, Amount>,

    /// When set, commands print which logo source answered for each merchant.
    #[serde(default)]
    debug_logos: bool,
}

impl LocalStore {
    /// Loads the store from `path`, or returns defaults when the file does not exist yet.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read store file at {}", path.display()))?;
        let store: LocalStore = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store file at {}", path.display()))?;
        Ok(store)
    }

    /// Saves the store to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize the store")?;
        utils::write(p, data)
            .await
            .context("Unable to write store file")
    }

    pub fn merchant_overrides(&self) -> &BTreeMap<String, String> {
        &self.merchant_overrides
    }

    pub fn set_override(&mut self, label: impl Into<String>, domain: impl Into<String>) {
        self.merchant_overrides.insert(label.into(), domain.into());
    }

    /// Removes an override. Returns false when there was nothing under that label.
    pub fn clear_override(&mut self, label: &str) -> bool {
        self.merchant_overrides.remove(label).is_some()
    }

    pub fn saver_goals(&self) -> &BTreeMap<String, Amount> {
        &self.saver_goals
    }

    pub fn goal_for(&self, account_id: &str) -> Option<Amount> {
        self.saver_goals.get(account_id).copied()
    }

    pub fn set_goal(&mut self, account_id: impl Into<String>, target: Amount) {
        self.saver_goals.insert(account_id.into(), target);
    }

    /// Removes a saver goal. Returns false when the account had no goal.
    pub fn clear_goal(&mut self, account_id: &str) -> bool {
        self.saver_goals.remove(account_id).is_some()
    }

    pub fn debug_logos(&self) -> bool {
        self.debug_logos
    }

    pub fn set_debug_logos(&mut self, value: bool) {
        self.debug_logos = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::load(dir.path().join("store.json")).await.unwrap();
        assert!(store.merchant_overrides().is_empty());
        assert!(store.saver_goals().is_empty());
        assert!(!store.debug_logos());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = LocalStore::default();
        store.set_override("corner store 4000", "cornerstore.example");
        store.set_goal("acc-2", Amount::from_str("5000").unwrap());
        store.set_debug_logos(true);
        store.save(&path).await.unwrap();

        let loaded = LocalStore::load(&path).await.unwrap();
        assert_eq!(store, loaded);
        assert_eq!(
            loaded.goal_for("acc-2"),
            Some(Amount::from_str("5000").unwrap())
        );
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let json = r#"{ "merchant_overrides": { "woolies": "custom.example" } }"#;
        let mut file = tokio::fs::File::create(&path).await.unwrap();
        file.write_all(json.as_bytes()).await.unwrap();

        let store = LocalStore::load(&path).await.unwrap();
        assert_eq!(
            store.merchant_overrides().get("woolies").map(String::as_str),
            Some("custom.example")
        );
        assert!(store.saver_goals().is_empty());
        assert!(!store.debug_logos());
    }

    #[test]
    fn test_clear_reports_presence() {
        let mut store = LocalStore::default();
        store.set_override("woolies", "custom.example");
        assert!(store.clear_override("woolies"));
        assert!(!store.clear_override("woolies"));
        assert!(!store.clear_goal("acc-9"));
    }
}
