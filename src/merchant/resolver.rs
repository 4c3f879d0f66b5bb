//! Resolves a transaction's description and raw bank text to a merchant domain.
//!
//! Resolution is deterministic and runs in strict priority order: user overrides first, then
//! the curated exact table, then the fuzzy patterns, and finally a literal domain written out
//! in the text itself. The first layer that produces a domain wins.

use std::collections::BTreeMap;

use url::Url;

use crate::merchant::directory::MerchantDirectory;

/// Lowercases, turns underscores and asterisks into spaces, collapses whitespace runs and
/// trims. Card rails love separators like "SQ *COFFEE_BAR"; this folds them all down to
/// "sq coffee bar".
pub(crate) fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .replace(['_', '*'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct DomainResolver {
    directory: MerchantDirectory,
    overrides: BTreeMap<String, String>,
}

impl DomainResolver {
    /// Override keys are matched against normalized text, so they are normalized here too.
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (normalize(&key), value))
            .collect();
        Self {
            directory: MerchantDirectory::new(),
            overrides,
        }
    }

    /// The domain for a transaction, or `None` when no layer recognizes it.
    pub fn resolve(&self, description: &str, raw_text: &str) -> Option<String> {
        let desc = normalize(description);
        let raw = normalize(raw_text);
        let combined = normalize(&format!("{desc} {raw}"));

        if let Some(value) = self
            .overrides
            .get(&combined)
            .or_else(|| self.overrides.get(&raw))
            .or_else(|| self.overrides.get(&desc))
        {
            return Some(override_domain(value));
        }
        if let Some(domain) = self.directory.exact_match(&combined) {
            return Some(domain.to_string());
        }
        if let Some(domain) = self.directory.fuzzy_match(&combined) {
            return Some(domain.to_string());
        }
        self.directory.extract_literal(&combined)
    }
}

/// Override values may be a bare domain or a full URL; a URL is reduced to its host.
fn override_domain(value: &str) -> String {
    Url::parse(value)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| value.to_string())
}
