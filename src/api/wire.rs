//! Serde types for the upstream JSON:API envelope, and their mapping into model types.
//!
//! The upstream wraps everything in `{ data, included, links }` with camelCase attribute
//! objects. Required fields are typed as required here so a malformed payload fails the
//! decode instead of producing half-empty rows.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::merchant::LogoResolver;
use crate::model::{Account, AccountKind, Amount, EntryKind, Ownership, Transaction, TransactionStatus};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: Vec<T>,
    #[serde(default)]
    pub(crate) included: Vec<IncludedResource>,
    #[serde(default)]
    pub(crate) links: PageLinks,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageLinks {
    #[serde(default)]
    pub(crate) next: Option<String>,
}

/// Error envelope: `{ errors: [ { status, title, detail } ] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub(crate) errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorObject {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) detail: Option<String>,
}

impl ErrorEnvelope {
    /// Best human-readable line from an error body.
    pub(crate) fn detail(&self) -> Option<String> {
        let first = self.errors.first()?;
        first.detail.clone().or_else(|| first.title.clone())
    }
}

/// Side-loaded resource from the `included` list. Only account resources are consumed, for
/// joining account display names onto transactions.
#[derive(Debug, Deserialize)]
pub(crate) struct IncludedResource {
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) attributes: serde_json::Value,
}

/// Display names of side-loaded accounts, keyed by account id.
pub(crate) fn included_account_names(included: &[IncludedResource]) -> HashMap<String, String> {
    included
        .iter()
        .filter(|resource| resource.kind == "accounts")
        .filter_map(|resource| {
            let name = resource.attributes.get("displayName")?.as_str()?;
            Some((resource.id.clone(), name.to_string()))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoneyObject {
    pub(crate) value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountResource {
    pub(crate) id: String,
    pub(crate) attributes: AccountAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountAttributes {
    pub(crate) display_name: String,
    pub(crate) balance: MoneyObject,
    pub(crate) account_type: AccountKind,
    #[serde(default)]
    pub(crate) ownership_type: Ownership,
}

impl AccountResource {
    pub(crate) fn into_account(self) -> Result<Account, ApiError> {
        let balance = parse_money(&self.attributes.balance.value)?;
        Ok(Account {
            id: self.id,
            display_name: self.attributes.display_name,
            balance,
            kind: self.attributes.account_type,
            ownership: self.attributes.ownership_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionResource {
    pub(crate) id: String,
    pub(crate) attributes: TransactionAttributes,
    #[serde(default)]
    pub(crate) relationships: Option<TransactionRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionAttributes {
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) raw_text: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) amount: MoneyObject,
    pub(crate) status: TransactionStatus,
    pub(crate) created_at: DateTime<FixedOffset>,
    /// Present (as an object) only when the transaction had a round-up.
    #[serde(default)]
    pub(crate) round_up: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransactionRelationships {
    #[serde(default)]
    pub(crate) account: Option<Relationship>,
    #[serde(default)]
    pub(crate) tags: Option<RelationshipList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Relationship {
    #[serde(default)]
    pub(crate) data: Option<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationshipList {
    #[serde(default)]
    pub(crate) data: Vec<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub(crate) id: String,
}

impl TransactionResource {
    /// Maps a raw record to the internal shape: signed amount split into magnitude and
    /// direction, timestamp split into date and short local time, relationships flattened,
    /// and a best-guess logo attached.
    pub(crate) fn into_transaction(
        self,
        logos: &LogoResolver,
        account_names: &HashMap<String, String>,
    ) -> Result<Transaction, ApiError> {
        let signed = parse_money(&self.attributes.amount.value)?;
        let kind = EntryKind::from_signed(signed.value());
        let date = self.attributes.created_at.date_naive();
        let time = self.attributes.created_at.format("%-I:%M%P").to_string();

        let (account_id, tags) = match self.relationships {
            Some(relationships) => {
                let account_id = relationships
                    .account
                    .and_then(|rel| rel.data)
                    .map(|data| data.id);
                let tags = relationships
                    .tags
                    .map(|rel| rel.data.into_iter().map(|tag| tag.id).collect())
                    .unwrap_or_default();
                (account_id, tags)
            }
            None => (None, Vec::new()),
        };
        let account_name = account_id
            .as_deref()
            .and_then(|id| account_names.get(id))
            .cloned();

        let logo_url = logos.resolve(
            &self.attributes.description,
            self.attributes.raw_text.as_deref().unwrap_or(""),
        );

        Ok(Transaction {
            id: self.id,
            description: self.attributes.description,
            raw_text: self.attributes.raw_text,
            message: self.attributes.message,
            amount: signed.abs(),
            kind,
            status: self.attributes.status,
            date,
            time,
            round_up: self.attributes.round_up.is_some(),
            tags,
            logo_url,
            account_id,
            account_name,
        })
    }
}

fn parse_money(value: &str) -> Result<Amount, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::InvalidResponse(format!("unparseable money value {value:?}")))
}
