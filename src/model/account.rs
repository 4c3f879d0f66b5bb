use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A single Up account as shown on the dashboard.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Account {
    pub(crate) id: String,
    pub(crate) display_name: String,
    pub(crate) balance: Amount,
    pub(crate) kind: AccountKind,
    pub(crate) ownership: Ownership,
}

impl Account {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// True for savers set aside for tentative purchases, flagged by the account's name,
    /// e.g. "Maybe Buy: new bike".
    pub fn is_maybe_buy(&self) -> bool {
        if self.kind != AccountKind::Saver {
            return false;
        }
        let name = self.display_name.to_lowercase();
        name.contains("maybe buy") || name.contains("maybuy")
    }
}

/// Up account types, as reported by the accounts endpoint.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    #[default]
    Transactional,
    Saver,
    HomeLoan,
}

serde_plain::derive_display_from_serialize!(AccountKind);
serde_plain::derive_fromstr_from_deserialize!(AccountKind);

/// Whether an account is held individually or as a 2Up joint account.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ownership {
    #[default]
    Individual,
    Joint,
}

serde_plain::derive_display_from_serialize!(Ownership);
serde_plain::derive_fromstr_from_deserialize!(Ownership);
