//! Types that represent the core data model, such as `Transaction` and `Account`.
mod account;
mod amount;
mod transaction;

pub use account::{Account, AccountKind, Ownership};
pub use amount::{Amount, AmountError};
use serde::{Deserialize, Serialize};
pub use transaction::{EntryKind, Transaction, TransactionStatus};

/// Everything one dashboard render needs: the account list and the normalized transaction
/// window, fetched together.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardData {
    pub(crate) accounts: Vec<Account>,
    pub(crate) transactions: Vec<Transaction>,
}

impl DashboardData {
    pub fn new(accounts: Vec<Account>, transactions: Vec<Transaction>) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
