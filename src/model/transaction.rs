use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A normalized transaction row, ready for display.
///
/// Invariant: `amount` is always a non-negative magnitude; the sign is carried by `kind` alone.
/// Two rows representing the legs of an internal transfer may be collapsed into one synthetic
/// "Transfer" row by the coalescer, in which case `id` is `{debit_id}_x_{credit_id}` and the
/// tag list gains `"internal"`.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) description: String,
    /// Raw merchant text from the bank feed, when present.
    pub(crate) raw_text: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) amount: Amount,
    pub(crate) kind: EntryKind,
    pub(crate) status: TransactionStatus,
    pub(crate) date: NaiveDate,
    /// Wall-clock time in the account's own offset, e.g. "2:30pm".
    pub(crate) time: String,
    pub(crate) round_up: bool,
    pub(crate) tags: Vec<String>,
    pub(crate) logo_url: Option<String>,
    pub(crate) account_id: Option<String>,
    pub(crate) account_name: Option<String>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }

    /// The raw merchant text, or "N/A" when the feed did not provide one.
    pub fn raw_text_display(&self) -> &str {
        self.raw_text.as_deref().unwrap_or("N/A")
    }

    /// The signed display form, e.g. "+$100.00" for a credit and "$4.50" for a debit.
    pub fn display_amount(&self) -> String {
        format!("{}{}", self.kind, self.amount)
    }

    /// Two-letter initials used as the avatar when no merchant logo resolved.
    pub fn initials(&self) -> String {
        let mut words = self.description.split_whitespace();
        let first = words.next().unwrap_or_default();
        match words.next() {
            Some(second) => first
                .chars()
                .take(1)
                .chain(second.chars().take(1))
                .collect::<String>()
                .to_uppercase(),
            None => first.chars().take(2).collect::<String>().to_uppercase(),
        }
    }
}

/// Direction of a transaction: the serialized form is `"+"` for credits and the empty string
/// for debits, which display code prepends directly to the amount.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "+")]
    Credit,
    #[default]
    #[serde(rename = "")]
    Debit,
}

serde_plain::derive_display_from_serialize!(EntryKind);
serde_plain::derive_fromstr_from_deserialize!(EntryKind);

impl EntryKind {
    /// Splits a signed value into its direction. Zero counts as a debit.
    pub fn from_signed(value: rust_decimal::Decimal) -> Self {
        if value > rust_decimal::Decimal::ZERO {
            EntryKind::Credit
        } else {
            EntryKind::Debit
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, EntryKind::Credit)
    }
}

/// Settlement status. The live API reports in-flight transactions as `HELD`; those read as
/// pending here so demo and live data render the same way.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Settled,
    #[default]
    #[serde(alias = "HELD")]
    Pending,
}

serde_plain::derive_display_from_serialize!(TransactionStatus);
serde_plain::derive_fromstr_from_deserialize!(TransactionStatus);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn transaction(description: &str) -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            description: description.to_string(),
            amount: Amount::from_str("4.50").unwrap(),
            kind: EntryKind::Debit,
            ..Transaction::default()
        }
    }

    #[test]
    fn test_entry_kind_from_signed() {
        assert_eq!(
            EntryKind::from_signed(Decimal::from_str("100.00").unwrap()),
            EntryKind::Credit
        );
        assert_eq!(
            EntryKind::from_signed(Decimal::from_str("-4.50").unwrap()),
            EntryKind::Debit
        );
        assert_eq!(EntryKind::from_signed(Decimal::ZERO), EntryKind::Debit);
    }

    #[test]
    fn test_entry_kind_wire_format() {
        assert_eq!(serde_json::to_string(&EntryKind::Credit).unwrap(), "\"+\"");
        assert_eq!(serde_json::to_string(&EntryKind::Debit).unwrap(), "\"\"");
    }

    #[test]
    fn test_display_amount() {
        let mut t = transaction("Coffee");
        assert_eq!(t.display_amount(), "$4.50");
        t.kind = EntryKind::Credit;
        assert_eq!(t.display_amount(), "+$4.50");
    }

    #[test]
    fn test_status_reads_held_as_pending() {
        let status: TransactionStatus = serde_json::from_str("\"HELD\"").unwrap();
        assert_eq!(status, TransactionStatus::Pending);
        let status: TransactionStatus = serde_json::from_str("\"SETTLED\"").unwrap();
        assert_eq!(status, TransactionStatus::Settled);
    }

    #[test]
    fn test_initials() {
        assert_eq!(transaction("Blue Bottle Coffee").initials(), "BB");
        assert_eq!(transaction("Woolworths").initials(), "WO");
        assert_eq!(transaction("7-Eleven Redfern").initials(), "7E");
        assert_eq!(transaction("").initials(), "");
    }

    #[test]
    fn test_raw_text_display() {
        let mut t = transaction("Coffee");
        assert_eq!(t.raw_text_display(), "N/A");
        t.raw_text = Some("BLUE BOTTLE COFFEE SYD".to_string());
        assert_eq!(t.raw_text_display(), "BLUE BOTTLE COFFEE SYD");
    }
}
