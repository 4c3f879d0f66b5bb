//! Collapses the two legs of an internal transfer into one display row.
//!
//! An account-to-account transfer lands in the feed twice: a debit "Transfer to X" on the
//! source account and a credit "Transfer from Y" on the destination. Pairing is greedy
//! nearest-forward: for each unused leg, the first later unused leg at the same time with the
//! same magnitude, the opposite sign and the complementary description pattern is taken. Same
//! timestamp pairs are expected to be unique within a day, so no global matching is needed.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::model::{EntryKind, Transaction, TransactionStatus};

/// Magnitudes closer than a tenth of a cent count as equal.
const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// One leg's role in a transfer, with the counterparty account name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TransferLeg {
    From(String),
    To(String),
}

/// The description shapes a transfer leg can take.
pub(crate) struct TransferPatterns {
    from: Regex,
    to: Regex,
}

impl TransferPatterns {
    pub(crate) fn new() -> Self {
        Self {
            from: Regex::new(r"(?i)^Transfer from\s+(.+)$").expect("static transfer pattern"),
            to: Regex::new(r"(?i)^Transfer to\s+(.+)$").expect("static transfer pattern"),
        }
    }

    fn leg(&self, description: &str) -> Option<TransferLeg> {
        if let Some(caps) = self.from.captures(description) {
            return Some(TransferLeg::From(caps[1].to_string()));
        }
        if let Some(caps) = self.to.captures(description) {
            return Some(TransferLeg::To(caps[1].to_string()));
        }
        None
    }

    /// True for a transfer leg or an already coalesced transfer row.
    pub(crate) fn is_transfer(&self, description: &str) -> bool {
        description == "Transfer" || self.leg(description).is_some()
    }
}

/// Coalesces transfer pairs in a bounded list, typically one day's worth. Unmatched rows pass
/// through unchanged; a merged row takes the position of the earlier leg. Running it again
/// over its own output changes nothing, since merged rows no longer match the leg patterns.
pub fn coalesce(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let patterns = TransferPatterns::new();
    let mut used = vec![false; transactions.len()];
    let mut result = Vec::with_capacity(transactions.len());

    for i in 0..transactions.len() {
        if used[i] {
            continue;
        }
        let a = &transactions[i];
        let a_leg = patterns.leg(&a.description);

        let mut paired = None;
        if let Some(a_leg) = &a_leg {
            for (j, b) in transactions.iter().enumerate().skip(i + 1) {
                if used[j] {
                    continue;
                }
                let same_time = a.time == b.time;
                let same_magnitude =
                    (a.amount.value() - b.amount.value()).abs() < AMOUNT_TOLERANCE;
                let opposite_sign = a.kind != b.kind;
                if !(same_time && same_magnitude && opposite_sign) {
                    continue;
                }
                match (a_leg, patterns.leg(&b.description)) {
                    (TransferLeg::From(_), Some(TransferLeg::To(name))) => {
                        paired = Some((j, TransferLeg::To(name)));
                        break;
                    }
                    (TransferLeg::To(_), Some(TransferLeg::From(name))) => {
                        paired = Some((j, TransferLeg::From(name)));
                        break;
                    }
                    _ => {}
                }
            }
        }

        match (a_leg, paired) {
            (Some(a_leg), Some((j, b_leg))) => {
                result.push(merge_pair(a, &transactions[j], &a_leg, &b_leg));
                used[i] = true;
                used[j] = true;
            }
            _ => result.push(a.clone()),
        }
    }
    result
}

/// Groups a feed by calendar day, newest day first, and coalesces transfer pairs within each
/// group. Feed order is preserved inside a day. Pairing is scoped to a day because leg
/// matching compares wall-clock times only.
pub fn daily_feed(transactions: Vec<Transaction>) -> Vec<(NaiveDate, Vec<Transaction>)> {
    let mut days: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for transaction in transactions {
        days.entry(transaction.date()).or_default().push(transaction);
    }
    days.into_iter()
        .rev()
        .map(|(date, rows)| (date, coalesce(rows)))
        .collect()
}

fn merge_pair(
    a: &Transaction,
    b: &Transaction,
    a_leg: &TransferLeg,
    b_leg: &TransferLeg,
) -> Transaction {
    let (from_name, to_name) = match (a_leg, b_leg) {
        (TransferLeg::From(from), TransferLeg::To(to)) => (from, to),
        (TransferLeg::To(to), TransferLeg::From(from)) => (from, to),
        // Pairing only ever matches complementary legs.
        (TransferLeg::From(from), TransferLeg::From(to)) => (from, to),
        (TransferLeg::To(from), TransferLeg::To(to)) => (from, to),
    };

    let mut tags = a.tags.clone();
    for tag in &b.tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    let internal = "internal".to_string();
    if !tags.contains(&internal) {
        tags.push(internal);
    }

    Transaction {
        id: format!("{}_x_{}", a.id, b.id),
        description: "Transfer".to_string(),
        raw_text: Some(format!("{from_name} → {to_name}")),
        message: None,
        amount: a.amount,
        kind: EntryKind::Debit,
        status: TransactionStatus::Settled,
        date: a.date,
        time: a.time.clone(),
        round_up: false,
        tags,
        logo_url: None,
        account_id: None,
        account_name: None,
    }
}
