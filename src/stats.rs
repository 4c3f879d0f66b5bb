//! Spending statistics over a transaction window.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::coalesce::TransferPatterns;
use crate::model::{Amount, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendingStats {
    pub(crate) total_spent: Amount,
    pub(crate) days_spanned: i64,
    pub(crate) average_daily: Amount,
    pub(crate) unique_merchants: usize,
}

impl SpendingStats {
    pub fn total_spent(&self) -> Amount {
        self.total_spent
    }

    pub fn days_spanned(&self) -> i64 {
        self.days_spanned
    }

    pub fn average_daily(&self) -> Amount {
        self.average_daily
    }

    pub fn unique_merchants(&self) -> usize {
        self.unique_merchants
    }
}

/// Computes stats for a window of transactions, excluding internal transfers. Spend is the
/// sum of debit magnitudes; the day span is inclusive of both endpoints so a single-day
/// window still averages over one day.
pub fn spending_stats(transactions: &[Transaction]) -> SpendingStats {
    if transactions.is_empty() {
        return SpendingStats::default();
    }
    let patterns = TransferPatterns::new();
    let included: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| !patterns.is_transfer(&t.description))
        .collect();

    let total_spent: Decimal = included
        .iter()
        .filter(|t| !t.kind.is_credit())
        .map(|t| t.amount.value())
        .sum();

    let oldest = transactions.iter().map(|t| t.date).min();
    let newest = transactions.iter().map(|t| t.date).max();
    let days_spanned = match (oldest, newest) {
        (Some(oldest), Some(newest)) => (newest - oldest).num_days() + 1,
        _ => 0,
    };

    let average_daily = if days_spanned > 0 {
        total_spent / Decimal::from(days_spanned)
    } else {
        Decimal::ZERO
    };

    let merchants: BTreeSet<&str> = included
        .iter()
        .map(|t| t.raw_text.as_deref().unwrap_or(&t.description))
        .collect();

    SpendingStats {
        total_spent: Amount::from(total_spent),
        days_spanned,
        average_daily: Amount::from(average_daily),
        unique_merchants: merchants.len(),
    }
}
