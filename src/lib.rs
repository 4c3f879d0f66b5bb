mod api;
pub mod args;
mod coalesce;
pub mod commands;
mod config;
mod error;
mod merchant;
mod model;
mod secret;
mod stats;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::{ApiError, Error, Result};
pub use model::{Account, Amount, DashboardData, EntryKind, Transaction, TransactionStatus};
pub use stats::SpendingStats;
