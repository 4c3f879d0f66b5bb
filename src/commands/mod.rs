//! Command handlers for the updash CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod accounts;
mod auth;
mod dash;
mod export;
mod goal;
mod init;
mod overrides;
mod stats;
mod transactions;

use crate::api::{validate_token, UpClient};
use crate::args::CredentialArgs;
use crate::error::Result;
use crate::merchant::{DomainResolver, LogoResolver};
use crate::secret::SecretStore;
use crate::store::LocalStore;
use crate::Config;
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use accounts::accounts;
pub use auth::{auth_clear, auth_store, auth_verify};
pub use dash::dash;
pub use export::export;
pub use goal::{goal_clear, goal_list, goal_set};
pub use init::init;
pub use overrides::{override_clear, override_list, override_set};
pub use stats::stats;
pub use transactions::transactions;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line interface.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Build an [`UpClient`] for a command, resolving the API token and loading any saved merchant
/// overrides so logo resolution respects them.
pub(crate) async fn api_client(config: &Config, credentials: &CredentialArgs) -> Result<UpClient> {
    let token = resolve_token(config, credentials).await?;
    let store = LocalStore::load(config.store_path()).await?;
    let domains = DomainResolver::new(store.merchant_overrides().clone());
    let logos = LogoResolver::new(domains);
    Ok(UpClient::new(&token, logos, config.client_options())?)
}

/// Resolve the API token for a command. An explicit `--token` wins, otherwise the encrypted
/// store is consulted (which requires a PIN).
async fn resolve_token(config: &Config, credentials: &CredentialArgs) -> Result<String> {
    if let Some(token) = credentials.token() {
        return Ok(validate_token(token)?);
    }
    let secrets = SecretStore::new(config.token_path());
    if !secrets.exists().await {
        bail!("No API token was given. Pass --token, or store one with 'updash auth'.");
    }
    let Some(pin) = credentials.pin() else {
        bail!("A token is stored but no PIN was given. Pass --pin or set UPDASH_PIN.");
    };
    secrets.load(pin).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEMO_TOKEN;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_resolve_token_prefers_explicit_token() {
        let env = TestEnv::new().await;
        let credentials = CredentialArgs::new(Some(DEMO_TOKEN.to_string()), None);
        let token = resolve_token(env.config(), &credentials).await.unwrap();
        assert_eq!(token, DEMO_TOKEN);
    }

    #[tokio::test]
    async fn test_resolve_token_without_any_source() {
        let env = TestEnv::new().await;
        let credentials = CredentialArgs::new(None, None);
        let err = resolve_token(env.config(), &credentials).await.unwrap_err();
        assert!(err.to_string().contains("No API token was given"));
    }

    #[tokio::test]
    async fn test_resolve_token_from_store_requires_pin() {
        let env = TestEnv::new().await;
        let secrets = SecretStore::new(env.config().token_path());
        secrets.store(DEMO_TOKEN, "4321").await.unwrap();

        let err = resolve_token(env.config(), &CredentialArgs::new(None, None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no PIN was given"));

        let token = resolve_token(
            env.config(),
            &CredentialArgs::new(None, Some("4321".to_string())),
        )
        .await
        .unwrap();
        assert_eq!(token, DEMO_TOKEN);
    }
}
