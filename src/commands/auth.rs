//! Authentication command handlers for the encrypted token store.
//!
//! This module implements the CLI commands for:
//! - `updash auth` - Encrypt an API token under a PIN and save it
//! - `updash auth --verify` - Check the token against the live API
//! - `updash auth --clear` - Delete the saved token

use crate::api::validate_token;
use crate::args::{AuthArgs, CredentialArgs};
use crate::commands::{api_client, Out};
use crate::error::Result;
use crate::secret::SecretStore;
use crate::Config;
use anyhow::{bail, Context};

/// Handles the `updash auth` command. Validates the given API token, encrypts it under the
/// given PIN and writes it to the secrets directory.
pub async fn auth_store(config: &Config, args: &AuthArgs) -> Result<Out<()>> {
    let Some(token) = args.token() else {
        bail!("No API token was given. Pass --token or set UP_TOKEN.");
    };
    let Some(pin) = args.pin() else {
        bail!("No PIN was given. Pass --pin or set UPDASH_PIN.");
    };
    let token = validate_token(token)?;
    let secrets = SecretStore::new(config.token_path());
    secrets
        .store(&token, pin)
        .await
        .context("Unable to save the encrypted API token")?;
    Ok(format!(
        "The API token was encrypted and saved to '{}'",
        config.token_path().display()
    )
    .into())
}

/// Handles the `updash auth --verify` command. Decrypts the stored token (or takes an explicit
/// `--token`) and pings the Up API with it. Never writes anything.
pub async fn auth_verify(config: &Config, args: &AuthArgs) -> Result<Out<()>> {
    let credentials = CredentialArgs::new(
        args.token().map(String::from),
        args.pin().map(String::from),
    );
    let client = api_client(config, &credentials).await?;
    client
        .ping()
        .await
        .context("The API token was rejected, run 'updash auth' to store a fresh one")?;
    Ok("Your Up API token is valid!".into())
}

/// Handles the `updash auth --clear` command. Deletes the encrypted token file if one exists.
pub async fn auth_clear(config: &Config) -> Result<Out<()>> {
    let secrets = SecretStore::new(config.token_path());
    if secrets.clear().await? {
        Ok("The stored API token was deleted".into())
    } else {
        Ok("There was no stored API token to delete".into())
    }
}
