//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::DEMO_TOKEN;
use crate::args::CredentialArgs;
use crate::Config;
use tempfile::TempDir;

/// Test environment that sets up an updash home directory with a Config.
/// Holds the TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with a freshly initialized home directory.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("updash");
        let config = Config::create(&root).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns the Config rooted in the temporary home.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Credentials that select the bundled demo transport, so commands run without the network.
pub fn demo_credentials() -> CredentialArgs {
    CredentialArgs::new(Some(DEMO_TOKEN.to_string()), None)
}
