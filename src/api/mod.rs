//! Client for the Up Bank REST API.

pub(crate) mod cache;
mod client;
mod demo;
pub(crate) mod transport;
pub(crate) mod wire;

pub use client::{validate_token, ClientOptions, FetchAll, RetryPolicy, UpClient};
pub use demo::DEMO_TOKEN;

/// Base URL for all API requests.
pub(crate) const BASE_URL: &str = "https://api.up.com.au/api/v1";

/// Set this environment variable to `true` to use the demo transport regardless of the
/// token, e.g. when running the whole binary in tests.
pub(crate) const IN_TEST_MODE: &str = "UPDASH_IN_TEST_MODE";

/// Whether to talk to the real API or serve the bundled demo data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Production,
    Test,
}

impl Mode {
    pub(crate) fn from_env() -> Self {
        let test = std::env::var(IN_TEST_MODE)
            .map(|value| value == "true")
            .unwrap_or(false);
        if test {
            Mode::Test
        } else {
            Mode::Production
        }
    }
}
