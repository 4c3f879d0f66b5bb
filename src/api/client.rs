//! The Up API client: credential validation, caching, retry, pagination and normalization.
//!
//! Everything above the transport seam happens here. Results are cached per credential
//! fingerprint with a short TTL; transient failures (network, 5xx) are retried with
//! exponential backoff while 4xx and malformed responses fail immediately.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::api::cache::{credential_fingerprint, ResponseCache};
use crate::api::demo::{DemoTransport, DEMO_TOKEN};
use crate::api::transport::{HttpTransport, Transport, Wire};
use crate::api::wire::{
    included_account_names, AccountResource, Envelope, ErrorEnvelope, TransactionResource,
};
use crate::api::{Mode, BASE_URL};
use crate::error::ApiError;
use crate::merchant::LogoResolver;
use crate::model::{Account, Transaction};
use crate::utils::{system_clock, Clock};

/// The upstream page-size ceiling; larger requests are paginated.
pub(crate) const PAGE_SIZE_CEILING: usize = 100;

const MIN_TOKEN_LENGTH: usize = 15;

/// Checks a personal access token before it is stored or sent anywhere. The demo token is
/// accepted as-is.
pub fn validate_token(token: &str) -> Result<String, ApiError> {
    let token = token.trim();
    if token == DEMO_TOKEN {
        return Ok(token.to_string());
    }
    let pattern = Regex::new(r"^up:yeah:[A-Za-z0-9_-]+$").expect("static token pattern");
    if token.len() < MIN_TOKEN_LENGTH || !pattern.is_match(token) {
        return Err(ApiError::Validation(
            "that does not look like an Up API token, expected the form up:yeah:...".to_string(),
        ));
    }
    Ok(token.to_string())
}

/// Backoff schedule for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following failure number `attempt` (zero-based), doubling each
    /// time up to the cap.
    pub(crate) fn delay_for(&self, attempt: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        doubled.min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(120),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Result of the combined fetch: the two requests run concurrently and fail independently.
#[derive(Debug)]
pub struct FetchAll {
    pub accounts: Result<Vec<Account>, ApiError>,
    pub transactions: Result<Vec<Transaction>, ApiError>,
}

pub struct UpClient {
    transport: Arc<dyn Transport>,
    token: String,
    fingerprint: String,
    retry: RetryPolicy,
    logos: LogoResolver,
    accounts_cache: ResponseCache<Vec<Account>>,
    transactions_cache: ResponseCache<Vec<Transaction>>,
}

impl UpClient {
    /// Builds a client for the given token. The demo token, or demo mode from the
    /// environment, selects the canned transport instead of real HTTP.
    pub fn new(token: &str, logos: LogoResolver, options: ClientOptions) -> Result<Self, ApiError> {
        let token = validate_token(token)?;
        let transport: Arc<dyn Transport> = if token == DEMO_TOKEN || Mode::from_env() == Mode::Test
        {
            debug!("using the demo transport");
            Arc::new(DemoTransport)
        } else {
            Arc::new(HttpTransport::new(options.timeout)?)
        };
        Ok(Self::assemble(transport, token, logos, options, system_clock()))
    }

    fn assemble(
        transport: Arc<dyn Transport>,
        token: String,
        logos: LogoResolver,
        options: ClientOptions,
        clock: Clock,
    ) -> Self {
        let fingerprint = credential_fingerprint(&token);
        Self {
            transport,
            token,
            fingerprint,
            retry: options.retry,
            logos,
            accounts_cache: ResponseCache::new(options.cache_ttl, clock.clone()),
            transactions_cache: ResponseCache::new(options.cache_ttl, clock),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_transport(
        transport: Arc<dyn Transport>,
        options: ClientOptions,
        clock: Clock,
    ) -> Self {
        use crate::merchant::DomainResolver;
        let logos = LogoResolver::new(DomainResolver::new(std::collections::BTreeMap::new()));
        Self::assemble(
            transport,
            "up:yeah:testtoken123456".to_string(),
            logos,
            options,
            clock,
        )
    }

    pub fn logos(&self) -> &LogoResolver {
        &self.logos
    }

    /// Wipes both response caches. Called before any user-initiated refresh.
    pub fn clear_cache(&self) {
        self.accounts_cache.clear();
        self.transactions_cache.clear();
    }

    /// Cheap authenticated call to check that the token works.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let url = format!("{BASE_URL}/util/ping");
        self.get_with_retry(&url).await.map(|_| ())
    }

    pub async fn fetch_accounts(&self) -> Result<Vec<Account>, ApiError> {
        let key = format!("accounts|{}", self.fingerprint);
        if let Some(cached) = self.accounts_cache.get(&key) {
            debug!("using cached accounts data");
            return Ok(cached);
        }

        let url = format!("{BASE_URL}/accounts");
        let wire = self.get_with_retry(&url).await?;
        let envelope: Envelope<AccountResource> = decode(&wire.body)?;
        if envelope.data.is_empty() {
            return Err(ApiError::InvalidResponse(
                "the accounts list came back empty".to_string(),
            ));
        }
        let accounts = envelope
            .data
            .into_iter()
            .map(AccountResource::into_account)
            .collect::<Result<Vec<_>, _>>()?;

        self.accounts_cache.put(&key, accounts.clone());
        Ok(accounts)
    }

    /// Fetches up to `count` transactions, following next-page cursors past the upstream
    /// page-size ceiling and truncating to the exact count.
    pub async fn fetch_transactions(&self, count: usize) -> Result<Vec<Transaction>, ApiError> {
        if count == 0 {
            return Err(ApiError::Validation(
                "the transaction count must be at least 1".to_string(),
            ));
        }
        let key = format!("transactions|{}|{count}", self.fingerprint);
        if let Some(cached) = self.transactions_cache.get(&key) {
            debug!("using cached transactions data");
            return Ok(cached);
        }

        let page_size = count.min(PAGE_SIZE_CEILING);
        let first_url =
            format!("{BASE_URL}/transactions?page[size]={page_size}&include=account");
        let mut next = Some(first_url);
        let mut first_page = true;
        let mut resources = Vec::new();
        let mut included = Vec::new();

        while let Some(url) = next {
            if resources.len() >= count {
                break;
            }
            let wire = self.get_with_retry(&url).await?;
            let envelope: Envelope<TransactionResource> = decode(&wire.body)?;
            if envelope.data.is_empty() {
                if first_page {
                    return Err(ApiError::InvalidResponse(
                        "the transactions list came back empty".to_string(),
                    ));
                }
                break;
            }
            first_page = false;
            resources.extend(envelope.data);
            included.extend(envelope.included);
            next = envelope.links.next;
        }
        resources.truncate(count);

        let account_names = included_account_names(&included);
        let transactions = resources
            .into_iter()
            .map(|resource| resource.into_transaction(&self.logos, &account_names))
            .collect::<Result<Vec<_>, _>>()?;

        self.transactions_cache.put(&key, transactions.clone());
        Ok(transactions)
    }

    /// Fetches accounts and transactions concurrently. The two results are independent so a
    /// failing transactions fetch still leaves usable account balances, and vice versa.
    pub async fn fetch_all(&self, count: usize) -> FetchAll {
        let (accounts, transactions) =
            tokio::join!(self.fetch_accounts(), self.fetch_transactions(count));
        FetchAll {
            accounts,
            transactions,
        }
    }

    /// Adds tags to a transaction. Mutations are not retried.
    pub async fn add_tags(&self, transaction_id: &str, tags: &[String]) -> Result<(), ApiError> {
        let url = format!("{BASE_URL}/transactions/{transaction_id}/relationships/tags");
        let body = json!({
            "data": tags
                .iter()
                .map(|tag| json!({ "type": "tags", "id": tag }))
                .collect::<Vec<_>>(),
        });
        let wire = self.transport.post(&url, &self.token, body).await?;
        if wire.status >= 400 {
            return Err(classify_response(&wire));
        }
        Ok(())
    }

    /// Sets or clears a transaction's category. Mutations are not retried.
    pub async fn categorize(
        &self,
        transaction_id: &str,
        category: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = format!("{BASE_URL}/transactions/{transaction_id}/relationships/category");
        let body = match category {
            Some(id) => json!({ "data": { "type": "categories", "id": id } }),
            None => json!({ "data": null }),
        };
        let wire = self.transport.patch(&url, &self.token, body).await?;
        if wire.status >= 400 {
            return Err(classify_response(&wire));
        }
        Ok(())
    }

    /// One GET with the retry policy applied: transient failures back off and try again,
    /// everything else returns its classified error straight away.
    async fn get_with_retry(&self, url: &str) -> Result<Wire, ApiError> {
        let mut failures = 0;
        loop {
            let outcome = self.transport.get(url, &self.token).await;
            let err = match outcome {
                Ok(wire) if wire.status < 400 => return Ok(wire),
                Ok(wire) => classify_response(&wire),
                Err(err) => err,
            };
            failures += 1;
            if failures >= self.retry.attempts || !err.is_retryable() {
                return Err(err);
            }
            let delay = self.retry.delay_for(failures - 1);
            warn!("request failed ({err}), retrying in {delay:?}");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Classifies an HTTP error response, pulling the human-readable detail out of the error
/// envelope when there is one.
fn classify_response(wire: &Wire) -> ApiError {
    let detail = serde_json::from_str::<ErrorEnvelope>(&wire.body)
        .ok()
        .and_then(|envelope| envelope.detail())
        .unwrap_or_else(|| "unknown error occurred".to_string());
    ApiError::from_status(wire.status, detail)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::scripted::ScriptedTransport;
    use crate::model::{AccountKind, EntryKind};
    use std::sync::Mutex;
    use std::time::Instant;

    fn fast_options() -> ClientOptions {
        ClientOptions {
            retry: RetryPolicy {
                attempts: 3,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
            },
            ..ClientOptions::default()
        }
    }

    fn test_clock() -> (Clock, Arc<Mutex<Duration>>) {
        let start = Instant::now();
        let offset = Arc::new(Mutex::new(Duration::ZERO));
        let handle = offset.clone();
        let clock: Clock = Arc::new(move || start + *offset.lock().unwrap());
        (clock, handle)
    }

    fn client_with(
        transport: Arc<ScriptedTransport>,
        options: ClientOptions,
    ) -> (UpClient, Arc<ScriptedTransport>) {
        let client = UpClient::with_transport(transport.clone(), options, system_clock());
        (client, transport)
    }

    fn accounts_body() -> String {
        serde_json::json!({
            "data": [
                {
                    "type": "accounts",
                    "id": "acc-1",
                    "attributes": {
                        "displayName": "Spending",
                        "accountType": "TRANSACTIONAL",
                        "ownershipType": "INDIVIDUAL",
                        "balance": { "value": "1057.42" }
                    }
                }
            ]
        })
        .to_string()
    }

    fn transactions_page(start: usize, len: usize, next: Option<&str>) -> String {
        let data: Vec<serde_json::Value> = (start..start + len)
            .map(|n| {
                serde_json::json!({
                    "type": "transactions",
                    "id": format!("txn-{n}"),
                    "attributes": {
                        "description": "Woolworths",
                        "rawText": "WOOLWORTHS 1234",
                        "status": "SETTLED",
                        "amount": { "value": "-10.00" },
                        "createdAt": "2025-07-14T10:00:00+10:00"
                    }
                })
            })
            .collect();
        serde_json::json!({ "data": data, "links": { "next": next } }).to_string()
    }

    fn error_body(title: &str) -> String {
        serde_json::json!({ "errors": [ { "title": title, "detail": title } ] }).to_string()
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("up:yeah:abc123DEF456xyz").is_ok());
        assert_eq!(
            validate_token("  up:yeah:abc123DEF456xyz  ").unwrap(),
            "up:yeah:abc123DEF456xyz"
        );
        assert!(validate_token(DEMO_TOKEN).is_ok());
        // Too short, wrong prefix, bad characters.
        assert!(matches!(validate_token("up:yeah:a"), Err(ApiError::Validation(_))));
        assert!(matches!(
            validate_token("ab:nope:abc123DEF456xyz"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_token("up:yeah:abc 123 def 456"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_retry_delays_double_and_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_third_attempt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Err(ApiError::Network("connection reset".to_string())));
        transport.push(Ok(Wire {
            status: 503,
            body: error_body("Service Unavailable"),
        }));
        transport.push(Ok(Wire::ok(accounts_body())));
        let (client, transport) = client_with(transport, fast_options());

        let accounts = client.fetch_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].kind(), AccountKind::Transactional);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_last_error() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..3 {
            transport.push(Err(ApiError::Network("timed out".to_string())));
        }
        let (client, transport) = client_with(transport, fast_options());

        let err = client.fetch_accounts().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        for (status, expected) in [
            (401, ApiError::Unauthenticated),
            (403, ApiError::Forbidden),
            (429, ApiError::RateLimited),
        ] {
            let transport = Arc::new(ScriptedTransport::new());
            transport.push(Ok(Wire {
                status,
                body: error_body("nope"),
            }));
            let (client, transport) = client_with(transport, fast_options());

            let err = client.fetch_accounts().await.unwrap_err();
            assert_eq!(err, expected);
            assert_eq!(transport.request_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_unprocessable_response_maps_to_unknown() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire {
            status: 422,
            body: error_body("Invalid page size"),
        }));
        let (client, transport) = client_with(transport, fast_options());

        let err = client.fetch_accounts().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Unknown {
                status: 422,
                detail: "Invalid page size".to_string()
            }
        );
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response_and_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(r#"{ "data": "not a list" }"#)));
        let (client, transport) = client_with(transport, fast_options());

        let err = client.fetch_accounts().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_data_is_invalid_response() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(r#"{ "data": [] }"#)));
        let (client, _) = client_with(transport, fast_options());

        let err = client.fetch_accounts().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_cache_serves_within_ttl_and_expires() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(accounts_body())));
        transport.push(Ok(Wire::ok(accounts_body())));
        let (clock, offset) = test_clock();
        let client = UpClient::with_transport(transport.clone(), fast_options(), clock);

        client.fetch_accounts().await.unwrap();
        client.fetch_accounts().await.unwrap();
        assert_eq!(transport.request_count(), 1);

        *offset.lock().unwrap() = Duration::from_secs(121);
        client.fetch_accounts().await.unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_a_fresh_fetch() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(accounts_body())));
        transport.push(Ok(Wire::ok(accounts_body())));
        let (client, transport) = client_with(transport, fast_options());

        client.fetch_accounts().await.unwrap();
        client.clear_cache();
        client.fetch_accounts().await.unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_pagination_follows_next_links_and_truncates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(transactions_page(
            0,
            100,
            Some("https://api.up.com.au/api/v1/transactions?page[size]=100&page[after]=cursor"),
        ))));
        transport.push(Ok(Wire::ok(transactions_page(100, 100, None))));
        let (client, transport) = client_with(transport, fast_options());

        let transactions = client.fetch_transactions(150).await.unwrap();
        assert_eq!(transactions.len(), 150);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains("page[size]=100"));
        assert!(requests[1].contains("page[after]=cursor"));
    }

    #[tokio::test]
    async fn test_small_requests_use_exact_page_size() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(transactions_page(0, 20, None))));
        let (client, transport) = client_with(transport, fast_options());

        let transactions = client.fetch_transactions(20).await.unwrap();
        assert_eq!(transactions.len(), 20);
        assert!(transport.requests()[0].contains("page[size]=20"));
    }

    #[tokio::test]
    async fn test_zero_count_is_a_validation_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, transport) = client_with(transport, fast_options());
        let err = client.fetch_transactions(0).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_all_reports_each_result_independently() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Ok(Wire::ok(accounts_body())));
        transport.push(Ok(Wire {
            status: 401,
            body: error_body("Not Authorized"),
        }));
        let (client, _) = client_with(transport, fast_options());

        let all = client.fetch_all(50).await;
        assert!(all.accounts.is_ok());
        assert_eq!(all.transactions.unwrap_err(), ApiError::Unauthenticated);
    }

    #[tokio::test]
    async fn test_demo_transport_end_to_end() {
        use crate::merchant::DomainResolver;
        let logos = LogoResolver::new(DomainResolver::new(std::collections::BTreeMap::new()));
        let client = UpClient::new(DEMO_TOKEN, logos, ClientOptions::default()).unwrap();

        let all = client.fetch_all(100).await;
        let accounts = all.accounts.unwrap();
        let transactions = all.transactions.unwrap();

        assert_eq!(accounts.len(), 3);
        assert!(accounts.iter().any(|account| account.is_maybe_buy()));

        assert_eq!(transactions.len(), 11);
        let woolworths = transactions
            .iter()
            .find(|t| t.description() == "Woolworths")
            .unwrap();
        assert_eq!(woolworths.kind(), EntryKind::Debit);
        assert!(woolworths.round_up);
        assert_eq!(woolworths.account_name.as_deref(), Some("Spending"));
        assert_eq!(
            woolworths.logo_url.as_deref(),
            Some("https://logo.clearbit.com/woolworths.com.au?size=256")
        );
        // Both transfer legs arrive un-coalesced; merging is the feed's job.
        assert!(transactions.iter().any(|t| t.description() == "Transfer to Savings"));
        assert!(transactions.iter().any(|t| t.description() == "Transfer from Spending"));

        client.ping().await.unwrap();
        client.add_tags("demo-txn-01", &["groceries".to_string()]).await.unwrap();
        client.categorize("demo-txn-01", Some("groceries")).await.unwrap();
    }
}
