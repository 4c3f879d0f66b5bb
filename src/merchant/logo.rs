//! Merchant logo URLs, layered on top of domain resolution.
//!
//! Five public logo CDNs are tried in a fixed priority order. The optimistic path just
//! templates the primary source URL; the verified path probes the chain until a source
//! actually answers for the domain. Verdicts, including "nothing works", are cached per
//! domain for a day so a scrolling feed does not hammer the CDNs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::debug;

use crate::merchant::DomainResolver;
use crate::utils::{system_clock, Clock};

const LOGO_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Logo CDN sources, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSource {
    Clearbit,
    IconHorse,
    GoogleFavicon,
    GithubFavicon,
    Statvoo,
}

impl LogoSource {
    pub const CHAIN: [LogoSource; 5] = [
        LogoSource::Clearbit,
        LogoSource::IconHorse,
        LogoSource::GoogleFavicon,
        LogoSource::GithubFavicon,
        LogoSource::Statvoo,
    ];

    pub fn url_for(&self, domain: &str) -> String {
        match self {
            LogoSource::Clearbit => format!("https://logo.clearbit.com/{domain}?size=256"),
            LogoSource::IconHorse => format!("https://icon.horse/icon/{domain}"),
            LogoSource::GoogleFavicon => {
                format!("https://www.google.com/s2/favicons?domain={domain}&sz=64")
            }
            LogoSource::GithubFavicon => {
                format!("https://favicons.githubusercontent.com/{domain}")
            }
            LogoSource::Statvoo => format!("https://api.statvoo.com/logo/{domain}"),
        }
    }
}

/// Ordered candidate URLs for one transaction with a cursor advanced on load failure.
/// Exhaustion is terminal; callers fall back to rendering initials.
#[derive(Debug, Clone)]
pub struct FallbackChain {
    candidates: Vec<String>,
    cursor: usize,
}

impl FallbackChain {
    pub fn new(domain: &str) -> Self {
        let candidates = LogoSource::CHAIN
            .iter()
            .map(|source| source.url_for(domain))
            .collect();
        Self { candidates, cursor: 0 }
    }

    /// The candidate to try now, or `None` once the chain is exhausted.
    pub fn current(&self) -> Option<&str> {
        self.candidates.get(self.cursor).map(String::as_str)
    }

    /// Gives up on the current candidate and moves to the next. Safe to call repeatedly
    /// after exhaustion.
    pub fn advance(&mut self) -> Option<&str> {
        if self.cursor < self.candidates.len() {
            self.cursor += 1;
        }
        self.current()
    }
}

/// Checks whether a candidate logo URL actually serves an image.
#[async_trait]
pub trait LogoProbe: Send + Sync {
    async fn check(&self, url: &str) -> bool;
}

/// Probes over plain HTTP. A source counts as working when it answers 2xx.
pub(crate) struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub(crate) fn new(timeout: Duration) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LogoProbe for HttpProbe {
    async fn check(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

struct CacheEntry {
    verdict: Option<String>,
    at: Instant,
}

/// Per-domain verdict cache. A `None` verdict is cached too, so domains with no working
/// source are not re-probed on every render.
struct LogoCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Clock,
}

impl LogoCache {
    fn new(ttl: Duration, clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Outer `None` is a miss; `Some(None)` is a cached negative verdict.
    fn lookup(&self, domain: &str) -> Option<Option<String>> {
        let now = (self.clock)();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(domain)?;
        if now.duration_since(entry.at) >= self.ttl {
            return None;
        }
        Some(entry.verdict.clone())
    }

    fn put(&self, domain: &str, verdict: Option<String>) {
        let at = (self.clock)();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(domain.to_string(), CacheEntry { verdict, at });
    }
}

pub struct LogoResolver {
    domains: DomainResolver,
    cache: LogoCache,
}

impl LogoResolver {
    pub fn new(domains: DomainResolver) -> Self {
        Self::with_clock(domains, LOGO_CACHE_TTL, system_clock())
    }

    pub(crate) fn with_clock(domains: DomainResolver, ttl: Duration, clock: Clock) -> Self {
        Self {
            domains,
            cache: LogoCache::new(ttl, clock),
        }
    }

    pub fn domains(&self) -> &DomainResolver {
        &self.domains
    }

    /// Optimistic lookup: no network. Returns a previously verified URL when one is cached,
    /// `None` for a cached negative verdict, and otherwise the primary source URL untried.
    pub fn resolve(&self, description: &str, raw_text: &str) -> Option<String> {
        let domain = self.domains.resolve(description, raw_text)?;
        if let Some(verdict) = self.cache.lookup(&domain) {
            return verdict;
        }
        Some(LogoSource::Clearbit.url_for(&domain))
    }

    /// Probes the source chain for one transaction and caches the verdict.
    pub async fn resolve_verified(
        &self,
        probe: &dyn LogoProbe,
        description: &str,
        raw_text: &str,
    ) -> Option<String> {
        let domain = self.domains.resolve(description, raw_text)?;
        if let Some(verdict) = self.cache.lookup(&domain) {
            return verdict;
        }
        let verdict = probe_chain(probe, &domain).await;
        self.cache.put(&domain, verdict.clone());
        verdict
    }

    /// Verifies a whole batch, probing each unresolved domain concurrently. Returns the
    /// verdict per domain; transactions sharing a domain share one probe run.
    pub async fn resolve_verified_batch(
        &self,
        probe: Arc<dyn LogoProbe>,
        inputs: &[(String, String)],
    ) -> HashMap<String, Option<String>> {
        let mut verdicts = HashMap::new();
        let mut pending = Vec::new();
        for (description, raw_text) in inputs {
            let Some(domain) = self.domains.resolve(description, raw_text) else {
                continue;
            };
            if verdicts.contains_key(&domain) || pending.contains(&domain) {
                continue;
            }
            match self.cache.lookup(&domain) {
                Some(verdict) => {
                    verdicts.insert(domain, verdict);
                }
                None => pending.push(domain),
            }
        }

        let mut probes = JoinSet::new();
        for domain in pending {
            let probe = probe.clone();
            probes.spawn(async move {
                let verdict = probe_chain(probe.as_ref(), &domain).await;
                (domain, verdict)
            });
        }
        while let Some(joined) = probes.join_next().await {
            if let Ok((domain, verdict)) = joined {
                self.cache.put(&domain, verdict.clone());
                verdicts.insert(domain, verdict);
            }
        }
        verdicts
    }
}

/// Walks the fallback chain until a source answers. `None` means every source failed.
async fn probe_chain(probe: &dyn LogoProbe, domain: &str) -> Option<String> {
    let mut chain = FallbackChain::new(domain);
    while let Some(url) = chain.current() {
        if probe.check(url).await {
            debug!("verified logo source for {domain}: {url}");
            return Some(url.to_string());
        }
        chain.advance();
    }
    debug!("no logo source answered for {domain}");
    None
}
