//! TTL cache for upstream responses.
//!
//! Keys combine the endpoint, its parameters and a fingerprint of the credential, so two
//! sessions with different tokens never see each other's data. Entries hold the already
//! normalized result, not the raw body.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::utils::Clock;

/// Short, stable hash of a credential for use in cache keys and logs. Never reversible to
/// the token itself.
pub(crate) fn credential_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    hex[..12].to_string()
}

pub(crate) struct ResponseCache<T> {
    entries: Mutex<HashMap<String, (T, Instant)>>,
    ttl: Duration,
    clock: Clock,
}

impl<T: Clone> ResponseCache<T> {
    pub(crate) fn new(ttl: Duration, clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<T> {
        let now = (self.clock)();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let (value, at) = entries.get(key)?;
        if now.duration_since(*at) >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    pub(crate) fn put(&self, key: &str, value: T) {
        let at = (self.clock)();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), (value, at));
    }

    pub(crate) fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_clock() -> (Clock, Arc<Mutex<Duration>>) {
        let start = Instant::now();
        let offset = Arc::new(Mutex::new(Duration::ZERO));
        let handle = offset.clone();
        let clock: Clock = Arc::new(move || start + *offset.lock().unwrap());
        (clock, handle)
    }

    #[test]
    fn test_hit_within_ttl() {
        let (clock, offset) = test_clock();
        let cache = ResponseCache::new(Duration::from_secs(120), clock);
        cache.put("accounts|abc", vec![1, 2, 3]);

        *offset.lock().unwrap() = Duration::from_secs(119);
        assert_eq!(cache.get("accounts|abc"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_miss_after_ttl() {
        let (clock, offset) = test_clock();
        let cache = ResponseCache::new(Duration::from_secs(120), clock);
        cache.put("accounts|abc", vec![1]);

        *offset.lock().unwrap() = Duration::from_secs(120);
        assert_eq!(cache.get("accounts|abc"), None);
    }

    #[test]
    fn test_keys_are_independent() {
        let (clock, _) = test_clock();
        let cache = ResponseCache::new(Duration::from_secs(120), clock);
        cache.put("transactions|abc|200", vec![1]);
        assert_eq!(cache.get("transactions|abc|100"), None);
        assert_eq!(cache.get("transactions|abc|200"), Some(vec![1]));
    }

    #[test]
    fn test_clear_wipes_everything() {
        let (clock, _) = test_clock();
        let cache = ResponseCache::new(Duration::from_secs(120), clock);
        cache.put("a", vec![1]);
        cache.put("b", vec![2]);
        cache.clear();
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_credential_fingerprint_is_stable_and_opaque() {
        let token = "up:yeah:abcdefghijklmnop";
        let fingerprint = credential_fingerprint(token);
        assert_eq!(fingerprint, credential_fingerprint(token));
        assert_eq!(fingerprint.len(), 12);
        assert!(!token.contains(&fingerprint));
        assert_ne!(fingerprint, credential_fingerprint("up:yeah:different"));
    }
}
