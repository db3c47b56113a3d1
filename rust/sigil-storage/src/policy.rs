use std::time::{Duration, SystemTime};

/// Time shaved off a URL's remaining validity before caching it
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Shortest time a URL is cached for
pub const DEFAULT_MIN_TTL: Duration = Duration::from_secs(60);

/// How long a freshly minted URL may be served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Subtracted from the remaining validity so that a cached URL still has
    /// time left on it when a client uses it
    pub safety_margin: Duration,
    /// Floor for the derived TTL
    pub min_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            min_ttl: DEFAULT_MIN_TTL,
        }
    }
}

impl CachePolicy {
    /// Shorthand for [cache_ttl] with this policy
    pub fn ttl_for(&self, expires_at: SystemTime, now: SystemTime) -> Duration {
        cache_ttl(expires_at, now, self)
    }
}

/// Cache TTL for a URL that expires at `expires_at`, observed at `now`:
/// `max(expires_at - now - safety_margin, min_ttl)`.
///
/// Saturates instead of underflowing, so URLs that are already expired or
/// within the safety margin get `min_ttl`. The floor wins even when it
/// outlasts the URL itself.
pub fn cache_ttl(expires_at: SystemTime, now: SystemTime, policy: &CachePolicy) -> Duration {
    expires_at
        .duration_since(now)
        .unwrap_or_default()
        .saturating_sub(policy.safety_margin)
        .max(policy.min_ttl)
}
