//! Resolution cache with single-flight lookups.
//!
//! Maps `(era, type hint, lowercase name)` to the link a mention resolved
//! to. The cache is an explicit object shared by clone; it is never ambient
//! global state.
//!
//! ## Single-flight
//!
//! Misses register a shared pending result in an in-flight registry keyed by
//! [`CacheKey`]. Any caller arriving while that key is pending awaits the
//! same result instead of resolving again. The pending computation stores
//! its own result and deregisters itself, so followers still complete if
//! the caller that started it is cancelled.
//!
//! ## Eviction
//!
//! [`CachePolicy`] bounds the cache by entry count (least recently used is
//! evicted) and/or age (entries expire on read). The default policy is
//! unbounded with no expiry.
//!
//! Degraded resolutions (lookup failures) are handed to every waiter but
//! never stored.

use futures::future::{BoxFuture, FutureExt, Shared};
use lorelink_core::logging::{CACHE_HIT, RESOLUTION};
use lorelink_core::{Era, EntityType, Resolution};
use lru::LruCache;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::mention::ParsedMention;

/// Identity of one resolution outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub era: Era,
    pub type_hint: Option<EntityType>,
    /// Lowercased clean name.
    pub name: String,
}

impl CacheKey {
    pub fn new(era: Era, mention: &ParsedMention) -> Self {
        Self {
            era,
            type_hint: mention.type_hint,
            name: mention.normalized_name(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hint = self.type_hint.map(EntityType::slug).unwrap_or("");
        write!(f, "{}:{}:{}", self.era, hint, self.name)
    }
}

/// Bounding policy for the resolution cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum resident entries; least recently used are evicted first.
    pub max_entries: Option<NonZeroUsize>,
    /// Maximum age of an entry before it must be resolved again.
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    /// No size cap and no expiry.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: NonZeroUsize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Callers that joined a resolution already in flight.
    pub coalesced: u64,
    /// Entries dropped by the size cap or TTL.
    pub evictions: u64,
}

struct CacheEntry {
    resolution: Resolution,
    inserted_at: Instant,
}

type PendingResolution = Shared<BoxFuture<'static, Resolution>>;

/// Shared, concurrency-safe resolution cache.
#[derive(Clone)]
pub struct ResolutionCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<LruCache<CacheKey, CacheEntry>>,
    in_flight: Mutex<HashMap<CacheKey, PendingResolution>>,
    policy: CachePolicy,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionCache {
    pub fn new(policy: CachePolicy) -> Self {
        let entries = match policy.max_entries {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(entries),
                in_flight: Mutex::new(HashMap::new()),
                policy,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
            }),
        }
    }

    /// Unbounded cache with no expiry.
    pub fn unbounded() -> Self {
        Self::new(CachePolicy::unbounded())
    }

    pub fn policy(&self) -> CachePolicy {
        self.inner.policy
    }

    /// Return the cached resolution for `key`, or run `resolve` to produce
    /// it.
    ///
    /// `resolve` is invoked at most once per key while a resolution for that
    /// key is pending, no matter how many callers race for it.
    pub async fn get_or_resolve<F, Fut>(&self, key: CacheKey, resolve: F) -> Resolution
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Resolution> + Send + 'static,
    {
        if let Some(hit) = self.inner.lookup(&key).await {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, { CACHE_HIT } = true, "Cache HIT");
            return hit;
        }

        let pending = {
            let mut in_flight = self.inner.in_flight.lock().await;
            if let Some(pending) = in_flight.get(&key).cloned() {
                self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Joining in-flight resolution");
                pending
            } else {
                // A pending resolution may have completed between the miss
                // above and taking the registry lock.
                if let Some(hit) = self.inner.lookup(&key).await {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, { CACHE_HIT } = true, "Cache HIT");
                    return hit;
                }

                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, { CACHE_HIT } = false, "Cache MISS");

                let inner = Arc::clone(&self.inner);
                let owned_key = key.clone();
                let work = resolve();
                let pending = async move {
                    let resolution = work.await;
                    inner.complete(owned_key, &resolution).await;
                    resolution
                }
                .boxed()
                .shared();
                in_flight.insert(key, pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Peek at a resident entry without resolving.
    pub async fn get(&self, key: &CacheKey) -> Option<Resolution> {
        self.inner.lookup(key).await
    }

    /// Number of resident entries (expired entries count until read).
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every resident entry. Pending resolutions are unaffected.
    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            coalesced: self.inner.coalesced.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
        }
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("policy", &self.inner.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

impl CacheInner {
    async fn lookup(&self, key: &CacheKey) -> Option<Resolution> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        let expired = self
            .policy
            .ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl);
        if !expired {
            return Some(entry.resolution.clone());
        }

        entries.pop(key);
        self.evictions.fetch_add(1, Ordering::Relaxed);
        trace!(key = %key, "Cache entry expired");
        None
    }

    async fn complete(&self, key: CacheKey, resolution: &Resolution) {
        if resolution.is_cacheable() {
            let mut entries = self.entries.lock().await;
            let entry = CacheEntry {
                resolution: resolution.clone(),
                inserted_at: Instant::now(),
            };
            if let Some((evicted, _)) = entries.push(key.clone(), entry) {
                if evicted != key {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    trace!(key = %evicted, "Cache entry evicted");
                }
            }
            debug!(key = %key, { RESOLUTION } = resolution.kind.as_str(), "Cache SET");
        } else {
            debug!(
                key = %key,
                { RESOLUTION } = resolution.kind.as_str(),
                "Not caching degraded resolution"
            );
        }

        self.in_flight.lock().await.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn key(era: Era, raw: &str) -> CacheKey {
        CacheKey::new(era, &ParsedMention::parse(raw))
    }

    fn counted(
        calls: &Arc<AtomicUsize>,
        resolution: Resolution,
        delay: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Resolution> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                resolution
            }
            .boxed()
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn canonical(url: &str) -> Resolution {
        Resolution::canonical(url.to_string())
    }

    #[test]
    fn test_cache_key_normalization() {
        assert_eq!(
            key(Era::Tbc, "item:Thunderfury"),
            key(Era::Tbc, "ITEM: thunderfury ")
        );
        assert_ne!(key(Era::Tbc, "item:Thunderfury"), key(Era::Tbc, "Thunderfury"));
        assert_ne!(key(Era::Tbc, "Thunderfury"), key(Era::Retail, "Thunderfury"));
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(key(Era::Wotlk, "spell:Frostbolt").to_string(), "WotLK:spell:frostbolt");
        assert_eq!(key(Era::Classic, "Thrall").to_string(), "Classic::thrall");
    }

    #[tokio::test]
    async fn test_hit_does_not_invoke_resolver() {
        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Retail, "Hearthstone");

        let first = cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("u1"), Duration::ZERO))
            .await;
        let second = cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("u2"), Duration::ZERO))
            .await;

        assert_eq!(first.url, "u1");
        assert_eq!(second.url, "u1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_resolution() {
        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Tbc, "Illidan Stormrage");

        let (a, b, c) = tokio::join!(
            cache.get_or_resolve(k.clone(), counted(&calls, canonical("u"), Duration::from_millis(50))),
            cache.get_or_resolve(k.clone(), counted(&calls, canonical("x"), Duration::from_millis(50))),
            cache.get_or_resolve(k.clone(), counted(&calls, canonical("y"), Duration::from_millis(50))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a.url.as_str(), b.url.as_str(), c.url.as_str()), ("u", "u", "u"));
        assert_eq!(cache.stats().coalesced, 2);
        assert!(cache.inner.in_flight.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_leader_does_not_strand_followers() {
        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Classic, "Onyxia");

        let leader = tokio::time::timeout(
            Duration::from_millis(10),
            cache.get_or_resolve(k.clone(), counted(&calls, canonical("u"), Duration::from_millis(50))),
        )
        .await;
        assert!(leader.is_err());

        let follower = cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("other"), Duration::ZERO))
            .await;

        assert_eq!(follower.url, "u");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&k).await, Some(canonical("u")));
    }

    #[tokio::test]
    async fn test_degraded_resolution_not_stored() {
        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Tbc, "Foo");
        let degraded = Resolution::degraded("https://tbc.example/search?q=Foo".to_string());

        let first = cache
            .get_or_resolve(k.clone(), counted(&calls, degraded.clone(), Duration::ZERO))
            .await;
        assert_eq!(first, degraded);
        assert!(cache.is_empty().await);

        let second = cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("u"), Duration::ZERO))
            .await;
        assert_eq!(second.url, "u");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_resolution_is_stored() {
        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Retail, "Nothing Matches");
        let fallback = Resolution::fallback("search".to_string());

        cache
            .get_or_resolve(k.clone(), counted(&calls, fallback.clone(), Duration::ZERO))
            .await;
        assert_eq!(cache.get(&k).await, Some(fallback));
    }

    #[tokio::test]
    async fn test_max_entries_evicts_least_recently_used() {
        let policy = CachePolicy::unbounded().with_max_entries(NonZeroUsize::new(2).unwrap());
        let cache = ResolutionCache::new(policy);
        let calls = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b"] {
            cache
                .get_or_resolve(key(Era::Retail, name), counted(&calls, canonical(name), Duration::ZERO))
                .await;
        }
        // Touch "a" so "b" becomes least recently used.
        assert!(cache.get(&key(Era::Retail, "a")).await.is_some());
        cache
            .get_or_resolve(key(Era::Retail, "c"), counted(&calls, canonical("c"), Duration::ZERO))
            .await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&key(Era::Retail, "a")).await.is_some());
        assert!(cache.get(&key(Era::Retail, "b")).await.is_none());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_entries() {
        let cache = ResolutionCache::new(CachePolicy::unbounded().with_ttl(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Wotlk, "Arthas");

        cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("old"), Duration::ZERO))
            .await;
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get(&k).await, Some(canonical("old")));

        tokio::time::advance(Duration::from_secs(31)).await;
        let refreshed = cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("new"), Duration::ZERO))
            .await;

        assert_eq!(refreshed.url, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let cache = ResolutionCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .get_or_resolve(key(Era::Retail, "x"), counted(&calls, canonical("x"), Duration::ZERO))
            .await;
        assert_eq!(cache.len().await, 1);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_events_use_shared_field_names() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let cache = ResolutionCache::unbounded();
        let calls = Arc::new(AtomicUsize::new(0));
        let k = key(Era::Retail, "Thrall");
        cache
            .get_or_resolve(k.clone(), counted(&calls, canonical("u"), Duration::ZERO))
            .await;
        cache
            .get_or_resolve(k, counted(&calls, canonical("u"), Duration::ZERO))
            .await;

        let out = logs.contents();
        assert!(out.contains(&format!("{}=false", CACHE_HIT)));
        assert!(out.contains(&format!("{}=true", CACHE_HIT)));
        assert!(out.contains(&format!("{}=", RESOLUTION)));
        assert!(out.contains("canonical"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
