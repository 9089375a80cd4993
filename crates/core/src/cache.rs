use crate::fetcher::{FetchOutcome, SignalFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Single global slot holding the last fetch result.
///
/// The slot lock is held across the fetch, so concurrent readers of an expired
/// slot wait for one fetch instead of each calling the API.
#[derive(Debug)]
pub struct SignalCache {
    ttl: Duration,
    slot: tokio::sync::Mutex<Option<CachedOutcome>>,
}

#[derive(Debug, Clone)]
struct CachedOutcome {
    outcome: Arc<FetchOutcome>,
    filled_at: Instant,
}

#[derive(Debug, Clone)]
pub struct CacheRead {
    pub outcome: Arc<FetchOutcome>,
    /// True when this read ran the fetcher rather than serving the slot.
    pub refreshed: bool,
}

impl SignalCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: tokio::sync::Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_fetch(&self, fetcher: &SignalFetcher) -> CacheRead {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.filled_at.elapsed() < self.ttl {
                return CacheRead {
                    outcome: cached.outcome.clone(),
                    refreshed: false,
                };
            }
            tracing::debug!(ttl_secs = self.ttl.as_secs(), "signal cache expired");
        }

        let outcome = Arc::new(fetcher.fetch().await);
        *slot = Some(CachedOutcome {
            outcome: outcome.clone(),
            filled_at: Instant::now(),
        });

        CacheRead {
            outcome,
            refreshed: true,
        }
    }

    /// Drops the cached result so the next read fetches again.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            tracing::info!("signal cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::tests::{fetcher, StubClient};
    use std::sync::atomic::Ordering;

    const ANSWER: &str = r#"[{"name": "Acme", "funding_stage": "Seed"}]"#;

    #[tokio::test]
    async fn serves_cached_outcome_within_ttl() {
        let stub = StubClient::ok(ANSWER);
        let f = fetcher(&stub);
        let cache = SignalCache::new(Duration::from_secs(300));

        let first = cache.get_or_fetch(&f).await;
        let second = cache.get_or_fetch(&f).await;

        assert!(first.refreshed);
        assert!(!second.refreshed);
        assert!(Arc::ptr_eq(&first.outcome, &second.outcome));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_ttl_always_refetches() {
        let stub = StubClient::ok(ANSWER);
        let f = fetcher(&stub);
        let cache = SignalCache::new(Duration::ZERO);
        assert_eq!(cache.ttl(), Duration::ZERO);

        cache.get_or_fetch(&f).await;
        let again = cache.get_or_fetch(&f).await;

        assert!(again.refreshed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let stub = StubClient::ok(ANSWER);
        let f = fetcher(&stub);
        let cache = SignalCache::new(Duration::from_secs(300));

        cache.get_or_fetch(&f).await;
        cache.invalidate().await;
        let after = cache.get_or_fetch(&f).await;

        assert!(after.refreshed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        assert_eq!(after.outcome.signals[0].name, "Acme");
    }

    #[tokio::test]
    async fn fallback_outcomes_are_cached_too() {
        let cache = SignalCache::new(Duration::from_secs(300));
        let f = SignalFetcher::new(None);

        let first = cache.get_or_fetch(&f).await;
        let second = cache.get_or_fetch(&f).await;
        assert!(first.outcome.is_fallback());
        assert!(!second.refreshed);
    }
}
