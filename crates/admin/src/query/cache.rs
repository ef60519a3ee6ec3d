//! Query result cache backed by `moka`.
//!
//! Every cached result carries the invalidation generation that was current
//! when its fetch started. A result whose fetch started before a later
//! invalidation of its key is treated as absent, even when an in-flight
//! fetch stored it after the invalidation ran.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use moka::future::Cache;
use project_tracker_core::Resource;

use super::{QueryKey, QueryOptions};
use crate::services::ServiceError;

/// Upper bound on cached entries per resource.
const MAX_CAPACITY: u64 = 1000;

/// A cached result and the generation its fetch started in.
struct Entry<T> {
    generation: u64,
    value: Arc<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            value: Arc::clone(&self.value),
        }
    }
}

/// Cache of query results for one resource type.
///
/// Results expire after [`QueryOptions::stale_time`]. Concurrent fetches of
/// the same key share a single in-flight call.
#[derive(Clone)]
pub struct QueryClient<R: Resource> {
    inner: Arc<QueryClientInner<R>>,
}

struct QueryClientInner<R: Resource> {
    collections: Cache<QueryKey, Entry<Vec<R>>>,
    entities: Cache<QueryKey, Entry<R>>,
    /// Bumped on every invalidation.
    generation: AtomicU64,
    /// Generation of the latest invalidation, per invalidated prefix.
    invalidated: Mutex<HashMap<QueryKey, u64>>,
    options: QueryOptions,
}

impl<R: Resource> QueryClient<R> {
    #[must_use]
    pub fn new(options: QueryOptions) -> Self {
        Self {
            inner: Arc::new(QueryClientInner {
                collections: build_cache(&options),
                entities: build_cache(&options),
                generation: AtomicU64::new(0),
                invalidated: Mutex::new(HashMap::new()),
                options,
            }),
        }
    }

    #[must_use]
    pub fn options(&self) -> &QueryOptions {
        &self.inner.options
    }

    /// Key of this resource's collection query.
    #[must_use]
    pub const fn collection_key() -> QueryKey {
        QueryKey::collection(R::COLLECTION)
    }

    /// Key of one entity query.
    #[must_use]
    pub fn entity_key(id: &R::Id) -> QueryKey {
        QueryKey::entity(R::COLLECTION, id.as_ref())
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Cached collection, fetching it with `fetch` when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns the last error of `fetch` once all retries are exhausted.
    pub async fn collection<F, Fut>(&self, fetch: F) -> Result<Arc<Vec<R>>, ServiceError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<Vec<R>, ServiceError>> + Send,
    {
        self.fetch_current(&self.inner.collections, Self::collection_key(), fetch)
            .await
    }

    /// Cached entity, fetching it with `fetch` when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns the last error of `fetch` once all retries are exhausted.
    pub async fn entity<F, Fut>(&self, id: &R::Id, fetch: F) -> Result<Arc<R>, ServiceError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<R, ServiceError>> + Send,
    {
        self.fetch_current(&self.inner.entities, Self::entity_key(id), fetch)
            .await
    }

    /// Cached collection without fetching.
    pub async fn peek_collection(&self) -> Option<Arc<Vec<R>>> {
        self.peek_current(&self.inner.collections, &Self::collection_key())
            .await
    }

    /// Cached entity without fetching.
    pub async fn peek_entity(&self, id: &R::Id) -> Option<Arc<R>> {
        self.peek_current(&self.inner.entities, &Self::entity_key(id))
            .await
    }

    /// Coalesced, retried fetch of `key`. A result whose fetch raced an
    /// invalidation is dropped and fetched again.
    async fn fetch_current<T, F, Fut>(
        &self,
        cache: &Cache<QueryKey, Entry<T>>,
        key: QueryKey,
        fetch: F,
    ) -> Result<Arc<T>, ServiceError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ServiceError>> + Send,
    {
        let options = self.inner.options;
        loop {
            let entry = cache
                .try_get_with(key.clone(), async {
                    let generation = self.inner.generation.load(Ordering::SeqCst);
                    with_retry(&key, options, &fetch)
                        .await
                        .map(|value| Entry {
                            generation,
                            value: Arc::new(value),
                        })
                })
                .await
                .map_err(|e| (*e).clone())?;

            if self.is_current(&key, entry.generation) {
                return Ok(entry.value);
            }

            tracing::debug!(%key, "Result fetched before invalidation, refetching");
            cache.invalidate(&key).await;
        }
    }

    async fn peek_current<T>(
        &self,
        cache: &Cache<QueryKey, Entry<T>>,
        key: &QueryKey,
    ) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        cache
            .get(key)
            .await
            .filter(|entry| self.is_current(key, entry.generation))
            .map(|entry| entry.value)
    }

    /// Whether a fetch of `key` that started in `generation` postdates every
    /// invalidation covering `key`.
    fn is_current(&self, key: &QueryKey, generation: u64) -> bool {
        let invalidated = self.invalidated();
        let collection = QueryKey::collection(key.resource);
        let latest = invalidated
            .get(&collection)
            .into_iter()
            .chain(invalidated.get(key))
            .copied()
            .max()
            .unwrap_or(0);
        generation >= latest
    }

    fn invalidated(&self) -> MutexGuard<'_, HashMap<QueryKey, u64>> {
        self.inner
            .invalidated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Drop every cached result whose key starts with `prefix`.
    ///
    /// Fetches of those keys already in flight still complete for their
    /// callers, but their results are refetched instead of being served.
    pub async fn invalidate(&self, prefix: &QueryKey) {
        {
            let mut invalidated = self.invalidated();
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            invalidated.retain(|key, _| !key.starts_with(prefix));
            invalidated.insert(prefix.clone(), generation);
        }

        let mut dropped = 0usize;

        let stale: Vec<Arc<QueryKey>> = self
            .inner
            .collections
            .iter()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(prefix))
            .collect();
        for key in stale {
            self.inner.collections.invalidate(key.as_ref()).await;
            dropped += 1;
        }

        let stale: Vec<Arc<QueryKey>> = self
            .inner
            .entities
            .iter()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(prefix))
            .collect();
        for key in stale {
            self.inner.entities.invalidate(key.as_ref()).await;
            dropped += 1;
        }

        tracing::debug!(%prefix, dropped, "Invalidated queries");
    }
}

fn build_cache<V: Clone + Send + Sync + 'static>(options: &QueryOptions) -> Cache<QueryKey, V> {
    Cache::builder()
        .max_capacity(MAX_CAPACITY)
        .time_to_live(options.stale_time)
        .build()
}

/// Run `fetch`, retrying API failures up to `options.retry` times.
///
/// Local lookup misses and rejected ids are final and never retried.
async fn with_retry<T, F, Fut>(
    key: &QueryKey,
    options: QueryOptions,
    fetch: F,
) -> Result<T, ServiceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 0;
    loop {
        match fetch().await {
            Ok(value) => return Ok(value),
            Err(error @ ServiceError::Api(_)) if attempt < options.retry => {
                attempt += 1;
                tracing::debug!(%key, attempt, error = %error, "Query failed, retrying");
                if !options.retry_delay.is_zero() {
                    tokio::time::sleep(options.retry_delay).await;
                }
            }
            Err(error) => {
                tracing::warn!(%key, error = %error, "Query failed");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use project_tracker_core::{DomainError, Line, LineId};

    use super::*;
    use crate::services::mock::line_fixtures;

    fn options() -> QueryOptions {
        QueryOptions {
            retry_delay: Duration::ZERO,
            ..QueryOptions::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_result_is_served_from_cache() {
        let client = QueryClient::<Line>::new(options());
        let calls = &AtomicUsize::new(0);

        for _ in 0..3 {
            let lines = client
                .collection(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(line_fixtures())
                })
                .await
                .unwrap();
            assert_eq!(lines.len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let client = QueryClient::<Line>::new(options());
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| {
            let client = client.clone();
            async move {
                client
                    .collection(|| {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(line_fixtures())
                        }
                    })
                    .await
            }
        };

        let (a, b, c) = tokio::join!(
            fetch(Arc::clone(&calls)),
            fetch(Arc::clone(&calls)),
            fetch(Arc::clone(&calls))
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let client = QueryClient::<Line>::new(options());
        let calls = &AtomicUsize::new(0);

        let lines = client
            .collection(|| async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ServiceError::Api(DomainError::timeout()))
                } else {
                    Ok(line_fixtures())
                }
            })
            .await
            .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_and_caches_nothing() {
        let client = QueryClient::<Line>::new(options());
        let calls = &AtomicUsize::new(0);

        let err = client
            .entity(&LineId::new("1"), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Api(DomainError::http(500, "Internal Server Error")))
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert!(client.peek_entity(&LineId::new("1")).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_prefix_drops_collection_and_entities() {
        let client = QueryClient::<Line>::new(options());
        let line = line_fixtures().remove(0);

        client.collection(|| async { Ok(line_fixtures()) }).await.unwrap();
        client
            .entity(&line.id, || {
                let line = line.clone();
                async move { Ok(line) }
            })
            .await
            .unwrap();
        assert!(client.peek_collection().await.is_some());
        assert!(client.peek_entity(&line.id).await.is_some());

        client.invalidate(&QueryKey::collection("lines")).await;

        assert!(client.peek_collection().await.is_none());
        assert!(client.peek_entity(&line.id).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_entity_key_keeps_collection() {
        let client = QueryClient::<Line>::new(options());
        let line = line_fixtures().remove(0);

        client.collection(|| async { Ok(line_fixtures()) }).await.unwrap();
        client
            .entity(&line.id, || {
                let line = line.clone();
                async move { Ok(line) }
            })
            .await
            .unwrap();

        client.invalidate(&QueryKey::entity("lines", "1")).await;

        assert!(client.peek_collection().await.is_some());
        assert!(client.peek_entity(&line.id).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_result_is_refetched() {
        let client = QueryClient::<Line>::new(QueryOptions {
            stale_time: Duration::from_millis(50),
            ..options()
        });
        let calls = &AtomicUsize::new(0);
        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(line_fixtures())
        };

        client.collection(fetch).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        client.collection(fetch).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_started_before_invalidation_is_refetched() {
        let client = QueryClient::<Line>::new(options());
        let rows = &AtomicUsize::new(1);
        let calls = &AtomicUsize::new(0);
        let fetch = || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let snapshot = rows.load(Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(line_fixtures().into_iter().cycle().take(snapshot).collect())
        };

        let (lines, ()) = tokio::join!(client.collection(fetch), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            rows.store(2, Ordering::SeqCst);
            client.invalidate(&QueryKey::collection("lines")).await;
        });

        assert_eq!(lines.unwrap().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.peek_collection().await.map(|l| l.len()), Some(2));

        // The refetched result is fresh and served from cache.
        client.collection(fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let client = QueryClient::<Line>::new(options());
        let calls = &AtomicUsize::new(0);

        let err = client
            .entity(&LineId::new("999"), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::NotFound("lines 999".to_string()))
            })
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::NotFound("lines 999".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
