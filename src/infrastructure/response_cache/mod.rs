//! Time-bounded cache of scraped responses

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::config::CacheConfig;
use crate::domain::{ChapterImages, DomainError, MangaDetail, MangaList};
use crate::infrastructure::observability::record_cache_lookup;

#[derive(Debug, Clone)]
enum CachedResponse {
    List(Arc<MangaList>),
    Detail(Arc<MangaDetail>),
    Chapter(Arc<ChapterImages>),
}

/// Response types that can live in the cache
trait Cacheable: Sized + Send + Sync + 'static {
    const ENDPOINT: &'static str;

    fn wrap(value: Arc<Self>) -> CachedResponse;
    fn unwrap(entry: CachedResponse) -> Option<Arc<Self>>;
}

impl Cacheable for MangaList {
    const ENDPOINT: &'static str = "list";

    fn wrap(value: Arc<Self>) -> CachedResponse {
        CachedResponse::List(value)
    }

    fn unwrap(entry: CachedResponse) -> Option<Arc<Self>> {
        match entry {
            CachedResponse::List(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for MangaDetail {
    const ENDPOINT: &'static str = "detail";

    fn wrap(value: Arc<Self>) -> CachedResponse {
        CachedResponse::Detail(value)
    }

    fn unwrap(entry: CachedResponse) -> Option<Arc<Self>> {
        match entry {
            CachedResponse::Detail(v) => Some(v),
            _ => None,
        }
    }
}

impl Cacheable for ChapterImages {
    const ENDPOINT: &'static str = "reader";

    fn wrap(value: Arc<Self>) -> CachedResponse {
        CachedResponse::Chapter(value)
    }

    fn unwrap(entry: CachedResponse) -> Option<Arc<Self>> {
        match entry {
            CachedResponse::Chapter(v) => Some(v),
            _ => None,
        }
    }
}

/// Caches successful responses per endpoint and parameters.
///
/// Concurrent misses on one key wait for a single load. Failed loads are
/// not stored.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache: Cache<String, CachedResponse>,
}

impl ResponseCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(Duration::from_secs(config.ttl_secs), config.max_capacity)
    }

    pub fn with_ttl(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    pub async fn manga_list<F>(&self, sort: &str, page: u32, load: F) -> Result<Arc<MangaList>, DomainError>
    where
        F: Future<Output = Result<MangaList, DomainError>>,
    {
        self.get_or_load(format!("list:{}:{}", sort, page), load).await
    }

    pub async fn manga_detail<F>(&self, slug: &str, load: F) -> Result<Arc<MangaDetail>, DomainError>
    where
        F: Future<Output = Result<MangaDetail, DomainError>>,
    {
        self.get_or_load(format!("detail:{}", slug), load).await
    }

    pub async fn chapter_images<F>(
        &self,
        slug: &str,
        chapter: u32,
        load: F,
    ) -> Result<Arc<ChapterImages>, DomainError>
    where
        F: Future<Output = Result<ChapterImages, DomainError>>,
    {
        self.get_or_load(format!("reader:{}:{}", slug, chapter), load).await
    }

    async fn get_or_load<V, F>(&self, key: String, load: F) -> Result<Arc<V>, DomainError>
    where
        V: Cacheable,
        F: Future<Output = Result<V, DomainError>>,
    {
        let mut loaded = false;

        let entry = self
            .cache
            .try_get_with(key.clone(), async {
                loaded = true;
                load.await.map(|value| V::wrap(Arc::new(value)))
            })
            .await
            .map_err(|e| (*e).clone())?;

        record_cache_lookup(V::ENDPOINT, !loaded);
        debug!(key = %key, hit = !loaded, "Response cache lookup");

        V::unwrap(entry)
            .ok_or_else(|| DomainError::internal(format!("cache entry {} has the wrong type", key)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::Pagination;

    fn list(current: u32) -> MangaList {
        MangaList::new(vec![], Pagination { current, pages: vec![] })
    }

    fn cache() -> ResponseCache {
        ResponseCache::with_ttl(Duration::from_secs(60), 16)
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let cache = cache();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .manga_list("views", 2, async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(list(2))
                })
                .await
                .unwrap();
            assert_eq!(value.pagination.current, 2);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parameters_are_part_of_the_key() {
        let cache = cache();

        cache.manga_list("views", 1, async { Ok(list(1)) }).await.unwrap();
        let other = cache.manga_list("views", 2, async { Ok(list(2)) }).await.unwrap();
        let sorted = cache.manga_list("latest", 1, async { Ok(list(9)) }).await.unwrap();

        assert_eq!(other.pagination.current, 2);
        assert_eq!(sorted.pagination.current, 9);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = cache();

        let err = cache
            .chapter_images("solo", 1, async { Err(DomainError::upstream("Fetching failed. last=x")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Fetching failed. last=x");

        let ok = cache
            .chapter_images("solo", 1, async { Ok(ChapterImages::new("solo", 1, vec![])) })
            .await
            .unwrap();
        assert_eq!(ok.slug, "solo");
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_load() {
        let cache = cache();
        let loads = Arc::new(AtomicUsize::new(0));

        let lookups = (0..8).map(|_| {
            let cache = cache.clone();
            let loads = loads.clone();
            async move {
                cache
                    .manga_detail("solo", async {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(MangaDetail {
                            title: "Solo".to_string(),
                            slug: "solo".to_string(),
                            url: "https://mangatek.com/manga/solo".to_string(),
                            description: None,
                            cover: None,
                            tags: vec![],
                            rating: None,
                            chapters: vec![],
                        })
                    })
                    .await
            }
        });

        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = ResponseCache::with_ttl(Duration::from_millis(50), 16);

        cache.manga_list("views", 1, async { Ok(list(1)) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        let reloaded = cache.manga_list("views", 1, async { Ok(list(5)) }).await.unwrap();

        assert_eq!(reloaded.pagination.current, 5);
    }
}
