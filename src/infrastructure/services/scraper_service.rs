//! Scraper service - Fetches, parses and caches catalogue pages

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::domain::{ChapterImages, DomainError, MangaDetail, MangaList, PageFetcher, ReaderTarget};
use crate::infrastructure::parser::{parse_chapter_images, parse_manga_detail, parse_manga_list};
use crate::infrastructure::response_cache::ResponseCache;

/// Resolves catalogue requests against the upstream site
pub struct ScraperService {
    fetcher: Arc<dyn PageFetcher>,
    cache: ResponseCache,
    base: Url,
    allowed_host: String,
}

impl ScraperService {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: ResponseCache,
        base_url: &str,
        allowed_host: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let base = Url::parse(base_url)
            .map_err(|e| DomainError::configuration(format!("Invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            fetcher,
            cache,
            base,
            allowed_host: allowed_host.into(),
        })
    }

    /// Site root without the trailing slash
    fn base_str(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub fn list_url(&self, sort: &str, page: u32) -> String {
        let sort: String = url::form_urlencoded::byte_serialize(sort.as_bytes()).collect();
        let mut url = format!("{}/manga-list?sort={}", self.base_str(), sort);

        if page > 1 {
            url.push_str(&format!("&page={}", page));
        }

        url
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/manga/{}", self.base_str(), slug)
    }

    pub fn reader_url(&self, slug: &str, chapter: u32) -> String {
        format!("{}/reader/{}/{}", self.base_str(), slug, chapter)
    }

    /// One page of the catalogue listing
    pub async fn manga_list(&self, sort: &str, page: u32) -> Result<MangaList, DomainError> {
        if page < 1 {
            return Err(DomainError::invalid_parameter(
                "page",
                "must be greater than or equal to 1",
            ));
        }

        let list = self
            .cache
            .manga_list(sort, page, async {
                let url = self.list_url(sort, page);
                let html = self.fetcher.fetch(&url).await?;
                let list = parse_manga_list(&html, &self.base, page);

                info!(url = %url, items = list.items.len(), "Parsed manga list");
                Ok(list)
            })
            .await?;

        Ok(Arc::unwrap_or_clone(list))
    }

    /// Series metadata and chapter index
    pub async fn manga_detail(&self, slug: &str) -> Result<MangaDetail, DomainError> {
        let detail = self
            .cache
            .manga_detail(slug, async {
                let url = self.detail_url(slug);
                let html = self.fetcher.fetch(&url).await?;
                let detail = parse_manga_detail(&html, &self.base, slug, &url);

                info!(url = %url, chapters = detail.chapters.len(), "Parsed manga detail");
                Ok(detail)
            })
            .await?;

        Ok(Arc::unwrap_or_clone(detail))
    }

    /// Page images of a chapter; diagnostics are kept only when `debug` is set
    pub async fn chapter_images(
        &self,
        slug: &str,
        chapter: u32,
        debug: bool,
    ) -> Result<ChapterImages, DomainError> {
        let images = self
            .cache
            .chapter_images(slug, chapter, async {
                let url = self.reader_url(slug, chapter);
                let html = self.fetcher.fetch(&url).await?;
                let extraction = parse_chapter_images(&html, &self.base, &url);

                info!(
                    url = %url,
                    images = extraction.images.len(),
                    strategy = ?extraction.diagnostics.strategy,
                    "Parsed chapter images"
                );

                Ok(ChapterImages::new(slug, chapter, extraction.images)
                    .with_debug(extraction.diagnostics))
            })
            .await?;

        Ok(Arc::unwrap_or_clone(images).for_caller(debug))
    }

    /// Chapter images addressed by a full reader or series URL
    pub async fn chapter_images_from_url(
        &self,
        url: &str,
        debug: bool,
    ) -> Result<ChapterImages, DomainError> {
        let target = ReaderTarget::from_url(url, &self.allowed_host)?;
        debug!(slug = %target.slug, chapter = target.chapter, "Resolved reader URL");

        self.chapter_images(&target.slug, target.chapter, debug).await
    }
}

impl std::fmt::Debug for ScraperService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperService")
            .field("fetcher", &self.fetcher.name())
            .field("base", &self.base.as_str())
            .field("allowed_host", &self.allowed_host)
            .finish()
    }
}
