//! Domain layer - Core entities, value types and ports

pub mod error;
pub mod fetch;
pub mod manga;
pub mod rate_limit;

pub use error::DomainError;
pub use fetch::PageFetcher;
pub use manga::{
    Chapter, ChapterImages, ExtractionDiagnostics, ImageStrategy, MangaDetail, MangaList,
    MangaSummary, PageLink, Pagination, ReaderTarget,
};
pub use rate_limit::RateLimitRule;
