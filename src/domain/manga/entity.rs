use serde::{Deserialize, Serialize};

/// Note attached to an empty catalogue page
pub const NO_ITEMS_NOTE: &str = "No items found; check logs.";

/// Note attached to a chapter with no usable images
pub const NO_IMAGES_NOTE: &str = "No images found; maybe JS-rendered or blocked.";

/// One entry of the catalogue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaSummary {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub cover: Option<String>,
}

/// Link to another listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub page: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current: u32,
    pub pages: Vec<PageLink>,
}

/// A page of the catalogue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaList {
    pub items: Vec<MangaSummary>,
    pub pagination: Pagination,
    pub note: Option<String>,
}

impl MangaList {
    pub fn new(items: Vec<MangaSummary>, pagination: Pagination) -> Self {
        let note = items.is_empty().then(|| NO_ITEMS_NOTE.to_string());

        Self {
            items,
            pagination,
            note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_number: String,
    pub url: String,
    pub title: String,
}

/// Series page: metadata plus chapter index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaDetail {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub rating: Option<f32>,
    pub chapters: Vec<Chapter>,
}

/// Which extraction pass produced the chapter images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStrategy {
    ReaderContainer,
    ImageScan,
    ScriptArrays,
    None,
}

/// Extraction details returned with `debug=true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    pub strategy: ImageStrategy,
    pub raw_candidates: usize,
    pub discarded: Vec<String>,
    pub source_url: String,
}

/// Page images of a single chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterImages {
    pub slug: String,
    pub chapter: u32,
    pub images: Vec<String>,
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<ExtractionDiagnostics>,
}

impl ChapterImages {
    pub fn new(slug: impl Into<String>, chapter: u32, images: Vec<String>) -> Self {
        let note = images.is_empty().then(|| NO_IMAGES_NOTE.to_string());

        Self {
            slug: slug.into(),
            chapter,
            images,
            note,
            debug: None,
        }
    }

    pub fn with_debug(mut self, diagnostics: ExtractionDiagnostics) -> Self {
        self.debug = Some(diagnostics);
        self
    }

    /// Drop diagnostics unless the caller asked for them
    pub fn for_caller(mut self, debug: bool) -> Self {
        if !debug {
            self.debug = None;
        }
        self
    }
}
