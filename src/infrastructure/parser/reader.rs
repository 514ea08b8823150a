//! Chapter reader page

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::html::{attr_cascade, join_url, selector, selectors};
use super::script_arrays::find_json_arrays_in_text;
use crate::domain::{ExtractionDiagnostics, ImageStrategy};

const IMAGE_ATTRS: [&str; 3] = ["data-src", "data-lazy-src", "src"];
const MIN_SCRIPT_LEN: usize = 20;
const KNOWN_PATH_MARKERS: [&str; 6] = [
    "/reader/",
    "/manga/",
    "/uploads/",
    "/covers/",
    "api.mangatek",
    "/images/",
];

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        ".reader",
        ".reader-container",
        ".chapter-images",
        "#reader",
        ".rdminimal",
        ".page",
    ])
});
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static ANY_IMAGE: Lazy<Selector> =
    Lazy::new(|| selector("article img, .page img, .chapter img, img"));
static SCRIPT: Lazy<Selector> = Lazy::new(|| selector("script"));

static IMAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(jpe?g|png|webp)(?:\?|$)").expect("valid image extension regex"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit regex"));

/// Cleaned image list plus how it was obtained
#[derive(Debug, Clone)]
pub struct ImageExtraction {
    pub images: Vec<String>,
    pub diagnostics: ExtractionDiagnostics,
}

/// Extract page images from a reader document.
///
/// Passes run in order until one yields candidates: known reader
/// containers, a scan of every `img`, then URL arrays in inline scripts.
/// Candidates are normalised against `base` and filtered to plausible
/// page images.
pub fn parse_chapter_images(html: &str, base: &Url, source_url: &str) -> ImageExtraction {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let (strategy, candidates) = [
        (ImageStrategy::ReaderContainer, container_images as fn(ElementRef<'_>) -> Vec<String>),
        (ImageStrategy::ImageScan, scanned_images),
        (ImageStrategy::ScriptArrays, script_images),
    ]
    .into_iter()
    .map(|(strategy, pass)| (strategy, pass(root)))
    .find(|(_, found)| !found.is_empty())
    .unwrap_or((ImageStrategy::None, Vec::new()));

    let raw_candidates = candidates.len();
    let (images, discarded) = clean_candidates(candidates, base);

    ImageExtraction {
        images,
        diagnostics: ExtractionDiagnostics {
            strategy,
            raw_candidates,
            discarded,
            source_url: source_url.to_string(),
        },
    }
}

fn image_source(img: ElementRef<'_>) -> Option<String> {
    attr_cascade(img, &IMAGE_ATTRS).filter(|src| !src.starts_with("data:"))
}

fn container_images(root: ElementRef<'_>) -> Vec<String> {
    CONTAINERS
        .iter()
        .filter_map(|s| root.select(s).next())
        .map(|container| container.select(&IMG).filter_map(image_source).collect::<Vec<_>>())
        .find(|images| !images.is_empty())
        .unwrap_or_default()
}

fn scanned_images(root: ElementRef<'_>) -> Vec<String> {
    root.select(&ANY_IMAGE).filter_map(image_source).collect()
}

fn script_images(root: ElementRef<'_>) -> Vec<String> {
    root.select(&SCRIPT)
        .map(|script| script.text().collect::<String>())
        .filter(|text| text.chars().count() >= MIN_SCRIPT_LEN)
        .map(|text| find_json_arrays_in_text(&text))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Normalise, filter and de-duplicate; returns (kept, discarded)
fn clean_candidates(candidates: Vec<String>, base: &Url) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut discarded = Vec::new();

    for candidate in candidates {
        let src = normalise(candidate.trim(), base);
        if src.is_empty() {
            continue;
        }

        if !looks_like_page_image(&src) {
            discarded.push(src);
            continue;
        }

        if seen.insert(src.clone()) {
            kept.push(src);
        }
    }

    (kept, discarded)
}

fn normalise(src: &str, base: &Url) -> String {
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else if src.starts_with('/') {
        join_url(base, src)
    } else {
        src.to_string()
    }
}

fn looks_like_page_image(src: &str) -> bool {
    KNOWN_PATH_MARKERS.iter().any(|m| src.contains(m))
        || (IMAGE_EXTENSION.is_match(src) && DIGIT.is_match(src))
}
