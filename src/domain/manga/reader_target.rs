use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::DomainError;

static READER_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/reader/([^/]+)/(\d+)").expect("valid reader regex"));
static MANGA_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/manga/([^/]+)").expect("valid manga regex"));
static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d+)/?$").expect("valid trailing number regex"));

/// Slug and chapter addressed by a user-supplied reader or series URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderTarget {
    pub slug: String,
    pub chapter: u32,
}

impl ReaderTarget {
    /// Resolve a target from an absolute or relative URL.
    ///
    /// Absolute URLs must point at a host containing `allowed_host`.
    /// `/reader/<slug>/<n>` is tried first, then `/manga/<slug>` with a
    /// trailing chapter number.
    pub fn from_url(input: &str, allowed_host: &str) -> Result<Self, DomainError> {
        let input = input.trim();

        if let Ok(parsed) = Url::parse(input) {
            if let Some(host) = parsed.host_str() {
                if !host.contains(allowed_host) {
                    return Err(DomainError::validation(format!(
                        "Only {} URLs allowed",
                        allowed_host
                    )));
                }
            }
        }

        if let Some(caps) = READER_PATH.captures(input) {
            return Self::build(&caps[1], &caps[2]);
        }

        if let Some(caps) = MANGA_PATH.captures(input) {
            if let Some(number) = TRAILING_NUMBER.captures(input) {
                return Self::build(&caps[1], &number[1]);
            }
        }

        Err(DomainError::validation(
            "Could not extract slug/chapter from URL",
        ))
    }

    fn build(slug: &str, chapter: &str) -> Result<Self, DomainError> {
        let chapter = chapter
            .parse::<u32>()
            .map_err(|_| DomainError::validation(format!("Chapter number out of range: {}", chapter)))?;

        Ok(Self {
            slug: slug.to_string(),
            chapter,
        })
    }
}
