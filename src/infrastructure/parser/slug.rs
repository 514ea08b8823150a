/// Slug named by a catalogue or reader link.
///
/// The segment after `manga` wins, then the one after `reader`, else the
/// last path segment.
pub fn extract_slug_from_href(href: &str) -> String {
    let parts: Vec<&str> = href.trim_matches('/').split('/').collect();

    let after = |marker: &str| {
        parts
            .iter()
            .position(|p| *p == marker)
            .and_then(|i| parts.get(i + 1))
    };

    after("manga")
        .or_else(|| after("reader"))
        .or_else(|| parts.last())
        .map(|s| s.to_string())
        .unwrap_or_default()
}
