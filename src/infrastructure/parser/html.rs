//! Shared HTML helpers

use scraper::{ElementRef, Selector};
use url::Url;

/// Compile a selector known at build time
pub(super) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

pub(super) fn selectors(css: &[&str]) -> Vec<Selector> {
    css.iter().map(|s| selector(s)).collect()
}

/// Text of every descendant text node, each trimmed, empty ones dropped, concatenated
pub(super) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// First element matched by the earliest selector that matches anything
pub(super) fn first_match<'a>(scope: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| scope.select(s).next())
}

/// First non-empty value among the given attributes
pub(super) fn attr_cascade(element: ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve `href` against `base`; unparseable input is returned as is
pub(super) fn join_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn base() -> Url {
        Url::parse("https://mangatek.com").unwrap()
    }

    #[test]
    fn test_stripped_text_joins_trimmed_nodes() {
        let doc = Html::parse_fragment("<div>  Solo <b> Leveling </b>\n <i> </i></div>");
        let div = doc.select(&selector("div")).next().unwrap();

        assert_eq!(stripped_text(div), "SoloLeveling");
    }

    #[test]
    fn test_first_match_respects_selector_order() {
        let doc = Html::parse_document("<p class='b'>second</p><p class='a'>first</p>");
        let found = first_match(doc.root_element(), &selectors(&[".a", ".b"])).unwrap();

        assert_eq!(stripped_text(found), "first");
    }

    #[test]
    fn test_attr_cascade_skips_empty_values() {
        let doc = Html::parse_fragment(r#"<img data-src="" src="/a.jpg">"#);
        let img = doc.select(&selector("img")).next().unwrap();

        assert_eq!(attr_cascade(img, &["data-src", "src"]), Some("/a.jpg".to_string()));
        assert_eq!(attr_cascade(img, &["alt"]), None);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(&base(), "/manga/solo"), "https://mangatek.com/manga/solo");
        assert_eq!(
            join_url(&base(), "https://cdn.example.com/x.jpg"),
            "https://cdn.example.com/x.jpg"
        );
        assert_eq!(join_url(&base(), "?page=2"), "https://mangatek.com/?page=2");
    }
}
