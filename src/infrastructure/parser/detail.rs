//! Series detail page

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::html::{attr_cascade, first_match, join_url, selector, selectors, stripped_text};
use crate::domain::{Chapter, MangaDetail};

static TITLE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["h1", ".title", ".entry-title"]));
static DESCRIPTION: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "p.text-gray-300",
        ".description",
        ".entry-content p",
        "meta[name='description']",
    ])
});
static COVER: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["img.cover", ".cover img", ".thumb img"]));
static TAGS: Lazy<Selector> = Lazy::new(|| selector(".tags span, .genres span, .tag a"));
static READER_LINK: Lazy<Selector> = Lazy::new(|| selector("a[href*='/reader/']"));
static MANGA_LINK: Lazy<Selector> = Lazy::new(|| selector("a[href*='/manga/']"));

static READER_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/reader/([^/]+)/(\d+)").expect("valid reader chapter regex"));
static MANGA_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/manga/([^/]+)/(\d+)").expect("valid manga chapter regex"));

pub fn parse_manga_detail(html: &str, base: &Url, slug: &str, url: &str) -> MangaDetail {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = first_match(root, &TITLE)
        .map(stripped_text)
        .unwrap_or_else(|| slug.to_string());

    let description = first_match(root, &DESCRIPTION).and_then(|el| {
        if el.value().name() == "meta" {
            el.value().attr("content").map(str::to_string)
        } else {
            Some(stripped_text(el))
        }
    });

    let cover = first_match(root, &COVER).and_then(|img| attr_cascade(img, &["data-src", "src"]));

    let tags = root.select(&TAGS).map(stripped_text).collect();

    let mut chapters = chapter_links(root, &READER_LINK, &READER_CHAPTER, base);
    if chapters.is_empty() {
        chapters = chapter_links(root, &MANGA_LINK, &MANGA_CHAPTER, base);
    }

    MangaDetail {
        title,
        slug: slug.to_string(),
        url: url.to_string(),
        description,
        cover,
        tags,
        rating: None,
        chapters,
    }
}

fn chapter_links(root: ElementRef<'_>, anchors: &Selector, pattern: &Regex, base: &Url) -> Vec<Chapter> {
    root.select(anchors)
        .filter_map(|a| {
            let href = a.value().attr("href").unwrap_or_default();
            let number = pattern.captures(href)?.get(2)?.as_str().to_string();

            Some(Chapter {
                chapter_number: number,
                url: join_url(base, href),
                title: stripped_text(a),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://mangatek.com/manga/solo-leveling";

    fn base() -> Url {
        Url::parse("https://mangatek.com").unwrap()
    }

    #[test]
    fn test_full_detail_page() {
        let html = r#"
            <html><head><meta name="description" content="meta text"></head>
            <body>
              <h1> Solo Leveling </h1>
              <p class="text-gray-300">A hunter <b>levels</b> up.</p>
              <div class="cover"><img data-src="/covers/solo.jpg" src="/lazy.gif"></div>
              <div class="tags"><span>Action</span><span> Fantasy </span></div>
              <ul>
                <li><a href="/reader/solo-leveling/2">Chapter 2</a></li>
                <li><a href="/reader/solo-leveling/1">Chapter 1</a></li>
                <li><a href="/reader/solo-leveling/">broken</a></li>
              </ul>
            </body></html>
        "#;

        let detail = parse_manga_detail(html, &base(), "solo-leveling", URL);

        assert_eq!(detail.title, "Solo Leveling");
        assert_eq!(detail.description.as_deref(), Some("A hunterlevelsup."));
        assert_eq!(detail.cover.as_deref(), Some("/covers/solo.jpg"));
        assert_eq!(detail.tags, vec!["Action", "Fantasy"]);
        assert_eq!(detail.rating, None);
        assert_eq!(detail.url, URL);
        assert_eq!(detail.chapters.len(), 2);
        assert_eq!(detail.chapters[0].chapter_number, "2");
        assert_eq!(
            detail.chapters[0].url,
            "https://mangatek.com/reader/solo-leveling/2"
        );
        assert_eq!(detail.chapters[1].title, "Chapter 1");
    }

    #[test]
    fn test_meta_description_and_slug_title_fallback() {
        let html = r#"<html><head><meta name="description" content="From meta"></head><body></body></html>"#;

        let detail = parse_manga_detail(html, &base(), "berserk", URL);

        assert_eq!(detail.title, "berserk");
        assert_eq!(detail.description.as_deref(), Some("From meta"));
        assert_eq!(detail.cover, None);
        assert!(detail.tags.is_empty());
        assert!(detail.chapters.is_empty());
    }

    #[test]
    fn test_manga_chapter_links_fallback() {
        let html = r#"
            <div class="entry-title">Bleach</div>
            <a href="/manga/bleach">series</a>
            <a href="/manga/bleach/12">Ch. 12</a>
        "#;

        let detail = parse_manga_detail(html, &base(), "bleach", URL);

        assert_eq!(detail.title, "Bleach");
        assert_eq!(detail.chapters.len(), 1);
        assert_eq!(detail.chapters[0].chapter_number, "12");
        assert_eq!(detail.chapters[0].title, "Ch. 12");
    }

    #[test]
    fn test_missing_description() {
        let detail = parse_manga_detail("<h1>T</h1>", &base(), "t", URL);
        assert_eq!(detail.description, None);
    }
}
