//! Catalogue listing page

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::html::{attr_cascade, first_match, join_url, selector, selectors, stripped_text};
use super::slug::extract_slug_from_href;
use crate::domain::{MangaList, MangaSummary, PageLink, Pagination};

static MANGA_CARD: Lazy<Selector> = Lazy::new(|| selector("a.manga-card"));
static MANGA_LINK: Lazy<Selector> = Lazy::new(|| selector("a[href*='/manga/']"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static LINK_WITH_HREF: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static CARD_TITLE: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["h3", ".title", "h2"]));
static PAGER: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["nav[aria-label='الصفحات']", ".pagination", ".pagenavi"])
});

pub fn parse_manga_list(html: &str, base: &Url, page: u32) -> MangaList {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut items = card_items(root, base);
    if items.is_empty() {
        items = link_items(root, base);
    }

    let pagination = Pagination {
        current: page,
        pages: page_links(root, base),
    };

    MangaList::new(items, pagination)
}

fn card_items(root: ElementRef<'_>, base: &Url) -> Vec<MangaSummary> {
    collect_unique(root, &MANGA_CARD, |anchor, href, slug| {
        let img = anchor.select(&IMG).next();

        let title = match img {
            Some(img) => attr_cascade(img, &["alt"]),
            None => Some(stripped_text(anchor)).filter(|t| !t.is_empty()),
        }
        .unwrap_or_else(|| slug.to_string());

        MangaSummary {
            title: title.trim().to_string(),
            slug: slug.to_string(),
            url: join_url(base, href),
            cover: img.and_then(|img| attr_cascade(img, &["src"])),
        }
    })
}

fn link_items(root: ElementRef<'_>, base: &Url) -> Vec<MangaSummary> {
    collect_unique(root, &MANGA_LINK, |anchor, href, slug| {
        let title = first_match(anchor, &CARD_TITLE)
            .map(stripped_text)
            .unwrap_or_else(|| stripped_text(anchor));

        MangaSummary {
            title,
            slug: slug.to_string(),
            url: join_url(base, href),
            cover: anchor
                .select(&IMG)
                .next()
                .and_then(|img| attr_cascade(img, &["data-src", "src"])),
        }
    })
}

/// Map anchors to items, skipping empty and repeated slugs
fn collect_unique<F>(root: ElementRef<'_>, anchors: &Selector, mut build: F) -> Vec<MangaSummary>
where
    F: FnMut(ElementRef<'_>, &str, &str) -> MangaSummary,
{
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for anchor in root.select(anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let slug = extract_slug_from_href(href);

        if slug.is_empty() || !seen.insert(slug.clone()) {
            continue;
        }

        items.push(build(anchor, href, &slug));
    }

    items
}

fn page_links(root: ElementRef<'_>, base: &Url) -> Vec<PageLink> {
    let Some(pager) = first_match(root, &PAGER) else {
        return Vec::new();
    };

    pager
        .select(&LINK_WITH_HREF)
        .map(|a| PageLink {
            page: stripped_text(a),
            url: join_url(base, a.value().attr("href").unwrap_or_default()),
        })
        .collect()
}
