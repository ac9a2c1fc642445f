//! HTML extraction for listing and song pages.
//!
//! Everything in this module is a pure function over an HTML string plus the
//! site base URL, so the extraction logic is testable against constructed
//! fixtures. Traversal goes through `scraper`'s typed DOM (`Html`,
//! `Selector`, `ElementRef`) rather than string matching; hrefs are resolved
//! against the base URL so relative and absolute links behave the same.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::{
    types::{Artist, SongLink, SongRecord},
    utils::{collapse_blank_lines, page_query_param, parse_song_count, strip_parenthetical},
};

/// Text carried by the source-attribution element on every lyrics page.
const SOURCE_MARKER: &str = "Nalaina tao amin'ny tononkira.serasera.org";
/// Weaker fallback marker when the themed attribution block is absent.
const SOURCE_MARKER_FALLBACK: &str = "tononkira.serasera.org";

static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static LAST_PAGE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[aria-label="Farany"]"#).unwrap());
static SOURCE_DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.print.my-3.fst-italic").unwrap());
static ANY_DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// Resolves the last page number of a paginated listing.
///
/// The listing's navigation carries a link labelled "Farany" ("last") whose
/// target has a `page` query parameter. A listing without that control is a
/// single page; a control whose target can't be parsed also counts as one
/// page. Never returns 0.
pub fn last_page_number(html: &str, base: &Url) -> u32 {
    let document = Html::parse_document(html);
    document
        .select(&LAST_PAGE_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| page_query_param(href, base))
        .unwrap_or(1)
        .max(1)
}

/// Extracts artists from one artist-listing page.
///
/// An artist entry is an anchor resolving to `/mpihira/<slug>` (exactly one
/// path segment after `mpihira`, so sub-pages like `/hira` and `/ankafizo`
/// are excluded) with non-empty text. The song count is advertised by the
/// next anchor in document order ("Misy hira N"); a missing or unparsable
/// label yields 0. Deduplication is left to the discovery loop.
pub fn extract_artists(html: &str, base: &Url) -> Vec<Artist> {
    let document = Html::parse_document(html);
    let anchors: Vec<(String, String)> = document
        .select(&ANCHORS)
        .filter_map(|a| {
            a.value()
                .attr("href")
                .map(|href| (href.to_string(), element_text(a)))
        })
        .collect();

    let mut artists = Vec::new();
    for (index, (href, name)) in anchors.iter().enumerate() {
        let Some(slug) = artist_slug(href, base) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let song_count = anchors
            .get(index + 1)
            .and_then(|(_, text)| parse_song_count(text))
            .unwrap_or(0);

        artists.push(Artist {
            name: name.clone(),
            slug,
            song_count,
        });
    }

    artists
}

/// Extracts song links from one page of an artist's song listing.
///
/// Matches anchors resolving under `/hira/`, deduplicated by URL in
/// first-seen order. The slug hint is the final path segment (the song
/// part of `/hira/<artist>/<song>`), or the only segment for flat links.
pub fn extract_song_links(html: &str, base: &Url) -> Vec<SongLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_on_site(href, base) else {
            continue;
        };
        let path = resolved.path();
        let Some(rest) = path.strip_prefix("/hira/") else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let parts: Vec<&str> = rest.split('/').collect();
        let slug = if parts.len() >= 2 {
            parts[parts.len() - 1]
        } else {
            parts[0]
        };
        let slug = if slug.is_empty() { parts[0] } else { slug };

        links.push(SongLink {
            url,
            slug: slug.to_string(),
        });
    }

    links
}

/// Extracts title, artist and lyrics from a song page.
///
/// Returns `None` when the page carries no source-attribution marker or the
/// lyrics collapse to nothing; the caller decides what a too-short body
/// means. Title and artist may legitimately come back empty.
pub fn extract_song(html: &str, base: &Url) -> Option<SongRecord> {
    let document = Html::parse_document(html);

    let mut title = document
        .select(&H2)
        .next()
        .or_else(|| document.select(&H1).next())
        .map(|el| strip_parenthetical(&element_text(el)))
        .unwrap_or_default();
    if title.is_empty() {
        title = document
            .select(&PAGE_TITLE)
            .next()
            .map(|el| {
                element_text(el)
                    .split('-')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();
    }

    let artist = document
        .select(&ANCHORS)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let resolved = resolve_on_site(href, base)?;
            let path = resolved.path();
            if path.starts_with("/mpihira/")
                && !path.contains("/hira")
                && !path.contains("/ankafizo")
            {
                let candidate = element_text(a);
                (candidate.chars().count() > 1).then_some(candidate)
            } else {
                None
            }
        })
        .next()
        .unwrap_or_default();

    let marker = find_source_marker(&document)?;

    let mut lines: Vec<String> = Vec::new();
    for sibling in marker.next_siblings() {
        match sibling.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            Node::Element(element) => {
                if matches!(element.name(), "div" | "h5" | "form" | "footer") {
                    break;
                }
                if element.name() == "br" {
                    lines.push("\n".to_string());
                } else if let Some(el) = ElementRef::wrap(sibling) {
                    let text = element_text(el);
                    if !text.is_empty() {
                        lines.push(text);
                    }
                }
            }
            _ => {}
        }
    }

    let lyrics = collapse_blank_lines(&lines.join("\n"));
    if lyrics.is_empty() {
        return None;
    }

    Some(SongRecord {
        title,
        artist,
        lyrics,
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn resolve_on_site(href: &str, base: &Url) -> Option<Url> {
    let resolved = base.join(href).ok()?;
    (resolved.host_str() == base.host_str()).then_some(resolved)
}

fn artist_slug(href: &str, base: &Url) -> Option<String> {
    let resolved = resolve_on_site(href, base)?;
    let rest = resolved.path().strip_prefix("/mpihira/")?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest.to_string())
}

/// Finds the element whose following siblings hold the lyrics. The themed
/// attribution block is preferred; any div directly carrying the site name
/// is accepted as a fallback.
fn find_source_marker<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
    document
        .select(&SOURCE_DIV)
        .find(|div| has_direct_text(div, SOURCE_MARKER))
        .or_else(|| {
            document
                .select(&ANY_DIV)
                .find(|div| has_direct_text(div, SOURCE_MARKER_FALLBACK))
        })
}

fn has_direct_text(el: &ElementRef, needle: &str) -> bool {
    el.children().any(|child| match child.value() {
        Node::Text(text) => text.contains(needle),
        _ => false,
    })
}
