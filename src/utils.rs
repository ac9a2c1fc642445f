use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use url::Url;

use crate::types::SongLink;

static FORBIDDEN_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static BLANK_LINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static SONG_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Misy hira (\d+)").unwrap());
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Turn a slug hint into a safe file name: forbidden filesystem characters
/// are stripped, whitespace runs collapse to one space, and the result is
/// capped at 200 characters.
pub fn sanitize_filename(name: &str) -> String {
    let name = FORBIDDEN_CHARS.replace_all(name, "");
    let name = WHITESPACE_RUNS.replace_all(&name, " ");
    let name = name.trim();
    name.chars().take(200).collect()
}

/// Collapse three or more consecutive newlines to exactly two and trim.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINE_RUNS.replace_all(text, "\n\n").trim().to_string()
}

/// Parse the song count from a listing label such as "Misy hira 42".
pub fn parse_song_count(text: &str) -> Option<u32> {
    SONG_COUNT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Remove every parenthetical from a title, e.g. "Tsara (Mahaleo)" -> "Tsara".
pub fn strip_parenthetical(title: &str) -> String {
    PARENTHETICAL.replace_all(title, "").trim().to_string()
}

/// Extract the `page` query parameter from a pagination link target,
/// resolving relative hrefs against `base`.
pub fn page_query_param(href: &str, base: &Url) -> Option<u32> {
    let target = base.join(href).ok()?;
    target
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// Deduplicate song links by URL, keeping first-seen order.
pub fn dedup_song_links(links: Vec<SongLink>) -> Vec<SongLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

/// Render a byte count as a short human-readable size.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
