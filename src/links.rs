use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::model::{LinkKind, ShowLink, VideoLink};

static SEASON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"seasons?-(\d+)").expect("valid season pattern"));

static SHOW_LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[^/]+-online-[^/]+/?$").expect("valid show link pattern"));

static SHOW_SUFFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-online-[^-]+$").expect("valid show suffix pattern"));

// Tried in order, first hit wins
static DRIVE_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)drive\.google\.com/file/d/([a-zA-Z0-9_-]+)",
        r"(?i)drive-video-([a-zA-Z0-9_-]+)",
        r"(?i)/file/d/([a-zA-Z0-9_-]+)/preview",
        r#"(?i)id="drive-video-([a-zA-Z0-9_-]+)""#,
        r#"(?i)data-id="([a-zA-Z0-9_-]+)""#,
        r#"(?i)fileId["\s:=]+([a-zA-Z0-9_-]+)"#,
        r#"(?i)video[_-]?id["\s:=]+([a-zA-Z0-9_-]+)"#,
        r#"(?i)src="[^"]*?/d/([a-zA-Z0-9_-]+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid drive id pattern"))
    .collect()
});

// (kind, pattern, capture group holding the URL)
static VIDEO_PATTERNS: LazyLock<Vec<(LinkKind, Regex, usize)>> = LazyLock::new(|| {
    [
        (LinkKind::Mega, r#"(?i)https?://mega\.nz/[^\s'"<>]+"#, 0),
        (
            LinkKind::DirectVideo,
            r#"(?i)https?://[^\s'"<>]+\.(?:mp4|m3u8|webm|mkv|avi|mov)(?:\?[^\s'"<>]*)?"#,
            0,
        ),
        (LinkKind::IframeSrc, r#"(?i)<iframe[^>]+src=["']([^"']+)["']"#, 1),
        (LinkKind::VideoSrc, r#"(?i)<video[^>]+src=["']([^"']+)["']"#, 1),
        (LinkKind::SourceSrc, r#"(?i)<source[^>]+src=["']([^"']+)["']"#, 1),
    ]
    .into_iter()
    .map(|(kind, p, group)| (kind, Regex::new(p).expect("valid video pattern"), group))
    .collect()
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

const VIDEO_EXTENSIONS: [&str; 6] = [".mp4", ".m3u8", ".webm", ".mkv", ".avi", ".mov"];

const NON_DRIVE_HOSTS: [&str; 6] = [
    "vimeo.com",
    "dailymotion.com",
    "streamtape.com",
    "doodstream.com",
    "mixdrop.co",
    "upstream.to",
];

// Ads, trackers and social embeds that show up in iframe/src scans
const SKIP_DOMAINS: [&str; 7] = [
    "google.com",
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "youtube.com",
    "doubleclick.net",
    "googletagmanager.com",
];

/// Season number from a `season-N` / `seasons-N` URL segment.
pub fn season_number(url: &str) -> Option<u32> {
    SEASON_PATTERN
        .captures(&url.to_lowercase())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn is_drive_url(url: &str) -> bool {
    !url.is_empty() && url.to_lowercase().contains("drive.google.com")
}

/// Cheap scan of a season page for anything that looks like a non-Drive source.
pub fn has_non_drive_indicators(html: &str) -> bool {
    let html = html.to_lowercase();

    html.contains("mega.nz")
        || VIDEO_EXTENSIONS.iter().any(|ext| html.contains(ext))
        || NON_DRIVE_HOSTS.iter().any(|host| html.contains(host))
}

pub fn extract_drive_id(html: &str) -> Option<String> {
    DRIVE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
}

pub fn drive_view_url(id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", id)
}

/// Every non-Drive video URL in the page, grouped by pattern family.
///
/// May contain duplicates; see [`dedupe_links`].
pub fn extract_video_links(html: &str) -> Vec<VideoLink> {
    let mut links = Vec::new();

    for (kind, re, group) in VIDEO_PATTERNS.iter() {
        for caps in re.captures_iter(html) {
            let Some(m) = caps.get(*group) else { continue };
            let url = m.as_str();

            if is_drive_url(url) {
                continue;
            }

            let url_lower = url.to_lowercase();
            if SKIP_DOMAINS.iter().any(|domain| url_lower.contains(domain)) {
                continue;
            }

            links.push(VideoLink { url: url.to_string(), kind: kind.clone() });
        }
    }

    links
}

/// Keeps the first occurrence of each URL.
pub fn dedupe_links(links: Vec<VideoLink>) -> Vec<VideoLink> {
    let mut seen = HashSet::new();
    links.into_iter().filter(|link| seen.insert(link.url.clone())).collect()
}

/// Resolves `href` against `base`. Absolute hrefs come back exactly as written.
pub fn resolve_url(base: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Episode pages linked from a season page that belong to the same season.
pub fn episode_links(html: &str, season_url: &str, base: &str) -> Vec<String> {
    let Some(current_season) = season_number(season_url) else {
        return Vec::new();
    };

    let mut links: Vec<String> = hrefs(html)
        .into_iter()
        .filter(|href| href.to_lowercase().contains("episode"))
        .filter(|href| season_number(href) == Some(current_season))
        .map(|href| resolve_url(base, &href))
        .collect();

    links.sort();
    links.dedup();
    links
}

/// Season pages linked from a show page, ordered by season number.
pub fn season_links(html: &str, base: &str) -> Vec<String> {
    let mut links: Vec<String> = hrefs(html)
        .into_iter()
        .filter(|href| {
            let lower = href.to_lowercase();
            SEASON_PATTERN.is_match(&lower) && !lower.contains("episode")
        })
        .map(|href| resolve_url(base, &href))
        .collect();

    links.sort();
    links.dedup();
    links.sort_by_key(|url| season_number(url).unwrap_or(0));
    links
}

/// Shows listed on one category page, in page order (may repeat).
pub fn category_shows(html: &str, base: &str) -> Vec<ShowLink> {
    hrefs(html)
        .into_iter()
        .filter(|href| {
            let lower = href.to_lowercase();
            SHOW_LINK_PATTERN.is_match(href) && !lower.contains("seasons-") && !lower.contains("episode")
        })
        .filter_map(|href| {
            let name = show_name_from_href(&href)?;
            Some(ShowLink { name, url: resolve_url(base, &href) })
        })
        .collect()
}

fn show_name_from_href(href: &str) -> Option<String> {
    let last = href.trim_end_matches('/').rsplit('/').next()?;
    let stripped = SHOW_SUFFIX_PATTERN.replace(last, "");
    let name = title_case(&stripped.replace('-', " "));
    if name.is_empty() { None } else { Some(name) }
}

/// Upper-cases the first letter of every run of letters, lower-cases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }

    out
}

pub fn page_url(category_url: &str, page: u32) -> String {
    if page > 1 {
        format!("{}?pg={}", category_url, page)
    } else {
        category_url.to_string()
    }
}

/// Last path segment of a URL, used to name output files.
pub fn url_slug(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
