use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::model::{EpisodeVideos, SeasonMap, ShowCatalog, VideoLink, season_key};

static SHOW_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"={60,}\nSHOW: (.+?)\n={60,}").expect("valid show header"));

static SEASON_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Season (\d+) \((\d+) episodes\)\n-{40,}").expect("valid season header")
});

static EPISODE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Episode (\d+):").expect("valid episode header"));

static LINK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.+?)\] (.+)").expect("valid link line"));

/// Splits `text` at every match of `re`, pairing capture group 1 with the text
/// that follows the match up to the next one.
fn sections<'a>(re: &Regex, text: &'a str) -> Vec<(&'a str, &'a str)> {
    let matches: Vec<_> = re.captures_iter(text).collect();
    let mut out = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else { continue };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        out.push((label.as_str(), &text[whole.end()..end]));
    }

    out
}

fn parse_links(body: &str) -> Vec<VideoLink> {
    let mut links = Vec::new();

    for line in body.trim().lines().map(str::trim) {
        if !line.starts_with('[') {
            continue;
        }
        let Some(caps) = LINK_LINE.captures(line) else { continue };
        match caps[1].parse() {
            Ok(kind) => links.push(VideoLink { url: caps[2].to_string(), kind }),
            Err(e) => warn!("Skipping link line {:?}: {}", line, e),
        }
    }

    links
}

fn parse_season(body: &str) -> Vec<EpisodeVideos> {
    sections(&EPISODE_HEADER, body)
        .into_iter()
        .filter_map(|(number, content)| {
            let episode = number.parse().ok()?;
            let video_links = parse_links(content);
            if video_links.is_empty() {
                return None;
            }
            Some(EpisodeVideos { episode, episode_url: None, video_links })
        })
        .collect()
}

/// Parses the category text export back into a show catalogue.
pub fn parse_category_text(content: &str) -> ShowCatalog {
    let content = content.replace("\r\n", "\n");
    let mut catalog = ShowCatalog::new();

    for (show, show_body) in sections(&SHOW_HEADER, &content) {
        let mut seasons = SeasonMap::new();

        for (number, season_body) in sections(&SEASON_HEADER, show_body) {
            let Ok(number) = number.parse::<usize>() else { continue };
            seasons.insert(season_key(number), parse_season(season_body));
        }

        catalog.insert(show.trim(), seasons);
    }

    catalog
}

/// Drops the named shows, returning the names that were actually present.
pub fn remove_shows(catalog: &mut ShowCatalog, names: &[String]) -> Vec<String> {
    let mut removed = Vec::new();

    for name in names {
        if catalog.remove(name).is_some() {
            info!("Removed: {}", name);
            removed.push(name.clone());
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinkKind;

    fn sample() -> String {
        let eq = "=".repeat(60);
        let dash = "-".repeat(40);
        format!(
            "\n{eq}\nSHOW: BANSHEE\n{eq}\n\
             \nSeason 1 (2 episodes)\n{dash}\n\
             \nEpisode 1:\n  [direct_video] https://cdn.x.com/B_S01E01.mp4\n  [mega] https://mega.nz/file/A\n\
             \nEpisode 2:\n  [iframe_src] https://player.x.com/e/2\n\
             \nSeason 2 (1 episodes)\n{dash}\n\
             \nEpisode 1:\n\
             \n{eq}\nSHOW: DEXTER TV SERIES\n{eq}\n\
             \nSeason 1 (1 episodes)\n{dash}\n\
             \nEpisode 4:\n  [video_src] https://cdn.x.com/d4.mp4\n"
        )
    }

    #[test]
    fn parses_shows_seasons_and_links() {
        let catalog = parse_category_text(&sample());
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["BANSHEE", "DEXTER TV SERIES"]);

        let banshee = catalog.get("BANSHEE").unwrap();
        let season1 = banshee.get("Season 1").unwrap();
        assert_eq!(season1.len(), 2);
        assert_eq!(season1[0].video_links.len(), 2);
        assert_eq!(season1[0].video_links[1].kind, LinkKind::Mega);
        assert_eq!(season1[1].video_links[0].url, "https://player.x.com/e/2");
        assert!(season1[0].episode_url.is_none());

        // an episode without links is dropped but the season stays
        assert!(banshee.get("Season 2").unwrap().is_empty());

        let dexter = catalog.get("DEXTER TV SERIES").unwrap();
        assert_eq!(dexter.get("Season 1").unwrap()[0].episode, 4);
    }

    #[test]
    fn keeps_link_types_it_does_not_know() {
        let eq = "=".repeat(60);
        let dash = "-".repeat(40);
        let text = format!(
            "{eq}\nSHOW: LOST\n{eq}\n\nSeason 1 (1 episodes)\n{dash}\n\nEpisode 1:\n  [streamtape] https://streamtape.com/e/1\n"
        );
        let catalog = parse_category_text(&text);
        let season1 = catalog.get("LOST").unwrap().get("Season 1").unwrap();
        assert_eq!(season1.len(), 1);
        assert_eq!(season1[0].video_links[0].kind, LinkKind::Other("streamtape".into()));
        assert_eq!(season1[0].video_links[0].url, "https://streamtape.com/e/1");
    }

    #[test]
    fn accepts_windows_line_endings() {
        let catalog = parse_category_text(&sample().replace('\n', "\r\n"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn removes_only_present_shows() {
        let mut catalog = parse_category_text(&sample());
        let removed = remove_shows(&mut catalog, &["DEXTER TV SERIES".to_string(), "THE FLASH".to_string()]);
        assert_eq!(removed, vec!["DEXTER TV SERIES"]);
        assert_eq!(catalog.len(), 1);
    }
}
