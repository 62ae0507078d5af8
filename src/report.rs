use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::model::{DriveEpisode, EpisodeVideos, SeasonMap, ShowCatalog};

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(60);
    let _ = write!(out, "\n{}\n{}\n{}\n", rule, title, rule);
}

fn episode_block(out: &mut String, episode: &EpisodeVideos, with_url: bool) {
    let _ = writeln!(out, "\nEpisode {}:", episode.episode);
    if with_url {
        if let Some(url) = &episode.episode_url {
            let _ = writeln!(out, "  URL: {}", url);
        }
    }
    for video in &episode.video_links {
        let _ = writeln!(out, "  [{}] {}", video.kind, video.url);
    }
}

pub fn drive_season_text(episodes: &[DriveEpisode]) -> String {
    let mut out = String::new();
    for ep in episodes {
        let _ = writeln!(out, "Episode {}: {}", ep.episode, ep.google_drive_link);
    }
    out
}

pub fn drive_show_text(seasons: &SeasonMap<DriveEpisode>) -> String {
    let mut out = String::new();
    for (season, episodes) in seasons.iter() {
        banner(&mut out, &format!("{} ({} episodes)", season.to_uppercase(), episodes.len()));
        out.push_str(&drive_season_text(episodes));
    }
    out
}

pub fn video_season_text(episodes: &[EpisodeVideos]) -> String {
    let mut out = String::new();
    for ep in episodes {
        episode_block(&mut out, ep, false);
    }
    out
}

pub fn video_show_text(seasons: &SeasonMap<EpisodeVideos>) -> String {
    let mut out = String::new();
    for (season, episodes) in seasons.iter() {
        banner(&mut out, &format!("{} ({} episodes)", season.to_uppercase(), episodes.len()));
        for ep in episodes {
            episode_block(&mut out, ep, true);
        }
    }
    out
}

/// Category export; `convert` reads this format back.
pub fn category_text(catalog: &ShowCatalog) -> String {
    let mut out = String::new();
    for (show, seasons) in catalog.iter() {
        banner(&mut out, &format!("SHOW: {}", show.to_uppercase()));
        for (season, episodes) in seasons.iter() {
            let _ = write!(out, "\n{} ({} episodes)\n{}\n", season, episodes.len(), "-".repeat(40));
            for ep in episodes {
                episode_block(&mut out, ep, false);
            }
        }
    }
    out
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON")
}

pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = to_json(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Data saved to: {}", path.display());
    Ok(())
}

pub fn save_text(text: &str, path: &Path) -> Result<()> {
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Data saved to: {}", path.display());
    Ok(())
}

pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn print_results(title: &str, body: &str) {
    println!("\n{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
    println!("{}", body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkKind, OrderedMap, VideoLink};

    fn episode(n: u32) -> EpisodeVideos {
        EpisodeVideos {
            episode: n,
            episode_url: Some(format!("https://x.com/show-seasons-1-episode-{}/", n)),
            video_links: vec![VideoLink { url: format!("https://cdn.x.com/e{}.mp4", n), kind: LinkKind::DirectVideo }],
        }
    }

    #[test]
    fn test_drive_show_text() {
        let mut seasons = OrderedMap::new();
        seasons.insert(
            "Season 1",
            vec![DriveEpisode {
                episode: 1,
                episode_url: "https://x.com/e1".into(),
                google_drive_link: "https://drive.google.com/file/d/A/view".into(),
            }],
        );
        let text = drive_show_text(&seasons);
        let rule = "=".repeat(60);
        assert_eq!(
            text,
            format!("\n{rule}\nSEASON 1 (1 episodes)\n{rule}\nEpisode 1: https://drive.google.com/file/d/A/view\n")
        );
    }

    #[test]
    fn test_show_text_includes_episode_url() {
        let mut seasons = OrderedMap::new();
        seasons.insert("Season 1", vec![episode(1)]);
        let text = video_show_text(&seasons);
        assert!(text.contains("\nEpisode 1:\n  URL: https://x.com/show-seasons-1-episode-1/\n  [direct_video] https://cdn.x.com/e1.mp4\n"));
    }

    #[test]
    fn test_category_text_layout() {
        let mut seasons = OrderedMap::new();
        seasons.insert("Season 2", vec![episode(3)]);
        let mut catalog = OrderedMap::new();
        catalog.insert("Banshee", seasons);

        let text = category_text(&catalog);
        assert!(text.contains("SHOW: BANSHEE\n"));
        assert!(text.contains(&format!("\nSeason 2 (1 episodes)\n{}\n", "-".repeat(40))));
        assert!(!text.contains("URL:"));
    }

    #[test]
    fn test_json_is_pretty_and_keeps_unicode() {
        let json = to_json(&serde_json::json!({"title": "Élite"})).unwrap();
        assert_eq!(json, "{\n  \"title\": \"Élite\"\n}");
    }
}
