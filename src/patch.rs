use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compare::LinkStatus;
use crate::database::{Database, Episode};
use crate::model::{LinkKind, ShowCatalog, VideoLink};

/// Which episode field a patch writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlField {
    #[default]
    #[serde(rename = "googleDriveUrl")]
    GoogleDriveUrl,
    #[serde(rename = "videoUrl")]
    VideoUrl,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchEntry {
    /// Missing season matches the episode number in any season.
    pub season: Option<u32>,
    pub episode: u32,
    pub url: String,
}

/// Declarative list of episode URLs to write into one show.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatchManifest {
    pub show_id: String,
    #[serde(default)]
    pub field: UrlField,
    /// `[season, episode]` pairs that must not be touched.
    #[serde(default)]
    pub skip: Vec<(u32, u32)>,
    #[serde(default)]
    pub episodes: Vec<PatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatchedEpisode {
    pub season: u32,
    pub episode: u32,
    pub title: String,
    pub old_url: Option<String>,
    pub new_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchOutcome {
    pub updated: Vec<PatchedEpisode>,
    pub skipped: Vec<(u32, u32)>,
    pub unmapped: Vec<(u32, u32)>,
}

impl PatchManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read patch manifest: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Exact (season, episode) entries win over season-less ones.
    pub fn url_for(&self, season: u32, episode: u32) -> Option<&str> {
        self.episodes
            .iter()
            .find(|e| e.season == Some(season) && e.episode == episode)
            .or_else(|| self.episodes.iter().find(|e| e.season.is_none() && e.episode == episode))
            .map(|e| e.url.as_str())
    }
}

fn field_mut(episode: &mut Episode, field: UrlField) -> &mut Option<Option<String>> {
    match field {
        UrlField::GoogleDriveUrl => &mut episode.google_drive_url,
        UrlField::VideoUrl => &mut episode.video_url,
    }
}

/// Writes the manifest's URLs into the matching episodes of its show.
pub fn apply_patch(db: &mut Database, manifest: &PatchManifest) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();

    if db.find_show(&manifest.show_id).is_none() {
        warn!("Show {} is not in the database", manifest.show_id);
    }

    for episode in db.episodes.iter_mut().filter(|e| e.show_id == manifest.show_id) {
        let key = (episode.season, episode.episode_number);

        if manifest.skip.contains(&key) {
            info!("Skipping S{}E{} - already updated", key.0, key.1);
            outcome.skipped.push(key);
            continue;
        }

        let Some(url) = manifest.url_for(key.0, key.1) else {
            warn!("No URL mapping for S{}E{}", key.0, key.1);
            outcome.unmapped.push(key);
            continue;
        };

        let slot = field_mut(episode, manifest.field);
        let old_url = slot.replace(Some(url.to_string())).flatten();
        info!("Updated S{}E{}: {}", key.0, key.1, episode.title());

        outcome.updated.push(PatchedEpisode {
            season: key.0,
            episode: key.1,
            title: episode.title().to_string(),
            old_url,
            new_url: url.to_string(),
        });
    }

    outcome
}

/// `"Season 3"` → 3.
fn season_number(key: &str) -> Option<u32> {
    key.trim().strip_prefix("Season")?.trim().parse().ok()
}

/// A `video_src` link when there is one, otherwise the first link.
fn preferred_link(links: &[VideoLink]) -> Option<&VideoLink> {
    links.iter().find(|l| l.kind == LinkKind::VideoSrc).or_else(|| links.first())
}

/// Moves extracted video links into the database for every show that
/// `link_status` found with placeholders or without episodes.
///
/// Each matched episode gets `videoUrl` set and `googleDriveUrl` nulled.
/// Extracted episodes without links are reported as skipped, and ones with
/// no database record as unmapped.
pub fn apply_extracted(db: &mut Database, status: &LinkStatus, catalog: &ShowCatalog) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();

    for show in status.shows_with_placeholders.iter().chain(&status.shows_no_episodes) {
        let Some(seasons) = catalog.get(&show.extracted_name) else {
            warn!("No extracted data found for {}", show.name);
            continue;
        };
        info!("Updating {} ({})", show.name, show.id);

        for (season_key, episodes) in seasons.iter() {
            let Some(season) = season_number(season_key) else {
                warn!("Unrecognised season key {:?} for {}", season_key, show.name);
                continue;
            };

            for extracted in episodes {
                let key = (season, extracted.episode);
                let Some(link) = preferred_link(&extracted.video_links) else {
                    outcome.skipped.push(key);
                    continue;
                };

                let Some(episode) = db
                    .episodes
                    .iter_mut()
                    .find(|e| e.show_id == show.id && e.season == key.0 && e.episode_number == key.1)
                else {
                    debug!("{} S{}E{} has no database record", show.name, key.0, key.1);
                    outcome.unmapped.push(key);
                    continue;
                };

                let old_url = episode.video_url.replace(Some(link.url.clone())).flatten();
                episode.google_drive_url = Some(None);
                info!("Updated {} S{}E{} with {}", show.name, key.0, key.1, link.kind);

                outcome.updated.push(PatchedEpisode {
                    season: key.0,
                    episode: key.1,
                    title: episode.title().to_string(),
                    old_url,
                    new_url: link.url.clone(),
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
show_id = "banshee"
skip = [[1, 1]]

[[episodes]]
season = 1
episode = 2
url = "https://cdn.x.com/B_S01E02.mp4"

[[episodes]]
episode = 3
url = "https://cdn.x.com/any-season-e3.mp4"

[[episodes]]
season = 2
episode = 3
url = "https://cdn.x.com/B_S02E03.mp4"
"#;

    #[test]
    fn test_manifest_defaults_and_lookup() {
        let manifest = PatchManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.field, UrlField::GoogleDriveUrl);
        assert_eq!(manifest.skip, vec![(1, 1)]);
        assert_eq!(manifest.url_for(2, 3), Some("https://cdn.x.com/B_S02E03.mp4"));
        assert_eq!(manifest.url_for(5, 3), Some("https://cdn.x.com/any-season-e3.mp4"));
        assert_eq!(manifest.url_for(1, 9), None);
    }

    #[test]
    fn test_video_url_field() {
        let manifest = PatchManifest::parse("show_id = \"x\"\nfield = \"videoUrl\"").unwrap();
        assert_eq!(manifest.field, UrlField::VideoUrl);
        assert!(manifest.episodes.is_empty());
        assert!(PatchManifest::parse("field = \"videoUrl\"").is_err());
    }

    #[test]
    fn test_shipped_manifests() {
        let banshee = PatchManifest::parse(include_str!("../patches/banshee.toml")).unwrap();
        assert_eq!(banshee.episodes.len(), 37);
        assert_eq!(banshee.skip, vec![(1, 1)]);
        assert_eq!(banshee.url_for(1, 1), None);
        assert!(banshee.url_for(4, 8).unwrap().ends_with("Banshee_S04E08-ENG.mp4"));

        let hers = PatchManifest::parse(include_str!("../patches/his-and-hers.toml")).unwrap();
        assert_eq!(hers.field, UrlField::GoogleDriveUrl);
        assert!(hers.url_for(1, 6).unwrap().contains("1y7z24puBEhW6qNOpK2kSqZaoxsZK_bDF"));
        assert_eq!(hers.url_for(1, 7), None);
    }

    #[test]
    fn test_season_number_and_preferred_link() {
        assert_eq!(season_number("Season 12"), Some(12));
        assert_eq!(season_number("Specials"), None);

        let links = vec![
            VideoLink { url: "https://mega.nz/file/a".into(), kind: LinkKind::Mega },
            VideoLink { url: "https://cdn.x.com/a.mp4".into(), kind: LinkKind::VideoSrc },
        ];
        assert_eq!(preferred_link(&links).unwrap().url, "https://cdn.x.com/a.mp4");
        assert_eq!(preferred_link(&links[..1]).unwrap().kind, LinkKind::Mega);
        assert!(preferred_link(&[]).is_none());
    }
}
