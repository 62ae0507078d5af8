use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::model::OrderedMap;
use crate::report;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub show_id: String,
    pub season: u32,
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` when the key is missing, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub google_drive_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Option<String>>, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}

impl Episode {
    pub fn drive_url(&self) -> Option<&str> {
        self.google_drive_url.as_ref().and_then(Option::as_deref)
    }

    pub fn video(&self) -> Option<&str> {
        self.video_url.as_ref().and_then(Option::as_deref)
    }

    /// The URL the player would use: `videoUrl` when set, otherwise `googleDriveUrl`.
    pub fn playable_url(&self) -> Option<&str> {
        self.video()
            .filter(|u| !u.is_empty())
            .or(self.drive_url())
            .filter(|u| !u.is_empty())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn key(&self) -> String {
        format!("S{}E{}", self.season, self.episode_number)
    }
}

/// The StreamVault JSON database; keys other than `shows`/`episodes` are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub shows: Vec<Show>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub show_id: String,
    pub show_title: String,
    pub key: String,
    pub episode_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowCount {
    pub id: String,
    pub title: String,
    pub episodes: usize,
}

/// Shows sharing one title: the one with the most episodes is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateShows {
    pub kept: ShowCount,
    pub removed: Vec<ShowCount>,
}

impl Database {
    pub fn load(path: &Path) -> Result<Self> {
        report::load_json(path).context("Failed to load StreamVault data")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = report::to_json(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn find_show(&self, show_id: &str) -> Option<&Show> {
        self.shows.iter().find(|s| s.id == show_id)
    }

    pub fn episodes_for_show<'a>(&'a self, show_id: &'a str) -> impl Iterator<Item = &'a Episode> + 'a {
        self.episodes.iter().filter(move |e| e.show_id == show_id)
    }

    /// `SxEy` keys that occur more than once within a known show.
    pub fn duplicate_episodes(&self) -> Vec<DuplicateGroup> {
        let mut groups = Vec::new();

        for show in &self.shows {
            let mut by_key: BTreeMap<(u32, u32), Vec<&Episode>> = BTreeMap::new();
            for ep in self.episodes_for_show(&show.id) {
                by_key.entry((ep.season, ep.episode_number)).or_default().push(ep);
            }

            for (_, eps) in by_key.into_iter().filter(|(_, eps)| eps.len() > 1) {
                groups.push(DuplicateGroup {
                    show_id: show.id.clone(),
                    show_title: show.title.clone(),
                    key: eps[0].key(),
                    episode_ids: eps.iter().map(|e| e.id.clone().unwrap_or_default()).collect(),
                });
            }
        }

        groups
    }

    /// Groups shows by trimmed, lower-cased title. Within a group the show with
    /// the most episodes is kept; ties go to the one listed first.
    pub fn duplicate_shows(&self) -> Vec<DuplicateShows> {
        let mut by_title: OrderedMap<Vec<&Show>> = OrderedMap::new();
        for show in &self.shows {
            let title = show.title.trim().to_lowercase();
            match by_title.get_mut(&title) {
                Some(group) => group.push(show),
                None => by_title.insert(title, vec![show]),
            }
        }

        by_title
            .values()
            .filter(|group| group.len() > 1)
            .filter_map(|group| {
                let mut counts: Vec<ShowCount> = group
                    .iter()
                    .map(|show| ShowCount {
                        id: show.id.clone(),
                        title: show.title.clone(),
                        episodes: self.episodes_for_show(&show.id).count(),
                    })
                    .collect();
                counts.sort_by(|a, b| b.episodes.cmp(&a.episodes));
                let mut counts = counts.into_iter();
                let kept = counts.next()?;
                Some(DuplicateShows { kept, removed: counts.collect() })
            })
            .collect()
    }

    /// Drops every show `duplicate_shows` marks for removal, with its episodes.
    pub fn remove_duplicate_shows(&mut self) -> Vec<DuplicateShows> {
        let groups = self.duplicate_shows();
        let kept: HashSet<String> = groups.iter().map(|g| g.kept.id.clone()).collect();
        let removed: HashSet<String> = groups
            .iter()
            .flat_map(|g| g.removed.iter().map(|s| s.id.clone()))
            .filter(|id| !kept.contains(id))
            .collect();

        self.shows.retain(|s| !removed.contains(&s.id));
        self.episodes.retain(|e| !removed.contains(&e.show_id));
        groups
    }
}
