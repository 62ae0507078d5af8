use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Where a scraped video link was found in the episode page.
///
/// Types written by other tools (`[streamtape] …` in a text export) are kept as
/// `Other` so nothing is lost on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Mega,
    DirectVideo,
    IframeSrc,
    VideoSrc,
    SourceSrc,
    Other(String),
}

impl LinkKind {
    pub fn as_str(&self) -> &str {
        match self {
            LinkKind::Mega => "mega",
            LinkKind::DirectVideo => "direct_video",
            LinkKind::IframeSrc => "iframe_src",
            LinkKind::VideoSrc => "video_src",
            LinkKind::SourceSrc => "source_src",
            LinkKind::Other(name) => name,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(anyhow::anyhow!("Empty link type")),
            "mega" => Ok(LinkKind::Mega),
            "direct_video" => Ok(LinkKind::DirectVideo),
            "iframe_src" => Ok(LinkKind::IframeSrc),
            "video_src" => Ok(LinkKind::VideoSrc),
            "source_src" => Ok(LinkKind::SourceSrc),
            other => Ok(LinkKind::Other(other.to_string())),
        }
    }
}

impl Serialize for LinkKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LinkKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLink {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

/// Non-Drive links found on one episode page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeVideos {
    pub episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_url: Option<String>,
    pub video_links: Vec<VideoLink>,
}

/// Google Drive link found on one episode page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveEpisode {
    pub episode: u32,
    pub episode_url: String,
    pub google_drive_link: String,
}

/// A show listed on a category page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowLink {
    pub name: String,
    pub url: String,
}

/// String-keyed map that keeps insertion order and serializes as a JSON object.
///
/// Season keys such as `"Season 10"` must stay in crawl order, so a sorted map
/// is not an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Inserts or replaces; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// `"Season N"` → episodes, in crawl order.
pub type SeasonMap<T> = OrderedMap<Vec<T>>;

/// Show name → seasons, as produced by category extraction and the text converter.
pub type ShowCatalog = OrderedMap<SeasonMap<EpisodeVideos>>;

pub fn season_key(number: usize) -> String {
    format!("Season {}", number)
}

/// Total number of episode entries across every season of a show.
pub fn episode_count<T>(seasons: &SeasonMap<T>) -> usize {
    seasons.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_map_keeps_insertion_order_in_json() {
        let mut seasons: SeasonMap<u32> = OrderedMap::new();
        seasons.insert("Season 2", vec![1]);
        seasons.insert("Season 10", vec![2, 3]);
        seasons.insert("Season 1", vec![]);

        let json = serde_json::to_string(&seasons).unwrap();
        assert_eq!(json, r#"{"Season 2":[1],"Season 10":[2,3],"Season 1":[]}"#);

        let back: SeasonMap<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["Season 2", "Season 10", "Season 1"]);
        assert_eq!(episode_count(&back), 3);
    }

    #[test]
    fn replacing_a_key_keeps_its_position() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", &3), ("b", &2)]);
        assert_eq!(map.remove("a"), Some(3));
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn link_kind_uses_snake_case_names() {
        let link = VideoLink { url: "https://mega.nz/x".into(), kind: LinkKind::DirectVideo };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "direct_video");
        assert_eq!("iframe_src".parse::<LinkKind>().unwrap(), LinkKind::IframeSrc);
        assert!("".parse::<LinkKind>().is_err());
    }

    #[test]
    fn unknown_link_types_are_kept_by_name() {
        let kind: LinkKind = "streamtape".parse().unwrap();
        assert_eq!(kind, LinkKind::Other("streamtape".into()));

        let link: VideoLink = serde_json::from_str(r#"{"url":"https://streamtape.com/e/1","type":"streamtape"}"#).unwrap();
        assert_eq!(link.kind, kind);
        assert_eq!(serde_json::to_value(&link).unwrap()["type"], "streamtape");
    }
}
