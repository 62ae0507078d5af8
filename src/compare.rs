use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::{Database, Show};
use crate::model::{OrderedMap, ShowCatalog, episode_count};

const TITLE_SUFFIXES: [&str; 3] = [" tv series", " online english dubbed", " online english"];

const LIST_SUFFIXES: [&str; 3] = [" tv series", " online english dubbed", " online english subtitles"];

/// Drive IDs and markers used for episodes that have no real video yet.
pub const PLACEHOLDER_MARKERS: [&str; 2] = ["1zcFHiGEOwgq2-j6hMqpsE0ov7qcIUqCd", "PLACEHOLDER"];

fn strip_suffixes(title: &str, suffixes: &[&str]) -> String {
    let mut cleaned = title.trim().to_lowercase();
    for suffix in suffixes {
        cleaned = cleaned.replace(suffix, "");
    }
    cleaned.trim().to_string()
}

/// Lower-cased title with the site's listing suffixes removed.
pub fn normalize_title(title: &str) -> String {
    strip_suffixes(title, &TITLE_SUFFIXES)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowMatch {
    pub extracted: String,
    pub streamvault: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_extracted: usize,
    pub already_in_streamvault: usize,
    pub new_shows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub matches: Vec<ShowMatch>,
    pub new_shows: Vec<String>,
    pub summary: ComparisonSummary,
}

fn partial_match<'a>(extracted: &str, shows: impl IntoIterator<Item = &'a Show>) -> Option<&'a Show> {
    let wanted = normalize_title(extracted);
    if wanted.is_empty() {
        return None;
    }

    shows.into_iter().find(|show| {
        let candidate = normalize_title(&show.title);
        !candidate.is_empty()
            && (candidate == wanted || candidate.contains(&wanted) || wanted.contains(&candidate))
    })
}

/// Splits extracted shows into ones already in the database and new ones.
pub fn compare_shows(extracted: &ShowCatalog, db: &Database) -> Comparison {
    // A later show with the same title replaces an earlier one in place.
    let mut by_title: OrderedMap<&Show> = OrderedMap::new();
    for show in &db.shows {
        by_title.insert(show.title.trim().to_lowercase(), show);
    }

    let mut comparison = Comparison::default();

    for name in extracted.keys() {
        let exact = by_title.get(&name.trim().to_lowercase()).copied();
        match exact.or_else(|| partial_match(name, by_title.values().copied())) {
            Some(show) => comparison.matches.push(ShowMatch {
                extracted: name.to_string(),
                streamvault: show.title.clone(),
                id: show.id.clone(),
            }),
            None => comparison.new_shows.push(name.to_string()),
        }
    }

    comparison.summary = ComparisonSummary {
        total_extracted: extracted.len(),
        already_in_streamvault: comparison.matches.len(),
        new_shows: comparison.new_shows.len(),
    };
    comparison
}

/// Reads a title list from either a JSON array of strings or an object keyed by title.
pub fn titles_from_json(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| anyhow!("Expected a string, found {}", v)))
            .collect(),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        other => Err(anyhow!("Expected a JSON array or object, found {}", other)),
    }
}

/// Titles of `left` with no normalised counterpart in `right`.
pub fn compare_lists(left: &[String], right: &[String]) -> Vec<String> {
    let right: Vec<String> = right.iter().map(|t| strip_suffixes(t, &LIST_SUFFIXES)).collect();
    left.iter()
        .filter(|t| !right.contains(&strip_suffixes(t, &LIST_SUFFIXES)))
        .cloned()
        .collect()
}

pub fn is_placeholder(url: Option<&str>) -> bool {
    match url {
        None => true,
        Some(url) => url.is_empty() || PLACEHOLDER_MARKERS.iter().any(|m| url.contains(m)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowLinkState {
    pub name: String,
    pub extracted_name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streamvault_episodes: Option<usize>,
    pub extracted_episodes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_some_real: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_some_placeholders: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkStatusSummary {
    pub with_real_links: usize,
    pub with_placeholders: usize,
    pub no_episodes: usize,
}

/// Output of `link_status`; saved as JSON and read back by `apply_extracted`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkStatus {
    pub shows_with_links: Vec<ShowLinkState>,
    pub shows_with_placeholders: Vec<ShowLinkState>,
    pub shows_no_episodes: Vec<ShowLinkState>,
    pub summary: LinkStatusSummary,
}

/// Classifies every matched show by the state of its stored episode URLs.
pub fn link_status(comparison: &Comparison, db: &Database, extracted: &ShowCatalog) -> LinkStatus {
    let mut status = LinkStatus::default();

    for m in &comparison.matches {
        let extracted_episodes = extracted.get(&m.extracted).map(episode_count).unwrap_or(0);
        let episodes: Vec<_> = db.episodes_for_show(&m.id).collect();

        if episodes.is_empty() {
            status.shows_no_episodes.push(ShowLinkState {
                name: m.streamvault.clone(),
                extracted_name: m.extracted.clone(),
                id: m.id.clone(),
                streamvault_episodes: None,
                extracted_episodes,
                has_some_real: None,
                has_some_placeholders: None,
            });
            continue;
        }

        let placeholders = episodes.iter().filter(|e| is_placeholder(e.playable_url())).count();
        let has_real = placeholders < episodes.len();
        let has_placeholders = placeholders > 0;

        let mut state = ShowLinkState {
            name: m.streamvault.clone(),
            extracted_name: m.extracted.clone(),
            id: m.id.clone(),
            streamvault_episodes: Some(episodes.len()),
            extracted_episodes,
            has_some_real: None,
            has_some_placeholders: None,
        };

        if has_real && !has_placeholders {
            status.shows_with_links.push(state);
        } else {
            state.has_some_real = Some(has_real);
            state.has_some_placeholders = Some(has_placeholders);
            status.shows_with_placeholders.push(state);
        }
    }

    status.summary = LinkStatusSummary {
        with_real_links: status.shows_with_links.len(),
        with_placeholders: status.shows_with_placeholders.len(),
        no_episodes: status.shows_no_episodes.len(),
    };
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  DEXTER TV SERIES "), "dexter");
        assert_eq!(normalize_title("Etoile Tv Series Online English Dubbed"), "etoile");
        assert_eq!(normalize_title("Stranger Things Online English"), "stranger things");
    }

    #[test]
    fn test_compare_lists_strips_subtitles_suffix() {
        let left = vec!["Dark Online English Subtitles".to_string(), "Lost Tv Series".to_string()];
        let right = vec!["dark".to_string()];
        assert_eq!(compare_lists(&left, &right), vec!["Lost Tv Series"]);
    }

    #[test]
    fn test_titles_from_json_shapes() {
        let arr = serde_json::json!(["A", "B"]);
        assert_eq!(titles_from_json(&arr).unwrap(), vec!["A", "B"]);
        let obj = serde_json::json!({"A": {}, "B": {}});
        assert_eq!(titles_from_json(&obj).unwrap().len(), 2);
        assert!(titles_from_json(&serde_json::json!([1])).is_err());
        assert!(titles_from_json(&serde_json::json!("A")).is_err());
    }

    fn db(shows: serde_json::Value) -> Database {
        serde_json::from_value(serde_json::json!({"shows": shows, "episodes": []})).unwrap()
    }

    fn catalog(names: &[&str]) -> ShowCatalog {
        let mut catalog = ShowCatalog::new();
        for name in names {
            catalog.insert(*name, OrderedMap::new());
        }
        catalog
    }

    #[test]
    fn test_duplicate_titles_resolve_to_the_last_show() {
        let db = db(serde_json::json!([
            {"id": "old", "title": "Dexter"},
            {"id": "dark-id", "title": "Dark"},
            {"id": "new", "title": "dexter "}
        ]));
        let comparison = compare_shows(&catalog(&["DEXTER", "Dexter Tv Series"]), &db);
        assert_eq!(comparison.matches.len(), 2);
        assert_eq!(comparison.matches[0].id, "new");
        assert_eq!(comparison.matches[0].streamvault, "dexter ");
        assert_eq!(comparison.matches[1].id, "new");
    }

    #[test]
    fn test_empty_titles_never_partially_match() {
        let db = db(serde_json::json!([{"id": "blank", "title": "  "}]));
        let comparison = compare_shows(&catalog(&["Dark", "Lost Tv Series"]), &db);
        assert!(comparison.matches.is_empty());
        assert_eq!(comparison.new_shows, vec!["Dark", "Lost Tv Series"]);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder(None));
        assert!(is_placeholder(Some("")));
        assert!(is_placeholder(Some("https://drive.google.com/file/d/1zcFHiGEOwgq2-j6hMqpsE0ov7qcIUqCd/preview")));
        assert!(!is_placeholder(Some("https://cdn.x.com/e1.mp4")));
    }
}
