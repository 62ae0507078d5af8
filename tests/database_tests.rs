// Integration tests for the StreamVault database tooling

use std::fs;

use serde_json::json;
use streamvault_scraper::compare::{Comparison, LinkStatus, compare_shows, link_status};
use streamvault_scraper::database::Database;
use streamvault_scraper::model::{EpisodeVideos, LinkKind, SeasonMap, ShowCatalog, VideoLink};
use streamvault_scraper::patch::{PatchManifest, UrlField, apply_extracted, apply_patch};

const PLACEHOLDER: &str = "https://drive.google.com/file/d/1zcFHiGEOwgq2-j6hMqpsE0ov7qcIUqCd/preview";

fn sample_db() -> Database {
    serde_json::from_value(json!({
        "shows": [
            {"id": "banshee-id", "title": "Banshee", "year": 2013},
            {"id": "hers-id", "title": "His & Hers"},
            {"id": "dexter-id", "title": "Dexter"},
            {"id": "dark-id", "title": "Dark"}
        ],
        "episodes": [
            {"id": "b11", "showId": "banshee-id", "season": 1, "episodeNumber": 1, "title": "Pilot",
             "googleDriveUrl": "https://cdn.x.com/already-done.mp4", "videoUrl": null},
            {"id": "b12", "showId": "banshee-id", "season": 1, "episodeNumber": 2, "title": "The Rave",
             "googleDriveUrl": PLACEHOLDER, "videoUrl": null},
            {"id": "b21", "showId": "banshee-id", "season": 2, "episodeNumber": 1, "title": "Little Fish",
             "googleDriveUrl": PLACEHOLDER, "videoUrl": null},
            {"id": "h11", "showId": "hers-id", "season": 1, "episodeNumber": 1, "title": "One",
             "googleDriveUrl": PLACEHOLDER, "videoUrl": null, "runtime": 52},
            {"id": "d11", "showId": "dexter-id", "season": 1, "episodeNumber": 1, "title": "Dexter",
             "googleDriveUrl": "https://drive.google.com/file/d/realDexter/preview", "videoUrl": null}
        ]
    }))
    .unwrap()
}

fn catalog(names: &[&str]) -> ShowCatalog {
    let mut catalog = ShowCatalog::new();
    for name in names {
        let mut seasons = SeasonMap::new();
        seasons.insert(
            "Season 1",
            vec![EpisodeVideos {
                episode: 1,
                episode_url: None,
                video_links: vec![VideoLink { url: "https://mega.nz/file/x".into(), kind: LinkKind::Mega }],
            }],
        );
        catalog.insert(*name, seasons);
    }
    catalog
}

#[test]
fn test_patch_and_save_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("streamvault-data.json");
    let manifest_path = dir.path().join("banshee.toml");

    sample_db().save(&db_path).unwrap();
    fs::write(
        &manifest_path,
        r#"
show_id = "banshee-id"
skip = [[1, 1]]

[[episodes]]
season = 1
episode = 2
url = "https://cdn.x.com/Banshee_S01E02-ENG.mp4"
"#,
    )
    .unwrap();

    let mut db = Database::load(&db_path).unwrap();
    let manifest = PatchManifest::load(&manifest_path).unwrap();
    let outcome = apply_patch(&mut db, &manifest);

    assert_eq!(outcome.updated.len(), 1);
    assert_eq!(outcome.updated[0].title, "The Rave");
    assert_eq!(outcome.updated[0].old_url.as_deref(), Some(PLACEHOLDER));
    assert_eq!(outcome.skipped, vec![(1, 1)]);
    assert_eq!(outcome.unmapped, vec![(2, 1)]);

    db.save(&db_path).unwrap();
    let reloaded = Database::load(&db_path).unwrap();
    let rave = reloaded.episodes.iter().find(|e| e.id.as_deref() == Some("b12")).unwrap();
    assert_eq!(rave.drive_url(), Some("https://cdn.x.com/Banshee_S01E02-ENG.mp4"));

    let pilot = reloaded.episodes.iter().find(|e| e.id.as_deref() == Some("b11")).unwrap();
    assert_eq!(pilot.drive_url(), Some("https://cdn.x.com/already-done.mp4"));

    // other shows and unknown fields are untouched
    assert_eq!(reloaded.episodes[3], sample_db().episodes[3]);
    assert_eq!(reloaded.shows[0].extra["year"], 2013);
}

#[test]
fn test_seasonless_patch_into_video_url() {
    let mut db = sample_db();
    let manifest = PatchManifest::parse(
        r#"
show_id = "hers-id"
field = "videoUrl"

[[episodes]]
episode = 1
url = "https://drive.google.com/file/d/19NLICm8A-LPGQcKKkL3ZMt9Mbh1yHaR1/preview"
"#,
    )
    .unwrap();
    assert_eq!(manifest.field, UrlField::VideoUrl);

    let outcome = apply_patch(&mut db, &manifest);
    assert_eq!(outcome.updated.len(), 1);
    assert_eq!(outcome.updated[0].old_url, None);

    let episode = &db.episodes[3];
    assert_eq!(episode.drive_url(), Some(PLACEHOLDER));
    assert_eq!(
        episode.playable_url(),
        Some("https://drive.google.com/file/d/19NLICm8A-LPGQcKKkL3ZMt9Mbh1yHaR1/preview")
    );
}

#[test]
fn test_patch_for_unknown_show_changes_nothing() {
    let mut db = sample_db();
    let manifest = PatchManifest::parse("show_id = \"nope\"\n[[episodes]]\nepisode = 1\nurl = \"https://x\"").unwrap();
    let outcome = apply_patch(&mut db, &manifest);
    assert!(outcome.updated.is_empty());
    assert_eq!(db, sample_db());
}

#[test]
fn test_compare_then_link_status() {
    let db = sample_db();
    let extracted = catalog(&["Banshee Online English", "Dexter Tv Series", "Dark", "Etoile", "His & Hers"]);

    let comparison = compare_shows(&extracted, &db);
    assert_eq!(comparison.summary.total_extracted, 5);
    assert_eq!(comparison.summary.already_in_streamvault, 4);
    assert_eq!(comparison.new_shows, vec!["Etoile"]);
    assert_eq!(comparison.matches[0].streamvault, "Banshee");
    assert_eq!(comparison.matches[0].id, "banshee-id");

    let status = link_status(&comparison, &db, &extracted);
    assert_eq!(status.summary.with_real_links, 1);
    assert_eq!(status.summary.with_placeholders, 2);
    assert_eq!(status.summary.no_episodes, 1);

    assert_eq!(status.shows_with_links[0].name, "Dexter");
    assert_eq!(status.shows_no_episodes[0].name, "Dark");
    assert_eq!(status.shows_no_episodes[0].extracted_episodes, 1);

    let banshee = &status.shows_with_placeholders[0];
    assert_eq!(banshee.streamvault_episodes, Some(3));
    assert_eq!(banshee.has_some_real, Some(true));
    assert_eq!(banshee.has_some_placeholders, Some(true));

    let hers = &status.shows_with_placeholders[1];
    assert_eq!(hers.has_some_real, Some(false));
}

#[test]
fn test_comparison_json_feeds_link_check() {
    let db = sample_db();
    let extracted = catalog(&["Dark"]);
    let comparison = compare_shows(&extracted, &db);

    let json = serde_json::to_string(&comparison).unwrap();
    let reloaded: Comparison = serde_json::from_str(&json).unwrap();
    assert_eq!(comparison, reloaded);

    let value = serde_json::to_value(link_status(&reloaded, &db, &extracted)).unwrap();
    assert!(value["shows_no_episodes"][0].get("streamvault_episodes").is_none());
    assert_eq!(value["summary"]["no_episodes"], 1);
}

fn links(urls: &[(&str, LinkKind)]) -> Vec<VideoLink> {
    urls.iter().map(|(url, kind)| VideoLink { url: url.to_string(), kind: kind.clone() }).collect()
}

fn extracted_banshee_and_dark() -> ShowCatalog {
    let mut banshee = SeasonMap::new();
    banshee.insert(
        "Season 1",
        vec![
            EpisodeVideos { episode: 1, episode_url: None, video_links: Vec::new() },
            EpisodeVideos {
                episode: 2,
                episode_url: None,
                video_links: links(&[
                    ("https://mega.nz/file/b2", LinkKind::Mega),
                    ("https://cdn.x.com/b2.mp4", LinkKind::VideoSrc),
                ]),
            },
            EpisodeVideos {
                episode: 3,
                episode_url: None,
                video_links: links(&[("https://mega.nz/file/b3", LinkKind::Mega)]),
            },
        ],
    );
    banshee.insert(
        "Season 2",
        vec![EpisodeVideos {
            episode: 1,
            episode_url: None,
            video_links: links(&[("https://player.x.com/e/21", LinkKind::IframeSrc)]),
        }],
    );

    let mut catalog = catalog(&["Dark"]);
    catalog.insert("Banshee Online English", banshee);
    catalog
}

#[test]
fn test_apply_extracted_fills_placeholder_shows() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("streamvault-data.json");
    let extracted = extracted_banshee_and_dark();

    let mut db = sample_db();
    let comparison = compare_shows(&extracted, &db);
    let status = link_status(&comparison, &db, &extracted);

    // the status file is read back the way check-links wrote it
    let status: LinkStatus = serde_json::from_str(&serde_json::to_string(&status).unwrap()).unwrap();
    assert_eq!(status.shows_with_placeholders[0].extracted_name, "Banshee Online English");

    let outcome = apply_extracted(&mut db, &status, &extracted);
    let updated: Vec<_> = outcome.updated.iter().map(|e| (e.season, e.episode, e.new_url.as_str())).collect();
    assert_eq!(updated, vec![(1, 2, "https://cdn.x.com/b2.mp4"), (2, 1, "https://player.x.com/e/21")]);
    assert_eq!(outcome.updated[0].title, "The Rave");
    assert_eq!(outcome.skipped, vec![(1, 1)]);
    assert_eq!(outcome.unmapped, vec![(1, 3), (1, 1)]);

    db.save(&db_path).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&db_path).unwrap()).unwrap();
    let rave = &saved["episodes"][1];
    assert_eq!(rave["videoUrl"], "https://cdn.x.com/b2.mp4");
    assert!(rave["googleDriveUrl"].is_null());
    assert!(rave.get("googleDriveUrl").is_some());

    // the pilot had no extracted links and keeps its URL
    assert_eq!(saved["episodes"][0]["googleDriveUrl"], "https://cdn.x.com/already-done.mp4");
    assert_eq!(Database::load(&db_path).unwrap().episodes[4], sample_db().episodes[4]);
}

#[test]
fn test_apply_extracted_ignores_shows_missing_from_the_catalog() {
    let mut db = sample_db();
    let extracted = extracted_banshee_and_dark();
    let status = link_status(&compare_shows(&extracted, &db), &db, &extracted);

    let outcome = apply_extracted(&mut db, &status, &catalog(&["Lost"]));
    assert_eq!(outcome, Default::default());
    assert_eq!(db, sample_db());
}
