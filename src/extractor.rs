use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::fetch::{FetchError, PageSource, fetch_with_retry};
use crate::links;
use crate::model::{
    DriveEpisode, EpisodeVideos, SeasonMap, ShowCatalog, ShowLink, VideoLink, season_key,
};

/// Counters reported at the end of a category crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub shows_listed: usize,
    pub shows_with_videos: usize,
    pub shows_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryResult {
    pub shows: ShowCatalog,
    pub summary: CategorySummary,
}

/// Walks show → season → episode pages and collects video links.
pub struct Extractor<S: PageSource> {
    source: S,
    config: ScraperConfig,
}

impl<S: PageSource> Extractor<S> {
    pub fn new(source: S, config: ScraperConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn fetch_episode(&self, url: &str) -> Result<String, FetchError> {
        fetch_with_retry(&self.source, url, self.config.retries, self.config.retry_delay()).await
    }

    /// Episode URLs of one season; an unreachable page yields none.
    pub async fn episode_links(&self, season_url: &str) -> Vec<String> {
        if links::season_number(season_url).is_none() {
            warn!("Could not determine season number from URL: {}", season_url);
            return Vec::new();
        }

        match self.source.fetch(season_url).await {
            Ok(html) => links::episode_links(&html, season_url, &self.config.base_url),
            Err(e) => {
                warn!("Error fetching season page {}: {}", season_url, e);
                Vec::new()
            }
        }
    }

    /// Season URLs of one show, ordered by season number.
    pub async fn season_links(&self, show_url: &str) -> Vec<String> {
        match self.source.fetch(show_url).await {
            Ok(html) => links::season_links(&html, &self.config.base_url),
            Err(e) => {
                warn!("Error fetching show page {}: {}", show_url, e);
                Vec::new()
            }
        }
    }

    pub async fn drive_link(&self, episode_url: &str) -> Option<String> {
        let html = self.fetch_episode(episode_url).await.ok()?;
        match links::extract_drive_id(&html) {
            Some(id) => Some(links::drive_view_url(&id)),
            None => {
                debug!("No Google Drive ID found in {}", episode_url);
                None
            }
        }
    }

    pub async fn drive_season(&self, season_url: &str) -> Vec<DriveEpisode> {
        info!("Extracting season from: {}", season_url);
        if let Some(number) = links::season_number(season_url) {
            info!("Detected: Season {}", number);
        }

        let episode_links = self.episode_links(season_url).await;
        if episode_links.is_empty() {
            warn!("No episodes found!");
            return Vec::new();
        }
        info!("Found {} episodes", episode_links.len());

        let total = episode_links.len();
        let mut results = Vec::new();
        let mut failed = Vec::new();

        for (i, episode_url) in episode_links.iter().enumerate() {
            let episode = (i + 1) as u32;

            match self.drive_link(episode_url).await {
                Some(link) => {
                    info!("[{}/{}] Episode {}: ok", episode, total, episode);
                    results.push(DriveEpisode {
                        episode,
                        episode_url: episode_url.clone(),
                        google_drive_link: link,
                    });
                }
                None => {
                    warn!("[{}/{}] Episode {}: no Drive link", episode, total, episode);
                    failed.push((episode, episode_url.as_str()));
                }
            }

            if i + 1 < total {
                self.pause(self.config.request_delay()).await;
            }
        }

        info!("Successfully extracted: {}/{} episodes", results.len(), total);
        for (episode, url) in &failed {
            warn!("Failed episode {}: {}", episode, url);
        }

        results
    }

    /// Every season of a show; seasons without links are kept as empty lists.
    pub async fn drive_show(&self, show_url: &str) -> SeasonMap<DriveEpisode> {
        info!("Extracting all seasons from: {}", show_url);

        let mut all = SeasonMap::new();
        let season_links = self.season_links(show_url).await;
        if season_links.is_empty() {
            warn!("No seasons found!");
            return all;
        }
        info!("Found {} seasons", season_links.len());

        for (i, season_url) in season_links.iter().enumerate() {
            info!("SEASON {}", i + 1);
            let results = self.drive_season(season_url).await;
            all.insert(season_key(i + 1), results);
        }

        info!(
            "Total seasons: {}, episodes extracted: {}",
            season_links.len(),
            crate::model::episode_count(&all)
        );
        all
    }

    /// Unique non-Drive links on one episode page; empty when the page fails.
    pub async fn episode_videos(&self, episode_url: &str) -> Vec<VideoLink> {
        match self.fetch_episode(episode_url).await {
            Ok(html) => links::dedupe_links(links::extract_video_links(&html)),
            Err(_) => Vec::new(),
        }
    }

    /// Non-Drive links for one season.
    ///
    /// With `probe` set the season is first checked for non-Drive indicators
    /// and its first episode must yield a link; `None` means the show looks
    /// Drive-only and should be skipped entirely.
    pub async fn video_season(&self, season_url: &str, probe: bool) -> Option<Vec<EpisodeVideos>> {
        info!("Extracting season from: {}", season_url);
        if let Some(number) = links::season_number(season_url) {
            info!("Detected: Season {}", number);
        }

        let episode_links = if probe {
            match self.source.fetch(season_url).await {
                Ok(html) => {
                    if !links::has_non_drive_indicators(&html) {
                        info!("Skipping show: no non-Drive video indicators found");
                        return None;
                    }
                    links::episode_links(&html, season_url, &self.config.base_url)
                }
                Err(e) => {
                    warn!("Error in quick check: {}, falling back to normal method", e);
                    self.episode_links(season_url).await
                }
            }
        } else {
            self.episode_links(season_url).await
        };

        if episode_links.is_empty() {
            warn!("No episodes found!");
            return Some(Vec::new());
        }
        info!("Found {} episodes", episode_links.len());

        let mut first_probe = None;
        if probe {
            let videos = self.episode_videos(&episode_links[0]).await;
            if videos.is_empty() {
                info!("Skipping show: no extractable non-Drive videos in first episode");
                return None;
            }
            info!("Verified: found {} extractable non-Drive video(s)", videos.len());
            first_probe = Some(videos);
        }

        let total = episode_links.len();
        let mut results = Vec::new();

        for (i, episode_url) in episode_links.iter().enumerate() {
            let episode = (i + 1) as u32;
            let videos = match (i, first_probe.take()) {
                (0, Some(videos)) => videos,
                _ => self.episode_videos(episode_url).await,
            };

            if videos.is_empty() {
                warn!("[{}/{}] Episode {}: no non-Drive videos found", episode, total, episode);
            } else {
                info!("[{}/{}] Episode {}: {} video link(s)", episode, total, episode, videos.len());
                results.push(EpisodeVideos {
                    episode,
                    episode_url: Some(episode_url.clone()),
                    video_links: videos,
                });
            }

            if i + 1 < total {
                self.pause(self.config.request_delay()).await;
            }
        }

        info!("Successfully extracted: {}/{} episodes", results.len(), total);
        Some(results)
    }

    /// Every season of a show; seasons without links are left out.
    pub async fn video_show(&self, show_url: &str) -> SeasonMap<EpisodeVideos> {
        info!("Extracting show from: {}", show_url);

        let mut all = SeasonMap::new();
        let season_links = self.season_links(show_url).await;
        if season_links.is_empty() {
            warn!("No seasons found!");
            return all;
        }
        info!("Found {} seasons", season_links.len());

        for (i, season_url) in season_links.iter().enumerate() {
            info!("SEASON {}: {}", i + 1, season_url);
            let results = self.video_season(season_url, false).await.unwrap_or_default();
            info!("Season {} summary: {} episodes with non-Drive videos", i + 1, results.len());
            if !results.is_empty() {
                all.insert(season_key(i + 1), results);
            }
        }

        info!(
            "Total seasons: {}, episodes with non-Drive videos: {}",
            season_links.len(),
            crate::model::episode_count(&all)
        );
        all
    }

    /// Shows listed across a paginated category, de-duplicated by URL and sorted by name.
    pub async fn category_shows(&self, category_url: &str) -> Vec<ShowLink> {
        info!("Fetching shows from {} with pagination...", category_url);
        let mut listed = Vec::new();

        for page in 1..=self.config.max_pages {
            let page_url = links::page_url(category_url, page);
            let html = match self.source.fetch(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Error on page {}: {}", page, e);
                    break;
                }
            };

            let page_shows = links::category_shows(&html, &self.config.base_url);
            if page_shows.is_empty() {
                info!("No more shows on page {}. Stopping.", page);
                break;
            }

            info!("Found {} shows on page {}", page_shows.len(), page);
            listed.extend(page_shows);
            self.pause(self.config.page_delay()).await;
        }

        let mut seen = HashSet::new();
        let mut shows: Vec<ShowLink> = listed.into_iter().filter(|s| seen.insert(s.url.clone())).collect();
        shows.sort_by(|a, b| a.name.cmp(&b.name));

        info!("Total unique shows loaded: {}", shows.len());
        shows
    }

    /// Non-Drive links for every show of a category; Drive-only shows are skipped.
    pub async fn video_category(&self, category_url: &str) -> CategoryResult {
        info!("Extracting category from: {}", category_url);

        let mut result = CategoryResult::default();
        let shows = self.category_shows(category_url).await;
        result.summary.shows_listed = shows.len();
        if shows.is_empty() {
            warn!("No shows found!");
            return result;
        }

        for (i, show) in shows.iter().enumerate() {
            info!("[{}/{}] Processing: {} ({})", i + 1, shows.len(), show.name, show.url);

            let season_links = self.season_links(&show.url).await;
            if season_links.is_empty() {
                warn!("No seasons found for {}", show.name);
            } else {
                let mut seasons = SeasonMap::new();
                let mut skipped = false;

                for (n, season_url) in season_links.iter().enumerate() {
                    info!("SEASON {}", n + 1);
                    match self.video_season(season_url, true).await {
                        None => {
                            info!("Skipping entire show: Google Drive links detected");
                            skipped = true;
                            break;
                        }
                        Some(episodes) if !episodes.is_empty() => {
                            seasons.insert(season_key(n + 1), episodes);
                        }
                        Some(_) => {}
                    }
                }

                if skipped {
                    result.summary.shows_skipped += 1;
                } else if !seasons.is_empty() {
                    result.shows.insert(show.name.clone(), seasons);
                }
            }

            if i + 1 < shows.len() {
                self.pause(self.config.show_delay()).await;
            }
        }

        result.summary.shows_with_videos = result.shows.len();
        info!(
            "Category summary: {} processed, {} with non-Drive videos, {} skipped",
            result.summary.shows_listed, result.summary.shows_with_videos, result.summary.shows_skipped
        );
        result
    }
}
