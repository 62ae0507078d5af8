use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use crate::extractor::Extractor;
use crate::fetch::PageSource;
use crate::links::url_slug;
use crate::report;

/// Which family of links an extraction collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkFamily {
    Drive,
    Videos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Season,
    Show,
    Category,
}

impl LinkFamily {
    pub fn label(&self) -> &'static str {
        match self {
            LinkFamily::Drive => "Google Drive links",
            LinkFamily::Videos => "Non-Drive videos (Mega, direct files, embeds)",
        }
    }

    /// Category crawling only exists for non-Drive extraction.
    pub fn scopes(&self) -> &'static [Scope] {
        match self {
            LinkFamily::Drive => &[Scope::Season, Scope::Show],
            LinkFamily::Videos => &[Scope::Season, Scope::Show, Scope::Category],
        }
    }
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Season => "Single season",
            Scope::Show => "All seasons of a show",
            Scope::Category => "All shows in a category (paginated)",
        }
    }

    pub fn example_url(&self) -> &'static str {
        match self {
            Scope::Season => "https://www.worthcrete.com/literature/seasons/english-seasons/stranger-things-online-english/stranger-things-seasons-1-online-english/",
            Scope::Show => "https://www.worthcrete.com/literature/seasons/english-seasons/stranger-things-online-english/",
            Scope::Category => "https://www.worthcrete.com/literature/seasons/english-seasons/",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub family: LinkFamily,
    pub scope: Scope,
    pub url: String,
}

impl Job {
    /// Base name of the output files, without extension.
    pub fn output_stem(&self) -> String {
        let slug = url_slug(&self.url);
        let slug = if slug.is_empty() { "show_videos".to_string() } else { slug };
        let suffix = match (self.family, self.scope) {
            (LinkFamily::Drive, Scope::Season) => "links",
            (LinkFamily::Drive, _) => "all_seasons",
            (LinkFamily::Videos, Scope::Season) => "non_drive_links",
            (LinkFamily::Videos, Scope::Show) => "non_drive",
            (LinkFamily::Videos, Scope::Category) => "non_drive_category",
        };
        format!("{}_{}", slug, suffix)
    }
}

pub fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn output_paths(job: &Job, out_dir: &Path) -> (PathBuf, PathBuf) {
    let stem = job.output_stem();
    (out_dir.join(format!("{}.json", stem)), out_dir.join(format!("{}.txt", stem)))
}

/// Runs one extraction, prints the results and writes the JSON and text files.
///
/// Returns `false` when nothing was found and no files were written.
pub async fn run_job<S: PageSource>(extractor: &Extractor<S>, job: &Job, out_dir: &Path) -> Result<bool> {
    let (json_path, txt_path) = output_paths(job, out_dir);

    match (job.family, job.scope) {
        (LinkFamily::Drive, Scope::Season) => {
            let results = extractor.drive_season(&job.url).await;
            if results.is_empty() {
                return Ok(false);
            }
            let text = report::drive_season_text(&results);
            report::print_results(&format!("EXTRACTION RESULTS ({} episodes)", results.len()), &text);
            report::save_json(&results, &json_path)?;
            report::save_text(&text, &txt_path)?;
        }
        (LinkFamily::Drive, _) => {
            let results = extractor.drive_show(&job.url).await;
            if results.is_empty() {
                return Ok(false);
            }
            let text = report::drive_show_text(&results);
            report::print_results("EXTRACTION RESULTS", &text);
            report::save_json(&results, &json_path)?;
            report::save_text(&text, &txt_path)?;
        }
        (LinkFamily::Videos, Scope::Season) => {
            let results = extractor.video_season(&job.url, false).await.unwrap_or_default();
            if results.is_empty() {
                return Ok(false);
            }
            let text = report::video_season_text(&results);
            report::print_results("EXTRACTION RESULTS (NON-DRIVE VIDEOS ONLY)", &text);
            report::save_json(&results, &json_path)?;
            report::save_text(&text, &txt_path)?;
        }
        (LinkFamily::Videos, Scope::Show) => {
            let results = extractor.video_show(&job.url).await;
            if results.is_empty() {
                warn!("No non-Drive videos found for this show!");
                return Ok(false);
            }
            let text = report::video_show_text(&results);
            report::print_results("EXTRACTION RESULTS (NON-DRIVE VIDEOS ONLY)", &text);
            report::save_json(&results, &json_path)?;
            report::save_text(&text, &txt_path)?;
        }
        (LinkFamily::Videos, Scope::Category) => {
            let result = extractor.video_category(&job.url).await;
            println!("Category summary:");
            println!("   Total shows processed: {}", result.summary.shows_listed);
            println!("   Shows with non-Drive videos: {}", result.summary.shows_with_videos);
            println!("   Shows skipped (Drive links): {}", result.summary.shows_skipped);
            if result.shows.is_empty() {
                return Ok(false);
            }
            let text = report::category_text(&result.shows);
            report::print_results("EXTRACTION RESULTS (NON-DRIVE VIDEOS ONLY)", &text);
            report::save_json(&result.shows, &json_path)?;
            report::save_text(&text, &txt_path)?;
        }
    }

    Ok(true)
}
