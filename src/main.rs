use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use streamvault_scraper::compare::{self, Comparison, LinkStatus};
use streamvault_scraper::config::ScraperConfig;
use streamvault_scraper::convert;
use streamvault_scraper::database::Database;
use streamvault_scraper::extractor::Extractor;
use streamvault_scraper::fetch::HttpFetcher;
use streamvault_scraper::job::{Job, LinkFamily, Scope, is_web_url, run_job};
use streamvault_scraper::model::{ShowCatalog, episode_count};
use streamvault_scraper::patch::{PatchManifest, PatchOutcome, apply_extracted, apply_patch};
use streamvault_scraper::report;
use streamvault_scraper::tui;

#[derive(Parser, Debug)]
#[command(name = "streamvault-scraper", version, about = "Extract episode video links and maintain StreamVault data")]
struct Cli {
    /// TOML file with scraper settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seconds to wait between episode requests
    #[arg(long, global = true)]
    delay: Option<u64>,

    /// Attempts per episode page
    #[arg(long, global = true)]
    retries: Option<u32>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract Google Drive links
    Drive {
        #[arg(value_enum)]
        scope: DriveScope,
        url: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Extract non-Drive video links (Mega, direct files, embeds)
    Videos {
        #[arg(value_enum)]
        scope: VideoScope,
        url: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Convert a category text export back into JSON
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Show name to drop from the result (repeatable)
        #[arg(long = "remove")]
        remove: Vec<String>,
    },
    /// Compare extracted shows with the StreamVault database
    Compare {
        extracted: PathBuf,
        database: PathBuf,
        #[arg(short, long, default_value = "show_comparison_results.json")]
        output: PathBuf,
    },
    /// List titles of the left file that are missing from the right file
    CompareLists { left: PathBuf, right: PathBuf },
    /// Report whether matched shows carry real links or placeholders
    CheckLinks {
        comparison: PathBuf,
        database: PathBuf,
        extracted: PathBuf,
        #[arg(short, long, default_value = "existing_shows_link_status.json")]
        output: PathBuf,
    },
    /// Write episode URLs from a TOML manifest into the database
    Patch {
        database: PathBuf,
        manifest: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Write extracted video links into shows still on placeholders
    ApplyExtracted {
        /// Link status JSON written by check-links
        status: PathBuf,
        database: PathBuf,
        extracted: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Report duplicate season/episode records per show
    Duplicates { database: PathBuf },
    /// Remove shows that share a title, keeping the one with the most episodes
    DedupeShows {
        database: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Step-by-step extraction wizard
    Interactive {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DriveScope {
    Season,
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VideoScope {
    Season,
    Show,
    Category,
}

impl From<DriveScope> for Scope {
    fn from(scope: DriveScope) -> Self {
        match scope {
            DriveScope::Season => Scope::Season,
            DriveScope::Show => Scope::Show,
        }
    }
}

impl From<VideoScope> for Scope {
    fn from(scope: VideoScope) -> Self {
        match scope {
            VideoScope::Season => Scope::Season,
            VideoScope::Show => Scope::Show,
            VideoScope::Category => Scope::Category,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "streamvault_scraper=debug" } else { "streamvault_scraper=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<ScraperConfig> {
    let mut config = match &cli.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(delay) = cli.delay {
        config.request_delay_secs = delay;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries.max(1);
    }
    Ok(config)
}

async fn extract(config: ScraperConfig, job: Job, out_dir: &Path) -> Result<()> {
    if !is_web_url(&job.url) {
        anyhow::bail!("Invalid URL! Must start with http:// or https://");
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    info!("Extracting {} ({}) from {}", job.family.label(), job.scope, job.url);
    let extractor = Extractor::new(HttpFetcher::new(&config)?, config);

    if run_job(&extractor, &job, out_dir).await? {
        println!("✓ Done! Results saved to {}", out_dir.display());
    } else {
        println!("✗ No links were extracted.");
    }
    Ok(())
}

fn run_convert(input: &Path, output: Option<PathBuf>, remove: &[String]) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mut catalog = convert::parse_category_text(&content);

    if !remove.is_empty() {
        let removed = convert::remove_shows(&mut catalog, remove);
        for name in remove.iter().filter(|n| !removed.contains(n)) {
            warn!("Not found: {}", name);
        }
    }

    let output = output.unwrap_or_else(|| input.with_extension("json"));
    report::save_json(&catalog, &output)?;

    println!("Converted {} shows", catalog.len());
    for (name, seasons) in catalog.iter() {
        let episodes = episode_count(seasons);
        println!("  {}: {} seasons, {} episodes", name, seasons.len(), episodes);
    }
    println!("✓ Saved to {}", output.display());
    Ok(())
}

fn run_compare(extracted: &Path, database: &Path, output: &Path) -> Result<()> {
    let catalog: ShowCatalog = report::load_json(extracted)?;
    let db = Database::load(database)?;
    let comparison = compare::compare_shows(&catalog, &db);

    println!("{}", "=".repeat(80));
    println!("SHOWS ALREADY IN STREAMVAULT ({})", comparison.matches.len());
    println!("{}", "=".repeat(80));
    for m in &comparison.matches {
        println!("✓ {}", m.extracted);
        if m.extracted != m.streamvault {
            println!("  → StreamVault: {}", m.streamvault);
        }
        println!("  ID: {}", m.id);
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("NEW SHOWS NOT IN STREAMVAULT ({})", comparison.new_shows.len());
    println!("{}", "=".repeat(80));
    for name in &comparison.new_shows {
        println!("• {}", name);
    }

    println!();
    println!("Summary:");
    println!("   Total extracted: {}", comparison.summary.total_extracted);
    println!("   Already in StreamVault: {}", comparison.summary.already_in_streamvault);
    println!("   New shows: {}", comparison.summary.new_shows);

    report::save_json(&comparison, output)?;
    println!("✓ Results saved to {}", output.display());
    Ok(())
}

fn run_compare_lists(left: &Path, right: &Path) -> Result<()> {
    let left_value: Value = report::load_json(left)?;
    let right_value: Value = report::load_json(right)?;
    let left_titles = compare::titles_from_json(&left_value)?;
    let right_titles = compare::titles_from_json(&right_value)?;
    let missing = compare::compare_lists(&left_titles, &right_titles);

    println!("Titles in {} missing from {} ({}):", left.display(), right.display(), missing.len());
    for title in &missing {
        println!("• {}", title);
    }
    Ok(())
}

fn run_check_links(comparison: &Path, database: &Path, extracted: &Path, output: &Path) -> Result<()> {
    let comparison: Comparison = report::load_json(comparison)?;
    let db = Database::load(database)?;
    let catalog: ShowCatalog = report::load_json(extracted)?;
    let status = compare::link_status(&comparison, &db, &catalog);

    println!("SHOWS WITH REAL LINKS ({})", status.summary.with_real_links);
    for show in &status.shows_with_links {
        println!("✓ {} ({} episodes)", show.name, show.streamvault_episodes.unwrap_or(0));
    }
    println!();
    println!("SHOWS WITH PLACEHOLDERS ({})", status.summary.with_placeholders);
    for show in &status.shows_with_placeholders {
        println!(
            "⚠ {} ({} in StreamVault, {} extracted)",
            show.name,
            show.streamvault_episodes.unwrap_or(0),
            show.extracted_episodes
        );
    }
    println!();
    println!("SHOWS WITH NO EPISODES ({})", status.summary.no_episodes);
    for show in &status.shows_no_episodes {
        println!("✗ {} ({} extracted)", show.name, show.extracted_episodes);
    }

    report::save_json(&status, output)?;
    println!("✓ Results saved to {}", output.display());
    Ok(())
}

fn run_patch(database: &Path, manifest: &Path, dry_run: bool) -> Result<()> {
    let mut db = Database::load(database)?;
    let manifest = PatchManifest::load(manifest)?;
    let outcome = apply_patch(&mut db, &manifest);
    finish_update(&db, database, &outcome, dry_run)
}

fn run_apply_extracted(status: &Path, database: &Path, extracted: &Path, dry_run: bool) -> Result<()> {
    let status: LinkStatus = report::load_json(status)?;
    let catalog: ShowCatalog = report::load_json(extracted)?;
    let mut db = Database::load(database)?;
    let outcome = apply_extracted(&mut db, &status, &catalog);
    finish_update(&db, database, &outcome, dry_run)
}

fn finish_update(db: &Database, database: &Path, outcome: &PatchOutcome, dry_run: bool) -> Result<()> {
    for ep in &outcome.updated {
        println!("✓ S{}E{}: {}", ep.season, ep.episode, ep.title);
        println!("  Old: {}", ep.old_url.as_deref().unwrap_or("N/A"));
        println!("  New: {}", ep.new_url);
    }

    println!();
    println!("Summary:");
    println!("   Updated: {}", outcome.updated.len());
    println!("   Skipped: {}", outcome.skipped.len());
    println!("   Unmapped: {}", outcome.unmapped.len());

    if dry_run {
        println!("Dry run: {} left unchanged", database.display());
    } else if outcome.updated.is_empty() {
        println!("Nothing to update.");
    } else {
        db.save(database)?;
        println!("✓ Saved {}", database.display());
    }
    Ok(())
}

fn run_dedupe_shows(database: &Path, dry_run: bool) -> Result<()> {
    let mut db = Database::load(database)?;
    let groups = db.remove_duplicate_shows();

    if groups.is_empty() {
        println!("✓ No duplicate shows found.");
        return Ok(());
    }

    for group in &groups {
        println!("\"{}\"", group.kept.title);
        println!("  KEEPING: {} ({} episodes)", group.kept.id, group.kept.episodes);
        for show in &group.removed {
            println!("  REMOVING: {} ({} episodes)", show.id, show.episodes);
        }
    }

    let removed: usize = groups.iter().map(|g| g.removed.len()).sum();
    println!();
    println!("Shows to remove: {}", removed);

    if dry_run {
        println!("Dry run: {} left unchanged", database.display());
    } else {
        db.save(database)?;
        println!("✓ Saved {}", database.display());
    }
    Ok(())
}

fn run_duplicates(database: &Path) -> Result<()> {
    let db = Database::load(database)?;
    let groups = db.duplicate_episodes();

    if groups.is_empty() {
        println!("✓ No duplicate episodes found.");
        return Ok(());
    }

    println!("Found {} duplicate episode keys:", groups.len());
    for group in &groups {
        println!("• {} {} ({} records)", group.show_title, group.key, group.episode_ids.len());
        for id in &group.episode_ids {
            println!("    {}", id);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Some(Command::Drive { scope, url, out_dir }) => {
            let job = Job { family: LinkFamily::Drive, scope: scope.into(), url };
            extract(config, job, &out_dir).await
        }
        Some(Command::Videos { scope, url, out_dir }) => {
            let job = Job { family: LinkFamily::Videos, scope: scope.into(), url };
            extract(config, job, &out_dir).await
        }
        Some(Command::Convert { input, output, remove }) => run_convert(&input, output, &remove),
        Some(Command::Compare { extracted, database, output }) => run_compare(&extracted, &database, &output),
        Some(Command::CompareLists { left, right }) => run_compare_lists(&left, &right),
        Some(Command::CheckLinks { comparison, database, extracted, output }) => {
            run_check_links(&comparison, &database, &extracted, &output)
        }
        Some(Command::Patch { database, manifest, dry_run }) => run_patch(&database, &manifest, dry_run),
        Some(Command::ApplyExtracted { status, database, extracted, dry_run }) => {
            run_apply_extracted(&status, &database, &extracted, dry_run)
        }
        Some(Command::Duplicates { database }) => run_duplicates(&database),
        Some(Command::DedupeShows { database, dry_run }) => run_dedupe_shows(&database, dry_run),
        Some(Command::Interactive { out_dir }) => interactive(config, &out_dir).await,
        None => interactive(config, Path::new(".")).await,
    }
}

async fn interactive(config: ScraperConfig, out_dir: &Path) -> Result<()> {
    match tui::run_tui()? {
        Some(job) => extract(config, job, out_dir).await,
        None => {
            println!("Goodbye!");
            Ok(())
        }
    }
}
