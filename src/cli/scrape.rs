use std::{path::PathBuf, sync::Arc, time::Duration};

use tabled::Table;
use url::Url;

use crate::{
    config, error,
    fetch::{FetcherConfig, PageFetcher},
    info,
    management::{ArtistManager, LyricsStore, RunLog},
    scrape::{self, ScrapeConfig},
    success,
    types::ScrapeSummaryRow,
};

/// Per-run options for Phase B, assembled by the CLI layer.
pub struct ScrapeOptions {
    pub artists_file: Option<PathBuf>,
    pub output: PathBuf,
    pub delay: f64,
    pub start_from: usize,
    pub artist: Option<String>,
    pub artist_workers: usize,
    pub song_workers: usize,
    pub retries: u32,
    pub backoff: f64,
}

/// Runs Phase B over the persisted artist collection.
pub async fn scrape(options: ScrapeOptions) {
    let base = match Url::parse(&config::base_url()) {
        Ok(base) => base,
        Err(err) => error!("Invalid base URL {}: {}", config::base_url(), err),
    };

    let artists_file = options
        .artists_file
        .unwrap_or_else(config::default_artists_file);
    let manager = match ArtistManager::load(&artists_file).await {
        Ok(manager) => manager,
        Err(err) => error!(
            "Cannot load {}: {:?}\nRun hiracli discover first.",
            artists_file.display(),
            err
        ),
    };

    let mut artists = manager.into_artists();
    info!("{} artists loaded from {}", artists.len(), artists_file.display());

    if let Some(slug) = &options.artist {
        artists.retain(|a| &a.slug == slug);
        if artists.is_empty() {
            error!("Artist '{}' not found in {}", slug, artists_file.display());
        }
        info!("Single-artist mode: {}", artists[0].name);
    }

    if options.start_from > 0 {
        artists = artists.split_off(options.start_from.min(artists.len()));
        info!("Starting from artist #{}", options.start_from);
    }

    let fetcher = Arc::new(PageFetcher::new(FetcherConfig {
        retries: options.retries,
        backoff: Duration::from_secs_f64(options.backoff),
        ..FetcherConfig::default()
    }));
    let store = Arc::new(LyricsStore::new(options.output.clone()));
    let log = Arc::new(RunLog::new("scrape"));

    info!(
        "Scraping {} artists into {} ({} artist worker(s) x {} song worker(s))",
        artists.len(),
        options.output.display(),
        options.artist_workers,
        options.song_workers
    );

    let scrape_config = ScrapeConfig {
        base,
        delay: Duration::from_secs_f64(options.delay),
        artist_workers: options.artist_workers,
        song_workers: options.song_workers,
    };
    let reports =
        scrape::scrape_artists(fetcher, store, artists, scrape_config, Arc::clone(&log)).await;

    let mut total = crate::types::ArtistTally::default();
    let rows: Vec<ScrapeSummaryRow> = reports
        .iter()
        .map(|report| {
            total.merge(report.tally);
            ScrapeSummaryRow {
                artist: report.name.clone(),
                saved: report.tally.saved,
                skipped: report.tally.skipped,
                failed: report.tally.failed,
            }
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    success!(
        "{} artists processed: {} saved, {} already on disk, {} failed",
        reports.len(),
        total.saved,
        total.skipped,
        total.failed
    );
    info!("Run log: {}", log.path().display());
}
