use std::{path::PathBuf, time::Duration};

use tabled::Table;
use url::Url;

use crate::{
    config, error,
    fetch::{FetcherConfig, PageFetcher},
    info,
    management::RunLog,
    scrape::{self, DiscoverConfig},
    success,
    types::ArtistRankRow,
};

/// Runs Phase A and prints the discovery summary.
pub async fn discover(delay: f64, retries: u32, backoff: f64, output: Option<PathBuf>) {
    let base = match Url::parse(&config::base_url()) {
        Ok(base) => base,
        Err(err) => error!("Invalid base URL {}: {}", config::base_url(), err),
    };

    let fetcher = PageFetcher::new(FetcherConfig {
        retries,
        backoff: Duration::from_secs_f64(backoff),
        ..FetcherConfig::default()
    });
    let log = RunLog::new("discover");
    let discover_config = DiscoverConfig {
        base,
        delay: Duration::from_secs_f64(delay),
        output: output.unwrap_or_else(config::default_artists_file),
    };

    info!("Discovering artists from {}", config::artists_list_url());

    let report = match scrape::discover(&fetcher, &discover_config, &log).await {
        Ok(report) => report,
        Err(err) => error!("Discovery aborted: {}", err),
    };

    success!(
        "Discovery finished: {} artists found, {} kept, {} without songs dropped",
        report.discovered,
        report.kept,
        report.dropped
    );
    info!("{} songs advertised in total", report.total_songs);
    info!(
        "Artist list saved to {}",
        discover_config.output.display()
    );
    info!("Run log: {}", log.path().display());

    if !report.top.is_empty() {
        let rows: Vec<ArtistRankRow> = report
            .top
            .iter()
            .enumerate()
            .map(|(index, artist)| ArtistRankRow {
                rank: index + 1,
                name: artist.name.clone(),
                songs: artist.song_count,
            })
            .collect();
        println!("{}", Table::new(rows));
    }
}
