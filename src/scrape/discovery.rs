use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::sleep;
use url::Url;

use crate::{
    fetch::PageFetcher,
    info,
    management::{ArtistManager, RunLog},
    parse,
    types::Artist,
};

pub struct DiscoverConfig {
    pub base: Url,
    /// Politeness delay between listing-page requests.
    pub delay: Duration,
    /// Where the artist collection is persisted.
    pub output: PathBuf,
}

pub struct DiscoverReport {
    pub discovered: usize,
    pub kept: usize,
    pub dropped: usize,
    pub total_songs: u64,
    pub top: Vec<Artist>,
}

/// Phase A: walk the paginated artist index and persist the collection.
///
/// The only fatal failure is the root listing page: without it there is
/// nothing to discover, so the error propagates to the caller. Every later
/// page failure skips that page. Artists advertising zero songs are dropped
/// from the persisted output but still counted in the report.
pub async fn discover(
    fetcher: &PageFetcher,
    config: &DiscoverConfig,
    log: &RunLog,
) -> crate::Res<DiscoverReport> {
    let list_url = format!("{}/mpihira", config.base.as_str().trim_end_matches('/'));
    log.line(&format!("discovery started from {list_url}")).await;

    let first = fetcher.fetch(&list_url).await?;
    let last_page = parse::last_page_number(&first, &config.base);
    info!("{} listing page(s) detected", last_page);
    log.line(&format!("{last_page} listing page(s) detected")).await;

    let pb = ProgressBar::new(last_page as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let mut manager = ArtistManager::new();
    for page in 1..=last_page {
        let url = format!("{list_url}?page={page}");
        match fetcher.fetch(&url).await {
            Ok(html) => {
                let mut new_count = 0;
                for artist in parse::extract_artists(&html, &config.base) {
                    if manager.insert(artist) {
                        new_count += 1;
                    }
                }
                pb.set_message(format!("{new_count} new artists"));
                log.line(&format!("page {page}/{last_page}: {new_count} new artists"))
                    .await;
            }
            Err(err) => {
                pb.set_message(format!("page {page} failed, skipping"));
                log.line(&format!("page {page}/{last_page} failed: {err}"))
                    .await;
            }
        }
        pb.inc(1);
        sleep(config.delay).await;
    }
    pb.finish_and_clear();

    let discovered = manager.len();
    let dropped = manager.drop_without_songs();
    let kept = manager.len();
    let total_songs = manager.total_songs();
    let top = manager.top_by_songs(15);

    manager
        .persist(&config.output)
        .await
        .map_err(|e| format!("cannot persist artist list: {e:?}"))?;

    log.line(&format!(
        "discovery finished: {discovered} found, {kept} kept, {dropped} without songs, {total_songs} songs total"
    ))
    .await;

    Ok(DiscoverReport {
        discovered,
        kept,
        dropped,
        total_songs,
        top,
    })
}
