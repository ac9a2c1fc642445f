use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::{sync::Semaphore, task::JoinSet, time::sleep};
use url::Url;

use crate::{
    fetch::PageFetcher,
    management::{LyricsStore, RunLog},
    parse,
    types::{Artist, ArtistReport, ArtistTally, SongLink, SongOutcome},
    utils::dedup_song_links,
};

/// Lyrics shorter than this after cleaning are treated as parsing artifacts,
/// not genuine short songs.
pub const MIN_LYRICS_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base: Url,
    /// Politeness delay between an artist's listing-page requests.
    pub delay: Duration,
    /// Bound on concurrently processed artists.
    pub artist_workers: usize,
    /// Bound on concurrent song fetches within one artist.
    pub song_workers: usize,
}

/// Phase B: scrape every artist's songs with two-level bounded concurrency.
///
/// An outer pool of `artist_workers` permits bounds concurrent artists; each
/// artist task runs its own inner pool of `song_workers` permits over its
/// songs, so at most `artist_workers * song_workers` requests are in flight.
/// Every failure is absorbed into the artist's tally; the run never aborts
/// on a single artist or song.
pub async fn scrape_artists(
    fetcher: Arc<PageFetcher>,
    store: Arc<LyricsStore>,
    artists: Vec<Artist>,
    config: ScrapeConfig,
    log: Arc<RunLog>,
) -> Vec<ArtistReport> {
    let config = Arc::new(config);
    let semaphore = Arc::new(Semaphore::new(config.artist_workers.max(1)));
    let total = artists.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let mut set = JoinSet::new();
    for (index, artist) in artists.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);
        let store = Arc::clone(&store);
        let log = Arc::clone(&log);
        let config = Arc::clone(&config);
        let pb = pb.clone();

        set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("artist pool closed");
            let tally = scrape_one_artist(&fetcher, &store, &artist, &config, &log, &pb).await;
            pb.inc(1);
            (
                index,
                ArtistReport {
                    name: artist.name,
                    slug: artist.slug,
                    tally,
                },
            )
        });
    }

    let mut reports = Vec::with_capacity(total);
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(entry) => reports.push(entry),
            Err(err) => log.line(&format!("artist task aborted: {err}")).await,
        }
    }
    pb.finish_and_clear();

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

async fn scrape_one_artist(
    fetcher: &Arc<PageFetcher>,
    store: &Arc<LyricsStore>,
    artist: &Artist,
    config: &Arc<ScrapeConfig>,
    log: &Arc<RunLog>,
    pb: &ProgressBar,
) -> ArtistTally {
    let listing_root = format!(
        "{}/mpihira/{}/hira",
        config.base.as_str().trim_end_matches('/'),
        artist.slug
    );
    log.line(&format!(
        "artist {} ({}): expecting ~{} songs",
        artist.name, artist.slug, artist.song_count
    ))
    .await;

    // The artist's own listing root being unreachable fails this artist
    // only; the rest of the run continues.
    let first = match fetcher.fetch(&listing_root).await {
        Ok(html) => html,
        Err(err) => {
            pb.println(format!("cannot load song listing for {}: {err}", artist.name));
            log.line(&format!("artist {} listing failed: {err}", artist.slug))
                .await;
            return ArtistTally {
                failed: 1,
                ..Default::default()
            };
        }
    };

    let last_page = parse::last_page_number(&first, &config.base);
    let mut links = Vec::new();
    for page in 1..=last_page {
        let url = format!("{listing_root}?page={page}");
        match fetcher.fetch(&url).await {
            Ok(html) => links.extend(parse::extract_song_links(&html, &config.base)),
            Err(err) => {
                log.line(&format!("artist {} page {page} failed: {err}", artist.slug))
                    .await;
            }
        }
        sleep(config.delay).await;
    }

    let songs = dedup_song_links(links);
    let song_total = songs.len();
    pb.set_message(format!("{}: {} songs found", artist.name, song_total));
    log.line(&format!(
        "artist {}: {} songs across {} page(s)",
        artist.slug, song_total, last_page
    ))
    .await;

    let inner = Arc::new(Semaphore::new(config.song_workers.max(1)));
    let mut set = JoinSet::new();
    for song in songs {
        let inner = Arc::clone(&inner);
        let fetcher = Arc::clone(fetcher);
        let store = Arc::clone(store);
        let config = Arc::clone(config);
        let artist_slug = artist.slug.clone();

        set.spawn(async move {
            let _permit = inner.acquire_owned().await.expect("song pool closed");
            let outcome = fetch_song(&fetcher, &store, &config, &artist_slug, &song).await;
            (song, outcome)
        });
    }

    let mut tally = ArtistTally::default();
    let mut done = 0usize;
    while let Some(joined) = set.join_next().await {
        let Ok((song, outcome)) = joined else {
            tally.failed += 1;
            continue;
        };
        done += 1;
        tally.record(&outcome);
        match &outcome {
            SongOutcome::Saved(file) => {
                pb.set_message(format!(
                    "{}: [{done}/{song_total}] saved {file}",
                    artist.name
                ));
                log.line(&format!("artist {}: saved {file}", artist.slug)).await;
            }
            SongOutcome::Skipped => {
                log.line(&format!(
                    "artist {}: skipped {} (already on disk)",
                    artist.slug, song.slug
                ))
                .await;
            }
            SongOutcome::TooShort(slug) => {
                log.line(&format!("artist {}: lyrics too short for {slug}", artist.slug))
                    .await;
            }
            SongOutcome::Absent(slug) => {
                log.line(&format!("artist {}: no lyrics found in {slug}", artist.slug))
                    .await;
            }
            SongOutcome::Failed(slug) => {
                log.line(&format!("artist {}: failed {slug}", artist.slug)).await;
            }
        }
    }

    log.line(&format!(
        "artist {}: {} saved, {} skipped, {} failed",
        artist.slug, tally.saved, tally.skipped, tally.failed
    ))
    .await;
    tally
}

/// One song task: `pending -> (skipped | fetching -> (failed | extracting ->
/// (absent | too_short | saved)))`. The resume check runs before any network
/// request, so a restarted run skips completed songs for free.
async fn fetch_song(
    fetcher: &PageFetcher,
    store: &LyricsStore,
    config: &ScrapeConfig,
    artist_slug: &str,
    song: &SongLink,
) -> SongOutcome {
    if store.exists(artist_slug, &song.slug) {
        return SongOutcome::Skipped;
    }

    let html = match fetcher.fetch(&song.url).await {
        Ok(html) => html,
        Err(_) => return SongOutcome::Failed(song.slug.clone()),
    };

    let Some(record) = parse::extract_song(&html, &config.base) else {
        return SongOutcome::Absent(song.slug.clone());
    };
    if record.lyrics.chars().count() < MIN_LYRICS_CHARS {
        return SongOutcome::TooShort(song.slug.clone());
    }

    match store.save(artist_slug, &song.slug, &record, &song.url).await {
        Ok(path) => {
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| song.slug.clone());
            SongOutcome::Saved(file)
        }
        Err(_) => SongOutcome::Failed(song.slug.clone()),
    }
}
