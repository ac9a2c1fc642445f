use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use axum::{Router, extract::Query, http::StatusCode, response::Html, routing::get};
use url::Url;

use hiracli::{
    fetch::{FetcherConfig, PageFetcher},
    management::{ArtistManager, LyricsStore, RunLog},
    scrape::{DiscoverConfig, ScrapeConfig, discover, scrape_artists},
    types::Artist,
};

fn scratch_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("hiracli-test-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    path
}

fn test_fetcher(retries: u32, backoff: Duration) -> PageFetcher {
    PageFetcher::new(FetcherConfig {
        retries,
        backoff,
        user_agent: "hiracli-test".to_string(),
        timeout: Duration::from_secs(5),
    })
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn song_page(title: &str, lyrics: &str) -> Html<String> {
    Html(format!(
        "<html><head><title>{title} - Tononkira</title></head><body>\
         <h2>{title} (Mahaleo)</h2>\
         <a href=\"/mpihira/mahaleo\">Mahaleo</a>\
         <div class=\"print my-3 fst-italic\">Nalaina tao amin'ny tononkira.serasera.org</div>\
         {lyrics}\
         <div class=\"footer\">end</div></body></html>"
    ))
}

#[tokio::test]
async fn test_fetch_retries_with_backoff_then_succeeds() {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);
    let app = Router::new().route(
        "/page",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StatusCode::INTERNAL_SERVER_ERROR)
                } else {
                    Ok(Html("<html><body>ok</body></html>"))
                }
            }
        }),
    );
    let root = serve(app).await;

    let fetcher = test_fetcher(3, Duration::from_secs(1));
    let start = Instant::now();
    let body = fetcher
        .fetch(&format!("{root}/page"))
        .await
        .expect("third attempt should succeed");
    let elapsed = start.elapsed();

    assert!(body.contains("ok"));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // 1s after the first failure, 2s after the second
    assert!(
        elapsed >= Duration::from_millis(2900),
        "expected ~3s of backoff, got {elapsed:?}"
    );
}

#[tokio::test]
async fn test_fetch_fails_after_exhausting_attempts() {
    let hits = Arc::new(AtomicUsize::new(0));
    let handler_hits = Arc::clone(&hits);
    let app = Router::new().route(
        "/page",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }),
    );
    let root = serve(app).await;

    let fetcher = test_fetcher(2, Duration::from_millis(20));
    let err = fetcher
        .fetch(&format!("{root}/page"))
        .await
        .expect_err("exhaustion should fail");

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(err.to_string().contains("failed to fetch"));
}

#[tokio::test]
async fn test_discover_walks_pages_and_drops_zero_count_artists() {
    const PAGE1: &str = r#"<html><body>
        <a href="/mpihira/mahaleo">Mahaleo</a>
        <a href="/mpihira/mahaleo/hira">Misy hira 42</a>
        <a href="/mpihira/vazo">Vazo</a>
        <nav><a aria-label="Farany" href="/mpihira?page=2">last</a></nav>
    </body></html>"#;
    // Page 2 repeats mahaleo with a stale count; first-seen must win.
    const PAGE2: &str = r#"<html><body>
        <a href="/mpihira/mahaleo">Mahaleo</a>
        <a href="/mpihira/mahaleo/hira">Misy hira 17</a>
        <a href="/mpihira/rossy">Rossy</a>
        <a href="/mpihira/rossy/hira">Misy hira 5</a>
    </body></html>"#;

    let app = Router::new().route(
        "/mpihira",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            match params.get("page").map(String::as_str) {
                Some("2") => Html(PAGE2),
                _ => Html(PAGE1),
            }
        }),
    );
    let root = serve(app).await;

    let dir = scratch_dir("discover");
    let output = dir.join("artists.json");
    let fetcher = test_fetcher(1, Duration::from_millis(10));
    let log = RunLog::with_path(dir.join("discover.log"));
    let config = DiscoverConfig {
        base: Url::parse(&root).unwrap(),
        delay: Duration::from_millis(0),
        output: output.clone(),
    };

    let report = discover(&fetcher, &config, &log)
        .await
        .expect("discovery should succeed");

    assert_eq!(report.discovered, 3);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.kept, 2);
    assert_eq!(report.total_songs, 47);

    let manager = ArtistManager::load(&output).await.unwrap();
    let artists = manager.artists();
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].slug, "mahaleo");
    assert_eq!(artists[0].song_count, 42);
    assert_eq!(artists[1].slug, "rossy");
    assert_eq!(artists[1].song_count, 5);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_discover_fails_when_root_is_unreachable() {
    let app = Router::new().route(
        "/mpihira",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let root = serve(app).await;

    let dir = scratch_dir("discover-fail");
    let fetcher = test_fetcher(1, Duration::from_millis(10));
    let log = RunLog::with_path(dir.join("discover.log"));
    let config = DiscoverConfig {
        base: Url::parse(&root).unwrap(),
        delay: Duration::from_millis(0),
        output: dir.join("artists.json"),
    };

    assert!(discover(&fetcher, &config, &log).await.is_err());

    let _ = std::fs::remove_dir_all(&dir);
}

fn lyrics_site() -> Router {
    const LISTING: &str = r#"<html><body>
        <a href="/hira/mahaleo/song-long">Song Long</a>
        <a href="/hira/mahaleo/song-long">Song Long again</a>
        <a href="/hira/mahaleo/song-fifty">Song Fifty</a>
        <a href="/hira/mahaleo/song-short">Song Short</a>
    </body></html>"#;

    Router::new()
        .route("/mpihira/mahaleo/hira", get(|| async { Html(LISTING) }))
        .route(
            "/hira/mahaleo/song-long",
            get(|| async { song_page("Long", &"x".repeat(120)) }),
        )
        .route(
            "/hira/mahaleo/song-fifty",
            get(|| async { song_page("Fifty", &"x".repeat(50)) }),
        )
        .route(
            "/hira/mahaleo/song-short",
            get(|| async { song_page("Short", &"x".repeat(49)) }),
        )
}

fn mahaleo() -> Artist {
    Artist {
        name: "Mahaleo".to_string(),
        slug: "mahaleo".to_string(),
        song_count: 3,
    }
}

#[tokio::test]
async fn test_scrape_saves_at_threshold_and_resumes_idempotently() {
    let root = serve(lyrics_site()).await;
    let dir = scratch_dir("scrape");

    let config = ScrapeConfig {
        base: Url::parse(&root).unwrap(),
        delay: Duration::from_millis(0),
        artist_workers: 1,
        song_workers: 3,
    };

    // First run: the 120- and 50-char songs save, the 49-char one is a
    // parsing artifact and counts as failed.
    let reports = scrape_artists(
        Arc::new(test_fetcher(1, Duration::from_millis(10))),
        Arc::new(LyricsStore::new(dir.clone())),
        vec![mahaleo()],
        config.clone(),
        Arc::new(RunLog::with_path(dir.join("scrape.log"))),
    )
    .await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].tally.saved, 2);
    assert_eq!(reports[0].tally.skipped, 0);
    assert_eq!(reports[0].tally.failed, 1);

    let fifty = dir.join("mahaleo").join("song-fifty.txt");
    let long = dir.join("mahaleo").join("song-long.txt");
    assert!(fifty.exists());
    assert!(long.exists());
    assert!(!dir.join("mahaleo").join("song-short.txt").exists());

    let fifty_content = std::fs::read_to_string(&fifty).unwrap();
    assert!(fifty_content.starts_with("Title: Fifty\nAuthor: Mahaleo\nSource: "));
    assert!(fifty_content.ends_with(&format!("---\n{}\n", "x".repeat(50))));

    let long_content = std::fs::read_to_string(&long).unwrap();

    // Second run: everything already on disk is skipped before any fetch;
    // the too-short song is naturally retried and fails again.
    let reports = scrape_artists(
        Arc::new(test_fetcher(1, Duration::from_millis(10))),
        Arc::new(LyricsStore::new(dir.clone())),
        vec![mahaleo()],
        config,
        Arc::new(RunLog::with_path(dir.join("scrape.log"))),
    )
    .await;

    assert_eq!(reports[0].tally.saved, 0);
    assert_eq!(reports[0].tally.skipped, 2);
    assert_eq!(reports[0].tally.failed, 1);

    assert_eq!(std::fs::read_to_string(&fifty).unwrap(), fifty_content);
    assert_eq!(std::fs::read_to_string(&long).unwrap(), long_content);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_unreachable_artist_listing_fails_only_that_artist() {
    let root = serve(lyrics_site()).await;
    let dir = scratch_dir("scrape-missing");

    let missing = Artist {
        name: "Missing".to_string(),
        slug: "missing".to_string(),
        song_count: 1,
    };

    let reports = scrape_artists(
        Arc::new(test_fetcher(1, Duration::from_millis(10))),
        Arc::new(LyricsStore::new(dir.clone())),
        vec![missing, mahaleo()],
        ScrapeConfig {
            base: Url::parse(&root).unwrap(),
            delay: Duration::from_millis(0),
            artist_workers: 2,
            song_workers: 2,
        },
        Arc::new(RunLog::with_path(dir.join("scrape.log"))),
    )
    .await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].slug, "missing");
    assert_eq!(reports[0].tally.saved, 0);
    assert_eq!(reports[0].tally.failed, 1);
    assert_eq!(reports[1].slug, "mahaleo");
    assert_eq!(reports[1].tally.saved, 2);

    let _ = std::fs::remove_dir_all(&dir);
}
