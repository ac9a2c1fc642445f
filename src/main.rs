use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use hiracli::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Discover all artists from the listing pages
    Discover(DiscoverOptions),

    /// Scrape lyrics for every discovered artist
    Scrape(ScrapeOptions),

    /// Analyze the scraped output directory
    Stats(StatsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct DiscoverOptions {
    /// Delay between listing-page requests in seconds
    #[clap(long, default_value_t = 2.0)]
    pub delay: f64,

    /// Fetch attempts per page
    #[clap(long, default_value_t = 3)]
    pub retries: u32,

    /// Base backoff delay between fetch attempts in seconds
    #[clap(long, default_value_t = 2.0)]
    pub backoff: f64,

    /// Output file for the artist list (default: data dir artists.json)
    #[clap(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ScrapeOptions {
    /// Artist list produced by `discover` (default: data dir artists.json)
    #[clap(long)]
    pub artists_file: Option<PathBuf>,

    /// Output directory for lyrics files
    #[clap(long, default_value = "output")]
    pub output: PathBuf,

    /// Delay between an artist's listing-page requests in seconds
    #[clap(long, default_value_t = 2.0)]
    pub delay: f64,

    /// Skip the first N artists (resume a crashed run at artist granularity)
    #[clap(long, default_value_t = 0)]
    pub start_from: usize,

    /// Scrape a single artist by slug (e.g. mahaleo)
    #[clap(long)]
    pub artist: Option<String>,

    /// Number of artists processed concurrently
    #[clap(long, default_value_t = 1)]
    pub artist_workers: usize,

    /// Number of songs fetched concurrently per artist
    #[clap(long, default_value_t = 5)]
    pub song_workers: usize,

    /// Fetch attempts per page
    #[clap(long, default_value_t = 3)]
    pub retries: u32,

    /// Base backoff delay between fetch attempts in seconds
    #[clap(long, default_value_t = 2.0)]
    pub backoff: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct StatsOptions {
    /// Output directory to analyze
    #[clap(long, default_value = "output")]
    pub output: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Discover(opt) => {
            cli::discover(opt.delay, opt.retries, opt.backoff, opt.output).await
        }
        Command::Scrape(opt) => {
            cli::scrape(cli::ScrapeOptions {
                artists_file: opt.artists_file,
                output: opt.output,
                delay: opt.delay,
                start_from: opt.start_from,
                artist: opt.artist,
                artist_workers: opt.artist_workers,
                song_workers: opt.song_workers,
                retries: opt.retries,
                backoff: opt.backoff,
            })
            .await
        }
        Command::Stats(opt) => cli::stats(opt.output).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
