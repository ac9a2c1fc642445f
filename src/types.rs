use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub slug: String,
    pub song_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLink {
    pub url: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongRecord {
    pub title: String,
    pub artist: String,
    pub lyrics: String,
}

/// Terminal outcome of one song task. `TooShort` and `Absent` are distinct
/// for the run log but both count as failures in the aggregate tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongOutcome {
    Saved(String),
    Skipped,
    TooShort(String),
    Absent(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtistTally {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ArtistTally {
    pub fn record(&mut self, outcome: &SongOutcome) {
        match outcome {
            SongOutcome::Saved(_) => self.saved += 1,
            SongOutcome::Skipped => self.skipped += 1,
            SongOutcome::TooShort(_) | SongOutcome::Absent(_) | SongOutcome::Failed(_) => {
                self.failed += 1
            }
        }
    }

    pub fn merge(&mut self, other: ArtistTally) {
        self.saved += other.saved;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone)]
pub struct ArtistReport {
    pub name: String,
    pub slug: String,
    pub tally: ArtistTally,
}

#[derive(Tabled)]
pub struct ArtistRankRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    pub songs: u32,
}

#[derive(Tabled)]
pub struct ScrapeSummaryRow {
    pub artist: String,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Tabled)]
pub struct StatsRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub artist: String,
    pub songs: usize,
    pub size: String,
}
