use std::{collections::HashSet, io::Error, path::Path};

use crate::types::Artist;

#[derive(Debug)]
pub enum ManagerError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for ManagerError {
    fn from(err: Error) -> Self {
        ManagerError::IoError(err)
    }
}

/// The discovery collection: artists in first-seen order, deduplicated by
/// slug. A duplicate slug keeps the first record, including its count.
pub struct ArtistManager {
    artists: Vec<Artist>,
    seen: HashSet<String>,
}

impl ArtistManager {
    pub fn new() -> Self {
        Self {
            artists: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn insert(&mut self, artist: Artist) -> bool {
        if self.seen.insert(artist.slug.clone()) {
            self.artists.push(artist);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn into_artists(self) -> Vec<Artist> {
        self.artists
    }

    pub fn total_songs(&self) -> u64 {
        self.artists.iter().map(|a| a.song_count as u64).sum()
    }

    /// Drops artists advertising zero songs; returns how many were removed.
    pub fn drop_without_songs(&mut self) -> usize {
        let before = self.artists.len();
        self.artists.retain(|a| a.song_count > 0);
        self.seen = self.artists.iter().map(|a| a.slug.clone()).collect();
        before - self.artists.len()
    }

    pub fn top_by_songs(&self, count: usize) -> Vec<Artist> {
        let mut sorted = self.artists.clone();
        sorted.sort_by(|a, b| b.song_count.cmp(&a.song_count));
        sorted.truncate(count);
        sorted
    }

    pub async fn persist(&self, path: &Path) -> Result<(), ManagerError> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(ManagerError::IoError)?;
        }

        let json =
            serde_json::to_string_pretty(&self.artists).map_err(ManagerError::SerdeError)?;
        async_fs::write(path, json)
            .await
            .map_err(ManagerError::IoError)
    }

    pub async fn load(path: &Path) -> Result<Self, ManagerError> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(ManagerError::IoError)?;
        let artists: Vec<Artist> =
            serde_json::from_str(&content).map_err(ManagerError::SerdeError)?;
        let seen = artists.iter().map(|a| a.slug.clone()).collect();
        Ok(Self { artists, seen })
    }
}

impl Default for ArtistManager {
    fn default() -> Self {
        Self::new()
    }
}
