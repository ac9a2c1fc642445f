use std::{
    io::Error,
    path::{Path, PathBuf},
};

use crate::{types::SongRecord, utils::sanitize_filename};

#[derive(Debug)]
pub enum StoreError {
    IoError(Error),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        StoreError::IoError(err)
    }
}

/// On-disk store for extracted lyrics, one text file per song under
/// `root/<artist_slug>/`. Restarted runs probe [`LyricsStore::exists`]
/// before fetching anything, so a song already on disk costs no network
/// round trip.
pub struct LyricsStore {
    root: PathBuf,
}

impl LyricsStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path a song is expected at, before any collision suffix.
    pub fn song_path(&self, artist_slug: &str, slug_hint: &str) -> PathBuf {
        self.root
            .join(artist_slug)
            .join(format!("{}.txt", sanitize_filename(slug_hint)))
    }

    pub fn exists(&self, artist_slug: &str, slug_hint: &str) -> bool {
        self.song_path(artist_slug, slug_hint).exists()
    }

    /// Writes one song artifact and returns its path.
    ///
    /// The artifact is self-describing: a `Title:`/`Author:`/`Source:`
    /// header, a `---` separator, then the lyrics. When the expected name is
    /// taken, numeric suffixes `_1`, `_2`, ... are probed in order. Content
    /// goes to a `.tmp` sibling first and is renamed into place, so an
    /// interrupted run leaves no truncated artifact behind.
    pub async fn save(
        &self,
        artist_slug: &str,
        slug_hint: &str,
        record: &SongRecord,
        source_url: &str,
    ) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(artist_slug);
        async_fs::create_dir_all(&dir).await?;

        let base = sanitize_filename(slug_hint);
        let mut path = dir.join(format!("{base}.txt"));
        let mut suffix = 1;
        while path.exists() {
            path = dir.join(format!("{base}_{suffix}.txt"));
            suffix += 1;
        }

        let content = format!(
            "Title: {}\nAuthor: {}\nSource: {}\n---\n{}\n",
            record.title, record.artist, source_url, record.lyrics
        );

        let tmp = path.with_extension("txt.tmp");
        async_fs::write(&tmp, content).await?;
        async_fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}
