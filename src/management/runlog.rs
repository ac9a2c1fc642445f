use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::Local;
use tokio::io::AsyncWriteExt;

use crate::warning;

/// Append-only run log persisted under the data directory. Every terminal
/// outcome of a run goes through here so interrupted or overnight runs can
/// be audited later. Log I/O failures warn once on the console and are then
/// ignored; they never abort scraping.
pub struct RunLog {
    path: PathBuf,
    warned: AtomicBool,
}

impl RunLog {
    pub fn new(name: &str) -> Self {
        let mut path = crate::config::logs_dir();
        path.push(format!("{name}.log"));
        Self::with_path(path)
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            warned: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn line(&self, message: &str) {
        if let Err(err) = self.append(message).await {
            if !self.warned.swap(true, Ordering::Relaxed) {
                warning!("cannot write run log {}: {}", self.path.display(), err);
            }
        }
    }

    async fn append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{stamp} - {message}\n").as_bytes())
            .await?;
        file.flush().await
    }
}
