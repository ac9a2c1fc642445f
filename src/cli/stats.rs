use std::{fs, path::PathBuf};

use tabled::Table;

use crate::{error, info, success, types::StatsRow, utils::format_size, warning};

struct ArtistStats {
    name: String,
    count: usize,
    size: u64,
}

/// Analyzes the output directory and reports per-artist file counts and
/// sizes, totals, and anomalies (empty artist directories, suspiciously
/// small files).
pub async fn stats(output: PathBuf) {
    if !output.is_dir() {
        error!(
            "Output directory {} not found.\nRun hiracli scrape first.",
            output.display()
        );
    }

    let mut artists: Vec<ArtistStats> = Vec::new();
    let mut empty_dirs: Vec<String> = Vec::new();
    let mut small_files: Vec<String> = Vec::new();

    let mut entries: Vec<_> = match fs::read_dir(&output) {
        Ok(entries) => entries.flatten().collect(),
        Err(err) => error!("Cannot read {}: {}", output.display(), err),
    };
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let mut count = 0usize;
        let mut size = 0u64;
        if let Ok(files) = fs::read_dir(&path) {
            for file in files.flatten() {
                let file_path = file.path();
                if file_path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
                    continue;
                }
                count += 1;
                if let Ok(meta) = file.metadata() {
                    size += meta.len();
                    if meta.len() < 100 {
                        small_files
                            .push(format!("{}/{}", name, file.file_name().to_string_lossy()));
                    }
                }
            }
        }

        if count == 0 {
            empty_dirs.push(name.clone());
        }
        artists.push(ArtistStats { name, count, size });
    }

    let total_files: usize = artists.iter().map(|a| a.count).sum();
    let total_size: u64 = artists.iter().map(|a| a.size).sum();

    info!("{} artist directories in {}", artists.len(), output.display());
    info!("{} songs, {} total", total_files, format_size(total_size));
    if total_files > 0 {
        info!(
            "average song size: {}",
            format_size(total_size / total_files as u64)
        );
    }

    artists.sort_by(|a, b| b.count.cmp(&a.count));
    let rows: Vec<StatsRow> = artists
        .iter()
        .take(20)
        .enumerate()
        .map(|(index, a)| StatsRow {
            rank: index + 1,
            artist: a.name.clone(),
            songs: a.count,
            size: format_size(a.size),
        })
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    if !empty_dirs.is_empty() {
        warning!(
            "{} artist directories contain no songs: {}",
            empty_dirs.len(),
            empty_dirs.join(", ")
        );
    }
    if !small_files.is_empty() {
        warning!(
            "{} files are smaller than 100 bytes (possible extraction artifacts)",
            small_files.len()
        );
    }

    success!("Stats done.");
}
