//! Configuration management for the lyrics scraper.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage the scraping target, HTTP client identity and local storage
//! locations.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults
//!
//! Unlike credentials, every value here has a sensible default, so a plain
//! `hiracli discover` works without any configuration at all.

use std::{env, path::PathBuf};

use dotenv;

/// Default base URL of the scraped site.
const DEFAULT_BASE_URL: &str = "https://tononkira.serasera.org";

/// Default User-Agent header sent with every request.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `hiracli/.env`. The file is optional; when it
/// is absent, built-in defaults and the process environment apply.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/hiracli/.env`
/// - macOS: `~/Library/Application Support/hiracli/.env`
/// - Windows: `%LOCALAPPDATA%/hiracli/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment is ready (with or without a `.env`
/// file), or an error string if directory creation fails.
pub async fn load_env() -> Result<(), String> {
    let mut path = data_dir();
    path.push(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the base URL of the scraped site.
///
/// Retrieves the `TONONKIRA_BASE_URL` environment variable, falling back to
/// the public tononkira.serasera.org instance. Override this to point the
/// scraper at a mirror.
///
/// # Example
///
/// ```
/// let base = base_url(); // e.g., "https://tononkira.serasera.org"
/// ```
pub fn base_url() -> String {
    env::var("TONONKIRA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Returns the artist listing URL (the discovery entry point).
///
/// The artist index lives under `/mpihira` ("performers") on the site; the
/// listing is paginated with a `page` query parameter.
pub fn artists_list_url() -> String {
    format!("{}/mpihira", base_url().trim_end_matches('/'))
}

/// Returns the User-Agent header value used for all requests.
///
/// Retrieves the `TONONKIRA_USER_AGENT` environment variable, falling back
/// to a desktop browser identity.
pub fn user_agent() -> String {
    env::var("TONONKIRA_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string())
}

/// Returns the per-request timeout in seconds.
///
/// Retrieves the `TONONKIRA_TIMEOUT` environment variable; values that are
/// missing or fail to parse fall back to the default of 20 seconds.
pub fn request_timeout_secs() -> u64 {
    env::var("TONONKIRA_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// Returns the application data directory.
///
/// All run artifacts that are not scrape output live here: the default
/// `artists.json`, run logs and the optional `.env` file.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("hiracli");
    path
}

/// Returns the default location of the discovery output file.
pub fn default_artists_file() -> PathBuf {
    let mut path = data_dir();
    path.push("artists.json");
    path
}

/// Returns the directory where run logs are persisted.
pub fn logs_dir() -> PathBuf {
    let mut path = data_dir();
    path.push("logs");
    path
}
