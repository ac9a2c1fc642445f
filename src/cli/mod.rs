//! # CLI Module
//!
//! This module provides the command-line interface layer for hiracli, a
//! scraper that collects Malagasy song lyrics from tononkira.serasera.org.
//! It wires user-facing commands to the fetcher, parsers, stores and the
//! scrape orchestration.
//!
//! ## Commands
//!
//! - [`discover`] - Phase A: walk the paginated artist index and persist
//!   the artist collection (`artists.json`)
//! - [`scrape`] - Phase B: walk every artist's song listing and store one
//!   lyrics file per song, resuming past completed work
//! - [`stats`] - Analyze the output directory and report per-artist counts,
//!   sizes and anomalies
//!
//! ## Data Flow
//!
//! ```text
//! CLI Layer (flags -> configs, summaries, tables)
//!     ↓
//! Scrape Layer (discovery / song orchestration)
//!     ↓
//! Fetch + Parse Layers (HTTP with retry, HTML extraction)
//!     ↓
//! Management Layer (artists.json, lyrics store, run log)
//! ```
//!
//! ## Error Handling Philosophy
//!
//! Per-item failures (one page, one song, one artist) are absorbed into
//! counted outcomes and logged; only two conditions end the process early:
//! an unreachable discovery root and a missing artists file. The operator
//! re-runs the same command to pick up failed items, relying on resume
//! semantics rather than in-run retries.

mod discover;
mod scrape;
mod stats;

pub use discover::discover;
pub use scrape::ScrapeOptions;
pub use scrape::scrape;
pub use stats::stats;
