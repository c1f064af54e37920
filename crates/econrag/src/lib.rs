//! Resumable abstract harvesting and retrieval for academic journals.
//!
//! `econrag` builds a small retrieval corpus of journal abstracts. It provides:
//!
//! - Cursor-paginated harvesting of Crossref `works` metadata
//! - A persistent, resumable response cache addressed by deterministic keys
//! - Normalization of raw Crossref payloads into flat article records
//! - Abstract cleaning and tokenization
//! - Embedding of the cleaned corpus and nearest-neighbour lookup
//!
//! # Getting Started
//!
//! ```no_run
//! use econrag::{
//!   cache::SqliteCache,
//!   harvest::{yearly_ranges, CrossrefClient, Harvester},
//!   journal::JournalRegistry,
//!   prelude::*,
//!   Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::load(None)?;
//!   let cache = SqliteCache::open(config.cache_path()).await?;
//!   let client = CrossrefClient::new(&config.crossref_url, &config.email)?;
//!   let harvester = Harvester::new(client, cache).with_page_size(config.page_size);
//!
//!   let ranges = yearly_ranges(config.start_year, chrono::Local::now().date_naive());
//!   let report = harvester.run(&JournalRegistry::default(), &ranges).await;
//!   println!("{} pages cached", harvester.cache().len().await?);
//!   println!("{} combinations failed", report.failures.len());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`key`]: Deterministic cache key encoding for fetch parameters
//! - [`cache`]: Persistent response cache and its backends
//! - [`harvest`]: Crossref client, pagination and the harvesting matrix
//! - [`journal`]: Journal identities and their identifier variants
//! - [`normalize`]: Raw payload to [`normalize::ArticleRecord`] conversion
//! - [`text`]: Abstract cleaning and tokenization
//! - [`corpus`]: Replaying the cache into a clean article table
//! - [`artifact`]: JSON Lines tabular artifacts
//! - [`embed`]: Embedding backends and the corpus embedding stage
//! - [`search`]: Cosine-similarity ranking

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod artifact;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod embed;
pub mod error;
pub mod harvest;
pub mod journal;
pub mod key;
pub mod normalize;
pub mod search;
pub mod text;

pub use crate::config::Config;
use crate::{cache::ResponseCache, error::*, journal::JournalRegistry, key::FetchRequest};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use econrag::{cache::MemoryCache, prelude::*};
///
/// async fn example() -> Result<(), EconragError> {
///   let cache = MemoryCache::new();
///   assert!(!cache.contains("issn=0033-5533").await?);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    cache::ResponseCache, embed::Embedder, error::EconragError, harvest::WorksSource,
  };
}
