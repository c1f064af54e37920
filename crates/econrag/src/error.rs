//! Error types for the econrag library.
//!
//! A single error enum covers every failure mode of the pipeline:
//! - Cache key encoding and decoding
//! - Cache lookups and storage
//! - Upstream API requests
//! - Payload and input validation
//! - Embedding backends and configuration
//!
//! # Examples
//!
//! ```
//! use econrag::{error::EconragError, key::decode};
//!
//! match decode("malformed") {
//!   Err(EconragError::MalformedKey(segment)) => println!("bad segment: {segment}"),
//!   Err(e) => println!("other error: {e}"),
//!   Ok(_) => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`econrag`](crate) crate.
pub type Result<T> = core::result::Result<T, EconragError>;

/// Errors that can occur while harvesting, normalizing, embedding or querying.
#[derive(Error, Debug)]
pub enum EconragError {
  /// A cache key segment could not be parsed into a `name=value` pair.
  ///
  /// Raised when a segment has no `=` or more than one `=`. The string holds
  /// the offending segment.
  #[error("Malformed cache key segment: {0:?}")]
  MalformedKey(String),

  /// A parameter name or value cannot be encoded into a cache key because it
  /// contains the key delimiter or the `=` separator.
  #[error("Cannot encode {name}={value:?} into a cache key")]
  UnencodableKey {
    /// Parameter name
    name:  String,
    /// Parameter value
    value: String,
  },

  /// A required cache entry does not exist.
  #[error("No cache entry for key {0:?}")]
  KeyNotFound(String),

  /// The upstream metadata API answered with a non-success status.
  #[error("Upstream request to {url} failed with status {status}")]
  UpstreamFetch {
    /// HTTP status code returned by the API
    status: u16,
    /// Request URL, including query parameters
    url:    String,
  },

  /// A cached or fetched payload does not have the expected shape.
  #[error("Invalid cache entry: {0}")]
  InvalidCacheEntry(String),

  /// Text cleaning was given a value that is not text.
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  /// An identifier from a cache key does not belong to any registered journal.
  #[error("No journal registered for identifier {0:?}")]
  UnknownJournal(String),

  /// The embedding backend failed or returned an unusable response.
  #[error("Embedding error: {0}")]
  Embedding(String),

  /// Configuration is missing or invalid.
  #[error("{0}")]
  Config(String),

  /// A network request failed before a response was received.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A TOML configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),
}
