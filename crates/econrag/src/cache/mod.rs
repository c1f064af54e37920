//! Persistent store of raw API responses.
//!
//! The cache is the single source of truth for "have we already fetched this
//! page". Entries are keyed by [`key`](crate::key) strings and hold the raw
//! `message` payload returned by the upstream API. Nothing is ever evicted: an
//! entry lives until the cache is explicitly cleared.
//!
//! The store is an injected collaborator. Harvesting and corpus building take a
//! [`ResponseCache`] implementation instead of reaching for global state:
//!
//! - [`SqliteCache`]: durable, file-backed store used by the CLI
//! - [`MemoryCache`]: process-local store for tests and dry runs
//!
//! # Examples
//!
//! ```no_run
//! use econrag::{cache::SqliteCache, prelude::*};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), EconragError> {
//! let cache = SqliteCache::open("data/cache.db").await?;
//! cache.put("cursor=*/issn=0033-5533", json!({ "items": [] })).await?;
//! assert!(cache.contains("cursor=*/issn=0033-5533").await?);
//! # Ok(())
//! # }
//! ```

use super::*;

mod memory;
mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// Key/value store of raw API response payloads.
///
/// Writes are last-writer-wins. Implementations must make a `put` visible to
/// every later `get`, including after a process restart for durable backends.
#[async_trait]
pub trait ResponseCache: Send + Sync {
  /// Whether an entry exists for `key`.
  async fn contains(&self, key: &str) -> Result<bool>;

  /// Returns the payload stored under `key`.
  ///
  /// # Errors
  ///
  /// Returns [`EconragError::KeyNotFound`] if nothing is stored under `key`.
  async fn get(&self, key: &str) -> Result<Value>;

  /// Stores `payload` under `key`, replacing any previous entry.
  async fn put(&self, key: &str, payload: Value) -> Result<()>;

  /// All stored keys in ascending order.
  async fn keys(&self) -> Result<Vec<String>>;

  /// Number of stored entries.
  async fn len(&self) -> Result<usize> { Ok(self.keys().await?.len()) }

  /// Whether the cache holds no entries.
  async fn is_empty(&self) -> Result<bool> { Ok(self.len().await? == 0) }

  /// Removes every entry.
  async fn clear(&self) -> Result<()>;
}

#[async_trait]
impl<C: ResponseCache + ?Sized> ResponseCache for std::sync::Arc<C> {
  async fn contains(&self, key: &str) -> Result<bool> { (**self).contains(key).await }

  async fn get(&self, key: &str) -> Result<Value> { (**self).get(key).await }

  async fn put(&self, key: &str, payload: Value) -> Result<()> { (**self).put(key, payload).await }

  async fn keys(&self) -> Result<Vec<String>> { (**self).keys().await }

  async fn len(&self) -> Result<usize> { (**self).len().await }

  async fn clear(&self) -> Result<()> { (**self).clear().await }
}
