use tokio::sync::RwLock;

use super::*;

/// In-process [`ResponseCache`] backed by an ordered map.
///
/// Nothing is persisted. Useful as a test double and for dry runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
  /// Stored payloads by key
  entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryCache {
  /// Creates an empty cache.
  pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ResponseCache for MemoryCache {
  async fn contains(&self, key: &str) -> Result<bool> {
    Ok(self.entries.read().await.contains_key(key))
  }

  async fn get(&self, key: &str) -> Result<Value> {
    self
      .entries
      .read()
      .await
      .get(key)
      .cloned()
      .ok_or_else(|| EconragError::KeyNotFound(key.to_string()))
  }

  async fn put(&self, key: &str, payload: Value) -> Result<()> {
    self.entries.write().await.insert(key.to_string(), payload);
    Ok(())
  }

  async fn keys(&self) -> Result<Vec<String>> {
    Ok(self.entries.read().await.keys().cloned().collect())
  }

  async fn len(&self) -> Result<usize> { Ok(self.entries.read().await.len()) }

  async fn clear(&self) -> Result<()> {
    self.entries.write().await.clear();
    Ok(())
  }
}
