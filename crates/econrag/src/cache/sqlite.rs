use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use super::*;

/// Schema for the response table. Payloads are stored as JSON text.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
  key     TEXT PRIMARY KEY NOT NULL,
  payload TEXT NOT NULL
);";

/// Durable [`ResponseCache`] stored in a single SQLite file.
///
/// Every `put` is an autocommitted statement, so it is on disk before the call
/// returns and the next process start observes it.
pub struct SqliteCache {
  /// Async SQLite connection handle
  conn: Connection,
  /// Location of the database file
  path: PathBuf,
}

impl SqliteCache {
  /// Opens the cache at `path`, creating the file, its parent directories and
  /// the schema if needed.
  ///
  /// # Examples
  ///
  /// ```no_run
  /// # use econrag::cache::SqliteCache;
  /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
  /// let cache = SqliteCache::open("data/cache.db").await?;
  /// # Ok(())
  /// # }
  /// ```
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&path).await?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    debug!("Opened response cache at {}", path.display());
    Ok(Self { conn, path })
  }

  /// Location of the backing database file.
  pub fn path(&self) -> &Path { &self.path }
}

#[async_trait]
impl ResponseCache for SqliteCache {
  async fn contains(&self, key: &str) -> Result<bool> {
    let key = key.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached("SELECT 1 FROM responses WHERE key = ?1")?;
        Ok(stmt.exists(params![key])?)
      })
      .await
      .map_err(EconragError::from)
  }

  async fn get(&self, key: &str) -> Result<Value> {
    let owned_key = key.to_string();
    let payload = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached("SELECT payload FROM responses WHERE key = ?1")?;
        Ok(stmt.query_row(params![owned_key], |row| row.get::<_, String>(0)).optional()?)
      })
      .await?;

    match payload {
      Some(payload) => Ok(serde_json::from_str(&payload)?),
      None => Err(EconragError::KeyNotFound(key.to_string())),
    }
  }

  async fn put(&self, key: &str, payload: Value) -> Result<()> {
    let key = key.to_string();
    let payload = serde_json::to_string(&payload)?;
    trace!("Caching {} bytes under {}", payload.len(), key);
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare_cached("INSERT OR REPLACE INTO responses (key, payload) VALUES (?1, ?2)")?;
        stmt.execute(params![key, payload])?;
        Ok(())
      })
      .await
      .map_err(EconragError::from)
  }

  async fn keys(&self) -> Result<Vec<String>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT key FROM responses ORDER BY key")?;
        let keys = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(keys.collect::<std::result::Result<Vec<_>, _>>()?)
      })
      .await
      .map_err(EconragError::from)
  }

  async fn len(&self) -> Result<usize> {
    let count = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get::<_, i64>(0))?)
      })
      .await?;
    Ok(usize::try_from(count).unwrap_or_default())
  }

  async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM responses", [])?;
        Ok(())
      })
      .await?;
    info!("Cleared response cache at {}", self.path.display());
    Ok(())
  }
}
