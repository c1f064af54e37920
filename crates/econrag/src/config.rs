//! Runtime configuration.
//!
//! Settings are resolved in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file, either given explicitly or found at [`Config::default_path`]
//! 3. Environment variables
//!
//! ```toml
//! data_dir    = "./data"
//! email       = "me@example.org"
//! page_size   = 1000
//! start_year  = 2000
//! embed_model = "all-minilm"
//! journals    = "config/journals.toml"
//! ```
//!
//! | variable              | field         |
//! |-----------------------|---------------|
//! | `USER_EMAIL`          | `email`       |
//! | `ECONRAG_DATA_DIR`    | `data_dir`    |
//! | `ECONRAG_EMBED_URL`   | `embed_url`   |
//! | `ECONRAG_EMBED_MODEL` | `embed_model` |

use super::*;
use crate::{
  artifact,
  embed::DEFAULT_BATCH_SIZE,
  harvest::{CROSSREF_API_URL, DEFAULT_PAGE_SIZE},
};

/// Contact email variable.
pub const EMAIL_VAR: &str = "USER_EMAIL";
/// Data directory variable.
pub const DATA_DIR_VAR: &str = "ECONRAG_DATA_DIR";
/// Embedding server variable.
pub const EMBED_URL_VAR: &str = "ECONRAG_EMBED_URL";
/// Embedding model variable.
pub const EMBED_MODEL_VAR: &str = "ECONRAG_EMBED_MODEL";

/// File name of the response cache under the data directory.
pub const CACHE_FILE: &str = "cache.db";

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory holding the cache and all artifacts
  pub data_dir:     PathBuf,
  /// Contact email sent to Crossref
  pub email:        String,
  /// Crossref API base URL
  pub crossref_url: String,
  /// Items requested per page
  pub page_size:    usize,
  /// First publication year harvested
  pub start_year:   i32,
  /// Embedding server base URL
  pub embed_url:    String,
  /// Embedding model name
  pub embed_model:  String,
  /// Documents per embedding request
  pub batch_size:   usize,
  /// TOML journal registry replacing the built-in one
  pub journals:     Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      data_dir:     PathBuf::from("./data"),
      email:        String::new(),
      crossref_url: CROSSREF_API_URL.to_string(),
      page_size:    DEFAULT_PAGE_SIZE,
      start_year:   2000,
      embed_url:    "http://localhost:11434".to_string(),
      embed_model:  "all-minilm".to_string(),
      batch_size:   DEFAULT_BATCH_SIZE,
      journals:     None,
    }
  }
}

impl Config {
  /// Default location of the configuration file, under the platform config
  /// directory.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("econrag").join("config.toml"))
  }

  /// Loads the configuration from `path`, or from [`Config::default_path`]
  /// when it exists, then applies environment overrides.
  ///
  /// # Errors
  ///
  /// Fails if an explicitly given file cannot be read, or if any file read is
  /// not valid TOML.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let config = match path {
      Some(path) => Self::from_file(path)?,
      None => match Self::default_path().filter(|path| path.exists()) {
        Some(path) => Self::from_file(&path)?,
        None => Self::default(),
      },
    };
    Ok(config.with_overrides(|name| std::env::var(name).ok()))
  }

  /// Reads settings from a TOML file. Missing fields take their defaults.
  pub fn from_file(path: &Path) -> Result<Self> {
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  /// Applies overrides from `lookup`, keyed by variable name. Empty values are
  /// ignored.
  pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
    if let Some(email) = get(EMAIL_VAR) {
      self.email = email;
    }
    if let Some(data_dir) = get(DATA_DIR_VAR) {
      self.data_dir = PathBuf::from(data_dir);
    }
    if let Some(url) = get(EMBED_URL_VAR) {
      self.embed_url = url;
    }
    if let Some(model) = get(EMBED_MODEL_VAR) {
      self.embed_model = model;
    }
    self
  }

  /// The contact email.
  ///
  /// # Errors
  ///
  /// Returns [`EconragError::Config`] if none is configured.
  pub fn contact_email(&self) -> Result<&str> {
    let email = self.email.trim();
    if email.is_empty() {
      return Err(EconragError::Config(format!(
        "a contact email is required; set `email` or {EMAIL_VAR}"
      )));
    }
    Ok(email)
  }

  /// The journal registry, read from `journals` when set.
  pub fn registry(&self) -> Result<JournalRegistry> {
    match &self.journals {
      Some(path) => JournalRegistry::from_file(path),
      None => Ok(JournalRegistry::default()),
    }
  }

  /// Location of the response cache.
  pub fn cache_path(&self) -> PathBuf { self.data_dir.join(CACHE_FILE) }

  /// Location of the cleaned article table.
  pub fn corpus_path(&self) -> PathBuf { artifact::corpus_path(&self.data_dir) }

  /// Location of the embedding table for the configured model.
  pub fn embeddings_path(&self) -> PathBuf {
    artifact::embeddings_path(&self.data_dir, &self.embed_model)
  }
}
