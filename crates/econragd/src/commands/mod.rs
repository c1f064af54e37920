use super::*;

pub mod clear;
pub mod embed;
pub mod harvest;
pub mod keys;
pub mod normalize;
pub mod query;

pub use clear::clear;
pub use embed::{embed, EmbedOptions};
pub use harvest::{harvest, HarvestOptions};
pub use keys::keys;
pub use normalize::normalize;
pub use query::{query, QueryOptions};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Fetch journal metadata from Crossref into the response cache
  Harvest(HarvestOptions),

  /// Replay the response cache into the cleaned article table
  Normalize,

  /// Embed every article in the cleaned table
  Embed(EmbedOptions),

  /// Find the articles closest to a free-text query
  Query(QueryOptions),

  /// List cached pages with their fetch parameters
  Keys,

  /// Remove every cached response after confirmation
  Clear,
}

/// Fails with [`EconragdError::MissingArtifact`] unless `path` exists.
fn require_artifact(path: PathBuf, stage: &'static str) -> Result<PathBuf> {
  if path.exists() {
    Ok(path)
  } else {
    Err(EconragdError::MissingArtifact { path, stage })
  }
}
