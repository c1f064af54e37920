//! Error types for the econrag command line interface.

use std::path::PathBuf;

use econrag::error::EconragError;
use thiserror::Error;

/// Error type alias used for the CLI.
pub type Result<T> = core::result::Result<T, EconragdError>;

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum EconragdError {
  /// A pipeline stage failed.
  #[error(transparent)]
  Econrag(#[from] EconragError),

  /// An interactive prompt failed.
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// An artifact produced by an earlier stage does not exist yet.
  #[error("{} not found; run `econrag {stage}` first", .path.display())]
  MissingArtifact {
    /// Expected artifact location
    path:  PathBuf,
    /// Command that produces it
    stage: &'static str,
  },
}
