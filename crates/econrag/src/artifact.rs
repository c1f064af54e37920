//! JSON Lines tabular artifacts.
//!
//! Each stage of the pipeline hands its table to the next through a file in
//! the data directory, one serialized record per line:
//!
//! - [`corpus_path`]: the cleaned article table
//! - [`embeddings_path`]: the article table with one embedding per row

use std::{
  fs::File,
  io::{BufRead, BufReader, BufWriter, Write},
};

use serde::de::DeserializeOwned;

use super::*;

/// File name of the cleaned article table.
pub const CORPUS_FILE: &str = "abstracts_clean.jsonl";

/// Location of the cleaned article table under `data_dir`.
pub fn corpus_path(data_dir: &Path) -> PathBuf { data_dir.join(CORPUS_FILE) }

/// Location of the embedding table for `model` under `data_dir`.
///
/// ```
/// use std::path::Path;
///
/// use econrag::artifact::embeddings_path;
///
/// let path = embeddings_path(Path::new("data"), "nomic-ai/nomic-embed-text:v1.5");
/// assert_eq!(path, Path::new("data/embeddings_nomic-ai-nomic-embed-text-v1.5.jsonl"));
/// ```
pub fn embeddings_path(data_dir: &Path, model: &str) -> PathBuf {
  data_dir.join(format!("embeddings_{}.jsonl", model.replace(['/', ':'], "-")))
}

/// Writes `records` to `path`, one JSON object per line, replacing the file.
///
/// Parent directories are created as needed. Returns the number of records
/// written.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }

  let mut writer = BufWriter::new(File::create(path)?);
  for record in records {
    serde_json::to_writer(&mut writer, record)?;
    writer.write_all(b"\n")?;
  }
  writer.flush()?;

  debug!("Wrote {} records to {}", records.len(), path.display());
  Ok(records.len())
}

/// Reads every record from a JSON Lines file. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`EconragError::Path`] if the file cannot be read and
/// [`EconragError::Json`] for the first line that does not parse.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
  let reader = BufReader::new(File::open(path)?);
  let mut records = Vec::new();
  for line in reader.lines() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }
    records.push(serde_json::from_str(&line)?);
  }
  debug!("Read {} records from {}", records.len(), path.display());
  Ok(records)
}
