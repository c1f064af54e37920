//! Module for the "normalize" stage.

use econrag::{artifact::write_jsonl, corpus};

use super::*;

/// Function for the [`Commands::Normalize`] in the CLI.
pub async fn normalize(config: &Config) -> Result<()> {
  let registry = config.registry()?;
  let cache = SqliteCache::open(config.cache_path()).await?;

  let records = corpus::build_corpus(&cache, &registry).await?;
  if records.is_empty() {
    println!("{} No articles in the cache; run `econrag harvest` first", style(INFO_PREFIX).blue());
  }

  for ((journal, desired), count) in corpus::journal_counts(&records) {
    println!(
      "{} {} (requested as {}): {}",
      style(ITEM_PREFIX).dim(),
      style(journal).cyan(),
      desired.as_deref().unwrap_or("-"),
      count
    );
  }

  let path = config.corpus_path();
  let written = write_jsonl(&path, &records)?;
  println!(
    "{} Wrote {} articles to {}",
    style(SUCCESS_PREFIX).green(),
    written,
    style(path.display()).yellow()
  );
  Ok(())
}
