//! Module for the "embed" stage.

use econrag::{
  artifact::{embeddings_path, read_jsonl, write_jsonl},
  embed::{embed_corpus, HttpEmbedder},
  normalize::ArticleRecord,
};

use super::*;

/// Options for the embed stage
#[derive(Args, Clone)]
pub struct EmbedOptions {
  /// Documents per embedding request (defaults to the configured size)
  #[arg(long)]
  pub batch_size: Option<usize>,

  /// Embedding model (defaults to the configured model)
  #[arg(long)]
  pub model: Option<String>,
}

/// Function for the [`Commands::Embed`] in the CLI.
pub async fn embed(config: &Config, options: EmbedOptions) -> Result<()> {
  let corpus_path = require_artifact(config.corpus_path(), "normalize")?;
  let records: Vec<ArticleRecord> = read_jsonl(&corpus_path)?;

  let model = options.model.as_deref().unwrap_or(&config.embed_model);
  let embedder = HttpEmbedder::new(&config.embed_url, model);
  println!(
    "{} Embedding {} articles with {}",
    style(WORKING_PREFIX).cyan(),
    records.len(),
    style(model).cyan()
  );

  let embedded =
    embed_corpus(records, &embedder, options.batch_size.unwrap_or(config.batch_size)).await?;

  let path = embeddings_path(&config.data_dir, model);
  write_jsonl(&path, &embedded)?;
  println!(
    "{} Wrote {} embeddings to {}",
    style(SUCCESS_PREFIX).green(),
    embedded.len(),
    style(path.display()).yellow()
  );
  Ok(())
}
