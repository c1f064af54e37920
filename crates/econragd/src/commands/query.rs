//! Module for the "query" stage.

use econrag::{
  artifact::{embeddings_path, read_jsonl},
  embed::{EmbeddedArticle, HttpEmbedder},
  search::top_k,
};

use super::*;

/// Options for the query stage
#[derive(Args, Clone)]
pub struct QueryOptions {
  /// Free-text query
  pub text: String,

  /// Number of articles to return
  #[arg(short, default_value_t = 5)]
  pub k: usize,

  /// Embedding model the corpus was embedded with (defaults to the configured
  /// model)
  #[arg(long)]
  pub model: Option<String>,
}

/// Function for the [`Commands::Query`] in the CLI.
pub async fn query(config: &Config, options: QueryOptions) -> Result<()> {
  let model = options.model.as_deref().unwrap_or(&config.embed_model);
  let path = require_artifact(embeddings_path(&config.data_dir, model), "embed")?;
  let articles: Vec<EmbeddedArticle> = read_jsonl(&path)?;

  let embedder = HttpEmbedder::new(&config.embed_url, model);
  let query = embedder.embed(&options.text).await?;

  let matches = top_k(&query, &articles, options.k);
  if matches.is_empty() {
    println!("{} No articles to search", style(INFO_PREFIX).blue());
  }

  for m in matches {
    let article = &m.article.article;
    let year = article.year.map_or_else(|| "n.d.".to_string(), |year| year.to_string());
    println!(
      "{} {:.3}  {}",
      style(format!("{:>2}.", m.rank)).bold(),
      m.score,
      style(&article.title).cyan()
    );
    println!("    {} ({}) {}", article.journal, year, style(&article.doi).dim());
  }
  Ok(())
}
