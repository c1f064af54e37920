//! Embedding backends and the corpus embedding stage.
//!
//! The embedding model is an opaque function from text to a fixed-length
//! vector. Backends implement [`Embedder`]; [`embed_corpus`] runs one over the
//! `document` column of the article table in fixed-size batches.

use super::*;
use crate::normalize::ArticleRecord;

mod http;

pub use http::HttpEmbedder;

/// Default number of documents sent per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// A text embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
  /// Identifier of the underlying model.
  fn model_name(&self) -> &str;

  /// Embeds every text in `texts`, returning one vector per input in order.
  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

  /// Embeds a single text.
  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    self
      .embed_batch(&[text.to_string()])
      .await?
      .pop()
      .ok_or_else(|| {
        EconragError::Embedding(format!("{} returned no embedding", self.model_name()))
      })
  }
}

/// An article and the embedding of its `document` text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedArticle {
  /// The embedded article
  #[serde(flatten)]
  pub article:   ArticleRecord,
  /// Embedding of `article.document`
  pub embedding: Vec<f32>,
}

/// Embeds the `document` of every record, `batch_size` records per request.
///
/// # Errors
///
/// Fails on the first batch the embedder rejects, or if it returns a different
/// number of vectors than it was given texts.
pub async fn embed_corpus<E: Embedder + ?Sized>(
  records: Vec<ArticleRecord>,
  embedder: &E,
  batch_size: usize,
) -> Result<Vec<EmbeddedArticle>> {
  let batch_size = batch_size.max(1);
  let total = records.len();
  let mut embedded = Vec::with_capacity(total);
  let mut records = records.into_iter().peekable();

  while records.peek().is_some() {
    let batch: Vec<ArticleRecord> = records.by_ref().take(batch_size).collect();
    let texts: Vec<String> = batch.iter().map(|record| record.document.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    if vectors.len() != batch.len() {
      return Err(EconragError::Embedding(format!(
        "expected {} embeddings, got {}",
        batch.len(),
        vectors.len()
      )));
    }

    embedded.extend(
      batch
        .into_iter()
        .zip(vectors)
        .map(|(article, embedding)| EmbeddedArticle { article, embedding }),
    );
    info!("Embedded {}/{} documents with {}", embedded.len(), total, embedder.model_name());
  }

  Ok(embedded)
}
