use reqwest::Client;

use super::*;

/// Path of the batch embedding endpoint.
const EMBED_ENDPOINT: &str = "/api/embed";

/// Request body for the embedding endpoint.
#[derive(Serialize)]
struct EmbedRequest<'a> {
  /// Model to embed with
  model: &'a str,
  /// Texts to embed
  input: &'a [String],
}

/// Response body of the embedding endpoint.
#[derive(Deserialize)]
struct EmbedResponse {
  /// One vector per input, in order
  #[serde(default)]
  embeddings: Vec<Vec<f32>>,
}

/// [`Embedder`] backed by an Ollama-compatible HTTP embedding server.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
  /// HTTP client
  client: Client,
  /// Server base URL without trailing slash
  url:    String,
  /// Model identifier sent with each request
  model:  String,
}

impl HttpEmbedder {
  /// Creates an embedder for `model` served at `url`.
  ///
  /// ```
  /// use econrag::{embed::HttpEmbedder, prelude::*};
  ///
  /// let embedder = HttpEmbedder::new("http://localhost:11434/", "all-minilm");
  /// assert_eq!(embedder.model_name(), "all-minilm");
  /// ```
  pub fn new(url: &str, model: &str) -> Self {
    Self {
      client: Client::new(),
      url:    url.trim_end_matches('/').to_string(),
      model:  model.to_string(),
    }
  }
}

#[async_trait]
impl Embedder for HttpEmbedder {
  fn model_name(&self) -> &str { &self.model }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    let url = format!("{}{}", self.url, EMBED_ENDPOINT);
    debug!("Embedding {} texts with {} at {}", texts.len(), self.model, url);
    let response =
      self.client.post(&url).json(&EmbedRequest { model: &self.model, input: texts }).send().await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(EconragError::Embedding(format!("{url} returned {status}: {body}")));
    }

    let EmbedResponse { embeddings } = response.json().await?;
    if embeddings.len() != texts.len() {
      return Err(EconragError::Embedding(format!(
        "requested {} embeddings, received {}",
        texts.len(),
        embeddings.len()
      )));
    }
    Ok(embeddings)
  }
}
