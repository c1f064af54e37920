use reqwest::Client;

use super::*;

/// Base URL of the public Crossref REST API.
pub const CROSSREF_API_URL: &str = "https://api.crossref.org";

/// Work fields requested from Crossref.
pub const SELECT_FIELDS: &str = "DOI,title,author,issued,abstract,container-title";

/// [`WorksSource`] backed by the Crossref `works` endpoint.
///
/// Requests carry the caller's contact address both as the `mailto` parameter
/// and in the `User-Agent`, which routes them to Crossref's polite pool.
#[derive(Debug, Clone)]
pub struct CrossrefClient {
  /// HTTP client with the polite-pool user agent
  client:   Client,
  /// API base URL without trailing slash
  base_url: String,
  /// Contact address sent with every request
  mailto:   String,
}

impl CrossrefClient {
  /// Creates a client for the API at `base_url`, identifying as `mailto`.
  ///
  /// # Errors
  ///
  /// Returns [`EconragError::Network`] if the HTTP client cannot be built.
  pub fn new(base_url: &str, mailto: &str) -> Result<Self> {
    let client = Client::builder()
      .user_agent(format!("econrag/{} (mailto:{})", env!("CARGO_PKG_VERSION"), mailto))
      .build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      mailto: mailto.to_string(),
    })
  }

  /// The API base URL.
  pub fn base_url(&self) -> &str { &self.base_url }
}

#[async_trait]
impl WorksSource for CrossrefClient {
  async fn fetch_page(&self, query: &WorksQuery, cursor: &str, rows: usize) -> Result<Value> {
    let url = format!("{}/works", self.base_url);
    let filter = query.filter();
    let rows = rows.to_string();

    debug!("GET {} filter={} cursor={}", url, filter, cursor);
    let response = self
      .client
      .get(&url)
      .query(&[
        ("filter", filter.as_str()),
        ("rows", rows.as_str()),
        ("select", SELECT_FIELDS),
        ("sort", "published"),
        ("order", "desc"),
        ("mailto", self.mailto.as_str()),
        ("cursor", cursor),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(EconragError::UpstreamFetch {
        status: status.as_u16(),
        url:    response.url().to_string(),
      });
    }

    let mut body: Value = response.json().await?;
    match body.get_mut("message").map(Value::take) {
      Some(message @ Value::Object(_)) => Ok(message),
      _ => Err(EconragError::InvalidCacheEntry(format!(
        "response from {url} has no message object"
      ))),
    }
  }
}
