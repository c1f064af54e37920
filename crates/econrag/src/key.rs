//! Deterministic cache keys for fetch parameters.
//!
//! A [`FetchRequest`] is a set of named parameters (journal ISSN, date range,
//! cursor, optional DOI prefix). Its cache key is the Hive-style rendering of
//! those parameters: names sorted by codepoint, each rendered `name=value`, and
//! joined with [`KEY_DELIMITER`].
//!
//! ```
//! use econrag::key::FetchRequest;
//!
//! let request = FetchRequest::new()
//!   .with("issn", "0033-5533")
//!   .with("date_to", "2020-12-31")
//!   .with("date_from", "2020-01-01")
//!   .with("cursor", "*");
//!
//! let key = request.to_key()?;
//! assert_eq!(key, "cursor=*/date_from=2020-01-01/date_to=2020-12-31/issn=0033-5533");
//! assert_eq!(FetchRequest::from_key(&key)?, request);
//! # Ok::<(), econrag::error::EconragError>(())
//! ```
//!
//! Values containing `=` cannot be represented: decoding such a segment fails
//! with [`EconragError::MalformedKey`], so encoding refuses them up front.

use super::*;

/// Separator between `name=value` segments of a cache key.
pub const KEY_DELIMITER: char = '/';

/// Separator between a parameter name and its value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Encodes a parameter mapping into its canonical cache key.
///
/// The mapping is ordered, so the output does not depend on how it was built.
/// An empty mapping encodes to the empty string.
///
/// # Errors
///
/// Returns [`EconragError::UnencodableKey`] if any name or value contains
/// [`KEY_DELIMITER`] or [`KEY_VALUE_SEPARATOR`].
pub fn encode(params: &BTreeMap<String, String>) -> Result<String> {
  let mut segments = Vec::with_capacity(params.len());
  for (name, value) in params {
    if !is_encodable(name) || !is_encodable(value) {
      return Err(EconragError::UnencodableKey { name: name.clone(), value: value.clone() });
    }
    segments.push(format!("{name}{KEY_VALUE_SEPARATOR}{value}"));
  }
  Ok(segments.join(&KEY_DELIMITER.to_string()))
}

/// Decodes a cache key back into its parameter mapping.
///
/// The empty string decodes to an empty mapping. Empty segments are skipped.
///
/// # Errors
///
/// Returns [`EconragError::MalformedKey`] for any segment that does not contain
/// exactly one [`KEY_VALUE_SEPARATOR`].
pub fn decode(key: &str) -> Result<BTreeMap<String, String>> {
  let mut params = BTreeMap::new();
  for segment in key.split(KEY_DELIMITER).filter(|segment| !segment.is_empty()) {
    let mut parts = segment.split(KEY_VALUE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
      (Some(name), Some(value), None) => {
        params.insert(name.to_string(), value.to_string());
      },
      _ => return Err(EconragError::MalformedKey(segment.to_string())),
    }
  }
  Ok(params)
}

/// Whether a name or value can appear inside a key segment.
fn is_encodable(part: &str) -> bool {
  !part.contains(KEY_DELIMITER) && !part.contains(KEY_VALUE_SEPARATOR)
}

/// A named set of parameters describing one page fetch.
///
/// Equality is mapping equality, so two requests built in different orders
/// compare equal and encode to the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
  /// Parameters in canonical (sorted) order
  params: BTreeMap<String, String>,
}

impl FetchRequest {
  /// Creates a request with no parameters.
  pub fn new() -> Self { Self::default() }

  /// Adds or replaces a parameter.
  pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
    self.params.insert(name.into(), value.to_string());
    self
  }

  /// Looks up a parameter value.
  pub fn get(&self, name: &str) -> Option<&str> { self.params.get(name).map(String::as_str) }

  /// The underlying parameter mapping.
  pub fn params(&self) -> &BTreeMap<String, String> { &self.params }

  /// Renders this request as a cache key. See [`encode`].
  pub fn to_key(&self) -> Result<String> { encode(&self.params) }

  /// Recovers a request from a cache key. See [`decode`].
  pub fn from_key(key: &str) -> Result<Self> { Ok(Self { params: decode(key)? }) }
}

impl From<BTreeMap<String, String>> for FetchRequest {
  fn from(params: BTreeMap<String, String>) -> Self { Self { params } }
}
