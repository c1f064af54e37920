//! Conversion of raw Crossref payloads into flat article records.
//!
//! Cached payloads are the `message` object of a Crossref `works` response. The
//! payload shape is loose (most fields are optional, list-valued, or both), so
//! it is first deserialized into the explicit optional-field types
//! [`WorksMessage`] and [`WorkItem`], and only then flattened into
//! [`ArticleRecord`]s with documented defaults:
//!
//! | field       | source                          | default          |
//! |-------------|---------------------------------|------------------|
//! | `title`     | `title[0]`                      | `""`             |
//! | `year`      | `issued.date-parts[0][0]`       | `None` (unknown) |
//! | `doi`       | `DOI` (string or `DOI[0]`)      | `""`             |
//! | `authors`   | `author[*].given + family`      | `[]`             |
//! | `journal`   | `container-title[0]`            | request journal  |
//! | `abstract`  | `abstract`                      | `""`             |

use super::*;

/// The `message` object of one Crossref `works` page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorksMessage {
  /// Works on this page
  pub items:         Vec<WorkItem>,
  /// Cursor for the next page, when more pages remain
  #[serde(rename = "next-cursor")]
  pub next_cursor:   Option<String>,
  /// Total number of works matching the query
  #[serde(rename = "total-results")]
  pub total_results: Option<u64>,
}

/// A single work as selected by the harvester.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkItem {
  /// DOI, reported either as a string or a list
  #[serde(rename = "DOI")]
  pub doi:             Option<OneOrMany>,
  /// Title(s)
  pub title:           Option<Vec<String>>,
  /// Journal title(s)
  #[serde(rename = "container-title")]
  pub container_title: Option<Vec<String>>,
  /// Authors in publication order
  pub author:          Option<Vec<WorkAuthor>>,
  /// Issue date
  pub issued:          Option<DateParts>,
  /// Abstract, usually JATS markup. Kept dynamic so non-text values are caught
  /// by the text cleaner's type check.
  #[serde(rename = "abstract")]
  pub abstract_text:   Option<Value>,
}

/// A value Crossref reports either as a scalar or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
  /// A single string
  One(String),
  /// A list of strings
  Many(Vec<String>),
}

impl OneOrMany {
  /// The single value, or the first element of the list.
  pub fn first(&self) -> Option<&str> {
    match self {
      OneOrMany::One(value) => Some(value),
      OneOrMany::Many(values) => values.first().map(String::as_str),
    }
  }
}

/// An author entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkAuthor {
  /// Given name(s)
  pub given:  Option<String>,
  /// Family name
  pub family: Option<String>,
}

impl WorkAuthor {
  /// `given family`, skipping empty parts. `None` when both are empty.
  pub fn display_name(&self) -> Option<String> {
    let parts: Vec<&str> = [self.given.as_deref(), self.family.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|part| !part.is_empty())
      .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
  }
}

/// Crossref partial date: `{"date-parts": [[year, month, day]]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DateParts {
  /// Nested date parts; any level may be missing or null
  #[serde(rename = "date-parts")]
  pub date_parts: Option<Vec<Option<Vec<Option<i32>>>>>,
}

impl DateParts {
  /// The year of the first date, if present.
  pub fn year(&self) -> Option<i32> {
    self.date_parts.as_ref()?.first()?.as_ref()?.first().copied().flatten()
  }
}

/// One normalized article row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
  /// Article title
  pub title:              String,
  /// Publication year, `None` when unknown
  pub year:               Option<i32>,
  /// DOI, empty when absent
  pub doi:                String,
  /// Author display names in publication order
  pub authors:            Vec<String>,
  /// Abstract exactly as returned by the API
  pub abstract_original:  String,
  /// Abstract with markup and leading heading removed
  #[serde(rename = "abstract")]
  pub abstract_text:      String,
  /// Cleaned, tokenized abstract
  pub tokenized_abstract: String,
  /// Canonical journal name
  pub journal:            String,
  /// Journal the originating request was issued for
  pub desired_journal:    Option<String>,
  /// Title and abstract, the text that gets embedded
  pub document:           String,
}

/// Parses a payload into a [`WorksMessage`].
///
/// # Errors
///
/// Returns [`EconragError::InvalidCacheEntry`] if the payload is not a JSON
/// object or its fields do not have the expected types.
pub fn parse_message(payload: &Value) -> Result<WorksMessage> {
  if !payload.is_object() {
    return Err(EconragError::InvalidCacheEntry("payload is not a mapping".to_string()));
  }
  WorksMessage::deserialize(payload)
    .map_err(|e| EconragError::InvalidCacheEntry(format!("unexpected payload shape: {e}")))
}

/// Flattens cached payloads into [`ArticleRecord`]s, resolving journal names
/// through a [`JournalRegistry`].
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
  /// Registry used to canonicalize journal titles
  registry: JournalRegistry,
}

impl Normalizer {
  /// Creates a normalizer over `registry`.
  pub fn new(registry: JournalRegistry) -> Self { Self { registry } }

  /// Converts one cached payload into zero or more records.
  ///
  /// `fallback_journal` is the journal the request was issued for; it names
  /// records whose payload lacks a `container-title`.
  ///
  /// # Errors
  ///
  /// - [`EconragError::InvalidCacheEntry`] if the payload is malformed
  /// - [`EconragError::InvalidInput`] if an abstract is not text
  pub fn normalize(
    &self,
    payload: &Value,
    fallback_journal: Option<&str>,
  ) -> Result<Vec<ArticleRecord>> {
    let message = parse_message(payload)?;
    message.items.into_iter().map(|item| self.normalize_item(item, fallback_journal)).collect()
  }

  /// Converts a single work.
  fn normalize_item(
    &self,
    item: WorkItem,
    fallback_journal: Option<&str>,
  ) -> Result<ArticleRecord> {
    let title = first_or_empty(item.title.as_deref());
    let doi = item.doi.as_ref().and_then(OneOrMany::first).unwrap_or_default().to_string();
    let year = item.issued.as_ref().and_then(DateParts::year);
    let authors = item
      .author
      .unwrap_or_default()
      .iter()
      .filter_map(WorkAuthor::display_name)
      .collect();

    let container = first_or_empty(item.container_title.as_deref());
    let journal = if container.is_empty() {
      fallback_journal.unwrap_or_default().to_string()
    } else {
      self.registry.canonical_name(&container).to_string()
    };

    let raw_abstract = match item.abstract_text {
      None | Some(Value::Null) => Value::String(String::new()),
      Some(value) => value,
    };
    let tokenized_abstract = text::clean_value(&raw_abstract, true)?;
    let abstract_original = raw_abstract.as_str().unwrap_or_default().to_string();
    let abstract_text = text::strip_leading_label(&abstract_original);

    let document = if title.is_empty() {
      abstract_text.clone()
    } else {
      format!("{title}\n{abstract_text}")
    };

    Ok(ArticleRecord {
      title,
      year,
      doi,
      authors,
      abstract_original,
      abstract_text,
      tokenized_abstract,
      journal,
      desired_journal: fallback_journal.map(String::from),
      document,
    })
  }
}

/// First element of an optional list, or the empty string.
fn first_or_empty(values: Option<&[String]>) -> String {
  values.and_then(<[String]>::first).cloned().unwrap_or_default()
}
