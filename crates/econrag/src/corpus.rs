//! Replaying the response cache into a clean article table.
//!
//! The corpus is rebuilt from scratch on every run: every cached page is
//! decoded back into its fetch parameters, attributed to a journal through the
//! [`JournalRegistry`], normalized, and the resulting records are filtered,
//! sorted by journal and year, and deduplicated on their embedded text.

use std::collections::HashSet;

use super::*;
use crate::normalize::{ArticleRecord, Normalizer};

/// Builds the article table from every entry in `cache`.
///
/// Records without authors or without an abstract are dropped. Of records
/// sharing the same `document` text, the first in (journal, year) order is
/// kept.
///
/// # Errors
///
/// Fails on the first key that cannot be decoded, names no known journal, or
/// holds a payload that cannot be normalized:
/// - [`EconragError::MalformedKey`]
/// - [`EconragError::UnknownJournal`]
/// - [`EconragError::InvalidCacheEntry`] or [`EconragError::InvalidInput`]
pub async fn build_corpus<C: ResponseCache + ?Sized>(
  cache: &C,
  registry: &JournalRegistry,
) -> Result<Vec<ArticleRecord>> {
  let normalizer = Normalizer::new(registry.clone());
  let keys = cache.keys().await?;
  info!("Replaying {} cached pages", keys.len());

  let mut records = Vec::new();
  for key in &keys {
    let request = FetchRequest::from_key(key)?;
    let journal = request_journal(&request, registry)?;
    let payload = cache.get(key).await?;
    let page = normalizer.normalize(&payload, Some(journal))?;
    trace!("{} records from {}", page.len(), key);
    records.extend(page);
  }

  let total = records.len();
  records.retain(|record| !record.authors.is_empty() && !record.abstract_text.is_empty());
  records.sort_by(|a, b| a.journal.cmp(&b.journal).then(a.year.cmp(&b.year)));

  let mut seen = HashSet::new();
  records.retain(|record| seen.insert(record.document.clone()));

  info!("Kept {} of {} records", records.len(), total);
  Ok(records)
}

/// The journal a cached request was issued for.
///
/// A DOI prefix takes precedence over the ISSN, since prefix requests are
/// filtered by it.
fn request_journal<'a>(request: &FetchRequest, registry: &'a JournalRegistry) -> Result<&'a str> {
  let identifier = request
    .get("prefix")
    .or_else(|| request.get("issn"))
    .ok_or_else(|| EconragError::UnknownJournal(format!("{:?}", request.params())))?;
  registry.resolve(identifier).ok_or_else(|| EconragError::UnknownJournal(identifier.to_string()))
}

/// Number of records per (journal, desired journal) pair.
pub fn journal_counts(records: &[ArticleRecord]) -> BTreeMap<(String, Option<String>), usize> {
  let mut counts = BTreeMap::new();
  for record in records {
    *counts.entry((record.journal.clone(), record.desired_journal.clone())).or_insert(0) += 1;
  }
  counts
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::cache::MemoryCache;

  fn item(title: &str, year: i32, journal: &str, abstract_text: &str) -> Value {
    json!({
      "title": [title],
      "container-title": [journal],
      "author": [{ "given": "A", "family": "Smith" }],
      "issued": { "date-parts": [[year]] },
      "abstract": abstract_text,
    })
  }

  fn key(issn: &str, cursor: &str) -> String {
    FetchRequest::new()
      .with("issn", issn)
      .with("date_from", "2020-01-01")
      .with("date_to", "2020-12-31")
      .with("cursor", cursor)
      .to_key()
      .unwrap()
  }

  #[traced_test]
  #[tokio::test]
  async fn test_build_corpus_filters_sorts_and_dedups() {
    let cache = MemoryCache::new();
    cache
      .put(
        &key("0012-9682", "*"),
        json!({ "items": [
          item("Late", 2021, "Econometrica", "Second."),
          item("Early", 2019, "Econometrica", "First."),
          { "title": ["No authors"], "abstract": "Dropped." },
          { "title": ["No abstract"], "author": [{ "family": "Doe" }] },
        ]}),
      )
      .await
      .unwrap();
    cache
      .put(
        &key("1468-0262", "*"),
        json!({ "items": [item("Early", 2019, "Econometrica", "First.")] }),
      )
      .await
      .unwrap();
    cache
      .put(
        &key("0034-6527", "*"),
        json!({ "items": [item("Alias", 2020, "The Review of Economic Studies", "Third.")] }),
      )
      .await
      .unwrap();

    let records = build_corpus(&cache, &JournalRegistry::default()).await.unwrap();
    let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Early", "Late", "Alias"]);
    assert_eq!(records[2].journal, "Review of Economic Studies");
    assert_eq!(records[2].desired_journal.as_deref(), Some("Review of Economic Studies"));

    let counts = journal_counts(&records);
    assert_eq!(
      counts.get(&("Econometrica".to_string(), Some("Econometrica".to_string()))),
      Some(&2)
    );
  }

  #[traced_test]
  #[tokio::test]
  async fn test_prefix_resolves_journal() {
    let cache = MemoryCache::new();
    let prefixed =
      FetchRequest::from_key(&key("9999-9999", "*")).unwrap().with("prefix", "10.1086");
    cache
      .put(
        &prefixed.to_key().unwrap(),
        json!({ "items": [{ "title": ["T"], "author": [{ "family": "F" }], "abstract": "A." }] }),
      )
      .await
      .unwrap();

    let records = build_corpus(&cache, &JournalRegistry::default()).await.unwrap();
    assert_eq!(records[0].journal, "Journal of Political Economy");
  }

  #[traced_test]
  #[tokio::test]
  async fn test_unknown_journal_aborts() {
    let cache = MemoryCache::new();
    cache.put(&key("0000-0000", "*"), json!({ "items": [] })).await.unwrap();
    assert!(matches!(
      build_corpus(&cache, &JournalRegistry::default()).await,
      Err(EconragError::UnknownJournal(_))
    ));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_malformed_key_aborts() {
    let cache = MemoryCache::new();
    cache.put("not-a-key", json!({ "items": [] })).await.unwrap();
    assert!(matches!(
      build_corpus(&cache, &JournalRegistry::default()).await,
      Err(EconragError::MalformedKey(_))
    ));
  }
}
