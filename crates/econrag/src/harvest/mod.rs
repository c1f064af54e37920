//! Resumable, cursor-paginated harvesting of journal metadata.
//!
//! The [`Harvester`] drives a [`WorksSource`] page by page and uses a
//! [`ResponseCache`] as both a read-through memo and a ledger of completed
//! pages. Every page is addressed by a [`FetchRequest`] built from the
//! journal ISSN, the date range, the optional DOI prefix and the current
//! cursor, so an interrupted run can be restarted and will not re-fetch any
//! page it already stored.
//!
//! # Pagination
//!
//! 1. Start at [`INITIAL_CURSOR`] and compute the page's cache key.
//! 2. On a cache hit, use the stored payload and skip the network.
//! 3. Otherwise fetch the page and store it before advancing.
//! 4. Collect the page's items.
//! 5. Stop once a page holds fewer items than the page size, otherwise follow
//!    the payload's `next-cursor`.
//!
//! # Harvesting matrix
//!
//! [`Harvester::run`] walks every (date range, journal, identifier variant)
//! combination one at a time. A failing combination is logged and recorded in
//! the [`HarvestReport`]; it never stops the run or touches pages cached for
//! other combinations.
//!
//! ```no_run
//! use econrag::{
//!   cache::SqliteCache,
//!   harvest::{yearly_ranges, CrossrefClient, Harvester},
//!   journal::JournalRegistry,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CrossrefClient::new("https://api.crossref.org", "me@example.org")?;
//! let harvester = Harvester::new(client, SqliteCache::open("data/cache.db").await?);
//! let ranges = yearly_ranges(2020, chrono::Local::now().date_naive());
//! let report = harvester.run(&JournalRegistry::default(), &ranges).await;
//! println!("{} items across {} combinations", report.items, report.completed);
//! # Ok(())
//! # }
//! ```

use std::{collections::HashSet, fmt};

use chrono::Datelike;

use super::*;
use crate::journal::{IdentifierVariant, Journal};

mod crossref;

pub use crossref::{CrossrefClient, CROSSREF_API_URL, SELECT_FIELDS};

/// Cursor value requesting the first page.
pub const INITIAL_CURSOR: &str = "*";

/// Items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// A paginated source of works metadata.
#[async_trait]
pub trait WorksSource: Send + Sync {
  /// Fetches one page of results for `query` starting at `cursor`.
  ///
  /// Returns the page payload: an object with an `items` list and, when more
  /// pages remain, a `next-cursor`.
  ///
  /// # Errors
  ///
  /// Returns [`EconragError::UpstreamFetch`] when the upstream API answers with
  /// a non-success status.
  async fn fetch_page(&self, query: &WorksQuery, cursor: &str, rows: usize) -> Result<Value>;
}

/// One yearly publication-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  /// Calendar year of the window
  pub year: i32,
  /// First day (inclusive)
  pub from: NaiveDate,
  /// Last day (inclusive)
  pub to:   NaiveDate,
}

/// Yearly windows from `start_year` through the year of `today`.
///
/// Every past year spans January 1st to December 31st; the current year ends
/// at `today`.
///
/// ```
/// use chrono::NaiveDate;
/// use econrag::harvest::yearly_ranges;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
/// let ranges = yearly_ranges(2023, today);
/// assert_eq!(ranges.len(), 2);
/// assert_eq!(ranges[0].to, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
/// assert_eq!(ranges[1].to, today);
/// ```
pub fn yearly_ranges(start_year: i32, today: NaiveDate) -> Vec<DateRange> {
  (start_year..=today.year())
    .filter_map(|year| {
      let from = NaiveDate::from_ymd_opt(year, 1, 1)?;
      let to =
        if year == today.year() { today } else { NaiveDate::from_ymd_opt(year, 12, 31)? };
      Some(DateRange { year, from, to })
    })
    .collect()
}

/// A single harvesting request: one identifier over one date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksQuery {
  /// ISSN the request is issued under
  pub issn:      String,
  /// DOI prefix filter used instead of the ISSN, if any
  pub prefix:    Option<String>,
  /// First publication date (inclusive)
  pub date_from: NaiveDate,
  /// Last publication date (inclusive)
  pub date_to:   NaiveDate,
}

impl WorksQuery {
  /// Creates a query for an ISSN over `range`.
  pub fn new(issn: &str, range: &DateRange) -> Self {
    Self { issn: issn.to_string(), prefix: None, date_from: range.from, date_to: range.to }
  }

  /// Sets the DOI prefix filter.
  pub fn with_prefix(mut self, prefix: Option<&str>) -> Self {
    self.prefix = prefix.map(String::from);
    self
  }

  /// The query for one journal, identifier variant and date range.
  pub fn for_journal(journal: &Journal, variant: IdentifierVariant, range: &DateRange) -> Self {
    Self::new(journal.issn(variant), range).with_prefix(journal.doi_prefix.as_deref())
  }

  /// The upstream filter expression for this query.
  pub fn filter(&self) -> String {
    let key_filter = match &self.prefix {
      Some(prefix) => format!("prefix:{prefix}"),
      None => format!("issn:{}", self.issn),
    };
    format!(
      "{key_filter},type:journal-article,from-pub-date:{},until-pub-date:{},has-abstract:true",
      self.date_from, self.date_to
    )
  }

  /// Fetch parameters identifying the page of `rows` items at `cursor`.
  ///
  /// The page size is part of the key: a cached page is only "short" relative
  /// to the size it was requested with. Upstream cursors are opaque base64 and
  /// may contain the key delimiters, so the cursor is escaped before it becomes
  /// part of the key.
  pub fn fetch_request(&self, cursor: &str, rows: usize) -> FetchRequest {
    let request = FetchRequest::new()
      .with("issn", &self.issn)
      .with("date_from", self.date_from)
      .with("date_to", self.date_to)
      .with("rows", rows)
      .with("cursor", escape_cursor(cursor));
    match &self.prefix {
      Some(prefix) => request.with("prefix", prefix),
      None => request,
    }
  }
}

/// One cell of the harvesting matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
  /// Canonical journal name
  pub journal: String,
  /// Identifier variant queried
  pub variant: IdentifierVariant,
  /// Year of the date range
  pub year:    i32,
}

impl fmt::Display for Combination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}, {})", self.journal, self.variant, self.year)
  }
}

/// Outcome of a harvesting run.
#[derive(Debug, Default)]
pub struct HarvestReport {
  /// Combinations that returned at least one item
  pub completed: usize,
  /// Total items gathered across all combinations
  pub items:     usize,
  /// Combinations with no qualifying works
  pub empty:     Vec<Combination>,
  /// Combinations that failed, with their error
  pub failures:  Vec<(Combination, EconragError)>,
}

/// Paginated harvester over a works source and a response cache.
pub struct Harvester<S, C> {
  /// Upstream works source
  source:    S,
  /// Page cache and completion ledger
  cache:     C,
  /// Items requested per page
  page_size: usize,
}

impl<S: WorksSource, C: ResponseCache> Harvester<S, C> {
  /// Creates a harvester with the [`DEFAULT_PAGE_SIZE`].
  pub fn new(source: S, cache: C) -> Self { Self { source, cache, page_size: DEFAULT_PAGE_SIZE } }

  /// Sets the number of items requested per page (at least one).
  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// The response cache.
  pub fn cache(&self) -> &C { &self.cache }

  /// The works source.
  pub fn source(&self) -> &S { &self.source }

  /// Retrieves every item for `query`, reading cached pages and storing new
  /// ones as it goes.
  ///
  /// An empty result is not an error.
  ///
  /// # Errors
  ///
  /// Fails on the first page that cannot be fetched, cached or read. Pages
  /// stored before the failure stay cached.
  pub async fn harvest(&self, query: &WorksQuery) -> Result<Vec<Value>> {
    let mut cursor = INITIAL_CURSOR.to_string();
    let mut visited = HashSet::new();
    let mut items = Vec::new();

    loop {
      visited.insert(cursor.clone());
      let key = query.fetch_request(&cursor, self.page_size).to_key()?;

      let payload = if self.cache.contains(&key).await? {
        debug!("Cache hit: {}", key);
        self.cache.get(&key).await?
      } else {
        debug!("Fetching page: {}", key);
        let payload = self.source.fetch_page(query, &cursor, self.page_size).await?;
        self.cache.put(&key, payload.clone()).await?;
        payload
      };

      let page = page_items(&payload)?;
      let count = page.len();
      items.extend(page);
      trace!("{} items on page {}, {} so far", count, key, items.len());

      if count < self.page_size {
        return Ok(items);
      }

      cursor = next_cursor(&payload)?;
      if visited.contains(&cursor) {
        return Err(EconragError::InvalidCacheEntry(format!(
          "cursor {cursor:?} repeats after page {key}"
        )));
      }
    }
  }

  /// Harvests every (date range, journal, variant) combination in turn.
  ///
  /// Failures and empty combinations are logged and recorded in the returned
  /// report; the run always proceeds to the next combination.
  pub async fn run(&self, registry: &JournalRegistry, ranges: &[DateRange]) -> HarvestReport {
    let mut report = HarvestReport::default();

    for range in ranges {
      for journal in registry.journals() {
        for variant in IdentifierVariant::ALL {
          let combination =
            Combination { journal: journal.name.clone(), variant, year: range.year };
          let query = WorksQuery::for_journal(journal, variant, range);

          match self.harvest(&query).await {
            Ok(items) if items.is_empty() => {
              info!(
                "No {} items for {} between {} and {}",
                variant, journal.name, range.from, range.to
              );
              report.empty.push(combination);
            },
            Ok(items) => {
              info!("Harvested {} items for {}", items.len(), combination);
              report.completed += 1;
              report.items += items.len();
            },
            Err(e) => {
              warn!("Harvesting {} failed: {}", combination, e);
              report.failures.push((combination, e));
            },
          }
        }
      }
    }

    report
  }
}

/// Percent-escapes the characters a cache key value cannot hold.
fn escape_cursor(cursor: &str) -> String {
  cursor.replace('%', "%25").replace('/', "%2F").replace('=', "%3D")
}

/// The `items` list of a page payload. A payload without one has no items.
fn page_items(payload: &Value) -> Result<Vec<Value>> {
  let Some(object) = payload.as_object() else {
    return Err(EconragError::InvalidCacheEntry("payload is not a mapping".to_string()));
  };
  match object.get("items") {
    None | Some(Value::Null) => Ok(Vec::new()),
    Some(Value::Array(items)) => Ok(items.clone()),
    Some(_) => Err(EconragError::InvalidCacheEntry("`items` is not a list".to_string())),
  }
}

/// The `next-cursor` of a full page payload.
fn next_cursor(payload: &Value) -> Result<String> {
  payload
    .get("next-cursor")
    .and_then(Value::as_str)
    .map(String::from)
    .ok_or_else(|| EconragError::InvalidCacheEntry("full page without `next-cursor`".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn range_2020() -> DateRange {
    DateRange {
      year: 2020,
      from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
      to:   NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
    }
  }

  #[test]
  fn test_yearly_ranges() {
    let today = NaiveDate::from_ymd_opt(2002, 3, 4).unwrap();
    let ranges = yearly_ranges(2000, today);
    assert_eq!(ranges.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2000, 2001, 2002]);
    assert_eq!(ranges[0].from, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    assert_eq!(ranges[1].to, NaiveDate::from_ymd_opt(2001, 12, 31).unwrap());
    assert_eq!(ranges[2].to, today);
    assert!(yearly_ranges(2003, today).is_empty());
  }

  #[test]
  fn test_fetch_request_key() {
    let query = WorksQuery::new("0033-5533", &range_2020());
    assert_eq!(
      query.fetch_request(INITIAL_CURSOR, 1000).to_key().unwrap(),
      "cursor=*/date_from=2020-01-01/date_to=2020-12-31/issn=0033-5533/rows=1000"
    );

    let query = query.with_prefix(Some("10.1086"));
    let request = query.fetch_request("abc", 20);
    assert_eq!(request.get("prefix"), Some("10.1086"));
    assert_eq!(request.get("cursor"), Some("abc"));
    assert_eq!(request.get("rows"), Some("20"));
    assert_ne!(request, query.fetch_request("abc", 1000));
  }

  #[test]
  fn test_cursor_escaping() {
    let query = WorksQuery::new("0033-5533", &range_2020());
    let request = query.fetch_request("DnF1/ZXJ5==", 10);
    assert_eq!(request.get("cursor"), Some("DnF1%2FZXJ5%3D%3D"));
    assert!(request.to_key().is_ok());
    assert_ne!(
      query.fetch_request("a%2Fb", 10).to_key().unwrap(),
      query.fetch_request("a/b", 10).to_key().unwrap()
    );
  }

  #[test]
  fn test_filter() {
    let query = WorksQuery::new("0022-3808", &range_2020());
    assert_eq!(
      query.filter(),
      "issn:0022-3808,type:journal-article,from-pub-date:2020-01-01,until-pub-date:2020-12-31,\
       has-abstract:true"
    );
    let query = query.with_prefix(Some("10.1086"));
    assert!(query.filter().starts_with("prefix:10.1086,type:journal-article"));
  }

  #[test]
  fn test_page_helpers() {
    use serde_json::json;

    assert!(page_items(&json!({})).unwrap().is_empty());
    assert_eq!(page_items(&json!({ "items": [1, 2] })).unwrap().len(), 2);
    assert!(matches!(page_items(&json!([1])), Err(EconragError::InvalidCacheEntry(_))));
    assert_eq!(next_cursor(&json!({ "next-cursor": "xyz" })).unwrap(), "xyz");
    assert!(matches!(next_cursor(&json!({})), Err(EconragError::InvalidCacheEntry(_))));
  }
}
