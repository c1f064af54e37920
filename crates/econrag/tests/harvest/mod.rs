use super::*;

/// A works source slicing a fixed list of items by offset cursors `o<n>`.
///
/// Offsets at or past `available` answer with an upstream 500.
struct SlicedSource {
  total:     usize,
  available: usize,
  fetches:   AtomicUsize,
}

impl SlicedSource {
  fn new(total: usize, available: usize) -> Self {
    Self { total, available, fetches: AtomicUsize::new(0) }
  }
}

#[async_trait]
impl WorksSource for SlicedSource {
  async fn fetch_page(&self, _query: &WorksQuery, cursor: &str, rows: usize) -> Result<Value> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    let offset = match cursor.strip_prefix('o') {
      Some(offset) => offset.parse().unwrap(),
      None => 0,
    };
    if offset >= self.available {
      return Err(EconragError::UpstreamFetch { status: 500, url: format!("cursor:{cursor}") });
    }
    let count = rows.min(self.total - offset);
    Ok(page(count, offset, Some(&format!("o{}", offset + count))))
  }
}

#[traced_test]
#[tokio::test]
async fn test_pagination_stops_on_short_page() {
  let source = ScriptedSource::new()
    .with_page(INITIAL_CURSOR, page(3, 0, Some("c1")))
    .with_page("c1", page(2, 3, Some("c2")));
  let harvester = Harvester::new(source, MemoryCache::new()).with_page_size(3);

  let items = harvester.harvest(&qje_query()).await.unwrap();
  assert_eq!(items.len(), 5);
  assert_eq!(harvester.source().fetches(), 2);
  assert_eq!(harvester.cache().len().await.unwrap(), 2);

  let keys = harvester.cache().keys().await.unwrap();
  assert_eq!(keys, vec![
    "cursor=*/date_from=2020-01-01/date_to=2020-12-31/issn=0033-5533/rows=3",
    "cursor=c1/date_from=2020-01-01/date_to=2020-12-31/issn=0033-5533/rows=3",
  ]);
}

#[traced_test]
#[tokio::test]
async fn test_rerun_is_served_from_cache() {
  let cache = Arc::new(MemoryCache::new());
  let pages = || {
    ScriptedSource::new()
      .with_page(INITIAL_CURSOR, page(2, 0, Some("c1")))
      .with_page("c1", page(1, 2, None))
  };

  let first = Harvester::new(pages(), Arc::clone(&cache)).with_page_size(2);
  let first_items = first.harvest(&qje_query()).await.unwrap();
  assert_eq!(first.source().fetches(), 2);

  let second = Harvester::new(pages(), Arc::clone(&cache)).with_page_size(2);
  let second_items = second.harvest(&qje_query()).await.unwrap();
  assert_eq!(second.source().fetches(), 0);
  assert_eq!(first_items, second_items);
}

#[traced_test]
#[tokio::test]
async fn test_interrupted_harvest_resumes() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("cache.db");

  // The second page is unavailable on the first run.
  let source = ScriptedSource::new().with_page(INITIAL_CURSOR, page(2, 0, Some("c1")));
  let harvester = Harvester::new(source, SqliteCache::open(&path).await.unwrap()).with_page_size(2);
  assert!(matches!(
    harvester.harvest(&qje_query()).await,
    Err(EconragError::UpstreamFetch { status: 500, .. })
  ));
  assert_eq!(harvester.cache().len().await.unwrap(), 1);
  drop(harvester);

  let source = ScriptedSource::new()
    .with_page(INITIAL_CURSOR, page(2, 0, Some("c1")))
    .with_page("c1", page(1, 2, None));
  let harvester = Harvester::new(source, SqliteCache::open(&path).await.unwrap()).with_page_size(2);
  let items = harvester.harvest(&qje_query()).await.unwrap();
  assert_eq!(items.len(), 3);
  assert_eq!(harvester.source().fetches(), 1);
  assert_eq!(harvester.cache().len().await.unwrap(), 2);
}

#[traced_test]
#[tokio::test]
async fn test_full_page_without_cursor() {
  let source = ScriptedSource::new().with_page(INITIAL_CURSOR, page(2, 0, None));
  let harvester = Harvester::new(source, MemoryCache::new()).with_page_size(2);
  assert!(matches!(
    harvester.harvest(&qje_query()).await,
    Err(EconragError::InvalidCacheEntry(_))
  ));
  // The page itself was stored before the cursor was read.
  assert_eq!(harvester.cache().len().await.unwrap(), 1);
}

#[traced_test]
#[tokio::test]
async fn test_repeated_cursor_is_rejected() {
  let source = ScriptedSource::new()
    .with_page(INITIAL_CURSOR, page(1, 0, Some("c1")))
    .with_page("c1", page(1, 1, Some("c1")));
  let harvester = Harvester::new(source, MemoryCache::new()).with_page_size(1);
  assert!(matches!(
    harvester.harvest(&qje_query()).await,
    Err(EconragError::InvalidCacheEntry(_))
  ));
}

#[traced_test]
#[tokio::test]
async fn test_empty_result_is_not_an_error() {
  let source = ScriptedSource::new().with_page(INITIAL_CURSOR, json!({ "items": [] }));
  let harvester = Harvester::new(source, MemoryCache::new());
  assert!(harvester.harvest(&qje_query()).await.unwrap().is_empty());
  assert_eq!(harvester.cache().len().await.unwrap(), 1);
}

#[traced_test]
#[tokio::test]
async fn test_matrix_continues_past_failures() {
  let registry = JournalRegistry::new(vec![
    Journal::new("Failing Journal", "1111-1111", "2222-2222"),
    Journal::new("Empty Journal", "3333-3333", "4444-4444"),
    Journal::new("Working Journal", "5555-5555", "6666-6666"),
  ]);
  let source = ScriptedSource::new()
    .with_page(INITIAL_CURSOR, page(1, 0, None))
    .failing_issn("1111-1111")
    .failing_issn("2222-2222")
    .empty_issn("3333-3333")
    .empty_issn("4444-4444");
  let harvester = Harvester::new(source, MemoryCache::new()).with_page_size(10);

  let report = harvester.run(&registry, &[range_2020()]).await;
  assert_eq!(report.failures.len(), 2);
  assert!(report.failures.iter().all(|(combination, _)| combination.journal == "Failing Journal"));
  assert_eq!(report.empty.len(), 2);
  assert_eq!(report.completed, 2);
  assert_eq!(report.items, 2);
  assert_eq!(harvester.source().fetches(), 6);

  // Two empty pages and two working pages are cached; failures store nothing.
  assert_eq!(harvester.cache().len().await.unwrap(), 4);
}

#[traced_test]
#[tokio::test]
async fn test_prefix_journal_uses_prefix_key() {
  let registry = JournalRegistry::new(vec![
    Journal::new("Journal of Political Economy", "0022-3808", "1537-534X")
      .with_doi_prefix("10.1086"),
  ]);
  let source = ScriptedSource::new().with_page(INITIAL_CURSOR, page(1, 0, None));
  let harvester = Harvester::new(source, MemoryCache::new());

  let report = harvester.run(&registry, &[range_2020()]).await;
  assert_eq!(report.completed, 2);
  for key in harvester.cache().keys().await.unwrap() {
    assert!(key.contains("/prefix=10.1086/"), "unexpected key {key}");
  }
}

#[traced_test]
#[tokio::test]
async fn test_resume_with_larger_page_size() {
  let cache = Arc::new(MemoryCache::new());

  // A run with two items per page stops after caching the first page.
  let harvester = Harvester::new(SlicedSource::new(5, 2), Arc::clone(&cache)).with_page_size(2);
  assert!(matches!(
    harvester.harvest(&qje_query()).await,
    Err(EconragError::UpstreamFetch { status: 500, .. })
  ));
  assert_eq!(cache.len().await.unwrap(), 1);

  // The two-item page is not short for the default page size and must not end the walk.
  let harvester = Harvester::new(SlicedSource::new(5, 5), Arc::clone(&cache));
  let items = harvester.harvest(&qje_query()).await.unwrap();
  assert_eq!(items.len(), 5);
  assert_eq!(harvester.source().fetches.load(Ordering::SeqCst), 1);
  assert_eq!(cache.len().await.unwrap(), 2);
}
