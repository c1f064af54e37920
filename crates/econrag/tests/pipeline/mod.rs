use econrag::{
  artifact::{read_jsonl, write_jsonl},
  corpus::{build_corpus, journal_counts},
  embed::{embed_corpus, EmbeddedArticle},
  normalize::ArticleRecord,
  search::top_k,
  Config,
};

use super::*;

/// Embeds a text as counts of a few marker words.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
  fn model_name(&self) -> &str { "keywords" }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(
      texts
        .iter()
        .map(|text| {
          let text = text.to_lowercase();
          ["wages", "prices", "trade"]
            .iter()
            .map(|word| text.matches(word).count() as f32)
            .collect()
        })
        .collect(),
    )
  }
}

fn item(title: &str, abstract_text: &str) -> Value {
  json!({
    "DOI": format!("10.1093/qje/{}", title.len()),
    "title": [title],
    "container-title": ["The Quarterly Journal of Economics"],
    "author": [{ "given": "Ada", "family": "Lovelace" }],
    "issued": { "date-parts": [[2020, 3]] },
    "abstract": abstract_text,
  })
}

#[traced_test]
#[tokio::test]
async fn test_harvest_to_query() {
  let dir = tempdir().unwrap();
  let config = Config { data_dir: dir.path().join("data"), ..Config::default() };

  let source = ScriptedSource::new().with_page(
    INITIAL_CURSOR,
    json!({ "items": [
      item("Wages", "<jats:p>Abstract We study wages and wages.</jats:p>"),
      item("Prices", "<jats:p>We study prices.</jats:p>"),
      item("Trade", "<jats:p>ABSTRACT: We study trade.</jats:p>"),
    ]}),
  );
  let cache = SqliteCache::open(config.cache_path()).await.unwrap();
  let harvester = Harvester::new(source, cache).with_page_size(config.page_size);
  let registry = JournalRegistry::default();
  let report = harvester.run(&registry, &[range_2020()]).await;
  assert!(report.failures.is_empty());
  assert_eq!(report.completed, registry.len() * 2);

  // Every combination returned the same three works; the corpus keeps one copy.
  let records = build_corpus(harvester.cache(), &registry).await.unwrap();
  assert_eq!(records.len(), 3);
  assert!(records.iter().all(|r| r.journal == "Quarterly Journal of Economics"));
  assert_eq!(records.iter().find(|r| r.title == "Trade").unwrap().abstract_text, "We study trade.");
  assert_eq!(journal_counts(&records).values().sum::<usize>(), 3);

  write_jsonl(&config.corpus_path(), &records).unwrap();
  let records: Vec<ArticleRecord> = read_jsonl(&config.corpus_path()).unwrap();

  let embedded = embed_corpus(records, &KeywordEmbedder, 2).await.unwrap();
  write_jsonl(&config.embeddings_path(), &embedded).unwrap();
  let embedded: Vec<EmbeddedArticle> = read_jsonl(&config.embeddings_path()).unwrap();

  let query = KeywordEmbedder.embed("how do prices move?").await.unwrap();
  let matches = top_k(&query, &embedded, 2);
  assert_eq!(matches.len(), 2);
  assert_eq!(matches[0].rank, 1);
  assert_eq!(matches[0].article.article.title, "Prices");
  assert!(matches[0].score > matches[1].score);
}
