//! Cosine-similarity ranking over embedded articles.

use std::cmp::Ordering;

use super::*;
use crate::embed::EmbeddedArticle;

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
  /// Position in the ranking, starting at 1
  pub rank:    usize,
  /// Cosine similarity to the query
  pub score:   f32,
  /// The matching article
  pub article: &'a EmbeddedArticle,
}

/// Cosine similarity of two vectors.
///
/// Vectors of different lengths, and zero vectors, score 0.
///
/// ```
/// use econrag::search::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
/// assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }

  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }
  dot / (norm_a * norm_b)
}

/// The `k` articles most similar to `query`, best first.
///
/// Ties keep corpus order.
pub fn top_k<'a>(query: &[f32], articles: &'a [EmbeddedArticle], k: usize) -> Vec<Match<'a>> {
  let mut scored: Vec<(f32, &EmbeddedArticle)> = articles
    .iter()
    .map(|article| (cosine_similarity(query, &article.embedding), article))
    .collect();
  scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
  trace!("Scored {} articles", scored.len());

  scored
    .into_iter()
    .take(k)
    .enumerate()
    .map(|(i, (score, article))| Match { rank: i + 1, score, article })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::ArticleRecord;

  fn article(title: &str, embedding: Vec<f32>) -> EmbeddedArticle {
    EmbeddedArticle {
      article: ArticleRecord {
        title:              title.to_string(),
        year:               None,
        doi:                String::new(),
        authors:            Vec::new(),
        abstract_original:  String::new(),
        abstract_text:      String::new(),
        tokenized_abstract: String::new(),
        journal:            String::new(),
        desired_journal:    None,
        document:           title.to_string(),
      },
      embedding,
    }
  }

  #[test]
  fn test_cosine_similarity() {
    assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
    assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
  }

  #[test]
  fn test_top_k_ranking() {
    let articles = vec![
      article("orthogonal", vec![0.0, 1.0]),
      article("exact", vec![1.0, 0.0]),
      article("close", vec![0.9, 0.1]),
      article("opposite", vec![-1.0, 0.0]),
    ];

    let matches = top_k(&[1.0, 0.0], &articles, 3);
    let titles: Vec<_> = matches.iter().map(|m| m.article.article.title.as_str()).collect();
    assert_eq!(titles, vec!["exact", "close", "orthogonal"]);
    assert_eq!(matches.iter().map(|m| m.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(matches[0].score >= matches[1].score);

    assert_eq!(top_k(&[1.0, 0.0], &articles, 10).len(), 4);
    assert!(top_k(&[1.0, 0.0], &articles, 0).is_empty());
  }
}
