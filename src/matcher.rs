use colored::Colorize;

use crate::embeddings::EmbeddingProvider;
use crate::index::{IndexedItem, ItemKind, LibraryIndex, LibraryItem};

/// Acceptance threshold for a library match. Scores at or above it are
/// accepted (inclusive lower bound). Overridable via `--threshold`.
pub const DEFAULT_THRESHOLD: f32 = 0.70;

/// The single best library item for a query, if it cleared the threshold.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub kind: ItemKind,
    pub item: LibraryItem<'a>,
    pub score: f32,
}

/// Cosine similarity: dot product over the product of Euclidean norms.
/// Invariant to vector magnitude, so longer composite texts get no edge.
/// Mismatched lengths and zero-magnitude vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Score every indexed item against the query embedding and keep a single
/// running best. Only a strictly greater score replaces the running best, so
/// ties go to the first item in declared order (entries before principles,
/// file order). Top-1 only; no ranked list.
pub fn best_match<'a>(
    index: &'a LibraryIndex,
    query_embedding: &[f32],
    threshold: f32,
) -> Option<MatchResult<'a>> {
    let mut best: Option<(&IndexedItem, f32)> = None;

    for candidate in &index.items {
        let score = cosine_similarity(query_embedding, &candidate.embedding);
        let replace = match best {
            None => true,
            Some((_, best_score)) => score > best_score,
        };
        if replace {
            best = Some((candidate, score));
        }
    }

    let (item, score) = best?;
    if score >= threshold {
        Some(MatchResult {
            kind: item.kind,
            item: index.item(item),
            score,
        })
    } else {
        None
    }
}

/// Match a user query against the index. An empty query or an empty index
/// short-circuits to no match without any external call; a failed
/// query-embedding request fails open to no match so the user still gets a
/// response down the inferred path.
pub async fn find_match<'a>(
    index: &'a LibraryIndex,
    provider: &EmbeddingProvider,
    query: &str,
    threshold: f32,
) -> Option<MatchResult<'a>> {
    if query.trim().is_empty() || index.is_empty() {
        return None;
    }

    let query_embedding = match provider.embed(query).await {
        Ok(embedding) => embedding,
        Err(e) => {
            eprintln!(
                "{} query embedding failed, continuing without a library match: {}",
                "Warning:".yellow(),
                e
            );
            return None;
        }
    };

    best_match(index, &query_embedding, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Entry, Library};
    use std::sync::Arc;

    fn entry(topic: &str) -> Entry {
        Entry {
            topic: topic.to_string(),
            ..Entry::default()
        }
    }

    fn indexed(kind: ItemKind, item_idx: usize, embedding: Vec<f32>) -> IndexedItem {
        IndexedItem {
            kind,
            item_idx,
            text: String::new(),
            embedding,
        }
    }

    fn index_of(entries: Vec<Entry>, items: Vec<IndexedItem>) -> LibraryIndex {
        LibraryIndex {
            library: Arc::new(Library {
                general_principles: Vec::new(),
                entries,
            }),
            items,
            skipped: 0,
        }
    }

    fn matched_topic<'a>(result: &MatchResult<'a>) -> &'a str {
        match result.item {
            LibraryItem::Entry(e) => &e.topic,
            LibraryItem::Principle(p) => &p.name,
        }
    }

    // ── cosine_similarity ───────────────────────────────────────────────────

    #[test]
    fn test_cosine_identical_vectors_is_one() {
        let v = vec![0.3, -1.2, 2.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors_is_minus_one() {
        let v = vec![0.3, -1.2, 2.5];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&v, &neg) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_magnitude_invariant() {
        let a = vec![1.0, 2.0];
        let scaled: Vec<f32> = a.iter().map(|x| x * 100.0).collect();
        let b = vec![2.0, 1.0];
        let plain = cosine_similarity(&a, &b);
        let after = cosine_similarity(&scaled, &b);
        assert!((plain - after).abs() < 1e-6);
    }

    // ── best_match ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_index_never_matches() {
        let index = index_of(Vec::new(), Vec::new());
        assert!(best_match(&index, &[1.0, 0.0], 0.0).is_none());
        assert!(best_match(&index, &[1.0, 0.0], -1.0).is_none());
    }

    #[test]
    fn test_exact_text_query_matches_itself() {
        // Self-similarity is maximal: the query vector equals item 1's vector
        let index = index_of(
            vec![entry("speech"), entry("fairness"), entry("equity")],
            vec![
                indexed(ItemKind::Entry, 0, vec![1.0, 0.0, 0.0]),
                indexed(ItemKind::Entry, 1, vec![0.0, 1.0, 0.0]),
                indexed(ItemKind::Entry, 2, vec![0.6, 0.0, 0.8]),
            ],
        );
        let result = best_match(&index, &[0.0, 1.0, 0.0], 0.70).expect("should match");
        assert_eq!(matched_topic(&result), "fairness");
        assert!((result.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_is_inclusive_at_boundary() {
        // cos([1,0], [3,4]) = 3/5 = 0.6 exactly at f32 precision
        let index = index_of(
            vec![entry("fairness")],
            vec![indexed(ItemKind::Entry, 0, vec![3.0, 4.0])],
        );
        let accepted = best_match(&index, &[1.0, 0.0], 0.6);
        assert!(accepted.is_some());

        let rejected = best_match(&index, &[1.0, 0.0], 0.6 + f32::EPSILON);
        assert!(rejected.is_none());
    }

    #[test]
    fn test_score_below_threshold_rejected() {
        let index = index_of(
            vec![entry("fairness")],
            vec![indexed(ItemKind::Entry, 0, vec![0.0, 1.0])],
        );
        // Orthogonal query scores 0.0
        assert!(best_match(&index, &[1.0, 0.0], f32::EPSILON).is_none());
        assert!(best_match(&index, &[1.0, 0.0], 0.0).is_some());
    }

    #[test]
    fn test_tie_broken_by_first_encountered() {
        let index = index_of(
            vec![entry("first"), entry("second")],
            vec![
                indexed(ItemKind::Entry, 0, vec![1.0, 0.0]),
                indexed(ItemKind::Entry, 1, vec![2.0, 0.0]), // same direction, same score
            ],
        );
        let result = best_match(&index, &[1.0, 0.0], 0.70).expect("should match");
        assert_eq!(matched_topic(&result), "first");
    }

    #[test]
    fn test_top_one_only_best_wins() {
        let index = index_of(
            vec![entry("close"), entry("closer")],
            vec![
                indexed(ItemKind::Entry, 0, vec![0.8, 0.6]),
                indexed(ItemKind::Entry, 1, vec![1.0, 0.1]),
            ],
        );
        let result = best_match(&index, &[1.0, 0.0], 0.70).expect("should match");
        assert_eq!(matched_topic(&result), "closer");
    }

    // ── find_match short-circuits (no provider call needed) ─────────────────

    #[tokio::test]
    async fn test_empty_query_returns_none_without_embedding() {
        // An unroutable provider proves no request is attempted
        let provider = EmbeddingProvider::Ollama {
            endpoint: "http://192.0.2.1:1".to_string(),
            model: "nomic-embed-text".to_string(),
        };
        let index = index_of(
            vec![entry("fairness")],
            vec![indexed(ItemKind::Entry, 0, vec![1.0, 0.0])],
        );
        assert!(find_match(&index, &provider, "   ", 0.70).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_index_returns_none_without_embedding() {
        let provider = EmbeddingProvider::Ollama {
            endpoint: "http://192.0.2.1:1".to_string(),
            model: "nomic-embed-text".to_string(),
        };
        let index = index_of(Vec::new(), Vec::new());
        assert!(find_match(&index, &provider, "is this fair?", 0.70)
            .await
            .is_none());
    }

    // ── end-to-end matching scenarios ───────────────────────────────────────

    fn fairness_library_index() -> LibraryIndex {
        let fairness = Entry {
            topic: "fairness".to_string(),
            tags: vec!["fairness".to_string(), "equity".to_string()],
            questions: vec!["What standard of fairness are you assuming?".to_string()],
            ..Entry::default()
        };
        index_of(
            vec![fairness],
            vec![indexed(ItemKind::Entry, 0, vec![1.0, 0.0])],
        )
    }

    #[test]
    fn test_scenario_fair_policy_query_matches_fairness_entry() {
        let index = fairness_library_index();
        // Query vector at cos = 0.85 against the entry
        let query = [0.85, (1.0f32 - 0.85 * 0.85).sqrt()];
        let result = best_match(&index, &query, 0.70).expect("should match");
        assert_eq!(result.kind, ItemKind::Entry);
        assert_eq!(matched_topic(&result), "fairness");
        assert!((result.score - 0.85).abs() < 1e-4);
        assert_eq!(
            crate::hint::compose(Some(&result)).label,
            "Library-based (fairness)"
        );
    }

    #[test]
    fn test_scenario_pizza_query_matches_nothing() {
        let index = fairness_library_index();
        // Query vector at cos = 0.10 against the entry
        let query = [0.10, (1.0f32 - 0.10 * 0.10).sqrt()];
        let result = best_match(&index, &query, 0.70);
        assert!(result.is_none());
        assert_eq!(
            crate::hint::compose(None).label,
            "Inferred (no close library match)"
        );
    }
}
