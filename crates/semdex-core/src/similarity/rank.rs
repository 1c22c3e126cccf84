//! Ranking and display helpers for search results.

use std::cmp::Ordering;

use semdex_types::embedding::EmbeddingRecord;
use semdex_types::search::SimilarItem;

/// Marker appended to truncated display text.
pub const TRUNCATION_MARKER: &str = "...";

/// A candidate record with its score against the query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub record: &'a EmbeddingRecord,
    pub score: f32,
}

/// Total order for ranking: score descending, then item_type and item_id
/// ascending so equal scores come back in a reproducible order.
pub fn rank_order(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.record.item_type.cmp(&b.record.item_type))
        .then_with(|| a.record.item_id.cmp(&b.record.item_id))
}

/// Sort candidates best-first and keep at most `top_k`, converting each to
/// a display result with truncated text.
pub fn top_k(
    mut candidates: Vec<ScoredCandidate<'_>>,
    top_k: usize,
    display_chars: usize,
) -> Vec<SimilarItem> {
    candidates.sort_by(rank_order);
    candidates
        .into_iter()
        .take(top_k)
        .map(|c| SimilarItem {
            item_type: c.record.item_type.clone(),
            item_id: c.record.item_id.clone(),
            score: c.score,
            text: truncate_for_display(&c.record.source_text, display_chars),
        })
        .collect()
}

/// First `max_chars` characters of `text`, followed by `...` if anything
/// was cut.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(item_type: &str, item_id: &str, text: &str) -> EmbeddingRecord {
        EmbeddingRecord {
            item_type: item_type.to_string(),
            item_id: item_id.to_string(),
            vector: vec![1.0],
            source_text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_for_display("hotel", 200), "hotel");
        assert_eq!(truncate_for_display("exactly", 7), "exactly");
    }

    #[test]
    fn test_truncate_long_text_marked() {
        let text = "a".repeat(250);
        let shown = truncate_for_display(&text, 200);
        assert_eq!(shown.len(), 203);
        assert!(shown.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let shown = truncate_for_display("héllo wörld", 4);
        assert_eq!(shown, "héll...");
    }

    #[test]
    fn test_orders_by_score_descending() {
        let (a, b, c) = (record("t", "a", "x"), record("t", "b", "x"), record("t", "c", "x"));
        let ranked = top_k(
            vec![
                ScoredCandidate { record: &a, score: 0.1 },
                ScoredCandidate { record: &b, score: 0.9 },
                ScoredCandidate { record: &c, score: -0.4 },
            ],
            3,
            200,
        );
        let ids: Vec<&str> = ranked.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ties_broken_by_type_then_id() {
        let records = [
            record("task", "a", "x"),
            record("summary", "z", "x"),
            record("summary", "b", "x"),
        ];
        let candidates = records
            .iter()
            .map(|record| ScoredCandidate { record, score: 0.5 })
            .collect();
        let ranked = top_k(candidates, 3, 200);
        let keys: Vec<(&str, &str)> = ranked
            .iter()
            .map(|r| (r.item_type.as_str(), r.item_id.as_str()))
            .collect();
        assert_eq!(keys, vec![("summary", "b"), ("summary", "z"), ("task", "a")]);
    }

    #[test]
    fn test_takes_at_most_k() {
        let records: Vec<EmbeddingRecord> =
            (0..10).map(|i| record("t", &format!("{i}"), "x")).collect();
        let candidates = records
            .iter()
            .map(|record| ScoredCandidate { record, score: 0.0 })
            .collect();
        assert_eq!(top_k(candidates, 3, 200).len(), 3);
    }

    #[test]
    fn test_display_truncation_does_not_change_score() {
        let long = record("t", "long", &"word ".repeat(100));
        let ranked = top_k(vec![ScoredCandidate { record: &long, score: 0.75 }], 1, 10);
        assert_eq!(ranked[0].score, 0.75);
        assert!(ranked[0].text.ends_with(TRUNCATION_MARKER));
    }
}
