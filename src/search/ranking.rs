//! Result ordering and rank assignment

use crate::search::{ScoredCandidate, SortField, SortOptions, SortOrder};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RankingError {
    #[error("Ranking failed: non-finite score at input position {position}")]
    NonFiniteScore { position: usize },
}

/// Orders scored candidates and assigns 1-based ranks
///
/// Sorting is stable: candidates that compare equal keep their input order,
/// which also makes ranking an already ranked list a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Order by final score, highest first
    pub fn rank(
        &self,
        candidates: Vec<ScoredCandidate>,
    ) -> Result<Vec<ScoredCandidate>, RankingError> {
        self.rank_by(candidates, SortOptions::default())
    }

    /// Order by the requested field and direction; rank is the 1-based
    /// position in that order
    pub fn rank_by(
        &self,
        mut candidates: Vec<ScoredCandidate>,
        sort: SortOptions,
    ) -> Result<Vec<ScoredCandidate>, RankingError> {
        if let Some(position) = candidates
            .iter()
            .position(|c| !sort_key_is_finite(c, sort.field))
        {
            return Err(RankingError::NonFiniteScore { position });
        }

        candidates.sort_by(|a, b| {
            let ordering = compare(a, b, sort.field);
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        tracing::debug!(
            count = candidates.len(),
            field = ?sort.field,
            order = ?sort.order,
            "Ranked candidates"
        );

        Ok(candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| candidate.with_rank(index + 1))
            .collect())
    }
}

fn sort_key_is_finite(candidate: &ScoredCandidate, field: SortField) -> bool {
    match field {
        SortField::Relevance => candidate.final_score().is_finite(),
        SortField::Confidence => candidate.score().confidence_score().is_finite(),
        SortField::Date => true,
    }
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate, field: SortField) -> Ordering {
    match field {
        SortField::Relevance => a.final_score().total_cmp(&b.final_score()),
        SortField::Date => a.thought().timestamp.cmp(&b.thought().timestamp),
        SortField::Confidence => a
            .score()
            .confidence_score()
            .total_cmp(&b.score().confidence_score()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{ScoringEngine, ScoringWeights};
    use crate::thought::Thought;
    use chrono::{Duration, TimeZone, Utc};

    fn semantic_only() -> ScoringEngine {
        ScoringEngine::new(ScoringWeights::new(1.0, 0.0, 0.0, 0.0).unwrap())
    }

    fn create_test_candidate(content: &str, final_score: f64, days_ago: i64) -> ScoredCandidate {
        let base = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let thought = Thought::new("user-1", content, base - Duration::days(days_ago));
        let score = semantic_only().score(final_score, 0.0, 0.0, 1.0 - final_score);
        ScoredCandidate::new(thought, score)
    }

    #[test]
    fn test_rank_by_final_score() {
        let candidates = vec![
            create_test_candidate("a", 0.4, 0),
            create_test_candidate("b", 0.85, 0),
            create_test_candidate("c", 0.6, 0),
        ];

        let ranked = RankingEngine::new().rank(candidates).unwrap();

        let scores: Vec<f64> = ranked.iter().map(|c| c.final_score()).collect();
        let ranks: Vec<usize> = ranked.iter().map(|c| c.rank()).collect();
        assert_eq!(scores, vec![0.85, 0.6, 0.4]);
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(RankingEngine::new().rank(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = vec![
            create_test_candidate("first", 0.5, 0),
            create_test_candidate("top", 0.9, 0),
            create_test_candidate("second", 0.5, 0),
        ];

        let ranked = RankingEngine::new().rank(candidates).unwrap();

        let contents: Vec<&str> = ranked.iter().map(|c| c.thought().content.as_str()).collect();
        assert_eq!(contents, vec!["top", "first", "second"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let engine = RankingEngine::new();
        let candidates = vec![
            create_test_candidate("a", 0.3, 0),
            create_test_candidate("b", 0.7, 0),
            create_test_candidate("c", 0.7, 0),
            create_test_candidate("d", 0.1, 0),
        ];

        let once = engine.rank(candidates).unwrap();
        let twice = engine.rank(once.clone()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_rank_by_date_ascending() {
        let candidates = vec![
            create_test_candidate("middle", 0.9, 5),
            create_test_candidate("newest", 0.1, 1),
            create_test_candidate("oldest", 0.5, 10),
        ];
        let sort = SortOptions {
            field: SortField::Date,
            order: SortOrder::Asc,
        };

        let ranked = RankingEngine::new().rank_by(candidates, sort).unwrap();

        let contents: Vec<&str> = ranked.iter().map(|c| c.thought().content.as_str()).collect();
        assert_eq!(contents, vec!["oldest", "middle", "newest"]);
        assert_eq!(ranked[2].rank(), 3);
    }

    #[test]
    fn test_rank_by_confidence_descending() {
        let candidates = vec![
            create_test_candidate("low-confidence", 0.8, 0),
            create_test_candidate("high-confidence", 0.2, 0),
        ];
        let sort = SortOptions {
            field: SortField::Confidence,
            order: SortOrder::Desc,
        };

        let ranked = RankingEngine::new().rank_by(candidates, sort).unwrap();

        assert_eq!(ranked[0].thought().content, "high-confidence");
    }

    #[test]
    fn test_rank_does_not_touch_scores() {
        let candidates = vec![create_test_candidate("a", 0.4, 0)];
        let before = *candidates[0].score();

        let ranked = RankingEngine::new().rank(candidates).unwrap();

        assert_eq!(*ranked[0].score(), before);
    }
}
