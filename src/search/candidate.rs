//! Raw and scored search candidates

use crate::entities::Entity;
use crate::search::signals::{self, RecencyTiers};
use crate::search::Score;
use crate::thought::Thought;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A span of matched text within a thought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Field the match was found in ("content")
    pub field: String,
    /// Query word that matched
    pub text: String,
    /// Byte offset of the first matched byte
    pub start: usize,
    /// Byte offset one past the last matched byte
    pub end: usize,
    /// Field value with the match wrapped in `<mark>` tags
    pub highlight: String,
}

/// Candidate as supplied by upstream retrieval, sub-scores not yet combined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub thought: Thought,
    pub semantic_similarity: f64,
    pub keyword_match: f64,
    pub recency_score: f64,
    pub confidence_score: f64,
}

impl RawCandidate {
    pub fn new(
        thought: Thought,
        semantic_similarity: f64,
        keyword_match: f64,
        recency_score: f64,
        confidence_score: f64,
    ) -> Self {
        Self {
            thought,
            semantic_similarity,
            keyword_match,
            recency_score,
            confidence_score,
        }
    }

    /// Build a candidate from a vector-store similarity, deriving the other
    /// three signals from the thought
    pub fn from_similarity(
        thought: Thought,
        semantic_similarity: f64,
        query_text: &str,
        now: DateTime<Utc>,
        tiers: &RecencyTiers,
        default_confidence: f64,
    ) -> Self {
        let keyword_match = signals::keyword_match(query_text, &thought.content);
        let recency_score = signals::recency_score(thought.timestamp, now, tiers);
        let confidence_score = signals::confidence_score(&thought.entities, default_confidence);

        Self::new(
            thought,
            semantic_similarity,
            keyword_match,
            recency_score,
            confidence_score,
        )
    }
}

/// A thought with its combined score, match spans and rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    thought: Thought,
    score: Score,
    #[serde(default)]
    matches: Vec<SearchMatch>,
    #[serde(default)]
    matching_entities: Vec<Entity>,
    /// 1-based position in the result set, 0 until ranked
    rank: usize,
}

impl ScoredCandidate {
    /// Create an unranked candidate
    pub fn new(thought: Thought, score: Score) -> Self {
        Self {
            thought,
            score,
            matches: Vec::new(),
            matching_entities: Vec::new(),
            rank: 0,
        }
    }

    pub fn with_matches(mut self, matches: Vec<SearchMatch>) -> Self {
        self.matches = matches;
        self
    }

    pub fn with_matching_entities(mut self, matching_entities: Vec<Entity>) -> Self {
        self.matching_entities = matching_entities;
        self
    }

    pub(crate) fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn thought(&self) -> &Thought {
        &self.thought
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn final_score(&self) -> f64 {
        self.score.final_score()
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn matching_entities(&self) -> &[Entity] {
        &self.matching_entities
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn is_ranked(&self) -> bool {
        self.rank > 0
    }
}
