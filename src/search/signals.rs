//! Derivation of the keyword, recency and confidence sub-scores
//!
//! Semantic similarity always comes from the vector store; the other three
//! signals can be computed locally from the thought itself.

use crate::entities::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Age threshold and the score given to thoughts no older than it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyTier {
    pub max_age_days: i64,
    pub score: f64,
}

/// Tiers checked in order; anything older than the last tier gets `floor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyTiers {
    pub floor: f64,
    pub tiers: Vec<RecencyTier>,
}

impl Default for RecencyTiers {
    fn default() -> Self {
        Self {
            floor: 0.2,
            tiers: vec![
                RecencyTier { max_age_days: 7, score: 1.0 },
                RecencyTier { max_age_days: 30, score: 0.8 },
                RecencyTier { max_age_days: 90, score: 0.6 },
                RecencyTier { max_age_days: 365, score: 0.4 },
            ],
        }
    }
}

/// Score given to thoughts without any extracted entities
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Fraction of distinct query words that appear as words in the content
pub fn keyword_match(query: &str, content: &str) -> f64 {
    let query_words: HashSet<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if query_words.is_empty() {
        return 0.0;
    }

    let content_words: HashSet<String> =
        content.split_whitespace().map(str::to_lowercase).collect();
    if content_words.is_empty() {
        return 0.0;
    }

    let matched = query_words.intersection(&content_words).count();
    matched as f64 / query_words.len() as f64
}

/// Step score by age in whole days; future timestamps count as fresh
pub fn recency_score(timestamp: DateTime<Utc>, now: DateTime<Utc>, tiers: &RecencyTiers) -> f64 {
    let age_days = (now - timestamp).num_days();

    tiers
        .tiers
        .iter()
        .find(|tier| age_days <= tier.max_age_days)
        .map(|tier| tier.score)
        .unwrap_or(tiers.floor)
}

/// Mean extraction confidence, `default` when there are no entities
pub fn confidence_score(entities: &[Entity], default: f64) -> f64 {
    if entities.is_empty() {
        return default;
    }
    entities.iter().map(|e| e.confidence).sum::<f64>() / entities.len() as f64
}
