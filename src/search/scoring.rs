//! Weighted combination of the four relevance signals

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightsError {
    #[error("Invalid weight {name}={value}: weights must be within [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("Invalid weight configuration: weights sum to {0}, expected 1.0")]
    InvalidSum(f64),
}

/// Weights applied to each sub-score, fixed for the lifetime of an engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    semantic: f64,
    keyword: f64,
    recency: f64,
    confidence: f64,
}

impl ScoringWeights {
    pub const SEMANTIC: f64 = 0.4;
    pub const KEYWORD: f64 = 0.3;
    pub const RECENCY: f64 = 0.2;
    pub const CONFIDENCE: f64 = 0.1;

    pub fn new(
        semantic: f64,
        keyword: f64,
        recency: f64,
        confidence: f64,
    ) -> Result<Self, WeightsError> {
        for (name, value) in [
            ("semantic", semantic),
            ("keyword", keyword),
            ("recency", recency),
            ("confidence", confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeightsError::OutOfRange { name, value });
            }
        }

        let sum = semantic + keyword + recency + confidence;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::InvalidSum(sum));
        }

        Ok(Self {
            semantic,
            keyword,
            recency,
            confidence,
        })
    }

    pub fn semantic(&self) -> f64 {
        self.semantic
    }

    pub fn keyword(&self) -> f64 {
        self.keyword
    }

    pub fn recency(&self) -> f64 {
        self.recency
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn sum(&self) -> f64 {
        self.semantic + self.keyword + self.recency + self.confidence
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: Self::SEMANTIC,
            keyword: Self::KEYWORD,
            recency: Self::RECENCY,
            confidence: Self::CONFIDENCE,
        }
    }
}

/// Clamped sub-scores and their weighted combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    semantic_similarity: f64,
    keyword_match: f64,
    recency_score: f64,
    confidence_score: f64,
    final_score: f64,
}

impl Score {
    pub fn semantic_similarity(&self) -> f64 {
        self.semantic_similarity
    }

    pub fn keyword_match(&self) -> f64 {
        self.keyword_match
    }

    pub fn recency_score(&self) -> f64 {
        self.recency_score
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }
}

/// Combines semantic, keyword, recency and confidence signals
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Out-of-range inputs are clamped to [0, 1]; NaN counts as 0
    pub fn score(&self, semantic: f64, keyword: f64, recency: f64, confidence: f64) -> Score {
        let semantic_similarity = unit(semantic);
        let keyword_match = unit(keyword);
        let recency_score = unit(recency);
        let confidence_score = unit(confidence);

        let final_score = unit(
            semantic_similarity * self.weights.semantic
                + keyword_match * self.weights.keyword
                + recency_score * self.weights.recency
                + confidence_score * self.weights.confidence,
        );

        Score {
            semantic_similarity,
            keyword_match,
            recency_score,
            confidence_score,
            final_score,
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
