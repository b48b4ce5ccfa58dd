//! JSON document store of thoughts and precomputed similarities

use crate::search::signals::{RecencyTiers, DEFAULT_CONFIDENCE};
use crate::search::{RawCandidate, StructuredQuery};
use crate::sources::{CandidateSource, EntrySource, SourceError};
use crate::thought::Thought;
use crate::timeline::TimelineEntry;
use ahash::HashMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Largest document the source will read (64 MiB)
pub const MAX_DOCUMENT_SIZE: u64 = 64 * 1024 * 1024;

/// On-disk layout of a thought document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtDocument {
    #[serde(default)]
    pub thoughts: Vec<Thought>,
    /// Semantic similarity per thought id, as produced by an external vector store
    #[serde(default)]
    pub similarities: HashMap<Uuid, f64>,
}

/// Reads thoughts from a JSON file on every fetch
///
/// A thought becomes a search candidate when it has a recorded similarity or
/// shares at least one word with the query.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    recency: RecencyTiers,
    default_confidence: f64,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recency: RecencyTiers::default(),
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Override how recency and confidence sub-scores are derived
    pub fn with_signals(mut self, recency: RecencyTiers, default_confidence: f64) -> Self {
        self.recency = recency;
        self.default_confidence = default_confidence;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole document
    pub async fn load(&self) -> Result<ThoughtDocument, SourceError> {
        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                source: e,
                context: format!("Failed to stat {}", self.path.display()),
            })?;

        if metadata.len() > MAX_DOCUMENT_SIZE {
            return Err(SourceError::TooLarge {
                size: metadata.len(),
                max: MAX_DOCUMENT_SIZE,
            });
        }

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                source: e,
                context: format!("Failed to read {}", self.path.display()),
            })?;

        let document: ThoughtDocument =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Json {
                source: e,
                path: self.path.clone(),
            })?;

        tracing::debug!(
            path = %self.path.display(),
            thoughts = document.thoughts.len(),
            similarities = document.similarities.len(),
            "Loaded thought document"
        );

        Ok(document)
    }

    /// Write `document`, creating parent directories as needed
    pub async fn save(&self, document: &ThoughtDocument) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SourceError::Io {
                    source: e,
                    context: format!("Failed to create directory {}", parent.display()),
                })?;
        }

        let payload = serde_json::to_vec_pretty(document).map_err(|e| SourceError::Json {
            source: e,
            path: self.path.clone(),
        })?;

        tokio::fs::write(&self.path, payload)
            .await
            .map_err(|e| SourceError::Io {
                source: e,
                context: format!("Failed to write {}", self.path.display()),
            })
    }
}

impl CandidateSource for JsonFileSource {
    async fn fetch_candidates(
        &self,
        query: &StructuredQuery,
    ) -> Result<Vec<RawCandidate>, SourceError> {
        let document = self.load().await?;
        let now = Utc::now();
        let similarities = document.similarities;

        let candidates: Vec<RawCandidate> = document
            .thoughts
            .into_iter()
            .filter(|thought| thought.user_id == query.user_id())
            .filter_map(|thought| {
                let similarity = similarities.get(&thought.id).copied();
                let candidate = RawCandidate::from_similarity(
                    thought,
                    similarity.unwrap_or(0.0),
                    query.text(),
                    now,
                    &self.recency,
                    self.default_confidence,
                );
                (similarity.is_some() || candidate.keyword_match > 0.0).then_some(candidate)
            })
            .collect();

        Ok(candidates)
    }
}

impl EntrySource for JsonFileSource {
    /// Entries of `user_id`, newest first
    async fn fetch_entries(&self, user_id: &str) -> Result<Vec<TimelineEntry>, SourceError> {
        let document = self.load().await?;

        let mut thoughts: Vec<Thought> = document
            .thoughts
            .into_iter()
            .filter(|thought| thought.user_id == user_id)
            .collect();
        thoughts.sort_by_key(|thought| Reverse(thought.timestamp));

        Ok(thoughts.into_iter().map(TimelineEntry::from_thought).collect())
    }
}
