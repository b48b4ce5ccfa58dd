//! Collaborators that supply candidates and timeline entries
//!
//! The search and timeline cores never perform I/O themselves. Everything
//! they work on is fetched up front through these traits, which are the only
//! suspension points of a request.

mod json;

pub use json::{JsonFileSource, ThoughtDocument, MAX_DOCUMENT_SIZE};

use crate::search::{RawCandidate, StructuredQuery};
use crate::timeline::TimelineEntry;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Source I/O error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    #[error("Source data error in {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("Source document too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },
}

/// Supplies raw search candidates with their four sub-scores
pub trait CandidateSource {
    fn fetch_candidates(
        &self,
        query: &StructuredQuery,
    ) -> impl Future<Output = Result<Vec<RawCandidate>, SourceError>> + Send;
}

/// Supplies the timeline entries of one user
pub trait EntrySource {
    fn fetch_entries(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<TimelineEntry>, SourceError>> + Send;
}
