//! Hybrid search: query parsing, scoring, ranking
//!
//! This module turns raw query text into a `StructuredQuery`, combines the
//! sub-scores supplied by upstream retrieval into a single weighted relevance
//! score, and orders the result set.

mod candidate;
mod highlight;
mod parser;
mod pipeline;
mod ranking;
mod scoring;
pub mod signals;
mod suggest;

pub use candidate::{RawCandidate, ScoredCandidate, SearchMatch};
pub use highlight::highlight_matches;
pub use parser::QueryParser;
pub use pipeline::SearchPipeline;
pub use ranking::{RankingEngine, RankingError};
pub use scoring::{Score, ScoringEngine, ScoringWeights, WeightsError};
pub use suggest::suggest;

use crate::entities::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("query text cannot be empty")]
    Empty,

    #[error("query text cannot be empty after parsing filters")]
    EmptyAfterFilters,

    #[error("end date {end} is before start date {start}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("page must be at least 1, got {0}")]
    InvalidPage(u32),

    #[error("page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u32),

    #[error("limit must be between {min} and {max}, got {limit}")]
    InvalidLimit { limit: usize, min: usize, max: usize },
}

/// Inclusive timestamp bounds, either side optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, QueryError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(QueryError::InvalidDateRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| timestamp >= start)
            && self.end.map_or(true, |end| timestamp <= end)
    }
}

/// Restrict results to thoughts carrying certain entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFilter {
    #[serde(default)]
    pub entity_types: BTreeSet<EntityType>,
    #[serde(default)]
    pub entity_values: BTreeSet<String>,
}

impl EntityFilter {
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty() && self.entity_values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Relevance,
    Date,
    Confidence,
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortField::Relevance),
            "date" => Ok(SortField::Date),
            "confidence" => Ok(SortField::Confidence),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortOptions {
    pub fn is_default(&self) -> bool {
        *self == SortOptions::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPage(page));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(QueryError::InvalidPageSize(page_size));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Parsed, validated search query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredQuery {
    text: String,
    user_id: String,
    date_range: Option<DateRange>,
    entity_filter: Option<EntityFilter>,
    sort: SortOptions,
    pagination: Pagination,
    include_raw_content: bool,
    highlight_matches: bool,
}

impl StructuredQuery {
    /// Query with default sort, pagination and display flags
    pub fn new(text: impl Into<String>, user_id: impl Into<String>) -> Result<Self, QueryError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QueryError::Empty);
        }

        Ok(Self {
            text,
            user_id: user_id.into(),
            date_range: None,
            entity_filter: None,
            sort: SortOptions::default(),
            pagination: Pagination::default(),
            include_raw_content: true,
            highlight_matches: true,
        })
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = Some(date_range);
        self
    }

    pub fn with_entity_filter(mut self, entity_filter: EntityFilter) -> Self {
        self.entity_filter = Some(entity_filter);
        self
    }

    pub fn with_sort(mut self, sort: SortOptions) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_display(mut self, include_raw_content: bool, highlight_matches: bool) -> Self {
        self.include_raw_content = include_raw_content;
        self.highlight_matches = highlight_matches;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn entity_filter(&self) -> Option<&EntityFilter> {
        self.entity_filter.as_ref()
    }

    pub fn sort(&self) -> SortOptions {
        self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn include_raw_content(&self) -> bool {
        self.include_raw_content
    }

    pub fn highlight_matches(&self) -> bool {
        self.highlight_matches
    }
}

impl fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.text)?;
        if let Some(filter) = &self.entity_filter {
            for entity_type in &filter.entity_types {
                write!(f, " type:{}", entity_type)?;
            }
        }
        if let Some(range) = &self.date_range {
            if let Some(start) = range.start {
                write!(f, " after:{}", start.format("%Y-%m-%d"))?;
            }
            if let Some(end) = range.end {
                write!(f, " before:{}", end.format("%Y-%m-%d"))?;
            }
        }
        Ok(())
    }
}

/// One page of ranked search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredCandidate>,
    /// Matches across all pages
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
    pub query_text: String,
    pub search_time_ms: u64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
