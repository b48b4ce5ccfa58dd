//! Timeline correlation: grouping entries and finding related ones
//!
//! Entries are built fresh from a user's thoughts for every operation.
//! `TimelineGrouper` clusters them into groups, `RelatedEntryFinder` answers
//! "what else touches the same entities", and `summarize` reports activity
//! statistics over the whole timeline.

mod grouping;
mod related;
mod summary;

pub use grouping::{GroupingError, TimelineGrouper, CO_OCCURRENCE};
pub use related::{RelatedEntryFinder, MAX_RELATED_LIMIT, MIN_RELATED_LIMIT};
pub use summary::{summarize, ActiveDay, EntityCount, TimelineSummary};

use crate::entities::{Entity, EntityConnection, EntityConnectionIndex};
use crate::thought::Thought;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Data source tag for entries built from thoughts
pub const THOUGHT_SOURCE: &str = "thought";

fn default_data_source() -> String {
    THOUGHT_SOURCE.to_string()
}

/// A thought placed on the timeline with its entity connections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Same as the underlying thought's id
    pub id: Uuid,
    pub thought: Thought,
    pub timestamp: DateTime<Utc>,
    pub entities: Vec<Entity>,
    pub connections: Vec<EntityConnection>,
    /// Ids of entries sharing a group with this one
    #[serde(default)]
    pub grouped_with: Vec<Uuid>,
    #[serde(default = "default_data_source")]
    pub data_source: String,
}

impl TimelineEntry {
    pub fn from_thought(thought: Thought) -> Self {
        let connections = EntityConnectionIndex::connections_for(&thought.entities);
        Self {
            id: thought.id,
            timestamp: thought.timestamp,
            entities: thought.entities.clone(),
            connections,
            grouped_with: Vec::new(),
            data_source: default_data_source(),
            thought,
        }
    }
}

/// Grouping strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Temporal,
    Entity,
    Location,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Temporal => "temporal",
            GroupType::Entity => "entity",
            GroupType::Location => "location",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupType {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temporal" => Ok(GroupType::Temporal),
            "entity" => Ok(GroupType::Entity),
            "location" => Ok(GroupType::Location),
            _ => Err(GroupingError::UnsupportedGroupType(s.to_string())),
        }
    }
}

/// Entries clustered together, with the entities they have in common
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub id: Uuid,
    pub entries: Vec<TimelineEntry>,
    /// Earliest member timestamp
    pub primary_timestamp: DateTime<Utc>,
    pub group_type: GroupType,
    pub common_entities: Vec<EntityConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
