//! Extracted entities and the overlap index built over them
//!
//! This module provides:
//! - The closed set of entity types a thought can carry
//! - The entity value object produced by upstream extraction
//! - `EntityConnectionIndex`, the overlap predicate shared by search
//!   annotation, timeline grouping and related-entry discovery

mod connections;

pub use connections::{
    EntityConnection, EntityConnectionIndex, EntityKey, IndexStats, SharedEntities, SHARED_TYPE,
    SHARED_VALUE,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Types of semantic entities that can be extracted from thoughts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Location,
    Date,
    Activity,
    Emotion,
    Organization,
    Event,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Person,
        EntityType::Location,
        EntityType::Date,
        EntityType::Activity,
        EntityType::Emotion,
        EntityType::Organization,
        EntityType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "person",
            EntityType::Location => "location",
            EntityType::Date => "date",
            EntityType::Activity => "activity",
            EntityType::Emotion => "emotion",
            EntityType::Organization => "organization",
            EntityType::Event => "event",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    /// Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| UnknownEntityType(s.to_string()))
    }
}

/// A semantic entity extracted from a thought
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    /// Thought the entity was extracted from
    pub thought_id: Uuid,
    pub entity_type: EntityType,
    /// Literal extracted value, e.g. "Paris"
    pub value: String,
    /// Extraction confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Text surrounding the entity in the thought
    #[serde(default)]
    pub context: String,
}

impl Entity {
    /// Create an entity with a fresh id; confidence is clamped to [0, 1]
    pub fn new(
        thought_id: Uuid,
        entity_type: EntityType,
        value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            thought_id,
            entity_type,
            value: value.into(),
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
            context: String::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}
