//! Captured thoughts, the content items search and timeline operate on

use crate::entities::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata captured alongside a thought
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

/// A user's thought with its extracted entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub id: Uuid,
    pub user_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: ThoughtMetadata,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Thought {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            content: content.into(),
            timestamp,
            metadata: ThoughtMetadata::default(),
            entities: Vec::new(),
        }
    }

    /// Get a short preview of the content (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            self.content.clone()
        } else {
            let truncated: String = self.content.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}
