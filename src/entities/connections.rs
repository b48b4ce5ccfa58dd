//! Entity connections and the overlap index over timeline entries

use crate::entities::{Entity, EntityType};
use crate::timeline::TimelineEntry;
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relationship label for connections sharing a literal value
pub const SHARED_VALUE: &str = "shared_value";
/// Relationship label for connections sharing only an entity type
pub const SHARED_TYPE: &str = "shared_type";

/// Connection between an entry and one of its entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConnection {
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    pub entity_value: String,
    pub confidence: f64,
    /// Set once grouping or relation logic finds the entity shared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
}

impl EntityConnection {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            entity_id: entity.id,
            entity_type: entity.entity_type,
            entity_value: entity.value.clone(),
            confidence: entity.confidence,
            relationship_type: None,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            entity_type: self.entity_type,
            value: self.entity_value.clone(),
        }
    }

    pub fn with_relationship(mut self, relationship_type: impl Into<String>) -> Self {
        self.relationship_type = Some(relationship_type.into());
        self
    }
}

/// (type, value) identity of an entity across entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub value: String,
}

/// What two entries have in common
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedEntities {
    pub values: Vec<String>,
    pub types: Vec<EntityType>,
}

impl SharedEntities {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty()
    }
}

/// Overlap index over a pool of timeline entries
///
/// Maps every entity value and entity type to the positions of the entries
/// carrying it, so the entries connected to a target can be collected without
/// comparing the target against the whole pool.
pub struct EntityConnectionIndex<'a> {
    entries: &'a [TimelineEntry],
    by_value: HashMap<&'a str, Vec<usize>>,
    by_type: HashMap<EntityType, Vec<usize>>,
}

impl<'a> EntityConnectionIndex<'a> {
    /// One connection per entity, confidence copied, relationship unset
    pub fn connections_for(entities: &[Entity]) -> Vec<EntityConnection> {
        entities.iter().map(EntityConnection::from_entity).collect()
    }

    /// True if the entries share at least one entity value or entity type
    pub fn overlap(a: &TimelineEntry, b: &TimelineEntry) -> bool {
        a.entities.iter().any(|ea| {
            b.entities
                .iter()
                .any(|eb| ea.value == eb.value || ea.entity_type == eb.entity_type)
        })
    }

    /// Values and types the two entries have in common, each listed once in
    /// the order they appear on `a`
    pub fn shared(a: &TimelineEntry, b: &TimelineEntry) -> SharedEntities {
        let b_values: HashSet<&str> = b.entities.iter().map(|e| e.value.as_str()).collect();
        let b_types: HashSet<EntityType> = b.entities.iter().map(|e| e.entity_type).collect();

        let mut shared = SharedEntities::default();
        for entity in &a.entities {
            if b_values.contains(entity.value.as_str()) && !shared.values.contains(&entity.value) {
                shared.values.push(entity.value.clone());
            }
            if b_types.contains(&entity.entity_type) && !shared.types.contains(&entity.entity_type)
            {
                shared.types.push(entity.entity_type);
            }
        }
        shared
    }

    /// Label each connection of `entry` by how it relates to `target`
    pub fn annotate(entry: &TimelineEntry, target: &TimelineEntry) -> Vec<EntityConnection> {
        let shared = Self::shared(entry, target);
        entry
            .connections
            .iter()
            .cloned()
            .map(|connection| {
                if shared.values.contains(&connection.entity_value) {
                    connection.with_relationship(SHARED_VALUE)
                } else if shared.types.contains(&connection.entity_type) {
                    connection.with_relationship(SHARED_TYPE)
                } else {
                    connection
                }
            })
            .collect()
    }

    /// Build the index over `entries`
    pub fn build(entries: &'a [TimelineEntry]) -> Self {
        let mut by_value: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut by_type: HashMap<EntityType, Vec<usize>> = HashMap::new();

        for (position, entry) in entries.iter().enumerate() {
            for entity in &entry.entities {
                let positions = by_value.entry(entity.value.as_str()).or_default();
                if positions.last() != Some(&position) {
                    positions.push(position);
                }
                let positions = by_type.entry(entity.entity_type).or_default();
                if positions.last() != Some(&position) {
                    positions.push(position);
                }
            }
        }

        Self {
            entries,
            by_value,
            by_type,
        }
    }

    /// Entries overlapping `target`, excluding any entry with the target's id,
    /// in pool order
    pub fn connected_to(&self, target: &TimelineEntry) -> Vec<&'a TimelineEntry> {
        let mut positions: HashSet<usize> = HashSet::new();

        for entity in &target.entities {
            if let Some(found) = self.by_value.get(entity.value.as_str()) {
                positions.extend(found.iter().copied());
            }
            if let Some(found) = self.by_type.get(&entity.entity_type) {
                positions.extend(found.iter().copied());
            }
        }

        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();

        positions
            .into_iter()
            .map(|position| &self.entries[position])
            .filter(|entry| entry.id != target.id)
            .collect()
    }

    /// Get statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entry_count: self.entries.len(),
            distinct_values: self.by_value.len(),
            distinct_types: self.by_type.len(),
        }
    }
}

/// Connection index statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub entry_count: usize,
    pub distinct_values: usize,
    pub distinct_types: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thought::Thought;
    use chrono::{TimeZone, Utc};

    fn create_test_entry(content: &str, hour: u32, entities: &[(EntityType, &str)]) -> TimelineEntry {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap();
        let mut thought = Thought::new("user-1", content, timestamp);
        for (entity_type, value) in entities {
            thought.entities.push(Entity::new(thought.id, *entity_type, *value, 0.9));
        }
        TimelineEntry::from_thought(thought)
    }

    #[test]
    fn test_connections_copy_confidence() {
        let thought_id = Uuid::new_v4();
        let entities = vec![
            Entity::new(thought_id, EntityType::Person, "Alice", 0.75),
            Entity::new(thought_id, EntityType::Location, "Paris", 0.5),
        ];

        let connections = EntityConnectionIndex::connections_for(&entities);

        assert_eq!(connections.len(), 2);
        assert_eq!(connections[0].entity_value, "Alice");
        assert_eq!(connections[0].confidence, 0.75);
        assert_eq!(connections[1].entity_id, entities[1].id);
        assert!(connections.iter().all(|c| c.relationship_type.is_none()));
    }

    #[test]
    fn test_overlap_by_value() {
        let a = create_test_entry("coffee with alice", 9, &[(EntityType::Person, "Alice")]);
        let b = create_test_entry("alice at the office", 10, &[(EntityType::Organization, "Alice")]);
        assert!(EntityConnectionIndex::overlap(&a, &b));
    }

    #[test]
    fn test_overlap_by_type() {
        let a = create_test_entry("lunch with bob", 9, &[(EntityType::Person, "Bob")]);
        let b = create_test_entry("call with carol", 10, &[(EntityType::Person, "Carol")]);
        assert!(EntityConnectionIndex::overlap(&a, &b));
    }

    #[test]
    fn test_no_overlap() {
        let a = create_test_entry("lunch with bob", 9, &[(EntityType::Person, "Bob")]);
        let b = create_test_entry("went to rome", 10, &[(EntityType::Location, "Rome")]);
        let c = create_test_entry("nothing here", 11, &[]);
        assert!(!EntityConnectionIndex::overlap(&a, &b));
        assert!(!EntityConnectionIndex::overlap(&a, &c));
        assert!(!EntityConnectionIndex::overlap(&c, &c));
    }

    #[test]
    fn test_shared_and_annotate() {
        let target = create_test_entry(
            "bob in rome",
            9,
            &[(EntityType::Person, "Bob"), (EntityType::Location, "Rome")],
        );
        let other = create_test_entry(
            "carol in rome",
            10,
            &[(EntityType::Person, "Carol"), (EntityType::Location, "Rome")],
        );

        let shared = EntityConnectionIndex::shared(&other, &target);
        assert_eq!(shared.values, vec!["Rome".to_string()]);
        assert_eq!(shared.types, vec![EntityType::Person, EntityType::Location]);

        let annotated = EntityConnectionIndex::annotate(&other, &target);
        assert_eq!(annotated[0].relationship_type.as_deref(), Some(SHARED_TYPE));
        assert_eq!(annotated[1].relationship_type.as_deref(), Some(SHARED_VALUE));
    }

    #[test]
    fn test_connected_to_excludes_target_and_keeps_pool_order() {
        let entries = vec![
            create_test_entry("rome trip", 8, &[(EntityType::Location, "Rome")]),
            create_test_entry("bob", 9, &[(EntityType::Person, "Bob")]),
            create_test_entry("dinner in rome", 10, &[(EntityType::Activity, "Rome")]),
            create_test_entry("paris", 11, &[(EntityType::Location, "Paris")]),
        ];
        let index = EntityConnectionIndex::build(&entries);

        let connected = index.connected_to(&entries[0]);

        let ids: Vec<Uuid> = connected.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![entries[2].id, entries[3].id]);
    }

    #[test]
    fn test_index_stats() {
        let entries = vec![
            create_test_entry(
                "a",
                8,
                &[(EntityType::Location, "Rome"), (EntityType::Location, "Rome")],
            ),
            create_test_entry("b", 9, &[(EntityType::Person, "Bob")]),
        ];
        let index = EntityConnectionIndex::build(&entries);

        let stats = index.stats();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.distinct_values, 2);
        assert_eq!(stats.distinct_types, 2);
    }
}
