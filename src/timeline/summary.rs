//! Activity statistics over a user's timeline

use crate::entities::EntityType;
use crate::timeline::TimelineEntry;
use ahash::{HashMap, HashMapExt};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_DAYS: usize = 5;
const TOP_ENTITIES: usize = 10;

/// Number of entries recorded on one UTC day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDay {
    pub date: NaiveDate,
    pub count: usize,
}

/// How often one (value, type) pair was extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub value: String,
    pub entity_type: EntityType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub total_entries: usize,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    pub entity_counts: BTreeMap<EntityType, usize>,
    pub most_active_days: Vec<ActiveDay>,
    pub top_entities: Vec<EntityCount>,
}

pub fn summarize(entries: &[TimelineEntry]) -> TimelineSummary {
    let earliest = entries.iter().map(|e| e.timestamp).min();
    let latest = entries.iter().map(|e| e.timestamp).max();

    let mut entity_counts: BTreeMap<EntityType, usize> = BTreeMap::new();
    let mut pair_counts: HashMap<(&str, EntityType), usize> = HashMap::new();
    let mut day_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for entry in entries {
        *day_counts.entry(entry.timestamp.date_naive()).or_insert(0) += 1;
        for entity in &entry.entities {
            *entity_counts.entry(entity.entity_type).or_insert(0) += 1;
            *pair_counts
                .entry((entity.value.as_str(), entity.entity_type))
                .or_insert(0) += 1;
        }
    }

    let mut most_active_days: Vec<ActiveDay> = day_counts
        .into_iter()
        .map(|(date, count)| ActiveDay { date, count })
        .collect();
    // Days arrive in ascending order, so a stable sort keeps earlier days first on ties
    most_active_days.sort_by(|a, b| b.count.cmp(&a.count));
    most_active_days.truncate(TOP_DAYS);

    let mut top_entities: Vec<EntityCount> = pair_counts
        .into_iter()
        .map(|((value, entity_type), count)| EntityCount {
            value: value.to_string(),
            entity_type,
            count,
        })
        .collect();
    top_entities.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.value.cmp(&b.value))
            .then_with(|| a.entity_type.cmp(&b.entity_type))
    });
    top_entities.truncate(TOP_ENTITIES);

    TimelineSummary {
        total_entries: entries.len(),
        earliest,
        latest,
        entity_counts,
        most_active_days,
        top_entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Entity;
    use crate::thought::Thought;
    use chrono::TimeZone;

    fn create_test_entry(day: u32, hour: u32, entities: &[(EntityType, &str)]) -> TimelineEntry {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap();
        let mut thought = Thought::new("user-1", "entry", timestamp);
        for (entity_type, value) in entities {
            thought
                .entities
                .push(Entity::new(thought.id, *entity_type, *value, 0.9));
        }
        TimelineEntry::from_thought(thought)
    }

    #[test]
    fn test_summary_counts() {
        let entries = vec![
            create_test_entry(10, 9, &[(EntityType::Person, "Alice")]),
            create_test_entry(10, 12, &[(EntityType::Person, "Alice"), (EntityType::Location, "Rome")]),
            create_test_entry(12, 8, &[(EntityType::Location, "Alice")]),
            create_test_entry(11, 8, &[]),
        ];

        let summary = summarize(&entries);

        assert_eq!(summary.total_entries, 4);
        assert_eq!(summary.earliest, Some(entries[0].timestamp));
        assert_eq!(summary.latest, Some(entries[2].timestamp));
        assert_eq!(summary.entity_counts[&EntityType::Person], 2);
        assert_eq!(summary.entity_counts[&EntityType::Location], 2);

        let days: Vec<(u32, usize)> = summary
            .most_active_days
            .iter()
            .map(|d| (chrono::Datelike::day(&d.date), d.count))
            .collect();
        assert_eq!(days, vec![(10, 2), (11, 1), (12, 1)]);

        assert_eq!(
            summary.top_entities[0],
            EntityCount {
                value: "Alice".to_string(),
                entity_type: EntityType::Person,
                count: 2
            }
        );
        assert_eq!(summary.top_entities[1].entity_type, EntityType::Location);
        assert_eq!(summary.top_entities[1].value, "Alice");
        assert_eq!(summary.top_entities[2].value, "Rome");
    }

    #[test]
    fn test_summary_truncates_days() {
        let entries: Vec<TimelineEntry> = (1..=8).map(|day| create_test_entry(day, 9, &[])).collect();
        let summary = summarize(&entries);
        assert_eq!(summary.most_active_days.len(), 5);
        assert_eq!(chrono::Datelike::day(&summary.most_active_days[0].date), 1);
    }

    #[test]
    fn test_summary_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_entries, 0);
        assert!(summary.earliest.is_none());
        assert!(summary.most_active_days.is_empty());
        assert!(summary.top_entities.is_empty());
    }
}
