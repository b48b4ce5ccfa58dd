//! Clustering timeline entries into groups

use crate::entities::{EntityConnection, EntityKey};
use crate::timeline::{GroupType, TimelineEntry, TimelineGroup};
use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Relationship label for entities shared by several members of a group
pub const CO_OCCURRENCE: &str = "co_occurrence";

/// Minimum number of entries for a bucket to become a group
const MIN_GROUP_SIZE: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupingError {
    #[error("unsupported group type: {0}")]
    UnsupportedGroupType(String),

    #[error("Grouping failed: {0}")]
    Internal(String),
}

/// Groups timeline entries by the requested strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineGrouper;

impl TimelineGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Cluster `entries`; entity and location grouping produce no groups yet
    pub fn group(
        &self,
        entries: &[TimelineEntry],
        group_type: GroupType,
    ) -> Result<Vec<TimelineGroup>, GroupingError> {
        let groups = match group_type {
            GroupType::Temporal => self.group_temporal(entries)?,
            GroupType::Entity | GroupType::Location => Vec::new(),
        };

        tracing::debug!(
            entries = entries.len(),
            groups = groups.len(),
            group_type = %group_type,
            "Grouped timeline entries"
        );

        Ok(groups)
    }

    /// One group per UTC calendar day holding at least two entries, in
    /// chronological order of days
    fn group_temporal(
        &self,
        entries: &[TimelineEntry],
    ) -> Result<Vec<TimelineGroup>, GroupingError> {
        let mut buckets: BTreeMap<NaiveDate, Vec<&TimelineEntry>> = BTreeMap::new();
        for entry in entries {
            buckets
                .entry(entry.timestamp.date_naive())
                .or_default()
                .push(entry);
        }

        buckets
            .into_iter()
            .filter(|(_, members)| members.len() >= MIN_GROUP_SIZE)
            .map(|(day, members)| build_group(day, members))
            .collect()
    }
}

fn build_group(
    day: NaiveDate,
    mut members: Vec<&TimelineEntry>,
) -> Result<TimelineGroup, GroupingError> {
    members.sort_by_key(|entry| entry.timestamp);

    let primary_timestamp = members
        .first()
        .map(|entry| entry.timestamp)
        .ok_or_else(|| GroupingError::Internal(format!("empty bucket for {}", day)))?;

    let common_entities = common_entities(&members);
    let ids: Vec<Uuid> = members.iter().map(|entry| entry.id).collect();

    let entries = members
        .into_iter()
        .map(|entry| {
            let mut entry = entry.clone();
            let own_id = entry.id;
            entry.grouped_with = ids.iter().copied().filter(|id| *id != own_id).collect();
            entry
        })
        .collect();

    Ok(TimelineGroup {
        id: Uuid::new_v4(),
        entries,
        primary_timestamp,
        group_type: GroupType::Temporal,
        common_entities,
        summary: Some(format!("Activities on {}", day.format("%Y-%m-%d"))),
    })
}

/// Connections whose (type, value) occurs more than once across `members`,
/// each key listed once at its first occurrence
fn common_entities(members: &[&TimelineEntry]) -> Vec<EntityConnection> {
    let mut counts: HashMap<EntityKey, usize> = HashMap::new();
    for connection in members.iter().flat_map(|entry| entry.connections.iter()) {
        *counts.entry(connection.key()).or_insert(0) += 1;
    }

    let mut seen: HashSet<EntityKey> = HashSet::new();
    let mut common = Vec::new();
    for connection in members.iter().flat_map(|entry| entry.connections.iter()) {
        let key = connection.key();
        if counts.get(&key).copied().unwrap_or(0) > 1 && seen.insert(key) {
            common.push(connection.clone().with_relationship(CO_OCCURRENCE));
        }
    }
    common
}
