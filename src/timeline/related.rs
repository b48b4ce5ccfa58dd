//! Related-entry discovery through shared entities

use crate::entities::EntityConnectionIndex;
use crate::search::QueryError;
use crate::timeline::TimelineEntry;
use std::cmp::Reverse;

pub const MIN_RELATED_LIMIT: usize = 1;
pub const MAX_RELATED_LIMIT: usize = 50;

/// Finds entries sharing an entity value or type with a target entry
///
/// Every overlapping entry qualifies equally, however many entities it
/// shares; the most recent ones are returned first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelatedEntryFinder;

impl RelatedEntryFinder {
    pub fn new() -> Self {
        Self
    }

    /// Reject limits outside 1..=50
    pub fn check_limit(limit: usize) -> Result<(), QueryError> {
        if !(MIN_RELATED_LIMIT..=MAX_RELATED_LIMIT).contains(&limit) {
            return Err(QueryError::InvalidLimit {
                limit,
                min: MIN_RELATED_LIMIT,
                max: MAX_RELATED_LIMIT,
            });
        }
        Ok(())
    }

    pub fn related(
        &self,
        target: &TimelineEntry,
        pool: &[TimelineEntry],
        limit: usize,
    ) -> Result<Vec<TimelineEntry>, QueryError> {
        Self::check_limit(limit)?;

        if target.entities.is_empty() {
            return Ok(Vec::new());
        }

        let index = EntityConnectionIndex::build(pool);
        let mut related = index.connected_to(target);
        related.sort_by_key(|entry| Reverse(entry.timestamp));
        related.truncate(limit);

        tracing::debug!(
            target = %target.id,
            pool = pool.len(),
            found = related.len(),
            "Found related entries"
        );

        Ok(related
            .into_iter()
            .map(|entry| {
                let mut related_entry = entry.clone();
                related_entry.connections = EntityConnectionIndex::annotate(entry, target);
                related_entry
            })
            .collect())
    }
}
