use crate::config::Config;
use crate::error::Result;
use crate::sources::EntrySource;
use crate::timeline::{
    summarize, GroupType, RelatedEntryFinder, TimelineEntry, TimelineGroup, TimelineGrouper,
    TimelineSummary,
};
use uuid::Uuid;

const DEFAULT_RELATED_LIMIT: usize = 10;

/// Timeline grouping, related-entry lookup and summaries for one source
pub struct TimelineService<S> {
    source: S,
    grouper: TimelineGrouper,
    finder: RelatedEntryFinder,
    default_related_limit: usize,
}

impl<S: EntrySource> TimelineService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            grouper: TimelineGrouper::new(),
            finder: RelatedEntryFinder::new(),
            default_related_limit: DEFAULT_RELATED_LIMIT,
        }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self {
            default_related_limit: config.timeline.default_related_limit,
            ..Self::new(source)
        }
    }

    /// Group the user's timeline; `group_type` is parsed before any fetch
    pub async fn group(&self, user_id: &str, group_type: &str) -> Result<Vec<TimelineGroup>> {
        let group_type: GroupType = group_type.parse()?;
        let entries = self.source.fetch_entries(user_id).await?;
        let groups = self.grouper.group(&entries, group_type)?;

        tracing::info!(
            "Grouped {} entries into {} {} groups",
            entries.len(),
            groups.len(),
            group_type
        );
        Ok(groups)
    }

    /// Entries related to `entry_id`; an unknown id yields no entries
    pub async fn related(
        &self,
        user_id: &str,
        entry_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<TimelineEntry>> {
        let limit = limit.unwrap_or(self.default_related_limit);
        RelatedEntryFinder::check_limit(limit)?;

        let entries = self.source.fetch_entries(user_id).await?;
        let Some(target) = entries.iter().find(|entry| entry.id == entry_id) else {
            tracing::info!("Entry {} not found for related lookup", entry_id);
            return Ok(Vec::new());
        };

        let related = self.finder.related(target, &entries, limit)?;
        tracing::info!("Found {} entries related to {}", related.len(), entry_id);
        Ok(related)
    }

    /// Activity statistics over the user's whole timeline
    pub async fn summary(&self, user_id: &str) -> Result<TimelineSummary> {
        let entries = self.source.fetch_entries(user_id).await?;
        let summary = summarize(&entries);

        tracing::info!("Summarized {} timeline entries", summary.total_entries);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, EntityType};
    use crate::error::Error;
    use crate::search::QueryError;
    use crate::sources::SourceError;
    use crate::thought::Thought;
    use crate::timeline::GroupingError;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source counting how often it was asked for entries
    struct StaticEntries {
        entries: Vec<TimelineEntry>,
        fetches: AtomicUsize,
    }

    impl EntrySource for StaticEntries {
        async fn fetch_entries(
            &self,
            _user_id: &str,
        ) -> std::result::Result<Vec<TimelineEntry>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.clone())
        }
    }

    fn create_test_service() -> TimelineService<StaticEntries> {
        let base = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let entries = [
            (0, "Alice"),
            (2, "Alice"),
            (30, "Bob"),
        ]
        .into_iter()
        .map(|(hours, person)| {
            let mut thought = Thought::new("user-1", "note", base + Duration::hours(hours));
            thought
                .entities
                .push(Entity::new(thought.id, EntityType::Person, person, 0.9));
            TimelineEntry::from_thought(thought)
        })
        .collect();

        TimelineService::new(StaticEntries {
            entries,
            fetches: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_group_temporal() {
        let service = create_test_service();

        let groups = service.group("user-1", "temporal").await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[0].common_entities.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_group_type_fails_before_fetch() {
        let service = create_test_service();

        let err = service.group("user-1", "weekly").await.unwrap_err();

        assert!(matches!(
            err,
            Error::Grouping(GroupingError::UnsupportedGroupType(_))
        ));
        assert_eq!(service.source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_related_unknown_entry() {
        let service = create_test_service();
        let related = service.related("user-1", Uuid::new_v4(), None).await.unwrap();
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_related_limit_checked_even_for_unknown_entry() {
        let service = create_test_service();

        let err = service
            .related("user-1", Uuid::new_v4(), Some(0))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Query(QueryError::InvalidLimit { .. })));
    }

    #[tokio::test]
    async fn test_related_and_summary() {
        let service = create_test_service();
        let target = service.source.entries[0].id;

        let related = service.related("user-1", target, Some(5)).await.unwrap();
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|e| e.id != target));

        let summary = service.summary("user-1").await.unwrap();
        assert_eq!(summary.total_entries, 3);
        assert_eq!(summary.entity_counts[&EntityType::Person], 3);
    }
}
