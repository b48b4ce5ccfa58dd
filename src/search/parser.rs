//! Query-language parser
//!
//! Recognised syntax, stripped from the free text in this order:
//! - `type:<entity_type>` (repeatable, unknown types ignored)
//! - `after:YYYY-MM-DD`, `before:YYYY-MM-DD`, "last week", "yesterday"
//! - `sort:<relevance|date|confidence>`, `order:<asc|desc>`
//!
//! Each stage works on the text left behind by the previous one.

use crate::entities::EntityType;
use crate::error::Error;
use crate::search::{
    DateRange, EntityFilter, QueryError, SortField, SortOptions, SortOrder, StructuredQuery,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeSet;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns raw query text into a `StructuredQuery`
#[derive(Debug, Clone)]
pub struct QueryParser {
    type_token: Regex,
    after_token: Regex,
    before_token: Regex,
    last_week: Regex,
    yesterday: Regex,
    sort_token: Regex,
    order_token: Regex,
    whitespace: Regex,
}

impl QueryParser {
    /// Compile the query syntax patterns
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            type_token: pattern(r"(?i)\btype:(\w+)")?,
            after_token: pattern(r"(?i)\bafter:(\d{4}-\d{2}-\d{2})")?,
            before_token: pattern(r"(?i)\bbefore:(\d{4}-\d{2}-\d{2})")?,
            last_week: pattern(r"(?i)\blast\s+week\b")?,
            yesterday: pattern(r"(?i)\byesterday\b")?,
            sort_token: pattern(r"(?i)\bsort:(\w+)")?,
            order_token: pattern(r"(?i)\border:(asc|desc)\b")?,
            whitespace: pattern(r"\s+")?,
        })
    }

    /// Parse against the current wall clock
    pub fn parse(&self, raw: &str, user_id: &str) -> Result<StructuredQuery, QueryError> {
        self.parse_at(raw, user_id, Utc::now())
    }

    /// Parse with `now` as the reference for relative date phrases
    pub fn parse_at(
        &self,
        raw: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StructuredQuery, QueryError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(QueryError::Empty);
        }

        let entity_types = self.parse_entity_types(text);
        let text = self.strip(&self.type_token, text);

        let date_range = self.parse_date_range(&text, now)?;
        let text = self.strip(&self.after_token, &text);
        let text = self.strip(&self.before_token, &text);
        let text = self.strip(&self.last_week, &text);
        let text = self.strip(&self.yesterday, &text);

        let sort = self.parse_sort(&text);
        let text = self.strip(&self.sort_token, &text);
        let text = self.strip(&self.order_token, &text);

        if text.is_empty() {
            return Err(QueryError::EmptyAfterFilters);
        }

        tracing::debug!(
            text = %text,
            entity_types = ?entity_types,
            date_range = ?date_range,
            sort = ?sort,
            "Parsed search query"
        );

        let mut query = StructuredQuery::new(text, user_id)?.with_sort(sort);
        if !entity_types.is_empty() {
            query = query.with_entity_filter(EntityFilter {
                entity_types,
                entity_values: BTreeSet::new(),
            });
        }
        if let Some(range) = date_range {
            query = query.with_date_range(range);
        }

        Ok(query)
    }

    fn parse_entity_types(&self, text: &str) -> BTreeSet<EntityType> {
        self.type_token
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<EntityType>().ok())
            .collect()
    }

    /// Explicit `after:`/`before:` bounds are read first. "last week" then
    /// replaces only the start; "yesterday" replaces both bounds but is not
    /// consulted when "last week" is present. An inverted result is rejected.
    fn parse_date_range(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<DateRange>, QueryError> {
        let mut start = Self::first_date(&self.after_token, text);
        let mut end = Self::first_date(&self.before_token, text);

        if self.last_week.is_match(text) {
            start = Some(now - Duration::weeks(1));
        } else if self.yesterday.is_match(text) {
            start = Some(now - Duration::days(1));
            end = Some(now);
        }

        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        DateRange::new(start, end).map(Some)
    }

    fn first_date(token: &Regex, text: &str) -> Option<DateTime<Utc>> {
        let caps = token.captures(text)?;
        let date = NaiveDate::parse_from_str(&caps[1], DATE_FORMAT).ok()?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    }

    fn parse_sort(&self, text: &str) -> SortOptions {
        let mut sort = SortOptions::default();

        if let Some(caps) = self.sort_token.captures(text) {
            if let Ok(field) = caps[1].parse::<SortField>() {
                sort.field = field;
            }
        }
        if let Some(caps) = self.order_token.captures(text) {
            if let Ok(order) = caps[1].parse::<SortOrder>() {
                sort.order = order;
            }
        }

        sort
    }

    /// Remove every match of `token` and collapse whitespace
    fn strip(&self, token: &Regex, text: &str) -> String {
        let removed = token.replace_all(text, "");
        self.whitespace.replace_all(&removed, " ").trim().to_string()
    }
}

fn pattern(source: &str) -> crate::Result<Regex> {
    Regex::new(source)
        .map_err(|e| Error::Pattern(format!("Invalid query pattern '{}': {}", source, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn parse(raw: &str) -> Result<StructuredQuery, QueryError> {
        QueryParser::new().unwrap().parse_at(raw, "user-1", now())
    }

    #[test]
    fn test_malformed_pattern_is_an_error() {
        let err = pattern(r"type:(\w+").unwrap_err();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_entity_type_tokens() {
        let query = parse("type:person john type:location paris").unwrap();
        assert_eq!(query.text(), "john paris");

        let types = &query.entity_filter().unwrap().entity_types;
        assert_eq!(types.len(), 2);
        assert!(types.contains(&EntityType::Person));
        assert!(types.contains(&EntityType::Location));
    }

    #[test]
    fn test_entity_types_deduplicated_and_case_insensitive() {
        let query = parse("TYPE:Person alice Type:PERSON").unwrap();
        assert_eq!(query.text(), "alice");
        assert_eq!(query.entity_filter().unwrap().entity_types.len(), 1);
    }

    #[test]
    fn test_unknown_entity_type_dropped() {
        let query = parse("type:planet mars").unwrap();
        assert_eq!(query.text(), "mars");
        assert!(query.entity_filter().is_none());
    }

    #[test]
    fn test_explicit_date_range() {
        let query = parse("after:2024-01-01 before:2024-12-31 test query").unwrap();
        assert_eq!(query.text(), "test query");

        let range = query.date_range().unwrap();
        assert_eq!(range.start(), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.end(), Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_malformed_date_ignored_but_stripped() {
        let query = parse("after:2024-02-30 dentist").unwrap();
        assert_eq!(query.text(), "dentist");
        assert!(query.date_range().is_none());
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let err = parse("after:2024-12-31 before:2024-01-01 trip").unwrap_err();
        assert!(matches!(err, QueryError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_last_week() {
        let query = parse("gym sessions last week").unwrap();
        assert_eq!(query.text(), "gym sessions");
        let range = query.date_range().unwrap();
        assert_eq!(range.start(), Some(now() - Duration::days(7)));
        assert_eq!(range.end(), None);
    }

    #[test]
    fn test_last_week_keeps_explicit_end() {
        let query = parse("before:2024-06-20 notes last week").unwrap();
        assert_eq!(query.text(), "notes");
        let range = query.date_range().unwrap();
        assert_eq!(range.start(), Some(now() - Duration::days(7)));
        assert_eq!(range.end(), Some(Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_last_week_past_explicit_end_rejected() {
        let err = parse("before:2024-06-01 notes last week").unwrap_err();
        assert!(matches!(err, QueryError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_order_token_needs_whole_word() {
        let query = parse("holiday order:ascending").unwrap();
        assert_eq!(query.text(), "holiday order:ascending");
        assert_eq!(query.sort().order, SortOrder::Desc);
    }

    #[test]
    fn test_yesterday() {
        let query = parse("Yesterday meeting notes").unwrap();
        assert_eq!(query.text(), "meeting notes");
        let range = query.date_range().unwrap();
        assert_eq!(range.start(), Some(now() - Duration::days(1)));
        assert_eq!(range.end(), Some(now()));
    }

    #[test]
    fn test_relative_phrase_overrides_explicit_bounds() {
        let query = parse("before:2020-01-01 lunch yesterday").unwrap();
        assert_eq!(query.text(), "lunch");
        let range = query.date_range().unwrap();
        assert_eq!(range.end(), Some(now()));

        let query = parse("last week and yesterday plans").unwrap();
        assert_eq!(query.text(), "and plans");
        assert_eq!(query.date_range().unwrap().end(), None);
    }

    #[test]
    fn test_sort_tokens() {
        let query = parse("sort:date order:asc holiday").unwrap();
        assert_eq!(query.text(), "holiday");
        assert_eq!(query.sort().field, SortField::Date);
        assert_eq!(query.sort().order, SortOrder::Asc);
    }

    #[test]
    fn test_invalid_sort_field_ignored() {
        let query = parse("sort:size holiday").unwrap();
        assert_eq!(query.text(), "holiday");
        assert!(query.sort().is_default());
    }

    #[test]
    fn test_empty_query_rejected() {
        assert_eq!(parse(""), Err(QueryError::Empty));
        assert_eq!(parse("   \t "), Err(QueryError::Empty));
    }

    #[test]
    fn test_filters_only_rejected() {
        assert_eq!(parse("type:person sort:date"), Err(QueryError::EmptyAfterFilters));
        assert_eq!(parse("yesterday"), Err(QueryError::EmptyAfterFilters));
    }

    #[test]
    fn test_whitespace_collapsed_and_defaults_applied() {
        let query = parse("  morning    run\n\tnotes ").unwrap();
        assert_eq!(query.text(), "morning run notes");
        assert_eq!(query.user_id(), "user-1");
        assert!(query.include_raw_content());
        assert!(query.highlight_matches());
    }

    #[test]
    fn test_embedded_type_word_not_treated_as_token() {
        let query = parse("subtype:person notes").unwrap();
        assert_eq!(query.text(), "subtype:person notes");
        assert!(query.entity_filter().is_none());
    }
}
