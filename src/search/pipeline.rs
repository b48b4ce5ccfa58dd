//! Filtering, scoring, ranking and pagination of retrieved candidates

use crate::entities::Entity;
use crate::search::{
    highlight_matches, Pagination, RankingEngine, RankingError, RawCandidate, ScoredCandidate,
    ScoringEngine, SearchResponse, StructuredQuery,
};
use crate::thought::Thought;
use ahash::{HashMap, HashMapExt};
use std::time::Instant;
use uuid::Uuid;

/// Turns the raw candidates for one query into a page of ranked results
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPipeline {
    scoring: ScoringEngine,
    ranking: RankingEngine,
}

impl SearchPipeline {
    pub fn new(scoring: ScoringEngine) -> Self {
        Self {
            scoring,
            ranking: RankingEngine::new(),
        }
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    /// Run the full pipeline for `query`
    pub fn run(
        &self,
        query: &StructuredQuery,
        candidates: Vec<RawCandidate>,
    ) -> Result<SearchResponse, RankingError> {
        let started = Instant::now();
        let received = candidates.len();

        // Step 1: Deduplicate by thought id, keeping the best semantic match
        let candidates = deduplicate(candidates);

        // Step 2: Apply user, date and entity filters
        let candidates: Vec<RawCandidate> = candidates
            .into_iter()
            .filter(|c| admits(query, &c.thought))
            .collect();

        // Step 3: Score and annotate
        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|c| self.score_candidate(query, c))
            .collect();

        // Step 4: Order and assign ranks
        let ranked = self.ranking.rank_by(scored, query.sort())?;
        let total_count = ranked.len();

        // Step 5: Cut the requested page
        let results = paginate(ranked, query.pagination());

        tracing::debug!(
            query = %query,
            received,
            matched = total_count,
            returned = results.len(),
            "Search pipeline complete"
        );

        Ok(SearchResponse {
            results,
            total_count,
            page: query.pagination().page(),
            page_size: query.pagination().page_size(),
            query_text: query.text().to_string(),
            search_time_ms: started.elapsed().as_millis() as u64,
            suggestions: Vec::new(),
        })
    }

    fn score_candidate(&self, query: &StructuredQuery, candidate: RawCandidate) -> ScoredCandidate {
        let score = self.scoring.score(
            candidate.semantic_similarity,
            candidate.keyword_match,
            candidate.recency_score,
            candidate.confidence_score,
        );

        let matches = if query.highlight_matches() {
            highlight_matches(query.text(), &candidate.thought.content)
        } else {
            Vec::new()
        };
        let matching_entities = matching_entities(query, &candidate.thought);

        ScoredCandidate::new(candidate.thought, score)
            .with_matches(matches)
            .with_matching_entities(matching_entities)
    }
}

fn deduplicate(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut positions: HashMap<Uuid, usize> = HashMap::new();
    let mut unique: Vec<RawCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match positions.get(&candidate.thought.id) {
            Some(&position) => {
                if candidate.semantic_similarity > unique[position].semantic_similarity {
                    unique[position] = candidate;
                }
            }
            None => {
                positions.insert(candidate.thought.id, unique.len());
                unique.push(candidate);
            }
        }
    }

    unique
}

fn admits(query: &StructuredQuery, thought: &Thought) -> bool {
    if thought.user_id != query.user_id() {
        return false;
    }

    if let Some(range) = query.date_range() {
        if !range.contains(thought.timestamp) {
            return false;
        }
    }

    if let Some(filter) = query.entity_filter() {
        if !filter.entity_types.is_empty()
            && !thought
                .entities
                .iter()
                .any(|e| filter.entity_types.contains(&e.entity_type))
        {
            return false;
        }
        if !filter.entity_values.is_empty()
            && !thought
                .entities
                .iter()
                .any(|e| filter.entity_values.contains(&e.value))
        {
            return false;
        }
    }

    true
}

/// Entities passing the entity filter whose value mentions a query word
fn matching_entities(query: &StructuredQuery, thought: &Thought) -> Vec<Entity> {
    let words: Vec<String> = query
        .text()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    thought
        .entities
        .iter()
        .filter(|entity| match query.entity_filter() {
            Some(filter) => {
                (filter.entity_types.is_empty() || filter.entity_types.contains(&entity.entity_type))
                    && (filter.entity_values.is_empty()
                        || filter.entity_values.contains(&entity.value))
            }
            None => true,
        })
        .filter(|entity| {
            let value = entity.value.to_lowercase();
            words.iter().any(|word| value.contains(word.as_str()))
        })
        .cloned()
        .collect()
}

fn paginate(ranked: Vec<ScoredCandidate>, pagination: Pagination) -> Vec<ScoredCandidate> {
    ranked
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.page_size() as usize)
        .collect()
}
