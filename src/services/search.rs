use crate::config::Config;
use crate::error::Result;
use crate::search::{
    suggest, Pagination, QueryParser, ScoringEngine, SearchPipeline, SearchResponse,
    StructuredQuery,
};
use crate::sources::{CandidateSource, EntrySource};
use crate::thought::Thought;

/// Parses, fetches and ranks search requests against one source
pub struct SearchService<S> {
    source: S,
    parser: QueryParser,
    pipeline: SearchPipeline,
    default_page_size: u32,
    max_suggestions: usize,
}

impl<S> SearchService<S> {
    pub fn new(source: S, pipeline: SearchPipeline) -> Result<Self> {
        Ok(Self {
            source,
            parser: QueryParser::new()?,
            pipeline,
            default_page_size: Pagination::default().page_size(),
            max_suggestions: 5,
        })
    }

    /// Build a service using the configured weights and limits
    pub fn from_config(source: S, config: &Config) -> Result<Self> {
        let pipeline = SearchPipeline::new(ScoringEngine::new(config.scoring_weights()?));
        Ok(Self {
            default_page_size: config.search.default_page_size,
            max_suggestions: config.search.max_suggestions,
            ..Self::new(source, pipeline)?
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn pipeline(&self) -> &SearchPipeline {
        &self.pipeline
    }

    /// Parse `raw` for `user_id` and apply the requested page
    pub fn prepare(
        &self,
        raw: &str,
        user_id: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<StructuredQuery> {
        let pagination = Pagination::new(page, page_size.unwrap_or(self.default_page_size))?;
        Ok(self.parser.parse(raw, user_id)?.with_pagination(pagination))
    }
}

impl<S: CandidateSource> SearchService<S> {
    /// Search with raw query-language text
    pub async fn search(
        &self,
        raw: &str,
        user_id: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<SearchResponse> {
        let query = self.prepare(raw, user_id, page, page_size)?;
        self.execute(&query).await
    }

    /// Search with an already structured query
    pub async fn execute(&self, query: &StructuredQuery) -> Result<SearchResponse> {
        let candidates = self.source.fetch_candidates(query).await?;
        let response = self.pipeline.run(query, candidates)?;

        tracing::info!(
            "Search '{}' returned {} of {} results in {}ms",
            response.query_text,
            response.results.len(),
            response.total_count,
            response.search_time_ms
        );

        Ok(response)
    }
}

impl<S: EntrySource> SearchService<S> {
    /// Completions for `partial` from the user's own thoughts
    pub async fn suggest(
        &self,
        partial: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let entries = self.source.fetch_entries(user_id).await?;
        let thoughts: Vec<Thought> = entries.into_iter().map(|entry| entry.thought).collect();
        let suggestions = suggest(partial, &thoughts, limit.unwrap_or(self.max_suggestions));

        tracing::info!("{} suggestions for '{}'", suggestions.len(), partial);
        Ok(suggestions)
    }
}

impl<S: CandidateSource + EntrySource> SearchService<S> {
    /// Search, attaching completions when nothing matched
    pub async fn search_with_suggestions(
        &self,
        raw: &str,
        user_id: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<SearchResponse> {
        let mut response = self.search(raw, user_id, page, page_size).await?;
        if response.total_count == 0 {
            response.suggestions = self.suggest(&response.query_text, user_id, None).await?;
        }
        Ok(response)
    }
}
