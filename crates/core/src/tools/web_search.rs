use super::{parse_input, Tool, ToolOutcome};
use crate::domain::search::{DomainFilter, SearchQuery, SearchResult, Topic};
use crate::search::normalize::{dedup_results, normalize_hit};
use crate::search::SearchProvider;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "web_search";
const DEFAULT_MAX_RESULTS: u32 = 5;
const MAX_RESULTS_CAP: u32 = 10;

#[derive(Debug, Deserialize)]
struct Input {
    queries: Vec<String>,
    #[serde(default)]
    max_results: Vec<u32>,
    #[serde(default)]
    topics: Vec<Topic>,
    #[serde(default)]
    include_domains: Option<Vec<String>>,
    #[serde(default)]
    exclude_domains: Option<Vec<String>>,
}

impl Input {
    /// Zips the parallel arrays; missing caps and topics fall back to defaults.
    fn into_queries(self) -> Vec<SearchQuery> {
        let domains = DomainFilter::from_lists(self.include_domains, self.exclude_domains);
        self.queries
            .into_iter()
            .enumerate()
            .filter(|(_, q)| !q.trim().is_empty())
            .map(|(i, query)| SearchQuery {
                query,
                max_results: self
                    .max_results
                    .get(i)
                    .copied()
                    .unwrap_or(DEFAULT_MAX_RESULTS)
                    .clamp(1, MAX_RESULTS_CAP),
                topic: self.topics.get(i).copied().unwrap_or_default(),
                domains: domains.clone(),
            })
            .collect()
    }
}

pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    /// Runs every query concurrently. A failing query contributes nothing; the rest
    /// are unaffected.
    pub async fn search_all(&self, queries: &[SearchQuery]) -> Vec<SearchResult> {
        let calls = queries.iter().map(|q| async move {
            match self.provider.search(q).await {
                Ok(hits) => hits,
                Err(err) => {
                    tracing::warn!(query = %q.query, error = %err, "search query failed");
                    Vec::new()
                }
            }
        });

        let results = join_all(calls)
            .await
            .into_iter()
            .flatten()
            .map(normalize_hit)
            .collect();

        dedup_results(results)
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Search the web for recent news and analysis. Send all queries in one call; \
         queries, max_results and topics are parallel arrays."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["queries"],
            "properties": {
                "queries": {"type": "array", "items": {"type": "string"}},
                "max_results": {"type": "array", "items": {"type": "integer", "minimum": 1, "maximum": MAX_RESULTS_CAP}},
                "topics": {"type": "array", "items": {"type": "string", "enum": ["news", "finance", "general"]}},
                "include_domains": {"type": "array", "items": {"type": "string"}},
                "exclude_domains": {"type": "array", "items": {"type": "string"}}
            }
        })
    }

    async fn call(&self, input: Value) -> ToolOutcome {
        let input = match parse_input::<Input>(NAME, input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let queries = input.into_queries();
        let results = self.search_all(&queries).await;
        tracing::debug!(queries = queries.len(), results = results.len(), "web search done");

        match serde_json::to_string(&results) {
            Ok(text) => ToolOutcome::Success(text),
            Err(err) => ToolOutcome::failure(format!("Failed to encode search results: {err}")),
        }
    }
}
