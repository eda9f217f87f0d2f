pub mod exa;
pub mod normalize;

use crate::domain::search::SearchQuery;
use serde::{Deserialize, Serialize};

pub use exa::ExaSearch;

/// Hit as returned by the search backend, before cleaning and dedup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSearchHit {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// One search-with-contents call for a single query.
    async fn search(&self, query: &SearchQuery) -> anyhow::Result<Vec<RawSearchHit>>;
}
