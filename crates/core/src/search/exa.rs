use super::{RawSearchHit, SearchProvider};
use crate::config::Settings;
use crate::domain::search::{DomainFilter, SearchQuery, Topic};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exa `/search` with page contents inlined in the response.
#[derive(Debug, Clone)]
pub struct ExaSearch {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ExaSearch {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_search_api_key()?.to_string();
        Self::new(settings.search_base_url.clone(), api_key, settings.search_timeout)
    }

    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build search http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    #[serde(rename = "type")]
    search_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_domains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_domains: Option<&'a [String]>,
    contents: Contents,
}

#[derive(Debug, Serialize)]
struct Contents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawSearchHit>,
}

fn category(topic: Topic) -> Option<&'static str> {
    match topic {
        Topic::News => Some("news"),
        Topic::Finance => Some("financial report"),
        Topic::General => None,
    }
}

fn build_request(query: &SearchQuery) -> SearchRequest<'_> {
    let (include_domains, exclude_domains) = match &query.domains {
        DomainFilter::None => (None, None),
        DomainFilter::Include(domains) => (Some(domains.as_slice()), None),
        DomainFilter::Exclude(domains) => (None, Some(domains.as_slice())),
    };

    SearchRequest {
        query: &query.query,
        num_results: query.max_results,
        search_type: "auto",
        category: category(query.topic),
        include_domains,
        exclude_domains,
        contents: Contents { text: true },
    }
}

#[async_trait::async_trait]
impl SearchProvider for ExaSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawSearchHit>> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&build_request(query))
            .send()
            .await
            .context("search request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read search response")?;
        if !status.is_success() {
            anyhow::bail!("search HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<SearchResponse>(&text)
            .with_context(|| format!("search response is not valid JSON: {text}"))?;
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::serve_fixed;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn exa_against(status: StatusCode, body: &'static str) -> ExaSearch {
        let base_url = serve_fixed(status, body).await;
        ExaSearch::new(base_url, "k".to_string(), Duration::from_secs(5)).unwrap()
    }

    fn query(domains: DomainFilter, topic: Topic) -> SearchQuery {
        SearchQuery {
            query: "TCS earnings".to_string(),
            max_results: 3,
            topic,
            domains,
        }
    }

    #[test]
    fn request_carries_only_the_include_list() {
        let q = query(
            DomainFilter::from_lists(
                Some(vec!["moneycontrol.com".to_string()]),
                Some(vec!["reddit.com".to_string()]),
            ),
            Topic::News,
        );
        let body = serde_json::to_value(build_request(&q)).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "TCS earnings",
                "numResults": 3,
                "type": "auto",
                "category": "news",
                "includeDomains": ["moneycontrol.com"],
                "contents": {"text": true}
            })
        );
    }

    #[test]
    fn general_topic_sends_no_category() {
        let q = query(DomainFilter::Exclude(vec!["x.com".to_string()]), Topic::General);
        let body = serde_json::to_value(build_request(&q)).unwrap();
        assert!(body.get("category").is_none());
        assert_eq!(body["excludeDomains"], json!(["x.com"]));
    }

    #[test]
    fn response_hits_tolerate_missing_fields() {
        let parsed: SearchResponse = serde_json::from_value(json!({
            "results": [
                {"url": "https://a.com/1", "title": "A", "text": "body", "publishedDate": "2026-10-18", "author": "Staff"},
                {"url": "https://b.com/2"}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].author.as_deref(), Some("Staff"));
        assert_eq!(parsed.results[1].title, None);
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let exa = exa_against(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let q = query(DomainFilter::None, Topic::News);
        let err = exa.search(&q).await.unwrap_err();
        assert!(err.to_string().contains("500"), "{err:#}");
    }

    #[tokio::test]
    async fn non_json_success_body_is_an_error() {
        let exa = exa_against(StatusCode::OK, "<html>captcha</html>").await;
        let q = query(DomainFilter::None, Topic::News);
        let err = exa.search(&q).await.unwrap_err();
        assert!(format!("{err:#}").contains("not valid JSON"));
    }

    #[tokio::test]
    async fn parses_hits_from_a_live_response() {
        let exa = exa_against(
            StatusCode::OK,
            r#"{"results":[{"url":"https://a.com/1","title":"A"}]}"#,
        )
        .await;
        let q = query(DomainFilter::None, Topic::General);
        let hits = exa.search(&q).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.com/1");
    }

    #[test]
    fn from_settings_uses_configured_base_url() {
        let exa = ExaSearch::from_settings(&Settings {
            search_api_key: Some("k".to_string()),
            search_base_url: "http://127.0.0.1:4010".to_string(),
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(exa.base_url, "http://127.0.0.1:4010");
    }
}
