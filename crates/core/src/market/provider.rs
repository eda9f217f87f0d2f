use crate::config::Settings;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

const DETAILS_PATH: &str = "/stock";
const HISTORY_PATH: &str = "/historical_data";

#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    async fn stock_details(&self, stock_name: &str) -> Result<Value>;

    async fn stock_history(&self, stock_name: &str, period: &str) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpMarketData {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMarketData {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.require_market_data_api_key()?.to_string();
        Self::new(
            settings.market_data_base_url.clone(),
            api_key,
            settings.market_data_timeout,
        )
    }

    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_str(&self.api_key)?);
        Ok(headers)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let res = self
            .http
            .get(self.url(path))
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("market data response is not valid JSON: {text}"))
    }
}

#[async_trait::async_trait]
impl MarketData for HttpMarketData {
    async fn stock_details(&self, stock_name: &str) -> Result<Value> {
        self.get_json(DETAILS_PATH, &[("name", stock_name)]).await
    }

    async fn stock_history(&self, stock_name: &str, period: &str) -> Result<Value> {
        self.get_json(
            HISTORY_PATH,
            &[
                ("stock_name", stock_name),
                ("period", period),
                ("filter", "price"),
            ],
        )
        .await
    }
}
