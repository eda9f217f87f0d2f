use super::{parse_input, Tool, ToolOutcome};
use crate::market::MarketData;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "get_stock_details";

#[derive(Debug, Deserialize)]
struct Input {
    stock_name: String,
}

pub struct StockDetailsTool {
    market: Arc<dyn MarketData>,
}

impl StockDetailsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

pub(crate) fn failure_notice(kind: &str, stock_name: &str) -> String {
    format!("Failed to fetch {kind} for {stock_name}")
}

#[async_trait::async_trait]
impl Tool for StockDetailsTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Get current details for a listed stock: price, fundamentals, financials and recent news."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["stock_name"],
            "properties": {
                "stock_name": {"type": "string", "description": "Ticker or company name, e.g. TCS"}
            }
        })
    }

    async fn call(&self, input: Value) -> ToolOutcome {
        let input = match parse_input::<Input>(NAME, input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };

        match self.market.stock_details(&input.stock_name).await {
            Ok(body) => ToolOutcome::Success(body.to_string()),
            Err(err) => {
                tracing::warn!(stock = %input.stock_name, error = %err, "stock details fetch failed");
                ToolOutcome::failure(failure_notice("stock details", &input.stock_name))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeMarket;
    use super::*;
    use crate::config::Settings;
    use crate::market::HttpMarketData;
    use crate::test_http::serve_fixed;
    use axum::http::StatusCode;

    async fn tool_against(status: StatusCode, body: &'static str) -> StockDetailsTool {
        let market = HttpMarketData::from_settings(&Settings {
            market_data_api_key: Some("k".to_string()),
            market_data_base_url: serve_fixed(status, body).await,
            ..Settings::default()
        })
        .unwrap();
        StockDetailsTool::new(Arc::new(market))
    }

    #[tokio::test]
    async fn returns_raw_json_text_on_success() {
        let market = Arc::new(FakeMarket::ok(json!({"companyName": "Tata Consultancy Services"})));
        let tool = StockDetailsTool::new(market.clone());

        let outcome = tool.call(json!({"stock_name": "TCS"})).await;
        assert_eq!(
            outcome,
            ToolOutcome::Success(r#"{"companyName":"Tata Consultancy Services"}"#.to_string())
        );
        assert_eq!(market.calls.lock().unwrap().as_slice(), ["details:TCS"]);
    }

    #[tokio::test]
    async fn swallows_upstream_failure_into_notice() {
        let tool = StockDetailsTool::new(Arc::new(FakeMarket::failing()));

        let outcome = tool.call(json!({"stock_name": "TCS"})).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Failed to fetch stock details for TCS")
        );
    }

    #[tokio::test]
    async fn provider_outage_becomes_the_failure_notice() {
        let tool = tool_against(StatusCode::SERVICE_UNAVAILABLE, "upstream down").await;
        let outcome = tool.call(json!({"stock_name": "INFY"})).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Failed to fetch stock details for INFY")
        );
    }

    #[tokio::test]
    async fn non_json_reply_becomes_the_failure_notice() {
        let tool = tool_against(StatusCode::OK, "<html>maintenance</html>").await;
        let outcome = tool.call(json!({"stock_name": "INFY"})).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Failed to fetch stock details for INFY")
        );
    }
}
