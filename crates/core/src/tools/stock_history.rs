use super::stock_details::failure_notice;
use super::{parse_input, Tool, ToolOutcome};
use crate::market::MarketData;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "get_stock_history";
const DEFAULT_PERIOD: &str = "1yr";

#[derive(Debug, Deserialize)]
struct Input {
    stock_name: String,
    #[serde(default)]
    period: Option<String>,
}

pub struct StockHistoryTool {
    market: Arc<dyn MarketData>,
}

impl StockHistoryTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait::async_trait]
impl Tool for StockHistoryTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Get historical daily prices for a listed stock over a period."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["stock_name"],
            "properties": {
                "stock_name": {"type": "string", "description": "Ticker or company name, e.g. TCS"},
                "period": {
                    "type": "string",
                    "enum": ["1m", "6m", "1yr", "3yr", "5yr", "10yr", "max"],
                    "description": "History window, defaults to 1yr"
                }
            }
        })
    }

    async fn call(&self, input: Value) -> ToolOutcome {
        let input = match parse_input::<Input>(NAME, input) {
            Ok(input) => input,
            Err(outcome) => return outcome,
        };
        let period = input
            .period
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PERIOD);

        match self.market.stock_history(&input.stock_name, period).await {
            Ok(body) => ToolOutcome::Success(body.to_string()),
            Err(err) => {
                tracing::warn!(stock = %input.stock_name, period, error = %err, "stock history fetch failed");
                ToolOutcome::failure(failure_notice("stock history", &input.stock_name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::stock_details::fakes::FakeMarket;
    use super::*;

    #[tokio::test]
    async fn defaults_period_to_one_year() {
        let market = Arc::new(FakeMarket::ok(json!({"datasets": []})));
        let tool = StockHistoryTool::new(market.clone());

        let outcome = tool.call(json!({"stock_name": "INFY"})).await;
        assert!(!outcome.is_failure());
        assert_eq!(market.calls.lock().unwrap().as_slice(), ["history:INFY:1yr"]);
    }

    #[tokio::test]
    async fn passes_requested_period_through() {
        let market = Arc::new(FakeMarket::ok(json!({})));
        let tool = StockHistoryTool::new(market.clone());

        tool.call(json!({"stock_name": "INFY", "period": "6m"})).await;
        assert_eq!(market.calls.lock().unwrap().as_slice(), ["history:INFY:6m"]);
    }

    #[tokio::test]
    async fn swallows_upstream_failure_into_notice() {
        let tool = StockHistoryTool::new(Arc::new(FakeMarket::failing()));

        let outcome = tool.call(json!({"stock_name": "INFY", "period": "1yr"})).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Failed to fetch stock history for INFY")
        );
    }
}
