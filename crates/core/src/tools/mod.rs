//! Tools the analysis agent can call while it works on a symbol.

pub mod stock_details;
pub mod stock_history;
pub mod web_search;

use serde_json::Value;
use std::sync::Arc;

pub use stock_details::StockDetailsTool;
pub use stock_history::StockHistoryTool;
pub use web_search::WebSearchTool;

/// Result of one tool invocation as handed back to the model.
///
/// A failure never aborts the agent call; the model receives the reason as text and
/// carries on with whatever else it has.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(String),
    Failure { reason: String },
}

impl ToolOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Success(text) => text,
            Self::Failure { reason } => reason,
        }
    }
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema of the tool input, as advertised to the model.
    fn input_schema(&self) -> Value;

    async fn call(&self, input: Value) -> ToolOutcome;
}

pub type ToolSet = Vec<Arc<dyn Tool>>;

pub fn find<'a>(tools: &'a [Arc<dyn Tool>], name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|t| t.name() == name)
}

/// Deserializes tool input, turning a schema mismatch into a failure the model can read.
pub(crate) fn parse_input<T: serde::de::DeserializeOwned>(
    tool: &str,
    input: Value,
) -> Result<T, ToolOutcome> {
    serde_json::from_value(input).map_err(|err| {
        tracing::warn!(tool, error = %err, "invalid tool input");
        ToolOutcome::failure(format!("Invalid input for {tool}: {err}"))
    })
}
