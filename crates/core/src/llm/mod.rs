pub mod anthropic;
pub mod error;
pub mod json;
pub mod prompt;

#[derive(Debug, Clone)]
pub enum Provider {
    Anthropic,
}

/// One agentic generation for a symbol: the model may call its bound tools before it
/// answers. Returns every piece of text the model produced, concatenated.
#[async_trait::async_trait]
pub trait AgentRunner: Send + Sync {
    fn provider(&self) -> Provider;

    async fn run_agent(&self, symbol: &str) -> anyhow::Result<String>;
}
