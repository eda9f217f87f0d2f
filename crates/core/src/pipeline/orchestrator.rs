use crate::config::Settings;
use crate::domain::analysis::{AnalysisRecord, RunResult};
use crate::llm::anthropic::AnthropicAgent;
use crate::llm::json::{extract_analysis, Extraction};
use crate::llm::AgentRunner;
use crate::market::HttpMarketData;
use crate::notify::{EmailNotifier, Notifier, NotifyOutcome};
use crate::pipeline::pacing::{FixedDelayPacer, Pacer};
use crate::search::ExaSearch;
use crate::tools::{StockDetailsTool, StockHistoryTool, Tool, WebSearchTool};
use anyhow::Context;
use std::sync::Arc;
use tracing::Instrument;

/// What to do when the reply has a fenced JSON block that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedBlockPolicy {
    /// Record an empty analysis and log a warning.
    #[default]
    Degrade,
    /// Fail the whole run.
    Abort,
}

pub struct Orchestrator {
    agent: Arc<dyn AgentRunner>,
    notifier: Arc<dyn Notifier>,
    pacer: Arc<dyn Pacer>,
    malformed: MalformedBlockPolicy,
}

impl Orchestrator {
    pub fn new(
        agent: Arc<dyn AgentRunner>,
        notifier: Arc<dyn Notifier>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            agent,
            notifier,
            pacer,
            malformed: MalformedBlockPolicy::default(),
        }
    }

    pub fn with_malformed_policy(mut self, policy: MalformedBlockPolicy) -> Self {
        self.malformed = policy;
        self
    }

    /// Wires the production stack: Anthropic agent with market data and Exa search
    /// tools, SMTP notifier, fixed delay between symbols.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.require_analysis_credentials()?;

        let market = Arc::new(HttpMarketData::from_settings(settings)?);
        let search = Arc::new(ExaSearch::from_settings(settings)?);
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(StockDetailsTool::new(market.clone())),
            Arc::new(StockHistoryTool::new(market)),
            Arc::new(WebSearchTool::new(search)),
        ];

        let agent = AnthropicAgent::from_settings(settings, tools)?;

        Ok(Self::new(
            Arc::new(agent),
            Arc::new(EmailNotifier::from_settings(settings)),
            Arc::new(FixedDelayPacer::new(settings.symbol_delay)),
        ))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Analyzes `symbols` one at a time, in order, then sends a single summary.
    ///
    /// A failed agent call aborts the remaining symbols and nothing is sent.
    pub async fn analyze(&self, symbols: &[String]) -> anyhow::Result<RunResult> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analysis_run", %run_id, symbols = symbols.len());
        self.analyze_inner(symbols).instrument(span).await
    }

    async fn analyze_inner(&self, symbols: &[String]) -> anyhow::Result<RunResult> {
        tracing::info!(provider = ?self.agent.provider(), "analysis run started");

        let mut results = Vec::with_capacity(symbols.len());
        for (idx, symbol) in symbols.iter().enumerate() {
            if idx != 0 {
                self.pacer.pause().await;
            }

            let reply = self
                .agent
                .run_agent(symbol)
                .await
                .with_context(|| format!("analysis failed for {symbol}"))?;
            let record = self.record_from_reply(symbol, &reply)?;

            tracing::info!(
                idx,
                %symbol,
                empty = record.is_empty(),
                "symbol analyzed"
            );
            results.push(record);
        }

        let outcome = self
            .notifier
            .notify(&results)
            .await
            .with_context(|| format!("{} notification failed", self.notifier.name()))?;

        let message = match outcome {
            NotifyOutcome::Sent => "Analysis completed and email sent".to_string(),
            NotifyOutcome::Skipped { reason } => {
                format!("Analysis completed; email skipped ({reason})")
            }
        };
        tracing::info!(records = results.len(), %message, "analysis run finished");

        Ok(RunResult {
            message,
            results,
            timestamp: chrono::Utc::now(),
        })
    }

    fn record_from_reply(&self, symbol: &str, reply: &str) -> anyhow::Result<AnalysisRecord> {
        match extract_analysis(reply) {
            Extraction::Parsed(record) => Ok(record),
            Extraction::Missing => {
                tracing::warn!(%symbol, "no fenced JSON block in model reply");
                Ok(AnalysisRecord::empty())
            }
            Extraction::Malformed { error, block } => match self.malformed {
                MalformedBlockPolicy::Degrade => {
                    tracing::warn!(%symbol, %error, "malformed JSON block in model reply");
                    Ok(AnalysisRecord::empty())
                }
                MalformedBlockPolicy::Abort => Err(anyhow::anyhow!(
                    "malformed JSON block for {symbol}: {error}: {block}"
                )),
            },
        }
    }
}
