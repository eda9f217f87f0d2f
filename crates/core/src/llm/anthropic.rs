use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::{prompt, AgentRunner, Provider};
use crate::tools::{self, ToolOutcome, ToolSet};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model round trips per symbol, counting the final answer.
pub const MAX_STEPS: usize = 5;
pub const TEMPERATURE: f32 = 0.1;

#[async_trait::async_trait]
trait MessagesApi: Send + Sync {
    async fn create_message(&self, req: &CreateMessageRequest)
        -> anyhow::Result<CreateMessageResponse>;
}

#[derive(Debug, Clone)]
struct HttpMessagesApi {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[async_trait::async_trait]
impl MessagesApi for HttpMessagesApi {
    async fn create_message(
        &self,
        req: &CreateMessageRequest,
    ) -> anyhow::Result<CreateMessageResponse> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: Provider::Anthropic,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        serde_json::from_str::<CreateMessageResponse>(&text).map_err(|err| {
            LlmDiagnosticsError {
                provider: Provider::Anthropic,
                stage: "decode",
                detail: err.to_string(),
                raw_response_json: serde_json::from_str::<Value>(&text).ok(),
                raw_output: Some(text),
            }
            .into()
        })
    }
}

/// Tool-calling analyst backed by the Anthropic Messages API.
pub struct AnthropicAgent {
    api: Box<dyn MessagesApi>,
    model: String,
    max_tokens: u32,
    tools: ToolSet,
}

impl AnthropicAgent {
    pub fn from_settings(settings: &Settings, tools: ToolSet) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(settings.anthropic_timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            api: Box::new(HttpMessagesApi {
                http,
                api_key,
                base_url: settings.anthropic_base_url.clone(),
            }),
            model: settings.anthropic_model.clone(),
            max_tokens: settings.anthropic_max_tokens,
            tools,
        })
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name(),
                description: tool.description(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    fn request(&self, messages: Vec<Message>) -> CreateMessageRequest {
        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            system: prompt::system_prompt(),
            messages,
            tools: self.tool_definitions(),
        }
    }

    fn response_text(res: &CreateMessageResponse) -> String {
        let mut out = String::new();
        for block in &res.content {
            if let ContentBlock::Text { text } = block {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(text);
            }
        }
        out
    }

    /// Assistant turn echoed back verbatim so tool results can refer to it.
    fn assistant_turn(res: &CreateMessageResponse) -> Message {
        let content = res
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(RequestBlock::Text { text: text.clone() }),
                ContentBlock::ToolUse { id, name, input } => Some(RequestBlock::ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect();
        Message {
            role: "assistant",
            content,
        }
    }

    async fn run_tool_calls(&self, symbol: &str, res: &CreateMessageResponse) -> Vec<RequestBlock> {
        let mut results = Vec::new();
        for block in &res.content {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let outcome = match tools::find(&self.tools, name) {
                Some(tool) => tool.call(input.clone()).await,
                None => ToolOutcome::failure(format!("Unknown tool: {name}")),
            };
            tracing::info!(%symbol, tool = %name, failed = outcome.is_failure(), "tool call finished");

            results.push(RequestBlock::ToolResult {
                tool_use_id: id.clone(),
                is_error: outcome.is_failure(),
                content: outcome.into_text(),
            });
        }
        results
    }
}

#[async_trait::async_trait]
impl AgentRunner for AnthropicAgent {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn run_agent(&self, symbol: &str) -> anyhow::Result<String> {
        let mut messages = vec![Message::user_text(prompt::user_prompt(symbol))];
        let mut output = String::new();

        for step in 1..=MAX_STEPS {
            let res = self.api.create_message(&self.request(messages.clone())).await?;

            let text = Self::response_text(&res);
            if !text.is_empty() {
                if !output.is_empty() {
                    output.push('\n');
                }
                output.push_str(&text);
            }

            let wants_tools = matches!(res.stop_reason.as_deref(), Some("tool_use"))
                && res
                    .content
                    .iter()
                    .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
            if !wants_tools {
                if matches!(res.stop_reason.as_deref(), Some("max_tokens")) {
                    tracing::warn!(%symbol, step, max_tokens = self.max_tokens, "model output hit max_tokens");
                }
                return Ok(output);
            }

            if step == MAX_STEPS {
                tracing::warn!(%symbol, max_steps = MAX_STEPS, "step limit reached with tool calls pending");
                break;
            }

            messages.push(Self::assistant_turn(&res));
            let results = self.run_tool_calls(symbol, &res).await;
            messages.push(Message {
                role: "user",
                content: results,
            });
        }

        Ok(output)
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<RequestBlock>,
}

impl Message {
    fn user_text(text: String) -> Self {
        Self {
            role: "user",
            content: vec![RequestBlock::Text { text }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        #[serde(default)]
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },

    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },

    #[serde(other)]
    Unknown,
}
