//! Anthropic Messages API provider
//!
//! Structured output is obtained by declaring one tool whose `input_schema`
//! is the requested schema and forcing the model to call it
//! (`tool_choice = {"type": "tool"}`); the tool input is the result.
//!
//! Configuration comes from [`LlmConfig`](crate::LlmConfig):
//! - `LLM_URL` (default: `https://api.anthropic.com/v1/messages`)
//! - `LLM_MODEL` (default: `claude-3-5-haiku-20241022`)
//! - `LLM_API_KEY` / `ANTHROPIC_API_KEY`
//! - `LLM_MAX_TOKENS` (default: `4096`)

use super::traits::{ModelMessage, OutputSchema, StructuredModel};
use crate::LlmConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP provider for the Anthropic Messages API.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ModelMessage],
    tools: Vec<ToolDefinition<'a>>,
    tool_choice: ToolChoice<'a>,
}

#[derive(Debug, Serialize)]
struct ToolDefinition<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { name: String, input: Value },
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl AnthropicProvider {
    pub fn new(
        url: String,
        model: String,
        api_key: Option<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            model,
            api_key,
            max_tokens,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        if config.api_key.is_none() {
            tracing::warn!("No LLM API key configured; requests will likely be rejected");
        }
        Self::new(
            config.url.clone(),
            config.model.clone(),
            config.api_key.clone(),
            config.max_tokens,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl StructuredModel for AnthropicProvider {
    async fn generate_structured(
        &self,
        messages: &[ModelMessage],
        schema: &OutputSchema,
    ) -> Result<Value> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages,
            tools: vec![ToolDefinition {
                name: &schema.name,
                description: &schema.description,
                input_schema: &schema.schema,
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: &schema.name,
            },
        };

        let mut req = self
            .client
            .post(&self.url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        if let Some(ref key) = self.api_key {
            req = req.header("x-api-key", key);
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("Failed to connect to model API at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if let Ok(ApiErrorResponse {
                error: Some(detail),
            }) = serde_json::from_str::<ApiErrorResponse>(&text)
            {
                anyhow::bail!(
                    "Model API error ({} {}): {}",
                    status.as_u16(),
                    detail.kind.unwrap_or_default(),
                    detail.message
                );
            }
            anyhow::bail!("Model API returned {}: {}", status.as_u16(), text);
        }

        let resp: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse model API response")?;

        let stop_reason = resp.stop_reason.unwrap_or_default();
        let mut text_parts = Vec::new();
        for block in resp.content {
            match block {
                ContentBlock::ToolUse { name, input } if name == schema.name => {
                    tracing::debug!(model = %self.model, %stop_reason, "Received structured output");
                    return Ok(input);
                }
                ContentBlock::Text { text } => text_parts.push(text),
                _ => {}
            }
        }

        anyhow::bail!(
            "Model response contained no '{}' tool call (stop_reason: {}): {}",
            schema.name,
            stop_reason,
            text_parts.join(" ")
        )
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
