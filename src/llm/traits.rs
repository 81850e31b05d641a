//! StructuredModel trait definition
//!
//! Abstract interface for a language model that answers with a JSON object
//! conforming to a caller-supplied schema. Same pattern as `ItemStore`:
//! async trait + Send + Sync for `Arc<dyn StructuredModel>` usage.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of the conversation sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ModelMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Output contract handed to the model
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    /// JSON schema of the expected object
    pub schema: Value,
}

/// Abstract interface for structured-output generation.
///
/// # Implementations
///
/// - [`AnthropicProvider`](super::AnthropicProvider): Anthropic Messages API,
///   forcing a single tool call whose input is the structured object
/// - `MockStructuredModel` (tests): replays scripted outputs
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Run the conversation and return the model's structured object.
    ///
    /// The returned value is not validated against `schema`; callers decide
    /// what to do with non-conforming output.
    ///
    /// # Errors
    ///
    /// Transport failures, API errors and responses carrying no structured
    /// object.
    async fn generate_structured(
        &self,
        messages: &[ModelMessage],
        schema: &OutputSchema,
    ) -> Result<Value>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
