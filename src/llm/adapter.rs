//! LLM invocation adapter
//!
//! Turns a pair of entity sets into a validated [`SuggestionMatchList`].
//! Output that does not decode or validate is sent back to the model with
//! the validation error, up to `max_retries` extra attempts. Transport and
//! API errors are not retried. Every failure comes back as an
//! `INTERNAL_SERVER_ERROR` [`ErrorResponse`].

use super::prompt::build_prompt;
use super::traits::{ModelMessage, OutputSchema, StructuredModel};
use crate::entity::EntitySchema;
use crate::error::ErrorResponse;
use crate::suggestion::SuggestionMatchList;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Seam between the orchestrator and the model.
#[async_trait]
pub trait Matchmaker: Send + Sync {
    /// Propose matches between `selected` and `available`.
    async fn generate_response(
        &self,
        available: &[EntitySchema],
        selected: &[EntitySchema],
    ) -> Result<SuggestionMatchList, ErrorResponse>;
}

pub struct MatchmakingAdapter {
    model: Arc<dyn StructuredModel>,
    max_retries: u32,
    schema: OutputSchema,
}

impl MatchmakingAdapter {
    pub fn new(model: Arc<dyn StructuredModel>, max_retries: u32) -> Self {
        Self {
            model,
            max_retries,
            schema: OutputSchema {
                name: "SuggestionMatchList".to_string(),
                description: "Report the suggested matches between the entities".to_string(),
                schema: SuggestionMatchList::output_schema(),
            },
        }
    }

    fn parse(value: &Value) -> std::result::Result<SuggestionMatchList, String> {
        let list: SuggestionMatchList =
            serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        list.validate()?;
        Ok(list)
    }

    /// Call the model until its output validates or the retry budget runs out.
    async fn invoke(&self, prompt: String) -> Result<SuggestionMatchList> {
        let mut messages = vec![ModelMessage::user(prompt)];
        let attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let output = self
                .model
                .generate_structured(&messages, &self.schema)
                .await?;

            match Self::parse(&output) {
                Ok(list) => {
                    debug!(
                        attempt,
                        matches = list.len(),
                        model = self.model.model_name(),
                        "Model output validated"
                    );
                    return Ok(list);
                }
                Err(e) => {
                    warn!(attempt, attempts, "Model output failed validation: {}", e);
                    messages.push(ModelMessage::assistant(output.to_string()));
                    messages.push(ModelMessage::user(format!(
                        "The previous output failed validation: {}\n\
                         Return a corrected result that conforms to the {} schema.",
                        e, self.schema.name
                    )));
                    last_error = e;
                }
            }
        }

        anyhow::bail!(
            "Model output failed validation after {} attempts: {}",
            attempts,
            last_error
        )
    }
}

#[async_trait]
impl Matchmaker for MatchmakingAdapter {
    async fn generate_response(
        &self,
        available: &[EntitySchema],
        selected: &[EntitySchema],
    ) -> Result<SuggestionMatchList, ErrorResponse> {
        let prompt = build_prompt(available, selected);
        self.invoke(prompt).await.map_err(|e| {
            error!("Error generating response: {:#}", e);
            ErrorResponse::from(e)
        })
    }
}
