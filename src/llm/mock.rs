//! Mock model implementations for tests
//!
//! - [`MockStructuredModel`] replays scripted raw outputs and records every
//!   conversation it receives.
//! - [`MockMatchmaker`] sits at the adapter seam: it replays scripted match
//!   lists, or in covering mode pairs every selected entity with a partner.
//!   The half-first covering mode leaves every other target uncovered on the
//!   first call so the coverage round has a gap to fill.

use super::adapter::Matchmaker;
use super::traits::{ModelMessage, OutputSchema, StructuredModel};
use crate::entity::{EntitySchema, EntityType};
use crate::error::ErrorResponse;
use crate::suggestion::{MatchedEntity, SuggestionMatch, SuggestionMatchList};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockStructuredModel {
    responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    calls: Mutex<Vec<Vec<ModelMessage>>>,
}

impl MockStructuredModel {
    pub fn new(responses: Vec<std::result::Result<Value, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ModelMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl StructuredModel for MockStructuredModel {
    async fn generate_structured(
        &self,
        messages: &[ModelMessage],
        _schema: &OutputSchema,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("mock model has no scripted response left")),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Record of one `generate_response` call: ids and types of the selected entities
#[derive(Debug, Clone, PartialEq)]
pub struct MatchmakerCall {
    pub selected_ids: Vec<String>,
    pub selected_types: Vec<EntityType>,
    pub available_count: usize,
}

enum Mode {
    Scripted,
    Covering,
    CoveringHalfFirst,
}

pub struct MockMatchmaker {
    script: Mutex<VecDeque<Result<SuggestionMatchList, ErrorResponse>>>,
    mode: Mode,
    calls: Mutex<Vec<MatchmakerCall>>,
}

impl MockMatchmaker {
    /// Replay `script` in order, one entry per call.
    pub fn scripted(script: Vec<Result<SuggestionMatchList, ErrorResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            mode: Mode::Scripted,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call returns one match per selected entity.
    pub fn covering() -> Self {
        Self::with_mode(Mode::Covering)
    }

    /// The first call covers only the even-indexed selected entities, paired
    /// among themselves; later calls cover everything selected.
    pub fn covering_half_first() -> Self {
        Self::with_mode(Mode::CoveringHalfFirst)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<MatchmakerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Pair each of `selected` with the first of `partners` that is not itself.
    fn cover(partners: &[EntitySchema], selected: &[EntitySchema]) -> SuggestionMatchList {
        let matched = |e: &EntitySchema| MatchedEntity {
            entity_id: e.id().to_string(),
            entity_type: e.entity_type(),
            name: e.name().unwrap_or_default().to_string(),
        };
        let matches = selected
            .iter()
            .filter_map(|s| {
                let partner = partners
                    .iter()
                    .find(|a| (a.entity_type(), a.id()) != (s.entity_type(), s.id()))?;
                Some(SuggestionMatch {
                    match_pair: vec![matched(s), matched(partner)],
                    certainty: 0.75,
                    rationale: format!("{} complements {}", s.id(), partner.id()),
                })
            })
            .collect();
        SuggestionMatchList::new(matches)
    }
}

#[async_trait]
impl Matchmaker for MockMatchmaker {
    async fn generate_response(
        &self,
        available: &[EntitySchema],
        selected: &[EntitySchema],
    ) -> Result<SuggestionMatchList, ErrorResponse> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(MatchmakerCall {
                selected_ids: selected.iter().map(|e| e.id().to_string()).collect(),
                selected_types: selected.iter().map(EntitySchema::entity_type).collect(),
                available_count: available.len(),
            });
            calls.len() - 1
        };

        match self.mode {
            Mode::Covering => return Ok(Self::cover(available, selected)),
            Mode::CoveringHalfFirst if call_index == 0 => {
                let half: Vec<EntitySchema> = selected.iter().step_by(2).cloned().collect();
                return Ok(Self::cover(&half, &half));
            }
            Mode::CoveringHalfFirst => return Ok(Self::cover(available, selected)),
            Mode::Scripted => {}
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ErrorResponse::internal("mock matchmaker script exhausted")))
    }
}
