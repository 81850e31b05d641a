//! Language model access for matchmaking
//!
//! - [`StructuredModel`]: provider trait (schema in, JSON object out)
//! - [`AnthropicProvider`]: Anthropic Messages API implementation
//! - [`build_prompt`]: deterministic matchmaking prompt
//! - [`MatchmakingAdapter`]: validation and retry on top of a provider

pub mod adapter;
pub mod anthropic;
pub mod prompt;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use adapter::{Matchmaker, MatchmakingAdapter};
pub use anthropic::AnthropicProvider;
pub use prompt::build_prompt;
pub use traits::{MessageRole, ModelMessage, OutputSchema, StructuredModel};
