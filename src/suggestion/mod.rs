//! Suggestion edges: model output types and persistence

pub mod models;
pub mod repository;

pub use models::*;
pub use repository::SuggestionRepository;
