//! Suggestion feed: suggested and saved profiles per entity

pub mod models;
pub mod repository;
pub mod service;

pub use models::{parse_fields, FeedProfile, SavedProfile};
pub use repository::SavedProfileRepository;
pub use service::SuggestionFeed;
