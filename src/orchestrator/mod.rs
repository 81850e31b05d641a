//! Orchestrator module for matchmaking runs

pub mod runner;

pub use runner::{select_targets, SuggestionOrchestrator};
