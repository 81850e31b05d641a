//! Profile entities: typed models, reconstruction and store access

pub mod builder;
pub mod models;
pub mod repository;

pub use builder::{reconstruct_entities, EntityAccumulator};
pub use models::*;
pub use repository::EntityRepository;
