//! Single-table item store: trait, Neo4j client and models

pub mod client;
mod impl_item_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::ItemStore;

#[cfg(test)]
pub(crate) mod mock;
