//! HTTP API for the matchmaker

pub mod handlers;
pub mod routes;

pub use routes::create_router;
