//! HTTP server layer
//!
//! Axum server with:
//! - GraphQL endpoint with bearer API key identity
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, HttpState, ServerConfig, ServerError};
