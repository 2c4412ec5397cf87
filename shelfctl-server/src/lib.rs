//! shelfctl-server: read-it-later GraphQL backend
//!
//! Saves pages into a per-user library, organizes them with ordered labels
//! and highlights, and exports them to Readwise and Notion.
//!
//! Layers, outermost first: [`http`] (axum) -> [`graphql`] (async-graphql
//! resolvers) -> [`services`] -> [`db::Store`] (Postgres or in-memory).

pub mod db;
pub mod error;
pub mod graphql;
pub mod http;
pub mod integrations;
pub mod models;
pub mod services;
pub mod state;

pub use db::{MemoryStore, PgStore, Store};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use http::{build_router, run_server, ServerConfig, ServerError};
pub use integrations::IntegrationRegistry;
pub use state::AppState;
