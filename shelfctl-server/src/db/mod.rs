//! Database layer - the [`Store`] seam and its two implementations
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default) - no Arc<Mutex<Connection>>
//! - Nested data is batch loaded - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations
//!
//! [`MemoryStore`] mirrors the Postgres semantics for `serve --ephemeral`
//! and for tests.

pub mod memory;
pub mod migrations;
pub mod pg;
pub mod pool;
pub mod repos;
pub mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use pool::create_pool;
pub use repos::*;
pub use store::{Store, StoreError, StoreResult};
