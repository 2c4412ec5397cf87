//! Operations behind the GraphQL API.
//!
//! Each operation takes the store and the caller's user id, validates its
//! input into model types, and runs one store operation (or, for exports,
//! a provider round-trip bracketed by store reads and writes).

pub mod highlights;
pub mod integrations;
pub mod labels;
pub mod library_items;
pub mod users;
