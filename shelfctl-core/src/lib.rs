//! shelfctl-core: configuration and error types shared by the server,
//! client and CLI crates.

pub mod config;
pub mod error;

pub use config::{ClientSection, IntegrationsConfig, ServerSection, ShelfConfig};
pub use error::{Result, ShelfError};
