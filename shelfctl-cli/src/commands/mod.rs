//! Command implementations for the shelfctl CLI

pub mod save;
pub mod serve;
pub mod user;
