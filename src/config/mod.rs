//! Configuration module for sheet processing
//!
//! Provides types, discovery and parsing for `boomsheets.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
