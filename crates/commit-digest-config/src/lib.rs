//! Configuration management for commit-digest.
//!
//! This crate loads and validates the file listing the repositories to
//! report on. Both TOML and JSON documents are accepted.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use schema::{AuthScheme, Config, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, RepositoryConfig};
