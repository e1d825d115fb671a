//! # Scout OpenSearch
//!
//! Configuration, dependency wiring and an admin CLI for the Scout OpenSearch
//! engine.
//!
//! ## Modules
//!
//! - [`config`]: Settings from the environment and dependency initialization
//! - [`commands`]: Index admin and search commands
//! - [`errors`]: Error types for the binary

pub mod commands;
pub mod config;
pub mod errors;

pub use config::{Dependencies, Settings};
pub use errors::AppError;
