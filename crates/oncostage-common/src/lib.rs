//! oncostage-common — Shared error type and configuration used across all oncostage crates.

pub mod config;
pub mod error;

pub use config::{Config, HistologyConfig, OutputConfig, OutputFormat, ResourceConfig};
pub use error::{OncostageError, Result};
