//! Infrastructure layer module
//!
//! Adapters satisfying the domain ports, plus the ambient stack:
//! - Configuration management (figment)
//! - Logging (tracing)
//! - Parse output access, prompt construction
//! - External generator and validator processes
//! - Suite merging and attempt record persistence

pub mod config;
pub mod filter;
pub mod generator;
pub mod logging;
pub mod merger;
pub mod parser;
pub mod prompt;
pub mod records;
pub mod setup;
pub mod validators;
