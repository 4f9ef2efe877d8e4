//! Domain layer for the unitsmith generation pipeline
//!
//! This module contains the immutable descriptors, per-attempt state and the
//! collaborator ports the schedulers are written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
