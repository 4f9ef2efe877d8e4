//! Parse output access.

pub mod json_store;

pub use json_store::JsonDescriptorStore;
