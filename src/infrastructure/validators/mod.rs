//! Candidate test validation.

pub mod command_validator;

pub use command_validator::CommandValidator;
