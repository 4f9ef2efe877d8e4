//! Model-backed generator adapter.

pub mod command;
pub mod extractor;

pub use command::CommandGenerator;
pub use extractor::CodeExtractor;
