//! Prompt construction adapters.

pub mod template;

pub use template::TemplatePromptConstructor;
