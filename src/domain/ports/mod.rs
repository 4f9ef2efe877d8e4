//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the collaborator interfaces the schedulers consume:
//! - DescriptorSource: parsed class/method descriptors
//! - PromptConstructor: chat prompt construction and token counting
//! - Generator: model call and code extraction
//! - Validator: compile and execute candidate tests
//! - TestClassMerger: per-class suite merge
//! - EligibilityFilter: class/method eligibility
//! - RecordStore: attempt record persistence
//! - Obfuscator: identifier obfuscation at the process boundary

pub mod descriptor_source;
pub mod eligibility;
pub mod generator;
pub mod merger;
pub mod obfuscator;
pub mod prompt_constructor;
pub mod record_store;
pub mod validator;

pub use descriptor_source::DescriptorSource;
pub use eligibility::EligibilityFilter;
pub use generator::Generator;
pub use merger::TestClassMerger;
pub use obfuscator::{NullObfuscator, Obfuscator};
pub use prompt_constructor::PromptConstructor;
pub use record_store::RecordStore;
pub use validator::Validator;
