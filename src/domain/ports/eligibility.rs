//! Eligibility filter port.

use crate::domain::models::{ClassDescriptor, MethodDescriptor};

/// Decides which classes and methods qualify for test generation.
pub trait EligibilityFilter: Send + Sync {
    fn is_class_eligible(&self, class: &ClassDescriptor) -> bool;

    fn is_method_eligible(&self, method: &MethodDescriptor) -> bool;
}
