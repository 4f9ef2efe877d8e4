//! Default eligibility rules.

use crate::domain::models::{ClassDescriptor, MethodDescriptor};
use crate::domain::ports::EligibilityFilter;

/// Concrete public classes and public methods with a body, excluding
/// constructors and plain accessors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEligibilityFilter;

impl DefaultEligibilityFilter {
    pub fn new() -> Self {
        Self
    }
}

impl EligibilityFilter for DefaultEligibilityFilter {
    fn is_class_eligible(&self, class: &ClassDescriptor) -> bool {
        class.is_public && !class.is_abstract && !class.is_interface
    }

    fn is_method_eligible(&self, method: &MethodDescriptor) -> bool {
        method.is_public && !method.is_constructor && !method.is_get_set && method.has_body
    }
}
