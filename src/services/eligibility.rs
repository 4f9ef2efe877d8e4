//! Eligible-method selection and job counting.
//!
//! The class scheduler and the project-wide total both go through
//! [`select_methods`], so the counted total always covers what is actually
//! scheduled.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ClassDescriptor, MethodDescriptor};
use crate::domain::ports::{DescriptorSource, EligibilityFilter};

/// Methods of one class split by eligibility.
#[derive(Debug, Default)]
pub struct MethodSelection {
    /// Eligible methods, in signature order
    pub eligible: Vec<Arc<MethodDescriptor>>,
    /// Signatures rejected by the filter
    pub skipped: Vec<String>,
    /// Signatures with no parsed info
    pub missing: Vec<String>,
}

/// Split the methods of a class by eligibility. A method whose parsed info
/// cannot be loaded is reported as missing.
pub async fn select_methods(
    source: &dyn DescriptorSource,
    filter: &dyn EligibilityFilter,
    class: &ClassDescriptor,
) -> DomainResult<MethodSelection> {
    let mut selection = MethodSelection::default();
    for signature in class.method_sigs.keys() {
        match source.method(class, signature).await {
            Ok(None) => selection.missing.push(signature.clone()),
            Ok(Some(method)) if filter.is_method_eligible(&method) => selection.eligible.push(method),
            Ok(Some(_)) => selection.skipped.push(signature.clone()),
            Err(e) => {
                tracing::warn!(
                    class = %class.full_name(),
                    method = %signature,
                    error = %e,
                    "Failed to load method info"
                );
                selection.missing.push(signature.clone());
            }
        }
    }
    Ok(selection)
}

/// Count the eligible methods across `classes`, skipping classes that are
/// not parsed, fail to load or are not eligible.
pub async fn count_eligible_methods(
    source: &dyn DescriptorSource,
    filter: &dyn EligibilityFilter,
    classes: &[String],
) -> DomainResult<usize> {
    let mut total = 0;
    for full_name in classes {
        let class = match source.class(full_name).await {
            Ok(Some(class)) => class,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(class = %full_name, error = %e, "Failed to load class info, not counted");
                continue;
            }
        };
        if !filter.is_class_eligible(&class) {
            continue;
        }
        total += select_methods(source, filter, &class).await?.eligible.len();
    }
    Ok(total)
}
