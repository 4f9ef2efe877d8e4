//! Output naming for generated tests.
//!
//! Every (class, method id, attempt) triple maps to its own test class, so
//! concurrent jobs never write the same file.

use crate::domain::models::{ClassDescriptor, MethodDescriptor, ProjectLayout, TestIdentity};

/// Test class name for one attempt: `<Class>_<methodId>_<attempt>Test`.
pub fn test_class_name(class: &ClassDescriptor, method: &MethodDescriptor, attempt: u32) -> String {
    format!("{}_{}_{}Test", class.class_name, method.method_id, attempt)
}

/// Prefix shared by every generated test of a class.
pub fn test_class_prefix(class: &ClassDescriptor) -> String {
    format!("{}_", class.class_name)
}

/// Suite class produced by the merger for a class.
pub fn suite_class_name(class: &ClassDescriptor) -> String {
    format!("{}Suite", class.class_name)
}

/// Resolve the test identity of one attempt against the project layout.
pub fn test_identity(
    layout: &ProjectLayout,
    class: &ClassDescriptor,
    method: &MethodDescriptor,
    attempt: u32,
) -> TestIdentity {
    let test_class = test_class_name(class, method, attempt);
    let package_dir = class.package_path();
    TestIdentity {
        package_name: class.package_name.clone(),
        test_file: layout
            .test_output
            .join(&package_dir)
            .join(format!("{test_class}.java")),
        staging_dir: layout.staging_dir.join(&package_dir).join(&test_class),
        test_class,
    }
}
