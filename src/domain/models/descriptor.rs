//! Class and method descriptors.
//!
//! Descriptors are produced once by the parser collaborator and are
//! read-only afterwards; every scheduler level shares them behind `Arc`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parsed information about one class under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassDescriptor {
    /// Package name, empty for the default package
    #[serde(default)]
    pub package_name: String,

    /// Simple class name
    pub class_name: String,

    /// Method signature -> stable method id
    #[serde(default)]
    pub method_sigs: BTreeMap<String, String>,

    /// Import statements of the source file, verbatim
    #[serde(default)]
    pub imports: Vec<String>,

    /// Field declarations, used as prompt context
    #[serde(default)]
    pub fields: Vec<String>,

    /// Constructor signatures, used as prompt context
    #[serde(default)]
    pub constructor_sigs: Vec<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default)]
    pub is_interface: bool,

    /// Source file the class was parsed from, relative to the project root
    #[serde(default)]
    pub source_file: Option<PathBuf>,
}

const fn default_true() -> bool {
    true
}

impl ClassDescriptor {
    /// Create a descriptor with no methods.
    pub fn new(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            class_name: class_name.into(),
            method_sigs: BTreeMap::new(),
            imports: Vec::new(),
            fields: Vec::new(),
            constructor_sigs: Vec::new(),
            is_public: true,
            is_abstract: false,
            is_interface: false,
            source_file: None,
        }
    }

    /// Builder-style helper to register a method signature with its id.
    pub fn with_method(mut self, signature: impl Into<String>, id: impl Into<String>) -> Self {
        self.method_sigs.insert(signature.into(), id.into());
        self
    }

    /// Package-qualified class name.
    pub fn full_name(&self) -> String {
        if self.package_name.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.class_name)
        }
    }

    /// Package as a relative directory path (`a.b.c` -> `a/b/c`).
    pub fn package_path(&self) -> PathBuf {
        package_to_path(&self.package_name)
    }

    /// Signature whose id matches `id` exactly.
    pub fn signature_for_id(&self, id: &str) -> Option<&str> {
        self.method_sigs
            .iter()
            .find(|(_, method_id)| method_id.as_str() == id)
            .map(|(sig, _)| sig.as_str())
    }

    /// All signatures whose method name equals `name` (every overload).
    pub fn signatures_named(&self, name: &str) -> Vec<&str> {
        self.method_sigs
            .keys()
            .filter(|sig| method_name_of(sig) == name)
            .map(String::as_str)
            .collect()
    }
}

/// Parsed information about one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MethodDescriptor {
    pub method_name: String,

    /// Full signature, e.g. `add(int, int)`
    pub signature: String,

    /// Stable id assigned by the parser
    pub method_id: String,

    /// Method source including its body
    #[serde(default)]
    pub source: String,

    /// Signatures of methods this method calls, used as dependency context
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,

    #[serde(default)]
    pub is_constructor: bool,

    /// Trivial getter or setter
    #[serde(default)]
    pub is_get_set: bool,

    /// Whether the parser found a body (false for abstract/native methods)
    #[serde(default = "default_true")]
    pub has_body: bool,
}

impl MethodDescriptor {
    /// Create a public method descriptor with a body.
    pub fn new(signature: impl Into<String>, method_id: impl Into<String>) -> Self {
        let signature = signature.into();
        Self {
            method_name: method_name_of(&signature).to_string(),
            signature,
            method_id: method_id.into(),
            source: String::new(),
            dependencies: Vec::new(),
            is_public: true,
            is_constructor: false,
            is_get_set: false,
            has_body: true,
        }
    }
}

/// Method name portion of a signature (`add(int, int)` -> `add`).
pub fn method_name_of(signature: &str) -> &str {
    signature.split('(').next().unwrap_or(signature).trim()
}

/// Convert a dotted package name into a relative path.
pub fn package_to_path(package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Whether a class name is already package-qualified.
pub fn is_full_name(name: &str) -> bool {
    name.contains('.')
}
