//! Deterministic textual repairs applied to every fresh candidate before it
//! is validated.
//!
//! These fixes never consult the model: the declared test class is renamed
//! to match its target file, the package declaration is corrected, and the
//! imports of the class under test plus the JUnit basics are reconciled.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::models::{ClassDescriptor, TestIdentity};

static CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:public\s+)?(?:final\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)")
        .expect("class declaration pattern is valid")
});

static PACKAGE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*package\s+[\w.]+\s*;[ \t]*\r?\n?").expect("package pattern is valid")
});

static IMPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*import\s+(static\s+)?([\w.*]+)\s*;").expect("import pattern is valid")
});

const JUNIT_TEST_IMPORT: &str = "import org.junit.jupiter.api.Test;";
const JUNIT_ASSERTIONS_IMPORT: &str = "import static org.junit.jupiter.api.Assertions.*;";

/// Apply every rule-based fix in order.
pub fn rule_based_repair(code: &str, test: &TestIdentity, class: &ClassDescriptor) -> String {
    let code = change_test_name(code, &test.test_class);
    let code = repair_package(&code, &test.package_name);
    repair_imports(&code, &class.imports)
}

/// Rename the first declared top-level class (and its references) to `test_name`.
pub fn change_test_name(code: &str, test_name: &str) -> String {
    let Some(declared) = CLASS_DECL
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
    else {
        return code.to_string();
    };
    if declared == test_name {
        return code.to_string();
    }
    let reference = Regex::new(&format!(r"\b{}\b", regex::escape(&declared)))
        .expect("escaped identifier is a valid pattern");
    reference.replace_all(code, test_name).into_owned()
}

/// Make the package declaration match `package` (removing it for the
/// default package).
pub fn repair_package(code: &str, package: &str) -> String {
    let stripped = PACKAGE_DECL.replace(code, "").into_owned();
    if package.is_empty() {
        return stripped;
    }
    format!("package {package};\n\n{}", stripped.trim_start())
}

/// Add the imports of the class under test and the JUnit basics when missing.
pub fn repair_imports(code: &str, class_imports: &[String]) -> String {
    let present: Vec<String> = IMPORT_DECL
        .captures_iter(code)
        .map(|caps| normalize_import(caps.get(0).map_or("", |m| m.as_str())))
        .collect();

    let mut missing: Vec<String> = Vec::new();
    let mut add = |import: &str| {
        let normalized = normalize_import(import);
        if !present.contains(&normalized) && !missing.iter().any(|m| normalize_import(m) == normalized) {
            missing.push(import.trim().to_string());
        }
    };

    for import in class_imports {
        let import = import.trim();
        if import.starts_with("import ") {
            add(import);
        }
    }
    if code.contains("@Test") && !present.iter().any(|p| p.contains("org.junit")) {
        add(JUNIT_TEST_IMPORT);
    }
    if code.contains("assert") && !present.iter().any(|p| p.contains("Assertions")) {
        add(JUNIT_ASSERTIONS_IMPORT);
    }

    if missing.is_empty() {
        return code.to_string();
    }

    let block = missing.join("\n");
    match PACKAGE_DECL.find(code) {
        Some(package) => {
            let (head, tail) = code.split_at(package.end());
            format!(
                "{}\n\n{}\n\n{}",
                head.trim_end(),
                block,
                tail.trim_start_matches(['\r', '\n'])
            )
        }
        None => format!("{block}\n{code}"),
    }
}

fn normalize_import(import: &str) -> String {
    import.split_whitespace().collect::<Vec<_>>().join(" ")
}
