//! Pulls Java test source out of a free-form model response.

use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*([A-Za-z]*)[ \t]*\r?\n(.*?)```").expect("fence pattern is valid")
});

/// Extracts candidate test code from model output.
///
/// Fenced blocks win over bare text. Among fenced blocks the first one that
/// declares a class is preferred, then the first `java` block. Bare text is
/// accepted when it declares a class. Anything else yields an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeExtractor;

impl CodeExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, response: &str) -> String {
        let blocks: Vec<(&str, &str)> = FENCE
            .captures_iter(response)
            .filter_map(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
            .collect();

        let chosen = blocks
            .iter()
            .find(|(_, body)| declares_class(body))
            .or_else(|| blocks.iter().find(|(lang, _)| lang.eq_ignore_ascii_case("java")))
            .map(|(_, body)| *body);

        if let Some(body) = chosen {
            return body.trim().to_string();
        }
        if blocks.is_empty() && declares_class(response) {
            return strip_preamble(response).trim().to_string();
        }
        String::new()
    }
}

fn declares_class(code: &str) -> bool {
    code.contains("class ") && code.contains('{')
}

/// Drop prose before the first `package`, `import` or class line.
fn strip_preamble(text: &str) -> &str {
    let start = text
        .match_indices('\n')
        .map(|(i, _)| i + 1)
        .chain(std::iter::once(0))
        .filter(|&i| {
            let line = text[i..].trim_start();
            line.starts_with("package ")
                || line.starts_with("import ")
                || line.starts_with("public class ")
                || line.starts_with("class ")
        })
        .min();
    start.map_or(text, |i| &text[i..])
}
