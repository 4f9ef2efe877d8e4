//! Identifier obfuscation port.
//!
//! Applied to prompts before they leave the process and reversed on the
//! candidates that come back.

use crate::domain::models::PromptMessages;

/// Reversible rewriting of project identifiers.
pub trait Obfuscator: Send + Sync {
    fn obfuscate(&self, messages: PromptMessages) -> PromptMessages;

    fn deobfuscate(&self, code: &str) -> String;
}

/// Identity obfuscator, used when obfuscation is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObfuscator;

impl NullObfuscator {
    pub fn new() -> Self {
        Self
    }
}

impl Obfuscator for NullObfuscator {
    fn obfuscate(&self, messages: PromptMessages) -> PromptMessages {
        messages
    }

    fn deobfuscate(&self, code: &str) -> String {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ChatMessage;

    #[test]
    fn null_obfuscator_is_identity() {
        let ob = NullObfuscator::new();
        let prompt = PromptMessages::new(vec![ChatMessage::user("class Foo {}")]);
        assert_eq!(ob.obfuscate(prompt.clone()), prompt);
        assert_eq!(ob.deobfuscate("class Foo {}"), "class Foo {}");
    }
}
