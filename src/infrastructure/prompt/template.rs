//! Template-based prompt construction.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ChatMessage, ClassDescriptor, MethodDescriptor, PromptMessages, TestIdentity, ValidationFailure,
};
use crate::domain::ports::PromptConstructor;

const SYSTEM_PROMPT: &str = "You are an expert Java developer who writes JUnit 5 unit tests. \
Reply with one complete, compilable test class inside a single ```java code block. \
Do not use mocking frameworks that are not on the classpath.";

/// Diagnostics beyond this many lines are dropped from repair prompts.
const MAX_FEEDBACK_LINES: usize = 30;

/// Messages kept from the initial prompt (system + task).
const CONTEXT_MESSAGES: usize = 2;

/// Builds prompts from class and method descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePromptConstructor;

impl TemplatePromptConstructor {
    pub fn new() -> Self {
        Self
    }

    fn task(class: &ClassDescriptor, method: &MethodDescriptor, test: &TestIdentity) -> String {
        let mut text = format!(
            "Write a JUnit 5 test class named `{}` in package `{}` for the method `{}` of class `{}`.\n",
            test.test_class,
            if test.package_name.is_empty() { "<default>" } else { test.package_name.as_str() },
            method.signature,
            class.full_name(),
        );

        push_section(&mut text, "Imports of the class under test", &class.imports);
        push_section(&mut text, "Fields", &class.fields);
        push_section(&mut text, "Constructors", &class.constructor_sigs);

        if !method.source.trim().is_empty() {
            text.push_str("\nMethod under test:\n```java\n");
            text.push_str(method.source.trim_end());
            text.push_str("\n```\n");
        }
        push_section(&mut text, "Dependencies of the method", &method.dependencies);
        text
    }
}

fn push_section(text: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    text.push('\n');
    text.push_str(title);
    text.push_str(":\n");
    for line in lines {
        text.push_str("  ");
        text.push_str(line.trim());
        text.push('\n');
    }
}

#[async_trait]
impl PromptConstructor for TemplatePromptConstructor {
    async fn build_initial(
        &self,
        class: &ClassDescriptor,
        method: &MethodDescriptor,
        test: &TestIdentity,
    ) -> DomainResult<PromptMessages> {
        Ok(PromptMessages::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::task(class, method, test)),
        ]))
    }

    /// Keeps the initial context plus only the latest failed turn, so the
    /// prompt does not grow with every round.
    async fn build_with_feedback(
        &self,
        prior: &PromptMessages,
        candidate: &str,
        failure: &ValidationFailure,
    ) -> DomainResult<PromptMessages> {
        let mut messages =
            PromptMessages::new(prior.messages.iter().take(CONTEXT_MESSAGES).cloned().collect());
        messages.push(ChatMessage::assistant(format!("```java\n{}\n```", candidate.trim_end())));

        let feedback = failure.feedback();
        let mut lines: Vec<&str> = feedback.lines().collect();
        let dropped = lines.len().saturating_sub(MAX_FEEDBACK_LINES);
        lines.truncate(MAX_FEEDBACK_LINES);
        let mut request = lines.join("\n");
        if dropped > 0 {
            request.push_str(&format!("\n... ({dropped} more lines)"));
        }
        request.push_str("\n\nFix the test and reply with the complete corrected test class.");
        messages.push(ChatMessage::user(request));
        Ok(messages)
    }
}
