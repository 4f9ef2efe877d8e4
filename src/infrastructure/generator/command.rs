//! Generator that shells out to a model CLI.
//!
//! The rendered prompt is written to the child's stdin and the code is
//! extracted from its stdout. The child is killed when the call is dropped
//! (timeout or cancellation).

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GeneratorConfig, PromptMessages};
use crate::domain::ports::Generator;
use crate::infrastructure::generator::extractor::CodeExtractor;

/// Model call through an external command such as `claude --print`.
pub struct CommandGenerator {
    config: GeneratorConfig,
    extractor: CodeExtractor,
}

impl CommandGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config, extractor: CodeExtractor::new() }
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Raw model response for a prompt.
    async fn ask(&self, messages: &PromptMessages) -> DomainResult<String> {
        let mut child = self.build_command().spawn().map_err(|e| {
            DomainError::Generation(format!("failed to spawn {}: {e}", self.config.program))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DomainError::Generation("failed to get stdin handle".to_string()))?;
        let prompt = messages.render();
        let writer = tokio::spawn(async move {
            let written = stdin.write_all(prompt.as_bytes()).await;
            drop(stdin);
            written
        });

        let limit = Duration::from_secs(self.config.timeout_secs);
        let output = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                DomainError::Generation(format!(
                    "{} timed out after {}s",
                    self.config.program, self.config.timeout_secs
                ))
            })?
            .map_err(|e| DomainError::Generation(format!("failed to wait for model: {e}")))?;

        if let Ok(Err(e)) = writer.await {
            tracing::debug!(error = %e, "model closed stdin before reading the whole prompt");
        }

        if !output.status.success() {
            return Err(DomainError::Generation(format!(
                "{} exited with code {:?}. Stderr: {}",
                self.config.program,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn generate(&self, messages: &PromptMessages) -> DomainResult<String> {
        let response = self.ask(messages).await?;
        let code = self.extractor.extract(&response);
        tracing::debug!(
            program = %self.config.program,
            response_len = response.len(),
            code_len = code.len(),
            "model responded"
        );
        Ok(code)
    }
}
