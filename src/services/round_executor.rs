//! Round executor: one generation attempt for one method.
//!
//! ```text
//! Preparing -> Generating -> Validating -> Success
//!                               |  ^
//!                               v  |
//!                            Repairing        (until the round limit: Exhausted)
//! ```
//!
//! `Preparing` and `Generating` run once. Each validation consumes one round;
//! a round limit of `R` means at most `R` validator calls and `R - 1` model
//! repairs. Every run ends with exactly one persisted [`AttemptRecord`].

use std::sync::Arc;

use chrono::Utc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AttemptContext, AttemptOutcome, AttemptRecord, AttemptState, ClassDescriptor,
    MethodDescriptor, PromptMessages, ValidationFailure,
};
use crate::services::context::GenerationContext;
use crate::services::naming;
use crate::services::repair::rule_based_repair;

/// Drives one attempt through the round state machine.
pub struct RoundExecutor {
    ctx: GenerationContext,
    class: Arc<ClassDescriptor>,
    method: Arc<MethodDescriptor>,
}

impl RoundExecutor {
    /// Executor for attempts at testing `method` of `class`.
    pub fn new(
        ctx: GenerationContext,
        class: Arc<ClassDescriptor>,
        method: Arc<MethodDescriptor>,
    ) -> Self {
        Self { ctx, class, method }
    }

    /// Run attempt `attempt` (one-based) to a terminal state and persist
    /// its record.
    ///
    /// Collaborator errors never escape: they end the attempt as
    /// `Exhausted` with the best-known candidate.
    pub async fn run(&self, attempt: u32) -> AttemptRecord {
        let started_at = Utc::now();
        let identity = naming::test_identity(&self.ctx.layout, &self.class, &self.method, attempt);
        let mut actx = AttemptContext::new(attempt, identity);

        let outcome = match self.drive(&mut actx).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    class = %self.class.full_name(),
                    method = %self.method.signature,
                    attempt,
                    round = actx.round(),
                    error = %err,
                    "attempt failed unexpectedly"
                );
                AttemptOutcome::Exhausted { rounds: actx.validations }
            }
        };

        actx.transition(match outcome {
            AttemptOutcome::Success { .. } => AttemptState::Success,
            AttemptOutcome::Exhausted { .. } => AttemptState::Exhausted,
            AttemptOutcome::Aborted { .. } => AttemptState::Aborted,
        });

        let record = AttemptRecord::from_context(
            &self.class.full_name(),
            &self.method.signature,
            &self.method.method_id,
            &actx,
            outcome,
            started_at,
        )
        .with_run_id(self.ctx.run_id);

        if let Err(err) = self.ctx.ports.records.persist(&record).await {
            tracing::error!(
                test = %record.test_name,
                error = %err,
                "failed to persist attempt record"
            );
        }

        record
    }

    async fn drive(&self, actx: &mut AttemptContext) -> DomainResult<AttemptOutcome> {
        let max_rounds = self.ctx.config.max_rounds;
        let method_name = &self.method.method_name;

        // Preparing
        actx.transition(AttemptState::Preparing);
        let messages = self
            .ctx
            .ports
            .prompts
            .build_initial(&self.class, &self.method, &actx.identity)
            .await?;
        if let Some(abort) = self.check_prompt(&messages) {
            return Ok(abort);
        }
        actx.messages = messages;

        // Generating
        actx.transition(AttemptState::Generating);
        let candidate = self.generate(&actx.messages).await?;
        if candidate.trim().is_empty() {
            tracing::warn!(
                class = %self.class.full_name(),
                method = %method_name,
                attempt = actx.attempt,
                "Test for method < {method_name} > extract code failed"
            );
            return Ok(AttemptOutcome::Aborted {
                reason: "generator returned no extractable code".to_string(),
            });
        }
        actx.candidate = rule_based_repair(&candidate, &actx.identity, &self.class);

        loop {
            // Validating
            actx.transition(AttemptState::Validating);
            let Some(failure) = self.validate(actx).await? else {
                tracing::info!(
                    test = %actx.identity.full_name(),
                    attempt = actx.attempt,
                    rounds = actx.validations,
                    "Test for method < {method_name} > generated successfully"
                );
                return Ok(AttemptOutcome::Success { rounds: actx.validations });
            };
            tracing::debug!(
                test = %actx.identity.full_name(),
                round = actx.round(),
                kind = ?failure.kind,
                messages = failure.messages.len(),
                "validation failed"
            );
            actx.last_failure = Some(failure);

            if actx.validations >= max_rounds {
                tracing::info!(
                    test = %actx.identity.full_name(),
                    attempt = actx.attempt,
                    rounds = actx.validations,
                    "Test for method < {method_name} > exhausted its rounds"
                );
                return Ok(AttemptOutcome::Exhausted { rounds: actx.validations });
            }

            // Repairing: the deterministic fixes were already applied to this
            // candidate, so go straight to a model repair.
            actx.transition(AttemptState::Repairing);
            let round = actx.next_round();
            let Some(failure) = actx.last_failure.as_ref() else {
                return Ok(AttemptOutcome::Exhausted { rounds: actx.validations });
            };
            let messages = self
                .ctx
                .ports
                .prompts
                .build_with_feedback(&actx.messages, &actx.candidate, failure)
                .await?;
            if let Some(abort) = self.check_prompt(&messages) {
                return Ok(abort);
            }
            actx.messages = messages;

            let repaired = self.generate(&actx.messages).await?;
            if repaired.trim().is_empty() {
                tracing::warn!(
                    test = %actx.identity.full_name(),
                    round,
                    "repair for method < {method_name} > extract code failed"
                );
                return Ok(AttemptOutcome::Exhausted { rounds: actx.validations });
            }
            actx.candidate = rule_based_repair(&repaired, &actx.identity, &self.class);
        }
    }

    /// `Some(outcome)` when the prompt cannot be sent.
    fn check_prompt(&self, messages: &PromptMessages) -> Option<AttemptOutcome> {
        if messages.is_empty() {
            tracing::error!(
                class = %self.class.full_name(),
                method = %self.method.method_name,
                "prompt construction produced no messages"
            );
            return Some(AttemptOutcome::Aborted { reason: "empty prompt".to_string() });
        }
        let tokens = self.ctx.ports.prompts.token_count(messages);
        let max = self.ctx.config.max_prompt_tokens;
        if tokens > max {
            tracing::error!(
                class = %self.class.full_name(),
                method = %self.method.method_name,
                tokens,
                max,
                "Exceed max prompt tokens: {} Skipped.",
                self.method.method_name
            );
            return Some(AttemptOutcome::Aborted {
                reason: format!("prompt has {tokens} tokens, budget is {max}"),
            });
        }
        None
    }

    async fn generate(&self, messages: &PromptMessages) -> DomainResult<String> {
        let outgoing = self.ctx.ports.obfuscator.obfuscate(messages.clone());
        let code = self.ctx.ports.generator.generate(&outgoing).await?;
        Ok(self.ctx.ports.obfuscator.deobfuscate(&code))
    }

    /// Compile then execute the current candidate. `None` means it passed.
    async fn validate(&self, actx: &mut AttemptContext) -> DomainResult<Option<ValidationFailure>> {
        actx.validations += 1;
        let round = actx.round();
        let validator = &self.ctx.ports.validator;

        let compiled = validator.compile(&actx.candidate, &actx.identity).await?;
        if !compiled.success {
            return Ok(Some(ValidationFailure::from_compile(round, &compiled)));
        }

        let execution = validator.execute(&actx.identity).await?;
        if execution.passed && execution.failed_count == 0 {
            Ok(None)
        } else {
            Ok(Some(ValidationFailure::from_execution(round, &execution)))
        }
    }
}
