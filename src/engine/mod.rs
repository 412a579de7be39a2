//! Security engine for claude-shell-guard
//!
//! Runs the bypass check, the command validator and, when needed, the
//! confirmation controller for one command.

pub mod command;
pub mod matcher;
pub mod path;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::debug;

use crate::config::{BypassConfig, Policy};
use crate::confirm::Confirmer;
use crate::output::{Decision, ValidationResult};

/// Whether the command carries the bypass keyword
///
/// Plain substring test; an empty keyword never matches.
pub fn is_bypassed(command: &str, bypass: &BypassConfig) -> bool {
    bypass.enabled && !bypass.keyword.is_empty() && command.contains(bypass.keyword.as_str())
}

/// Result of the synchronous part of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// The bypass keyword was present; nothing was validated
    Bypassed,

    /// The validator's verdict
    Validated(ValidationResult),
}

/// The security engine, owning an immutable policy
#[derive(Debug, Clone)]
pub struct SecurityEngine {
    policy: Policy,
}

impl SecurityEngine {
    /// Create a new engine for the given policy
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Check the bypass keyword
    pub fn is_bypassed(&self, command: &str) -> bool {
        is_bypassed(command, &self.policy.bypass)
    }

    /// Validate a command without considering the bypass keyword
    pub fn validate(&self, command: &str, working_dir: &str) -> ValidationResult {
        command::validate(command, working_dir, &self.policy)
    }

    /// Bypass check followed by validation
    pub fn evaluate(&self, command: &str, working_dir: &str) -> Evaluation {
        if self.is_bypassed(command) {
            debug!("bypass keyword present, skipping validation");
            return Evaluation::Bypassed;
        }

        Evaluation::Validated(self.validate(command, working_dir))
    }

    /// Full decision for a command, asking the user when the verdict is confirm
    pub async fn decide<R, W>(
        &self,
        command: &str,
        working_dir: &str,
        confirmer: &mut Confirmer<R, W>,
    ) -> Decision
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let validation = match self.evaluate(command, working_dir) {
            Evaluation::Bypassed => return Decision::bypassed(),
            Evaluation::Validated(result) => result,
        };

        if !validation.is_confirm() {
            return Decision::validated(validation);
        }

        let outcome = confirmer.confirm(command, &validation).await;
        Decision {
            validation: Some(validation),
            result: outcome.result,
            confirmation: Some(outcome.state),
            user_response: outcome.response,
        }
    }
}
