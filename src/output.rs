//! Decision types and hook reporting for claude-shell-guard
//!
//! A `ValidationResult` is what the engine concludes about one command. A
//! `Decision` adds the bypass and confirmation context, and a `HookReport`
//! turns that into the exit code and diagnostics Claude Code reads.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

use crate::confirm::ConfirmationState;

/// Exit code that lets the tool call proceed
pub const EXIT_ALLOW: i32 = 0;

/// Exit code that stops the tool call (Claude Code treats 2 as a blocking hook)
pub const EXIT_BLOCK: i32 = 2;

/// What should happen to the command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Block,
    Confirm,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::Block => "block",
            Action::Confirm => "confirm",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    /// Used by the audit trail when no command could be identified
    Unknown,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's verdict for a single command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub action: Action,
    pub reason: String,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
}

impl ValidationResult {
    /// Allow with low risk
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Allow,
            reason: reason.into(),
            risk_level: RiskLevel::Low,
            category: None,
            matched_pattern: None,
        }
    }

    /// Block with high risk
    pub fn block(
        reason: impl Into<String>,
        category: Option<&str>,
        matched_pattern: Option<&str>,
    ) -> Self {
        Self {
            action: Action::Block,
            reason: reason.into(),
            risk_level: RiskLevel::High,
            category: category.map(String::from),
            matched_pattern: matched_pattern.map(String::from),
        }
    }

    /// Require confirmation, medium risk
    pub fn confirm(
        reason: impl Into<String>,
        category: Option<&str>,
        matched_pattern: Option<&str>,
    ) -> Self {
        Self {
            action: Action::Confirm,
            reason: reason.into(),
            risk_level: RiskLevel::Medium,
            category: category.map(String::from),
            matched_pattern: matched_pattern.map(String::from),
        }
    }

    /// Fail-closed verdict for internal errors
    pub fn system_error() -> Self {
        Self::block("Security system error", None, None)
    }

    pub fn is_allow(&self) -> bool {
        self.action == Action::Allow
    }

    pub fn is_block(&self) -> bool {
        self.action == Action::Block
    }

    pub fn is_confirm(&self) -> bool {
        self.action == Action::Confirm
    }
}

/// Final outcome for a command after bypass and confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Validator verdict; `None` when the bypass keyword skipped validation
    pub validation: Option<ValidationResult>,

    /// The result that decides the exit code
    pub result: ValidationResult,

    /// Terminal confirmation state, if the controller ran
    pub confirmation: Option<ConfirmationState>,

    /// Raw user answer, kept for the audit record
    pub user_response: Option<String>,
}

impl Decision {
    /// Decision for a command carrying the bypass keyword
    pub fn bypassed() -> Self {
        Self {
            validation: None,
            result: ValidationResult::allow("Bypass keyword detected"),
            confirmation: None,
            user_response: None,
        }
    }

    /// Decision taken directly from the validator
    pub fn validated(result: ValidationResult) -> Self {
        Self {
            validation: Some(result.clone()),
            result,
            confirmation: None,
            user_response: None,
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.validation.is_none()
    }

    pub fn is_allow(&self) -> bool {
        self.result.is_allow()
    }

    pub fn exit_code(&self) -> i32 {
        if self.result.is_block() {
            EXIT_BLOCK
        } else {
            EXIT_ALLOW
        }
    }
}

/// Exit code and diagnostics for one hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl HookReport {
    /// Allow the tool call
    pub fn allow(reason: &str) -> Self {
        Self {
            exit_code: EXIT_ALLOW,
            stdout: vec![format!("Security Guard: ALLOW - {}", reason)],
            stderr: Vec::new(),
        }
    }

    /// Block the tool call with operator diagnostics
    pub fn block(result: &ValidationResult, command: &str) -> Self {
        let mut stderr = vec![format!("🛑 BLOCKED: {}", result.reason)];

        if result.risk_level == RiskLevel::High {
            stderr.push(format!("⚠️  HIGH RISK COMMAND BLOCKED: {}", command));
        } else {
            stderr.push(format!("Command: {}", command));
        }
        if let Some(category) = &result.category {
            stderr.push(format!("📂 Category: {}", category));
        }
        if let Some(pattern) = &result.matched_pattern {
            stderr.push(format!("🔍 Matched pattern: {}", pattern));
        }

        Self {
            exit_code: EXIT_BLOCK,
            stdout: Vec::new(),
            stderr,
        }
    }

    /// Create a report from a final decision
    pub fn from_decision(decision: &Decision, command: &str) -> Self {
        match decision.result.action {
            Action::Block => Self::block(&decision.result, command),
            // A confirm never reaches here unresolved, but treat it as allow-with-review
            Action::Allow | Action::Confirm => Self::allow(&decision.result.reason),
        }
    }

    /// Fail-closed report for internal errors
    pub fn system_error(detail: &str) -> Self {
        let mut report = Self::block(&ValidationResult::system_error(), "unknown");
        report.stderr.push(format!("Detail: {}", detail));
        report
    }

    /// Write the diagnostics to stdout/stderr
    pub fn emit(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in &self.stdout {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        let stderr = io::stderr();
        let mut err = stderr.lock();
        for line in &self.stderr {
            writeln!(err, "{}", line)?;
        }
        err.flush()
    }
}
