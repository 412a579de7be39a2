//! Security log for the `check` pipeline

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::append_json;
use crate::config::Policy;
use crate::confirm::ConfirmationState;
use crate::output::{Action, Decision, RiskLevel, ValidationResult};

/// File name of the security log inside the log directory
pub const SECURITY_LOG_FILE: &str = "security.log";

/// What a security record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    Allow,
    Block,
    Confirm,
    Bypass,
    ConfirmedAllow,
    ConfirmedBlock,
}

impl From<Action> for LogAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Allow => LogAction::Allow,
            Action::Block => LogAction::Block,
            Action::Confirm => LogAction::Confirm,
        }
    }
}

/// One `security_check` line
#[derive(Debug, Clone, Serialize)]
pub struct SecurityRecord {
    pub timestamp: DateTime<Utc>,
    pub event_type: &'static str,
    pub action: LogAction,
    pub command: String,
    pub working_directory: Option<String>,
    pub reason: String,
    pub risk_level: Option<RiskLevel>,
    pub category: Option<String>,
    pub matched_pattern: Option<String>,
    pub user_response: Option<String>,
}

impl SecurityRecord {
    fn new(action: LogAction, command: &str, working_dir: Option<&str>, reason: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: "security_check",
            action,
            command: command.to_string(),
            working_directory: working_dir.map(String::from),
            reason: reason.to_string(),
            risk_level: None,
            category: None,
            matched_pattern: None,
            user_response: None,
        }
    }

    /// Record for a bypassed command
    pub fn bypass(command: &str, working_dir: &str) -> Self {
        Self::new(
            LogAction::Bypass,
            command,
            Some(working_dir),
            "Bypass keyword detected",
        )
    }

    /// Record for a validator verdict
    pub fn validation(command: &str, working_dir: &str, result: &ValidationResult) -> Self {
        let mut record = Self::new(
            result.action.into(),
            command,
            Some(working_dir),
            &result.reason,
        );
        record.fill_from(result);
        record
    }

    /// Record for the user's answer to a confirmation prompt
    pub fn confirmation(
        command: &str,
        state: ConfirmationState,
        pending: &ValidationResult,
        response: Option<&str>,
    ) -> Self {
        let action = if state == ConfirmationState::Confirmed {
            LogAction::ConfirmedAllow
        } else {
            LogAction::ConfirmedBlock
        };

        let mut record = Self::new(action, command, None, &pending.reason);
        record.fill_from(pending);
        record.user_response = response.map(String::from);
        record
    }

    fn fill_from(&mut self, result: &ValidationResult) {
        self.risk_level = Some(result.risk_level);
        self.category = result.category.clone();
        self.matched_pattern = result.matched_pattern.clone();
    }
}

/// One `security_error` line
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub event_type: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data: Option<Value>,
}

/// Security logger
///
/// Decision records honor `logging.enabled`; error records are always written
/// when a path is known.
#[derive(Debug, Clone, Default)]
pub struct SecurityLog {
    path: Option<PathBuf>,
    enabled: bool,
}

impl SecurityLog {
    /// Create a logger writing to `path`
    pub fn new(path: Option<&Path>, enabled: bool) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            enabled,
        }
    }

    /// Logger configured from the policy's logging section
    pub fn for_policy(policy: &Policy) -> Self {
        let path = policy.log_dir().join(SECURITY_LOG_FILE);
        Self::new(Some(&path), policy.logging.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append a decision record
    pub fn log(&self, record: &SecurityRecord) -> io::Result<()> {
        match &self.path {
            Some(path) if self.enabled => append_json(path, record),
            _ => Ok(()),
        }
    }

    /// Log every record a decision produced; failures only warn
    pub fn log_decision(&self, command: &str, working_dir: &str, decision: &Decision) {
        for record in Self::records_for(command, working_dir, decision) {
            if let Err(e) = self.log(&record) {
                warn!("failed to write security log: {}", e);
            }
        }
    }

    /// Log an internal error; failures only warn
    pub fn log_error(&self, error: &str, event_data: Option<&Value>) {
        let Some(path) = &self.path else {
            return;
        };

        let record = ErrorRecord {
            timestamp: Utc::now(),
            event_type: "security_error",
            error: error.to_string(),
            event_data: event_data.cloned(),
        };
        if let Err(e) = append_json(path, &record) {
            warn!("failed to write security error log: {}", e);
        }
    }

    /// The records a decision maps to, in write order
    pub fn records_for(command: &str, working_dir: &str, decision: &Decision) -> Vec<SecurityRecord> {
        let Some(validation) = &decision.validation else {
            return vec![SecurityRecord::bypass(command, working_dir)];
        };

        let mut records = vec![SecurityRecord::validation(command, working_dir, validation)];
        if let Some(state) = decision.confirmation {
            records.push(SecurityRecord::confirmation(
                command,
                state,
                validation,
                decision.user_response.as_deref(),
            ));
        }
        records
    }
}
