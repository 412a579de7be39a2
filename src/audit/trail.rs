//! Audit trail for every tool execution

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::suspicious::{self, SuspiciousActivity};
use super::{append_json, append_line};
use crate::engine::SecurityEngine;
use crate::input::HookInput;
use crate::output::{Action, RiskLevel};

pub const AUDIT_LOG_FILE: &str = "audit.log";
pub const DETAILED_AUDIT_FILE: &str = "detailed-audit.json";
pub const SUSPICIOUS_LOG_FILE: &str = "suspicious-activity.log";
pub const AUDIT_ERROR_FILE: &str = "audit-errors.log";

/// Validator verdict as recorded in the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityAssessment {
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<Action>,
    pub category: Option<String>,
    pub reason: String,
    pub matched_pattern: Option<String>,
}

impl SecurityAssessment {
    /// Assessment for an event with no identifiable command
    pub fn unidentified() -> Self {
        Self {
            risk_level: RiskLevel::Unknown,
            action_taken: None,
            category: None,
            reason: "Command not identified".to_string(),
            matched_pattern: None,
        }
    }

    pub fn assess(engine: &SecurityEngine, command: Option<&str>, working_dir: &str) -> Self {
        let Some(command) = command else {
            return Self::unidentified();
        };

        let result = engine.validate(command, working_dir);
        Self {
            risk_level: result.risk_level,
            action_taken: Some(result.action),
            category: result.category,
            reason: result.reason,
            matched_pattern: result.matched_pattern,
        }
    }
}

/// One audited tool execution
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub audit_id: String,
    pub event_type: &'static str,
    pub tool_name: String,
    pub hook_event_name: Option<String>,
    pub command: Option<String>,
    pub command_hash: Option<String>,
    pub working_directory: String,
    pub project_name: String,
    pub user: String,
    pub hostname: String,
    pub platform: &'static str,
    pub security_assessment: SecurityAssessment,
    pub raw_event_data: Value,
    pub risk_indicators: Vec<&'static str>,
}

impl AuditEntry {
    /// Build the entry for a hook event
    pub fn new(input: &HookInput, engine: &SecurityEngine) -> Self {
        let command = input.command().map(String::from);
        let working_directory = input.working_dir();

        Self {
            timestamp: Utc::now(),
            session_id: session_id(input),
            audit_id: uuid::Uuid::new_v4().simple().to_string(),
            event_type: "tool_execution",
            tool_name: input.tool_name.clone(),
            hook_event_name: input.hook_event_name.clone(),
            command_hash: command.as_deref().map(hash_command),
            security_assessment: SecurityAssessment::assess(
                engine,
                command.as_deref(),
                &working_directory,
            ),
            risk_indicators: risk_indicators(command.as_deref().unwrap_or(""), &working_directory),
            project_name: project_name(&working_directory),
            working_directory,
            command,
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            hostname: hostname(),
            platform: std::env::consts::OS,
            raw_event_data: input.raw.clone(),
        }
    }

    /// `{timestamp} {icon} [{ACTION}] {tool}: {command} ({project})`
    pub fn human_line(&self) -> String {
        let icon = match self.security_assessment.risk_level {
            RiskLevel::Medium => "⚠️ ",
            RiskLevel::High => "🛑",
            RiskLevel::Low | RiskLevel::Unknown => "✅",
        };
        let action = self
            .security_assessment
            .action_taken
            .unwrap_or(Action::Allow)
            .as_str()
            .to_uppercase();

        format!(
            "{} {} [{}] {}: {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            icon,
            action,
            self.tool_name,
            self.command.as_deref().unwrap_or("unknown_command"),
            self.project_name
        )
    }
}

/// SHA-256 of the command, hex encoded
pub fn hash_command(command: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(command.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Substring indicators of risky behavior
pub fn risk_indicators(command: &str, working_dir: &str) -> Vec<&'static str> {
    let checks: [(bool, &'static str); 9] = [
        (command.contains("sudo"), "elevated_privileges"),
        (command.contains("rm"), "file_deletion"),
        (
            command.contains("curl") || command.contains("wget"),
            "network_access",
        ),
        (command.contains(".."), "path_traversal"),
        (command.contains("/dev/"), "device_access"),
        (
            command.contains("&&") || command.contains("||") || command.contains('|'),
            "command_chaining",
        ),
        (
            command.contains("eval") || command.contains("exec"),
            "code_execution",
        ),
        (working_dir.contains("/tmp"), "temporary_directory"),
        (working_dir == "/", "root_directory_operation"),
    ];

    checks
        .into_iter()
        .filter_map(|(hit, name)| hit.then_some(name))
        .collect()
}

fn session_id(input: &HookInput) -> String {
    input
        .session_id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| std::env::var("CLAUDE_SESSION_ID").ok())
        .unwrap_or_else(|| {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            format!("session_{}_{}", Utc::now().timestamp_millis(), &suffix[..9])
        })
}

fn project_name(working_dir: &str) -> String {
    Path::new(working_dir)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Serialize)]
struct AuditErrorRecord<'a> {
    timestamp: DateTime<Utc>,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_data: Option<&'a Value>,
}

/// Writer for the audit logs in one directory
#[derive(Debug, Clone)]
pub struct AuditTrail {
    dir: PathBuf,
}

impl AuditTrail {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the entry to every audit log and run the heuristics
    pub fn record(&self, entry: &AuditEntry) -> io::Result<Vec<SuspiciousActivity>> {
        append_line(&self.dir.join(AUDIT_LOG_FILE), &entry.human_line())?;
        append_json(&self.dir.join(DETAILED_AUDIT_FILE), entry)?;

        let found = suspicious::analyze(entry);
        for activity in &found {
            warn!(
                "SUSPICIOUS ACTIVITY: {} - {}",
                activity.pattern, activity.details
            );
            append_json(&self.dir.join(SUSPICIOUS_LOG_FILE), &activity.record(entry))?;
        }

        debug!("audited {} ({})", entry.audit_id, entry.tool_name);
        Ok(found)
    }

    /// Record a failure to audit an event; failures only warn
    pub fn log_error(&self, error: &str, event_data: Option<&Value>) {
        let record = AuditErrorRecord {
            timestamp: Utc::now(),
            error,
            event_data,
        };
        if let Err(e) = append_json(&self.dir.join(AUDIT_ERROR_FILE), &record) {
            warn!("failed to write audit error log: {}", e);
        }
    }
}
