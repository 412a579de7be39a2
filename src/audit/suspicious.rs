//! Suspicious-activity heuristics for audited events

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

use super::trail::AuditEntry;
use crate::output::RiskLevel;

/// Working directories that should never host agent work
pub const SENSITIVE_DIRECTORIES: &[&str] = &["/etc", "/bin", "/usr/bin", "/sbin", "/boot", "/sys"];

static EXFILTRATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // POST data from a file
        r"curl.*-d.*@",
        r"wget.*--post-file",
        // Netcat with execute
        r"nc.*-e",
        // SSH reverse tunnel
        r"ssh.*-R",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

/// A triggered heuristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspiciousActivity {
    pub pattern: &'static str,
    pub severity: Severity,
    pub details: String,
}

/// One line of `suspicious-activity.log`
#[derive(Debug, Serialize)]
pub struct SuspiciousRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub pattern: &'static str,
    pub severity: Severity,
    pub details: &'a str,
    pub audit_id: &'a str,
    pub command: Option<&'a str>,
    pub working_directory: &'a str,
}

impl SuspiciousActivity {
    pub fn record<'a>(&'a self, entry: &'a AuditEntry) -> SuspiciousRecord<'a> {
        SuspiciousRecord {
            timestamp: Utc::now(),
            pattern: self.pattern,
            severity: self.severity,
            details: &self.details,
            audit_id: &entry.audit_id,
            command: entry.command.as_deref(),
            working_directory: &entry.working_directory,
        }
    }
}

/// Run every heuristic against an audit entry
pub fn analyze(entry: &AuditEntry) -> Vec<SuspiciousActivity> {
    [
        high_risk_command(entry),
        sensitive_directory(entry),
        data_exfiltration(entry),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn high_risk_command(entry: &AuditEntry) -> Option<SuspiciousActivity> {
    (entry.security_assessment.risk_level == RiskLevel::High).then(|| SuspiciousActivity {
        pattern: "rapid_high_risk_commands",
        severity: Severity::High,
        details: "High-risk command detected".to_string(),
    })
}

fn sensitive_directory(entry: &AuditEntry) -> Option<SuspiciousActivity> {
    let working_dir = Path::new(&entry.working_directory);

    SENSITIVE_DIRECTORIES
        .iter()
        .find(|dir| working_dir.starts_with(dir))
        .map(|dir| SuspiciousActivity {
            pattern: "unusual_directory_access",
            severity: Severity::Medium,
            details: format!("Operation in sensitive directory: {}", dir),
        })
}

fn data_exfiltration(entry: &AuditEntry) -> Option<SuspiciousActivity> {
    let command = entry.command.as_deref()?;

    EXFILTRATION_PATTERNS
        .iter()
        .any(|re| re.is_match(command))
        .then(|| SuspiciousActivity {
            pattern: "potential_data_exfiltration",
            severity: Severity::High,
            details: "Potential data exfiltration pattern detected".to_string(),
        })
}
