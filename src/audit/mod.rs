//! Append-only JSONL logs for claude-shell-guard
//!
//! - `security.log`: one record per step of the `check` pipeline
//! - `audit.log` / `detailed-audit.json`: every tool execution (`audit` mode)
//! - `suspicious-activity.log`: heuristics triggered by an audited event
//!
//! Every line is written with a single `write_all` on an append-mode handle,
//! so records from parallel hook processes never interleave within a line.

pub mod security_log;
pub mod suspicious;
pub mod trail;

pub use security_log::{LogAction, SecurityLog, SecurityRecord};
pub use suspicious::{Severity, SuspiciousActivity};
pub use trail::{AuditEntry, AuditTrail, SecurityAssessment};

use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append one line to `path`, creating the parent directory if needed
pub fn append_line(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(buf.as_bytes())
}

/// Serialize `record` as one JSON line and append it to `path`
pub fn append_json<T: Serialize>(path: &Path, record: &T) -> io::Result<()> {
    let line = serde_json::to_string(record)?;
    append_line(path, &line)
}
