//! Hook pipelines used by the binary
//!
//! `check` decides whether a Bash command may run; `audit` records a tool
//! execution after the fact. Both read one JSON event.

use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, error, warn};

use crate::audit::{AuditEntry, AuditTrail, SecurityLog, SuspiciousActivity};
use crate::confirm::Confirmer;
use crate::engine::SecurityEngine;
use crate::error::GuardError;
use crate::input::HookInput;
use crate::output::HookReport;

/// Read the whole event from `reader`
pub async fn read_event<R: AsyncRead + Unpin>(mut reader: R) -> Result<String, GuardError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw).await?;
    Ok(raw)
}

/// Decide on one event; errors surface to the caller
pub async fn handle_event<R, W>(
    raw: &str,
    engine: &SecurityEngine,
    log: &SecurityLog,
    confirmer: &mut Confirmer<R, W>,
) -> Result<HookReport, GuardError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if raw.trim().is_empty() {
        return Err(GuardError::EmptyInput);
    }

    let input = HookInput::from_json(raw)?;
    if !input.is_bash() {
        debug!("skipping non-Bash tool {:?}", input.tool_name);
        return Ok(HookReport::allow("Not a Bash command"));
    }

    let Some(command) = input.command() else {
        return Ok(HookReport::allow("No command found"));
    };

    let working_dir = input.working_dir();
    let decision = engine.decide(command, &working_dir, confirmer).await;
    debug!(
        "{} -> {} ({})",
        input.summary(),
        decision.result.action,
        decision.result.reason
    );

    log.log_decision(command, &working_dir, &decision);
    Ok(HookReport::from_decision(&decision, command))
}

/// Decide on one event, failing closed on any error
pub async fn check_event<R, W>(
    raw: &str,
    engine: &SecurityEngine,
    log: &SecurityLog,
    confirmer: &mut Confirmer<R, W>,
) -> HookReport
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match handle_event(raw, engine, log, confirmer).await {
        Ok(report) => report,
        Err(e) => {
            error!("security check failed: {}", e);
            let event = serde_json::from_str(raw).ok();
            log.log_error(&e.to_string(), event.as_ref());
            HookReport::system_error(&e.to_string())
        }
    }
}

/// Audit one event
pub fn audit_event(
    raw: &str,
    engine: &SecurityEngine,
    trail: &AuditTrail,
) -> Result<(AuditEntry, Vec<SuspiciousActivity>), GuardError> {
    if raw.trim().is_empty() {
        return Err(GuardError::EmptyInput);
    }

    let input = HookInput::from_json(raw)?;
    let entry = AuditEntry::new(&input, engine);
    let found = trail.record(&entry)?;
    Ok((entry, found))
}

/// Audit one event; never blocks the tool
pub fn run_audit(raw: &str, engine: &SecurityEngine, trail: &AuditTrail) -> HookReport {
    match audit_event(raw, engine, trail) {
        Ok((entry, found)) => {
            if !found.is_empty() {
                warn!("{} suspicious pattern(s) in {}", found.len(), entry.audit_id);
            }
        }
        Err(e) => {
            error!("audit failed: {}", e);
            let event = serde_json::from_str(raw).ok();
            trail.log_error(&e.to_string(), event.as_ref());
        }
    }

    HookReport {
        exit_code: crate::output::EXIT_ALLOW,
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}
