//! Interactive confirmation for commands that need human review
//!
//! States: `AwaitingInput` → `Confirmed` | `Denied` | `TimedOut`. A single
//! line is read from the terminal, raced against a fixed timeout; whichever
//! resolves first decides and the other future is dropped.

use serde::Serialize;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::output::{Action, ValidationResult};
use crate::rules::risk_explanation;

/// How long the user has to answer
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Confirmation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    AwaitingInput,
    Confirmed,
    Denied,
    TimedOut,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::AwaitingInput)
    }
}

/// Terminal state plus the resulting verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationOutcome {
    pub state: ConfirmationState,

    /// Raw line typed by the user, if one arrived
    pub response: Option<String>,

    pub result: ValidationResult,
}

/// Render the confirmation prompt for a pending verdict
pub fn render_prompt(command: &str, pending: &ValidationResult) -> String {
    format!(
        "\n⚠️  SECURITY WARNING ⚠️\n\n\
         Command: {}\n\
         Risk Level: {}\n\
         Category: {}\n\
         Reason: {}\n\n\
         Do you want to proceed? (y/N) ",
        command,
        pending.risk_level.as_str().to_uppercase(),
        pending.category.as_deref().unwrap_or("unknown"),
        risk_explanation(pending.category.as_deref()),
    )
}

/// Whether a typed answer approves the command
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}

/// Asks the user about one pending command
pub struct Confirmer<R, W> {
    input: R,
    output: W,
    timeout: Duration,
    state: ConfirmationState,
}

impl<R, W> Confirmer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            timeout: CONFIRMATION_TIMEOUT,
            state: ConfirmationState::AwaitingInput,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current state; `AwaitingInput` until an answer or the timeout settles it
    pub fn state(&self) -> ConfirmationState {
        self.state
    }

    /// Give back the prompt sink (used by tests to inspect the prompt)
    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompt for the pending verdict and wait for an answer or the timeout
    pub async fn confirm(&mut self, command: &str, pending: &ValidationResult) -> ConfirmationOutcome {
        self.state = ConfirmationState::AwaitingInput;
        debug!(
            category = pending.category.as_deref().unwrap_or("unknown"),
            "awaiting confirmation"
        );

        let outcome = self.await_answer(command, pending).await;
        debug!(state = ?outcome.state, "confirmation settled");
        self.state = outcome.state;
        outcome
    }

    async fn await_answer(&mut self, command: &str, pending: &ValidationResult) -> ConfirmationOutcome {
        if let Err(e) = self.prompt(command, pending).await {
            warn!("failed to show confirmation prompt: {}", e);
            return denied(pending, format!("Confirmation input error: {}", e), None);
        }

        let timeout = self.timeout;
        let input = &mut self.input;
        let mut line = String::new();

        let read = tokio::select! {
            read = input.read_line(&mut line) => Some(read),
            _ = tokio::time::sleep(timeout) => None,
        };

        match read {
            None => {
                debug!("confirmation timed out after {:?}", timeout);
                ConfirmationOutcome {
                    state: ConfirmationState::TimedOut,
                    response: None,
                    result: escalate(pending, "Confirmation timed out"),
                }
            }
            Some(Err(e)) => {
                warn!("failed to read confirmation: {}", e);
                denied(pending, format!("Confirmation input error: {}", e), None)
            }
            // EOF
            Some(Ok(0)) => denied(pending, "User denied confirmation".to_string(), None),
            Some(Ok(_)) if is_affirmative(&line) => ConfirmationOutcome {
                state: ConfirmationState::Confirmed,
                result: ValidationResult {
                    category: pending.category.clone(),
                    matched_pattern: pending.matched_pattern.clone(),
                    ..ValidationResult::allow("User confirmed risky operation")
                },
                response: Some(line),
            },
            Some(Ok(_)) => denied(pending, "User denied confirmation".to_string(), Some(line)),
        }
    }

    async fn prompt(&mut self, command: &str, pending: &ValidationResult) -> std::io::Result<()> {
        self.output
            .write_all(render_prompt(command, pending).as_bytes())
            .await?;
        self.output.flush().await
    }
}

/// Confirmer wired to the controlling terminal
pub type TerminalConfirmer = Confirmer<Box<dyn AsyncBufRead + Unpin + Send>, tokio::io::Stderr>;

/// Read answers from `/dev/tty` (stdin carries the hook event) and prompt on stderr
///
/// Without a terminal every confirmation reads EOF and is denied.
pub async fn terminal() -> TerminalConfirmer {
    let input: Box<dyn AsyncBufRead + Unpin + Send> = match tokio::fs::File::open(TTY_PATH).await {
        Ok(tty) => Box::new(tokio::io::BufReader::new(tty)),
        Err(e) => {
            debug!("no controlling terminal ({}), confirmations will be denied", e);
            Box::new(tokio::io::empty())
        }
    };

    Confirmer::new(input, tokio::io::stderr())
}

const TTY_PATH: &str = "/dev/tty";

fn denied(pending: &ValidationResult, reason: String, response: Option<String>) -> ConfirmationOutcome {
    ConfirmationOutcome {
        state: ConfirmationState::Denied,
        response,
        result: escalate(pending, reason),
    }
}

/// Turn the pending verdict into a block, keeping its risk context
fn escalate(pending: &ValidationResult, reason: impl Into<String>) -> ValidationResult {
    ValidationResult {
        action: Action::Block,
        reason: reason.into(),
        ..pending.clone()
    }
}
