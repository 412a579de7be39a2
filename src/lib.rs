//! claude-shell-guard - Security policy hook for Claude Code shell commands
//!
//! This library decides whether a shell command proposed by Claude Code may
//! run, must be blocked, or needs a human to confirm it first.
//!
//! # Features
//!
//! - **Category patterns**: Ordered risk categories with block and confirm regex lists
//! - **Path scope**: Protected system paths and operations outside the working directory
//! - **Precedence**: Any block beats any confirm, which beats allow
//! - **Bypass keyword**: A literal marker that skips validation
//! - **Confirmation**: A single-line prompt raced against a 30 second timeout
//! - **Logging**: JSONL security log and a tool-execution audit trail
//!
//! # Example
//!
//! ```
//! use claude_shell_guard::{Policy, SecurityEngine};
//!
//! let engine = SecurityEngine::new(Policy::recommended());
//!
//! let result = engine.validate("rm -rf /", "/home/dev/project");
//! assert!(result.is_block());
//! assert_eq!(result.category.as_deref(), Some("file_destruction"));
//!
//! assert!(engine.validate("ls -la", "/home/dev/project").is_allow());
//! ```

pub mod audit;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod error;
pub mod hook;
pub mod input;
pub mod output;
pub mod rules;

// Re-exports for convenience
pub use config::{BypassConfig, Category, PathRestrictions, Policy};
pub use confirm::{ConfirmationState, Confirmer};
pub use engine::{Evaluation, SecurityEngine};
pub use error::{GuardError, PolicyError};
pub use input::HookInput;
pub use output::{Action, Decision, HookReport, RiskLevel, ValidationResult};
