//! Integration tests for claude-shell-guard

mod bypass_tests;
mod cli_tests;
mod confirm_tests;
mod path_tests;
mod policy_tests;

use claude_shell_guard::{Policy, SecurityEngine, ValidationResult};

/// Working directory used by the library-level tests
pub const PROJECT_DIR: &str = "/home/dev/project";

pub fn validate(command: &str) -> ValidationResult {
    SecurityEngine::new(Policy::recommended()).validate(command, PROJECT_DIR)
}
