//! Command validation
//!
//! Combines the category patterns with path-scope analysis into a single
//! verdict. Precedence: any block (pattern or path) > any confirm > allow.

use crate::config::Policy;
use crate::engine::{matcher, path};
use crate::output::{Action, ValidationResult};

/// Validate a command against the policy
///
/// Evaluation order encodes risk priority:
/// 1. a disabled policy allows everything;
/// 2. categories in registration order: a block pattern returns immediately,
///    a confirm pattern is recorded and evaluation continues;
/// 3. path restrictions, which can only escalate a recorded confirm to block;
/// 4. with no pattern match, the path verdict decides.
pub fn validate(command: &str, working_dir: &str, policy: &Policy) -> ValidationResult {
    if !policy.enabled {
        return ValidationResult::allow("Security system disabled");
    }

    let mut pending: Option<ValidationResult> = None;

    for (name, category) in policy.categories.iter() {
        if !category.enabled {
            continue;
        }

        if let Some(pattern) = matcher::first_match(command, &category.block_patterns) {
            return ValidationResult::block(
                format!("Command matches blocked pattern in {}", name),
                Some(name),
                Some(pattern),
            );
        }

        // A later category's confirm replaces an earlier one
        if let Some(pattern) = matcher::first_match(command, &category.confirm_patterns) {
            pending = Some(ValidationResult::confirm(
                format!("Command requires confirmation for {}", name),
                Some(name),
                Some(pattern),
            ));
        }
    }

    let path_result = path::check_path(command, working_dir, &policy.path_restrictions);

    match pending {
        Some(confirm) => {
            if path_result.action == Action::Block {
                path_result
            } else {
                confirm
            }
        }
        None => match path_result.action {
            Action::Allow => ValidationResult::allow("Command passed security validation"),
            Action::Block | Action::Confirm => path_result,
        },
    }
}
