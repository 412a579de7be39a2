//! Path-scope analysis
//!
//! Decides whether a command touches a protected system path or reaches
//! outside the working directory. This is a textual heuristic, not a shell
//! parser: any token that looks like an absolute path (even `./build`, which
//! contains `/build`) counts as "outside". The over-approximation is kept on
//! purpose; the per-command op lists decide what actually happens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::PathRestrictions;
use crate::output::ValidationResult;
use crate::rules::PATH_RESTRICTION;

/// Commands allowed to inspect protected paths
static READ_ONLY_COMMANDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ls", "cat", "less", "more", "head", "tail", "grep", "find", "file", "stat", "du", "df",
        "wc", "sort", "uniq", "cut", "awk", "sed", "diff", "cmp", "strings", "hexdump", "od",
    ]
    .into_iter()
    .collect()
});

/// Markers for paths outside the working directory
static OUTSIDE_CWD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Absolute paths
        r"/[^/\s]+",
        // Parent directory traversal
        r"\.\./",
        // Home directory shorthand
        r"~/[^/\s]+",
        // Home environment variable
        r"\$HOME",
        r"\$\{HOME\}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Check a command against the path restrictions
pub fn check_path(
    command: &str,
    working_dir: &str,
    restrictions: &PathRestrictions,
) -> ValidationResult {
    if !restrictions.enabled {
        return ValidationResult::allow("Path restrictions disabled");
    }

    // Protected paths take priority over everything else
    if let Some(prefix) = blocked_path(command, &restrictions.blocked_paths) {
        if !is_read_only_command(command) {
            return ValidationResult::block(
                format!("Operation on protected system path: {}", prefix),
                Some(PATH_RESTRICTION),
                None,
            );
        }
    }

    if references_outside_cwd(command) {
        if starts_with_operation(command, &restrictions.allowed_read_only_ops_outside_cwd) {
            return ValidationResult::allow("Read-only operation outside working directory allowed");
        }

        if starts_with_operation(command, &restrictions.confirm_ops_outside_cwd) {
            return ValidationResult::confirm(
                format!(
                    "Operation outside working directory {} requires confirmation",
                    working_dir
                ),
                Some(PATH_RESTRICTION),
                None,
            );
        }
    }

    ValidationResult::allow("Path validation passed")
}

/// Return the first blocked prefix the command references as a path argument
///
/// The prefix must follow whitespace and be followed by `/`, whitespace or the
/// end of the command, so `/etc` matches `rm /etc/passwd` but not `/etcd` or
/// `./etc`.
pub fn blocked_path<'a>(command: &str, blocked_paths: &'a [String]) -> Option<&'a str> {
    for blocked in blocked_paths {
        let prefix = normalize_prefix(blocked);
        if prefix.is_empty() {
            continue;
        }

        let pattern = format!(r"(?i)\s{}(/|\s|$)", regex::escape(prefix));
        match Regex::new(&pattern) {
            Ok(re) if re.is_match(command) => return Some(blocked),
            Ok(_) => {}
            Err(e) => tracing::warn!("skipping blocked path {:?}: {}", blocked, e),
        }
    }

    None
}

/// Whether the command's leading token is a read-only inspection command
pub fn is_read_only_command(command: &str) -> bool {
    let name = leading_token(command).to_lowercase();
    READ_ONLY_COMMANDS.contains(name.as_str())
}

/// Whether the command mentions a path outside the working directory
pub fn references_outside_cwd(command: &str) -> bool {
    OUTSIDE_CWD_PATTERNS.iter().any(|re| re.is_match(command))
}

/// The first shell word of the command, with quotes removed
pub fn leading_token(command: &str) -> String {
    shlex::split(command)
        .and_then(|tokens| tokens.into_iter().next())
        .or_else(|| command.split_whitespace().next().map(String::from))
        .unwrap_or_default()
}

/// Whether the command starts with one of `ops` followed by whitespace
///
/// Entries may span several words (`git log`); comparison ignores case.
fn starts_with_operation(command: &str, ops: &[String]) -> bool {
    let command = command.trim_start().to_lowercase();

    ops.iter().any(|op| {
        let op = op.trim().to_lowercase();
        !op.is_empty()
            && command
                .strip_prefix(op.as_str())
                .and_then(|rest| rest.chars().next())
                .is_some_and(char::is_whitespace)
    })
}

fn normalize_prefix(prefix: &str) -> &str {
    let trimmed = prefix.trim();
    if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    }
}
