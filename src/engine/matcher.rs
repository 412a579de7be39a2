//! Pattern matching against policy regex lists
//!
//! Patterns are compiled case-insensitively and tried in list order. An
//! invalid pattern is logged and skipped; it never fails the evaluation.

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compile a single policy pattern
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Return the first pattern (in list order) that matches anywhere in `command`
pub fn first_match<'a>(command: &str, patterns: &'a [String]) -> Option<&'a str> {
    for pattern in patterns {
        match compile(pattern) {
            Ok(re) => {
                if re.is_match(command) {
                    return Some(pattern);
                }
            }
            Err(e) => {
                warn!("skipping invalid pattern {:?}: {}", pattern, e);
            }
        }
    }

    None
}

/// Patterns that fail to compile, with the compiler message
pub fn invalid_patterns(patterns: &[String]) -> Vec<(&str, String)> {
    patterns
        .iter()
        .filter_map(|pattern| {
            compile(pattern)
                .err()
                .map(|e| (pattern.as_str(), e.to_string()))
        })
        .collect()
}
