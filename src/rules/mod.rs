//! Built-in rule tables for claude-shell-guard
//!
//! The recommended policy ships these categories. Each category also carries
//! the explanation shown in the confirmation prompt.

pub mod defaults;

/// A built-in risk category
#[derive(Debug, Clone)]
pub struct CategoryRules {
    /// Category name, used as the policy key
    pub name: &'static str,

    /// Patterns that block outright
    pub block: &'static [&'static str],

    /// Patterns that require confirmation
    pub confirm: &'static [&'static str],

    /// Human-readable explanation for the confirmation prompt
    pub explanation: &'static str,
}

impl CategoryRules {
    pub const fn new(
        name: &'static str,
        block: &'static [&'static str],
        confirm: &'static [&'static str],
        explanation: &'static str,
    ) -> Self {
        Self {
            name,
            block,
            confirm,
            explanation,
        }
    }
}

/// Category name used for verdicts produced by path restrictions
pub const PATH_RESTRICTION: &str = "path_restriction";

/// Explanation for categories without a known one
pub const GENERIC_EXPLANATION: &str = "This command has been flagged for security review";

/// Look up the prompt explanation for a category name
pub fn risk_explanation(category: Option<&str>) -> &'static str {
    let Some(category) = category else {
        return GENERIC_EXPLANATION;
    };

    if category == PATH_RESTRICTION {
        return "This command operates outside the current working directory";
    }

    defaults::RECOMMENDED_CATEGORIES
        .iter()
        .find(|rules| rules.name == category)
        .map(|rules| rules.explanation)
        .unwrap_or(GENERIC_EXPLANATION)
}
