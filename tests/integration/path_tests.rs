//! Integration tests for path-scope restrictions

use claude_shell_guard::{Action, PathRestrictions, Policy, SecurityEngine};

use crate::{validate, PROJECT_DIR};

// ============================================================================
// Protected system paths
// ============================================================================

#[test]
fn test_protected_path_ignores_trailing_arguments() {
    for command in ["rm /etc/passwd", "rm /etc/passwd --force"] {
        let result = validate(command);
        assert!(result.is_block(), "{}", command);
        assert_eq!(result.category.as_deref(), Some("path_restriction"));
        assert_eq!(result.reason, "Operation on protected system path: /etc");
    }
}

#[test]
fn test_read_only_inspection_of_protected_path() {
    assert!(validate("cat /etc/passwd").is_allow());
    assert!(validate("grep root /etc/group").is_allow());
    assert!(validate("stat /boot/vmlinuz").is_allow());
}

#[test]
fn test_protected_prefix_needs_path_boundary() {
    // /etcd is not /etc, /usr/binaries is not /usr/bin
    assert!(!validate("touch /etcd/config").is_block());
    assert!(!validate("touch /usr/binaries/x").is_block());
}

#[test]
fn test_dev_null_redirect_is_not_protected() {
    assert!(validate("make build > /dev/null").is_allow());
}

// ============================================================================
// Outside the working directory
// ============================================================================

#[test]
fn test_outside_cwd_read_only_allowed() {
    let result = validate("cat ../sibling/file.txt");
    assert!(result.is_allow());
    assert_eq!(result.reason, "Read-only operation outside working directory allowed");
}

#[test]
fn test_outside_cwd_confirm_list() {
    for command in ["rm ../sibling/file.txt", "mv notes.txt ~/archive", "cp a.txt $HOME/b.txt"] {
        let result = validate(command);
        assert_eq!(result.action, Action::Confirm, "{}", command);
        assert_eq!(result.category.as_deref(), Some("path_restriction"));
        assert!(result.reason.contains(PROJECT_DIR));
    }
}

#[test]
fn test_outside_cwd_multi_word_operation() {
    assert!(validate("git log ../other-repo").is_allow());
    assert!(validate("git diff /tmp/a /tmp/b").is_allow());
}

#[test]
fn test_outside_cwd_unlisted_command() {
    assert!(validate("echo done > /tmp/marker").is_allow());
}

#[test]
fn test_relative_path_with_separator_counts_as_outside() {
    // Known over-approximation: "./notes.txt" contains "/notes.txt"
    let result = validate("touch ./notes.txt");
    assert_eq!(result.action, Action::Confirm);
    assert_eq!(result.category.as_deref(), Some("path_restriction"));
}

// ============================================================================
// Custom restrictions
// ============================================================================

#[test]
fn test_ops_lists_swap_verdicts() {
    let mut policy = Policy::recommended();
    policy.path_restrictions = PathRestrictions {
        enabled: true,
        blocked_paths: Vec::new(),
        allowed_read_only_ops_outside_cwd: Vec::new(),
        confirm_ops_outside_cwd: vec!["cat".to_string()],
    };
    let engine = SecurityEngine::new(policy);

    let result = engine.validate("cat ../sibling/file.txt", PROJECT_DIR);
    assert_eq!(result.action, Action::Confirm);
}

#[test]
fn test_restrictions_disabled() {
    let mut policy = Policy::recommended();
    policy.path_restrictions.enabled = false;
    let engine = SecurityEngine::new(policy);

    assert!(engine.validate("rm /etc/passwd", PROJECT_DIR).is_allow());
    assert!(engine.validate("mv a ../b", PROJECT_DIR).is_allow());
}
