//! Integration tests for policy documents

use std::fs;

use claude_shell_guard::{Policy, SecurityEngine};
use tempfile::TempDir;

use crate::PROJECT_DIR;

const TEAM_POLICY: &str = r#"
enabled = true

[bypass]
enabled = false

[path_restrictions]
enabled = false

[policies.deploys]
enabled = true
block_patterns = ['\bkubectl\s+delete\b']
require_confirmation = ['\bkubectl\s+apply\b']

[policies.cleanup]
enabled = true
block_patterns = ['\bkubectl\b']
"#;

#[test]
fn test_first_blocking_category_in_document_order_wins() {
    let policy = Policy::from_toml(TEAM_POLICY).unwrap();
    let engine = SecurityEngine::new(policy);

    let result = engine.validate("kubectl delete ns prod", PROJECT_DIR);
    assert!(result.is_block());
    assert_eq!(result.category.as_deref(), Some("deploys"));

    // The confirm in "deploys" loses to the block in "cleanup"
    let result = engine.validate("kubectl apply -f app.yaml", PROJECT_DIR);
    assert!(result.is_block());
    assert_eq!(result.category.as_deref(), Some("cleanup"));
}

#[test]
fn test_json_policy_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("security-policy.json");
    fs::write(
        &path,
        r#"{
            "enabled": true,
            "bypass": { "enabled": true, "keyword": "SHIP_IT" },
            "policies": {
                "git_safety": {
                    "enabled": true,
                    "block_patterns": ["git\\s+push\\s+.*--force"],
                    "require_confirmation": ["git\\s+reset\\s+--hard"]
                }
            }
        }"#,
    )
    .unwrap();

    let engine = SecurityEngine::new(Policy::load(Some(&path)));
    assert!(engine.validate("git push origin main --force", PROJECT_DIR).is_block());
    assert!(engine.validate("git reset --hard HEAD~1", PROJECT_DIR).is_confirm());
    assert!(engine.is_bypassed("git push --force SHIP_IT"));
}

#[test]
fn test_invalid_pattern_does_not_break_category() {
    let policy = Policy::from_toml(
        r#"
enabled = true

[policies.mixed]
enabled = true
block_patterns = ['(?<=sudo )rm', '\bmkfs\b']
"#,
    )
    .unwrap();
    let engine = SecurityEngine::new(policy);

    assert!(engine.validate("mkfs.ext4 /dev/sdb1", PROJECT_DIR).is_block());
    assert!(engine.validate("sudo rm x", PROJECT_DIR).is_allow());
}

#[test]
fn test_unreadable_policy_fails_open() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("security-policy.toml");
    fs::write(&path, "enabled = true\n[policies.x\n").unwrap();

    let engine = SecurityEngine::new(Policy::load(Some(&path)));
    let result = engine.validate("rm -rf /", PROJECT_DIR);
    assert!(result.is_allow());
    assert_eq!(result.reason, "Security system disabled");
}

#[test]
fn test_recommended_policy_survives_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("security-policy.toml");
    fs::write(&path, Policy::recommended().to_toml().unwrap()).unwrap();

    let loaded = Policy::load_from(&path).unwrap();
    assert_eq!(loaded, Policy::recommended());
}
