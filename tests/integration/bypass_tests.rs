//! Integration tests for the bypass keyword

use claude_shell_guard::{BypassConfig, Confirmer, Evaluation, Policy, SecurityEngine};
use tokio::io::BufReader;

use crate::PROJECT_DIR;

fn engine() -> SecurityEngine {
    SecurityEngine::new(Policy::recommended())
}

#[test]
fn test_bypass_skips_blocked_commands() {
    let engine = engine();
    for command in [
        "rm -rf / # SECURITY_OVERRIDE",
        "SECURITY_OVERRIDE=1 sudo su -",
        "chmod 755 /usr/bin/vim SECURITY_OVERRIDE",
    ] {
        assert_eq!(engine.evaluate(command, PROJECT_DIR), Evaluation::Bypassed, "{}", command);
    }
}

#[test]
fn test_bypass_keyword_is_case_sensitive() {
    match engine().evaluate("rm -rf / # security_override", PROJECT_DIR) {
        Evaluation::Validated(result) => assert!(result.is_block()),
        Evaluation::Bypassed => panic!("lowercase keyword must not bypass"),
    }
}

#[test]
fn test_bypass_disabled() {
    let mut policy = Policy::recommended();
    policy.bypass = BypassConfig {
        enabled: false,
        keyword: "SECURITY_OVERRIDE".to_string(),
    };
    let engine = SecurityEngine::new(policy);

    assert!(!engine.is_bypassed("rm -rf / SECURITY_OVERRIDE"));
    assert!(matches!(
        engine.evaluate("rm -rf / SECURITY_OVERRIDE", PROJECT_DIR),
        Evaluation::Validated(_)
    ));
}

#[test]
fn test_custom_keyword() {
    let mut policy = Policy::recommended();
    policy.bypass.keyword = "I_KNOW_WHAT_I_AM_DOING".to_string();
    let engine = SecurityEngine::new(policy);

    assert!(engine.is_bypassed("rm -rf / I_KNOW_WHAT_I_AM_DOING"));
    assert!(!engine.is_bypassed("rm -rf / SECURITY_OVERRIDE"));
}

#[tokio::test]
async fn test_bypass_never_prompts() {
    let mut confirmer = Confirmer::new(BufReader::new(&b"n\n"[..]), Vec::new());
    let decision = engine()
        .decide("rm -rf ./build SECURITY_OVERRIDE", PROJECT_DIR, &mut confirmer)
        .await;

    assert!(decision.is_bypassed());
    assert!(decision.is_allow());
    assert_eq!(decision.result.reason, "Bypass keyword detected");
    assert!(decision.result.category.is_none());
    assert!(confirmer.into_output().is_empty());
}
