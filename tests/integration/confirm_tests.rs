//! Integration tests for interactive confirmation

use std::time::Duration;

use claude_shell_guard::{
    ConfirmationState, Confirmer, Policy, RiskLevel, SecurityEngine, ValidationResult,
};
use tokio::io::BufReader;

use crate::PROJECT_DIR;

async fn decide(command: &str, answer: &'static [u8]) -> claude_shell_guard::Decision {
    let engine = SecurityEngine::new(Policy::recommended());
    let mut confirmer =
        Confirmer::new(BufReader::new(answer), Vec::new()).with_timeout(Duration::from_secs(5));
    engine.decide(command, PROJECT_DIR, &mut confirmer).await
}

#[tokio::test]
async fn test_affirmative_answers_allow() {
    for answer in [&b"y\n"[..], b"Y\n", b"yes\n", b"  YES  \n", b"Yes"] {
        let decision = decide("rm -rf ./build", answer).await;
        assert!(decision.is_allow(), "{:?}", String::from_utf8_lossy(answer));
        assert_eq!(decision.confirmation, Some(ConfirmationState::Confirmed));
        assert_eq!(decision.result.reason, "User confirmed risky operation");
    }
}

#[tokio::test]
async fn test_other_answers_block() {
    for answer in [&b"n\n"[..], b"no\n", b"yeah\n", b"\n", b""] {
        let decision = decide("rm -rf ./build", answer).await;
        assert!(decision.result.is_block(), "{:?}", String::from_utf8_lossy(answer));
        assert_eq!(decision.confirmation, Some(ConfirmationState::Denied));
        assert_eq!(decision.result.reason, "User denied confirmation");
        assert_eq!(decision.result.risk_level, RiskLevel::Medium);
    }
}

#[tokio::test]
async fn test_path_confirmation_prompt() {
    let engine = SecurityEngine::new(Policy::recommended());
    let mut confirmer = Confirmer::new(BufReader::new(&b"y\n"[..]), Vec::new());

    let decision = engine.decide("mv a.txt ../b.txt", PROJECT_DIR, &mut confirmer).await;
    assert!(decision.is_allow());

    let prompt = String::from_utf8(confirmer.into_output()).unwrap();
    assert!(prompt.contains("Category: path_restriction"));
    assert!(prompt.contains("outside the current working directory"));
}

#[tokio::test]
async fn test_timeout_blocks() {
    let (_writer, reader) = tokio::io::duplex(16);
    let mut confirmer =
        Confirmer::new(BufReader::new(reader), Vec::new()).with_timeout(Duration::from_millis(20));

    let pending = ValidationResult::confirm(
        "Command requires confirmation for process_control",
        Some("process_control"),
        Some(r"\bkill\s+"),
    );
    let outcome = confirmer.confirm("kill 4242", &pending).await;

    assert_eq!(outcome.state, ConfirmationState::TimedOut);
    assert!(outcome.result.is_block());
    assert_eq!(outcome.result.reason, "Confirmation timed out");
    assert_eq!(outcome.result.matched_pattern.as_deref(), Some(r"\bkill\s+"));
}

#[tokio::test]
async fn test_answer_before_timeout_wins() {
    let (mut writer, reader) = tokio::io::duplex(16);
    let mut confirmer =
        Confirmer::new(BufReader::new(reader), Vec::new()).with_timeout(Duration::from_secs(5));

    let answer = tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.write_all(b"yes\n").await.unwrap();
        writer
    });

    let pending = ValidationResult::confirm("needs review", Some("process_control"), None);
    let outcome = confirmer.confirm("kill 4242", &pending).await;
    assert_eq!(outcome.state, ConfirmationState::Confirmed);

    answer.await.unwrap();
}
