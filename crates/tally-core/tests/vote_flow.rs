mod common;

use common::{config, session, session_with};
use std::time::Duration;
use tally_core::vote::{SubmitRejected, VoteState, VOTE_PATH};
use tally_core::FailureKind;

fn sent_choice(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn exhausted_pool_then_retry_resubmits_same_choice() {
    let (network, session) = session();
    network.push_response(503, r#"{"detail":"QueuePool limit reached"}"#);
    network.push_response(200, r#"{"status":"ok"}"#);

    let failed = session.vote("ai").await.unwrap();
    let failure = failed.failure().unwrap();
    assert_eq!(failure.kind, FailureKind::ResourceExhausted);
    assert_eq!(failure.status, Some(503));

    let retried = session.submitter().retry().await.unwrap();
    assert!(retried.is_confirmed());
    assert_eq!(session.submitter().confirmed_label(), Some("Ask an AI to explain it"));

    let votes = network.requests_to(VOTE_PATH);
    assert_eq!(votes.len(), 2);
    for vote in &votes {
        assert_eq!(vote.method, "POST");
        assert_eq!(sent_choice(&vote.body)["choice"], "ai");
    }
}

#[tokio::test(start_paused = true)]
async fn unanswered_vote_times_out_at_twenty_seconds() {
    let (network, session) = session();
    network.push_hang();

    let started = tokio::time::Instant::now();
    let attempt = session.vote("restart").await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(20));
    assert_eq!(attempt.failure().map(|f| f.kind), Some(FailureKind::Timeout));
    assert!(matches!(session.submitter().state(), VoteState::Failed(_)));
}

#[tokio::test]
async fn referral_from_page_url_is_sent() {
    let mut config = config();
    config
        .apply_page_url("http://kiosk.local/?referral=booth-7&conf=sreday")
        .unwrap();
    let (network, session) = session_with(config);
    network.push_response(200, "{}");

    session.vote("stare").await.unwrap();
    let body = sent_choice(&network.requests_to(VOTE_PATH)[0].body);
    assert_eq!(body["choice"], "stare");
    assert_eq!(body["referral"], "booth-7");

    assert_eq!(
        session.vote("print").await.unwrap_err(),
        SubmitRejected::AlreadyConfirmed
    );
}
