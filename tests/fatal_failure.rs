//! Integration tests for the fatal error tier.
//!
//! Only two things cross the engine boundary as errors: a malformed alert
//! and a failure to send the guaranteed final text. Everything else is
//! absorbed into degraded outcomes.

use flare::core::{Alert, DispatchError};
use flare::test_support::HandlerBehavior;
use flare::transport::TransportError;

mod helpers;
use helpers::harness;

#[tokio::test]
async fn test_summary_failure_is_fatal() {
    let h = harness(
        &["handlerX"],
        vec![("handlerX", HandlerBehavior::Accept)],
    );
    // Both photos deliver, so the first text sent is the summary.
    h.text.script(vec![Err(TransportError::Unavailable(
        "radio off".to_string(),
    ))]);
    let alert = Alert::new(
        "+15550001",
        "fire detected",
        vec!["imgA".to_string(), "imgB".to_string()],
    );

    let result = h.orchestrator.dispatch_alert(&alert).await;

    match result {
        Err(DispatchError::FinalNotice { reason }) => assert!(reason.contains("radio off")),
        other => panic!("expected FinalNotice, got {:?}", other),
    }
}

#[tokio::test]
async fn test_degraded_notice_failures_are_ignored_for_the_result() {
    let h = harness(
        &["handlerX"],
        vec![("handlerX", HandlerBehavior::Reject("declined".to_string()))],
    );
    // Two degraded notices fail, then the summary succeeds.
    h.text.script(vec![
        Err(TransportError::Unavailable("radio busy".to_string())),
        Err(TransportError::Unavailable("radio busy".to_string())),
    ]);
    let alert = Alert::new(
        "+15550001",
        "fire detected",
        vec!["imgA".to_string(), "imgB".to_string()],
    );

    let report = h.orchestrator.dispatch_alert(&alert).await.unwrap();

    assert_eq!(report.degraded, 2);
    // Only the summary actually went through.
    let bodies = h.text.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("Sent 2 emergency photos"));
}

#[tokio::test]
async fn test_no_attachments_notice_failure_is_fatal() {
    let h = harness(&["handlerX"], vec![]);
    h.text.script(vec![Err(TransportError::Rejected(
        "number blocked".to_string(),
    ))]);
    let alert = Alert::new("+15550001", "evacuate now", vec![]);

    let result = h.orchestrator.dispatch_alert(&alert).await;

    assert!(matches!(result, Err(DispatchError::FinalNotice { .. })));
}

#[tokio::test]
async fn test_missing_recipient_sends_nothing() {
    let h = harness(&["handlerX"], vec![("handlerX", HandlerBehavior::Accept)]);
    let alert = Alert::new("  ", "fire detected", vec!["imgA".to_string()]);

    let result = h.orchestrator.dispatch_alert(&alert).await;

    assert!(matches!(result, Err(DispatchError::MissingRecipient)));
    assert!(h.journal.lock().unwrap().is_empty());
}
