//! Shared harness wiring the orchestrator over the crate's fakes.

use flare::config::Config;
use flare::core::AttachmentStore;
use flare::orchestrator::AlertOrchestrator;
use flare::test_support::{
    new_journal, AllPresentStore, CountingWait, FakeAttachmentTransport, FakeTextTransport,
    HandlerBehavior, Journal,
};
use std::sync::Arc;

pub struct Harness {
    pub journal: Journal,
    pub text: Arc<FakeTextTransport>,
    pub attachments: Arc<FakeAttachmentTransport>,
    pub wait: Arc<CountingWait>,
    pub orchestrator: AlertOrchestrator,
}

/// Builds an orchestrator over fakes, with the given handler priority list
/// and per-handler behaviors. Handlers not listed in `behaviors` reject.
pub fn harness_with_store(
    handlers: &[&str],
    behaviors: Vec<(&str, HandlerBehavior)>,
    store: Arc<dyn AttachmentStore>,
) -> Harness {
    let mut config = Config::default();
    config.handlers = handlers.iter().map(|h| h.to_string()).collect();
    config.delivery.attempt_timeout_ms = 1_000;

    let journal = new_journal();
    let text = FakeTextTransport::new(journal.clone());
    let attachments = if behaviors.is_empty() {
        FakeAttachmentTransport::new(journal.clone())
    } else {
        FakeAttachmentTransport::with_behaviors(journal.clone(), behaviors)
    };
    let wait = CountingWait::new();

    let orchestrator = AlertOrchestrator::builder(config)
        .text_transport(text.clone())
        .attachment_transport(attachments.clone())
        .store(store)
        .wait_policy(wait.clone())
        .build();

    Harness {
        journal,
        text,
        attachments,
        wait,
        orchestrator,
    }
}

pub fn harness(handlers: &[&str], behaviors: Vec<(&str, HandlerBehavior)>) -> Harness {
    harness_with_store(handlers, behaviors, Arc::new(AllPresentStore))
}
