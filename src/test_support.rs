//! Shared fakes for exercising the dispatch engine without real transports.
//!
//! Compiled only with the `test-utils` feature; integration tests enable it
//! through the crate's dev-dependency on itself.

use crate::core::{AttachmentStore, AttachmentTransport, TextTransport};
use crate::settle::WaitPolicy;
use crate::transport::TransportError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A shared, ordered log of everything the fakes observed.
///
/// Entries are `"text:{body}"` and `"attach:{handler}:{locator}"`, pushed in
/// call order, so tests can assert on the interleaving of notices and
/// channel attempts.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// A recording text transport with an optional failure script.
pub struct FakeTextTransport {
    journal: Journal,
    sent: Mutex<Vec<(String, String)>>,
    script: Mutex<VecDeque<Result<(), TransportError>>>,
}

impl FakeTextTransport {
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            sent: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
        })
    }

    /// Queues results to return for upcoming sends, in order. Once the queue
    /// is drained, further sends succeed.
    pub fn script(&self, results: Vec<Result<(), TransportError>>) {
        self.script.lock().unwrap().extend(results);
    }

    /// The `(address, body)` pairs sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// The bodies sent so far.
    pub fn bodies(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, body)| body).collect()
    }
}

#[async_trait]
impl TextTransport for FakeTextTransport {
    async fn send_text(&self, address: &str, body: &str) -> Result<(), TransportError> {
        self.journal.lock().unwrap().push(format!("text:{}", body));
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        if result.is_ok() {
            self.sent
                .lock()
                .unwrap()
                .push((address.to_string(), body.to_string()));
        }
        result
    }
}

/// How a fake handler responds to attachment sends.
#[derive(Debug, Clone)]
pub enum HandlerBehavior {
    Accept,
    Reject(String),
    /// Never completes; used with paused time to exercise attempt timeouts.
    Hang,
    /// Simulates an unusable transport object (the fatal tier).
    Fault(String),
}

/// A recording attachment transport with per-handler scripted behavior.
pub struct FakeAttachmentTransport {
    journal: Journal,
    behaviors: HashMap<String, HandlerBehavior>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeAttachmentTransport {
    /// Creates a transport where every handler accepts.
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            behaviors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Creates a transport with explicit per-handler behavior. Handlers not
    /// listed reject with `"absent"`.
    pub fn with_behaviors(
        journal: Journal,
        behaviors: Vec<(&str, HandlerBehavior)>,
    ) -> Arc<Self> {
        Arc::new(Self {
            journal,
            behaviors: behaviors
                .into_iter()
                .map(|(handler, behavior)| (handler.to_string(), behavior))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// The `(handler, locator)` pairs attempted so far, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttachmentTransport for FakeAttachmentTransport {
    async fn send_attachment(
        &self,
        handler: &str,
        _address: &str,
        locator: &str,
        _caption: &str,
    ) -> Result<(), TransportError> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("attach:{}:{}", handler, locator));
        self.calls
            .lock()
            .unwrap()
            .push((handler.to_string(), locator.to_string()));

        let behavior = if self.behaviors.is_empty() {
            HandlerBehavior::Accept
        } else {
            self.behaviors
                .get(handler)
                .cloned()
                .unwrap_or(HandlerBehavior::Reject("absent".to_string()))
        };

        match behavior {
            HandlerBehavior::Accept => Ok(()),
            HandlerBehavior::Reject(reason) => Err(TransportError::Rejected(reason)),
            HandlerBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            HandlerBehavior::Fault(reason) => Err(TransportError::Fault(reason)),
        }
    }
}

/// An attachment store backed by a fixed set of present locators.
pub struct StaticStore {
    present: HashSet<String>,
}

impl StaticStore {
    pub fn with_present(locators: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            present: locators.into_iter().map(str::to_string).collect(),
        })
    }
}

#[async_trait]
impl AttachmentStore for StaticStore {
    async fn exists(&self, locator: &str) -> bool {
        self.present.contains(locator)
    }
}

/// A store that reports every locator as present.
pub struct AllPresentStore;

#[async_trait]
impl AttachmentStore for AllPresentStore {
    async fn exists(&self, _locator: &str) -> bool {
        true
    }
}

/// A wait policy that returns immediately but counts invocations.
#[derive(Default)]
pub struct CountingWait {
    settles: AtomicUsize,
}

impl CountingWait {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn settles(&self) -> usize {
        self.settles.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WaitPolicy for CountingWait {
    async fn settle(&self) {
        self.settles.fetch_add(1, Ordering::SeqCst);
    }
}
