//! Testing utilities for the fortune house.
//!
//! This module provides tools for integration testing:
//! - `MockGateway` for deterministic chat tests without API calls
//! - `TestHarness` wiring a shared in-memory store into both the draw
//!   session and the chat manager
//! - Assertion helpers for verifying conversation state

use crate::chat::{ChatConfig, ChatManager, CompletionGateway, Conversation, Message};
use crate::clock::FixedClock;
use crate::draw::DrawSession;
use crate::store::MemoryStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A completion gateway that returns scripted replies.
///
/// Use this for deterministic integration tests without API calls. Replies
/// are consumed in order; once exhausted, a canned default is returned so
/// tests never hang on an empty script.
#[derive(Clone, Default)]
pub struct MockGateway {
    script: Arc<Mutex<VecDeque<Result<String, deepseek::Error>>>>,
    last_request: Arc<Mutex<Option<deepseek::Request>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(text.into()));
    }

    /// Queue a failure, to exercise the fallback path.
    pub fn queue_failure(&self) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(deepseek::Error::Network(
                "scripted network failure".to_string(),
            )));
    }

    /// The most recent request, for asserting on prompt composition.
    pub fn last_request(&self) -> Option<deepseek::Request> {
        self.last_request.lock().unwrap().clone()
    }

    /// The system prompt of the most recent request.
    pub fn last_system_prompt(&self) -> Option<String> {
        self.last_request().and_then(|r| r.system)
    }
}

impl CompletionGateway for MockGateway {
    async fn generate(&self, request: deepseek::Request) -> Result<String, deepseek::Error> {
        *self.last_request.lock().unwrap() = Some(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("（剧本演完了，小精灵即兴发挥中）".to_string()))
    }
}

/// Test harness for running fortune-house scenarios.
///
/// Draw session and chat manager share one store, as the real surfaces do,
/// so cross-cutting effects (a wipe, a saved prompt override) are visible
/// to both.
pub struct TestHarness {
    pub store: MemoryStore,
    pub clock: FixedClock,
    pub gateway: MockGateway,
    pub draws: DrawSession<MemoryStore, FixedClock>,
    pub chat: ChatManager<MemoryStore, FixedClock, MockGateway>,
}

impl TestHarness {
    /// A harness pinned to an arbitrary test date.
    pub fn new() -> Self {
        Self::on_date("2026-06-01")
    }

    /// A harness pinned to the given date.
    pub fn on_date(date: &str) -> Self {
        let store = MemoryStore::new();
        let clock = FixedClock::new(date);
        let gateway = MockGateway::new();
        let draws = DrawSession::load(store.clone(), clock.clone());
        let chat = ChatManager::load(
            store.clone(),
            clock.clone(),
            gateway.clone(),
            ChatConfig::default(),
        );
        Self {
            store,
            clock,
            gateway,
            draws,
            chat,
        }
    }

    /// Rebuild both managers from the store, simulating an app restart on
    /// the given date.
    pub fn reload_on(&mut self, date: &str) {
        self.clock = FixedClock::new(date);
        self.draws = DrawSession::load(self.store.clone(), self.clock.clone());
        self.chat = ChatManager::load(
            self.store.clone(),
            self.clock.clone(),
            self.gateway.clone(),
            ChatConfig::default(),
        );
    }

    /// The active conversation, which the scenario expects to exist.
    #[track_caller]
    pub fn active(&self) -> &Conversation {
        self.chat
            .active_conversation()
            .expect("expected an active conversation")
    }

    /// Messages of the active conversation.
    #[track_caller]
    pub fn messages(&self) -> &[Message] {
        &self.active().messages
    }

    /// Content of the last message in the active conversation.
    #[track_caller]
    pub fn last_message(&self) -> &str {
        self.messages()
            .last()
            .map(|m| m.content.as_str())
            .expect("expected at least one message")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the active conversation holds exactly this many messages.
#[track_caller]
pub fn assert_message_count(harness: &TestHarness, expected: usize) {
    let actual = harness.messages().len();
    assert_eq!(
        actual, expected,
        "Expected {expected} messages in the active conversation, got {actual}"
    );
}

/// Assert the last message in the active conversation contains a fragment.
#[track_caller]
pub fn assert_last_message_contains(harness: &TestHarness, fragment: &str) {
    let last = harness.last_message();
    assert!(
        last.contains(fragment),
        "Expected last message to contain '{fragment}', got '{last}'"
    );
}
