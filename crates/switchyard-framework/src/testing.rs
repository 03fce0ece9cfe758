//! Shared fixtures for the framework's unit tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use switchyard_core::{Bot, BoxedBot, BoxedEvent, Event};

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, HandlerId};
use crate::outcome::Outcome;

#[derive(Debug, Clone)]
pub(crate) struct TestEvent {
    pub name: &'static str,
    pub text: String,
}

impl TestEvent {
    pub fn boxed(name: &'static str) -> BoxedEvent {
        Self::with_text(name, "")
    }

    pub fn with_text(name: &'static str, text: &str) -> BoxedEvent {
        BoxedEvent::new(Self {
            name,
            text: text.to_string(),
        })
    }
}

impl Event for TestEvent {
    fn event_name(&self) -> &'static str {
        self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct MockBot;

impl Bot for MockBot {
    fn id(&self) -> &str {
        "test-bot"
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub(crate) fn mock_bot() -> BoxedBot {
    Arc::new(MockBot)
}

/// Records which handlers were checked and which were invoked, in order.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    checks: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that matches everything and returns `Handled`.
    pub fn handler(&self, name: &str) -> BoxedHandler {
        self.scripted(name, true, || Outcome::Handled)
    }

    pub fn scripted(&self, name: &str, matches: bool, outcome: fn() -> Outcome) -> BoxedHandler {
        Arc::new(ScriptedHandler {
            id: HandlerId::new(name),
            matches,
            outcome,
            recorder: self.clone(),
        })
    }

    pub fn checks(&self) -> Vec<String> {
        self.checks.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

struct ScriptedHandler {
    id: HandlerId,
    matches: bool,
    outcome: fn() -> Outcome,
    recorder: Recorder,
}

#[async_trait]
impl Handler for ScriptedHandler {
    fn id(&self) -> HandlerId {
        self.id.clone()
    }

    fn check(&self, _event: &BoxedEvent) -> bool {
        self.recorder.checks.lock().push(self.id.to_string());
        self.matches
    }

    async fn handle(&self, _bot: &BoxedBot, _ctx: Context) -> Outcome {
        self.recorder.calls.lock().push(self.id.to_string());
        (self.outcome)()
    }
}
