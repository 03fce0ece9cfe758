//! Closure-based handler construction.
//!
//! [`HandlerBuilder`] turns a check and an async closure into a
//! [`BoxedHandler`] without a dedicated type:
//!
//! ```rust,ignore
//! use switchyard_framework::{DispatchSignal, HandlerBuilder};
//!
//! let handler = HandlerBuilder::new()
//!     .id("ban-filter")
//!     .on::<Message>()
//!     .check(|event| is_banned(event))
//!     .handle(|_bot, _ctx| async { Err::<(), _>(DispatchSignal::EndGroups) });
//! ```
//!
//! Checks added with [`check`](HandlerBuilder::check) and
//! [`on`](HandlerBuilder::on) are combined: all of them must pass. Without
//! any check the handler matches every update.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use switchyard_core::{BoxedBot, BoxedEvent, Event};

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler, HandlerId};
use crate::outcome::{IntoOutcome, Outcome};

/// A type-erased check function.
pub type CheckFn = Arc<dyn Fn(&BoxedEvent) -> bool + Send + Sync>;

type HandleFn = Arc<dyn Fn(BoxedBot, Context) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// Builder for closure-backed handlers.
#[derive(Clone, Default)]
pub struct HandlerBuilder {
    id: Option<HandlerId>,
    checks: Vec<CheckFn>,
}

impl HandlerBuilder {
    /// Creates a builder that matches every update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler id. A random id is used if none is given.
    pub fn id(mut self, id: impl Into<HandlerId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a check; the handler only runs when every check passes.
    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&BoxedEvent) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(f));
        self
    }

    /// Restricts the handler to updates of concrete type `E`.
    pub fn on<E: Event>(self) -> Self {
        self.check(|event| event.is::<E>())
    }

    /// Finishes the handler with its action.
    ///
    /// The closure receives an owned bot handle and the invocation context;
    /// its return value is converted with [`IntoOutcome`].
    pub fn handle<F, Fut, R>(self, f: F) -> BoxedHandler
    where
        F: Fn(BoxedBot, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome,
    {
        let handle: HandleFn = Arc::new(move |bot: BoxedBot, ctx: Context| {
            f(bot, ctx).map(R::into_outcome).boxed()
        });
        Arc::new(FnHandler {
            id: self.id.unwrap_or_else(HandlerId::random),
            checks: self.checks,
            handle,
        })
    }
}

impl std::fmt::Debug for HandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerBuilder")
            .field("id", &self.id)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// The handler produced by [`HandlerBuilder::handle`].
struct FnHandler {
    id: HandlerId,
    checks: Vec<CheckFn>,
    handle: HandleFn,
}

#[async_trait]
impl Handler for FnHandler {
    fn id(&self) -> HandlerId {
        self.id.clone()
    }

    fn check(&self, event: &BoxedEvent) -> bool {
        self.checks.iter().all(|check| check(event))
    }

    async fn handle(&self, bot: &BoxedBot, ctx: Context) -> Outcome {
        (self.handle)(Arc::clone(bot), ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, DispatchSignal};
    use crate::testing::{TestEvent, mock_bot};

    struct Other;

    impl Event for Other {
        fn event_name(&self) -> &'static str {
            "other"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn ctx_for(event: BoxedEvent, handler: &BoxedHandler) -> Context {
        Context::new(event, mock_bot(), 0, handler.id(), 1)
    }

    #[test]
    fn test_default_matches_everything_with_random_id() {
        let a = HandlerBuilder::new().handle(|_bot, _ctx| async {});
        let b = HandlerBuilder::new().handle(|_bot, _ctx| async {});

        assert!(a.check(&TestEvent::boxed("message")));
        assert!(a.check(&BoxedEvent::new(Other)));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_checks_are_combined() {
        let handler = HandlerBuilder::new()
            .id("hello")
            .on::<TestEvent>()
            .check(|event| {
                event
                    .downcast_ref::<TestEvent>()
                    .is_some_and(|e| e.text.starts_with("hello"))
            })
            .handle(|_bot, _ctx| async {});

        assert_eq!(handler.id(), HandlerId::new("hello"));
        assert!(handler.check(&TestEvent::with_text("message", "hello there")));
        assert!(!handler.check(&TestEvent::with_text("message", "bye")));
        assert!(!handler.check(&BoxedEvent::new(Other)));
    }

    #[tokio::test]
    async fn test_return_values_become_outcomes() {
        let bot = mock_bot();
        let event = TestEvent::boxed("message");

        let unit = HandlerBuilder::new().handle(|_bot, _ctx| async {});
        let outcome = unit.handle(&bot, ctx_for(event.clone(), &unit)).await;
        assert!(matches!(outcome, Outcome::Handled));

        let signal = HandlerBuilder::new()
            .handle(|_bot, _ctx| async { Err::<(), BoxError>(DispatchSignal::EndGroups.into()) });
        let outcome = signal.handle(&bot, ctx_for(event.clone(), &signal)).await;
        assert!(matches!(outcome, Outcome::EndGroups));

        let failure = HandlerBuilder::new()
            .handle(|_bot, _ctx| async { Err::<(), _>(std::io::Error::other("disk full")) });
        let outcome = failure.handle(&bot, ctx_for(event, &failure)).await;
        match outcome {
            Outcome::Failed(err) => assert_eq!(err.to_string(), "disk full"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closure_sees_bot_and_context() {
        let handler = HandlerBuilder::new().id("probe").handle(|bot, ctx| async move {
            assert_eq!(bot.id(), "test-bot");
            assert_eq!(ctx.handler_id().as_str(), "probe");
            match ctx.event_as::<TestEvent>() {
                Some(e) if e.text == "ping" => Outcome::ContinueGroup,
                _ => Outcome::Handled,
            }
        });

        let outcome = handler
            .handle(&mock_bot(), ctx_for(TestEvent::with_text("message", "ping"), &handler))
            .await;
        assert!(matches!(outcome, Outcome::ContinueGroup));
    }
}
