//! Tower service adapter.
//!
//! [`ServiceHandler`] registers any `tower::Service<Context>` as a handler,
//! so existing middleware (timeouts, rate limits, ...) can wrap the action:
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//! use switchyard_framework::ServiceHandler;
//!
//! let service = ServiceBuilder::new()
//!     .timeout(Duration::from_secs(5))
//!     .service_fn(|ctx: Context| async move { reply(ctx).await });
//!
//! dispatcher.add(ServiceHandler::new(service).with_id("reply").on::<Message>().boxed());
//! ```
//!
//! The service's response and error are converted with
//! [`IntoOutcome`]: a `DispatchSignal` in the error chain routes dispatch,
//! any other error is reported as a failure.

use std::sync::Arc;

use async_trait::async_trait;
use tower::{Service, ServiceExt};

use switchyard_core::{BoxedBot, BoxedEvent, Event};

use crate::builder::CheckFn;
use crate::context::Context;
use crate::error::BoxError;
use crate::handler::{BoxedHandler, Handler, HandlerId};
use crate::outcome::{IntoOutcome, Outcome};

/// A handler backed by a tower service.
///
/// The service is cloned for every invocation and driven with
/// [`ServiceExt::oneshot`], which waits for readiness before calling it.
#[derive(Clone)]
pub struct ServiceHandler<S> {
    id: HandlerId,
    checks: Vec<CheckFn>,
    service: S,
}

impl<S> ServiceHandler<S> {
    /// Wraps `service` with a random id and no checks.
    pub fn new(service: S) -> Self {
        Self {
            id: HandlerId::random(),
            checks: Vec::new(),
            service,
        }
    }

    /// Sets the handler id.
    ///
    /// Named apart from [`Handler::id`], which reads it back.
    pub fn with_id(mut self, id: impl Into<HandlerId>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds a check; the service only runs when every check passes.
    pub fn with_check<F>(mut self, f: F) -> Self
    where
        F: Fn(&BoxedEvent) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Arc::new(f));
        self
    }

    /// Restricts the handler to updates of concrete type `E`.
    pub fn on<E: Event>(self) -> Self {
        self.with_check(|event| event.is::<E>())
    }
}

impl<S> ServiceHandler<S>
where
    S: Service<Context> + Clone + Send + Sync + 'static,
    S::Response: IntoOutcome,
    S::Error: Into<BoxError> + Send + 'static,
    S::Future: Send,
{
    /// Erases the handler for registration.
    pub fn boxed(self) -> BoxedHandler {
        Arc::new(self)
    }
}

#[async_trait]
impl<S> Handler for ServiceHandler<S>
where
    S: Service<Context> + Clone + Send + Sync + 'static,
    S::Response: IntoOutcome,
    S::Error: Into<BoxError> + Send + 'static,
    S::Future: Send,
{
    fn id(&self) -> HandlerId {
        self.id.clone()
    }

    fn check(&self, event: &BoxedEvent) -> bool {
        self.checks.iter().all(|check| check(event))
    }

    async fn handle(&self, _bot: &BoxedBot, ctx: Context) -> Outcome {
        self.service.clone().oneshot(ctx).await.into_outcome()
    }
}

impl<S> std::fmt::Debug for ServiceHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHandler")
            .field("id", &self.id)
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchSignal;
    use crate::testing::{TestEvent, mock_bot};
    use tower::service_fn;

    fn ctx_for(event: BoxedEvent, id: HandlerId) -> Context {
        Context::new(event, mock_bot(), 0, id, 1)
    }

    #[tokio::test]
    async fn test_service_response_becomes_outcome() {
        let handler = ServiceHandler::new(service_fn(|ctx: Context| async move {
            Ok::<_, BoxError>(if ctx.event().event_name() == "ping" {
                Outcome::ContinueGroup
            } else {
                Outcome::Handled
            })
        }))
        .with_id("svc");

        let outcome = handler
            .handle(&mock_bot(), ctx_for(TestEvent::boxed("ping"), handler.id()))
            .await;
        assert!(matches!(outcome, Outcome::ContinueGroup));
    }

    #[tokio::test]
    async fn test_service_errors_are_classified() {
        let signal = ServiceHandler::new(service_fn(|_ctx: Context| async {
            Err::<(), BoxError>(DispatchSignal::SkipCurrentGroup.into())
        }));
        let outcome = signal
            .handle(&mock_bot(), ctx_for(TestEvent::boxed("message"), signal.id()))
            .await;
        assert!(matches!(outcome, Outcome::SkipGroup));

        let failure = ServiceHandler::new(service_fn(|_ctx: Context| async {
            Err::<(), BoxError>("upstream timeout".into())
        }));
        let outcome = failure
            .handle(&mock_bot(), ctx_for(TestEvent::boxed("message"), failure.id()))
            .await;
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_checks_and_boxing() {
        let handler = ServiceHandler::new(service_fn(|_ctx: Context| async {
            Ok::<_, BoxError>(())
        }))
        .with_id("typed")
        .on::<TestEvent>()
        .with_check(|event| event.event_name() != "ignored")
        .boxed();

        assert_eq!(handler.id().as_str(), "typed");
        assert!(handler.check(&TestEvent::boxed("message")));
        assert!(!handler.check(&TestEvent::boxed("ignored")));
    }
}
