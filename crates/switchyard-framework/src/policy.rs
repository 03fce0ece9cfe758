//! Error policy: classifying handler errors and reporting failures.
//!
//! Errors coming back from handlers fall into two buckets:
//!
//! - **Control signals** ([`DispatchSignal`]) anywhere in the error's source
//!   chain are routing instructions and map to the matching [`Outcome`].
//! - Everything else is a **failure**. Failures go to the configured
//!   [`ErrorReporter`], or to the default sink (a `tracing` error event) when
//!   none is configured. Dispatch always carries on afterwards.

use std::error::Error as StdError;
use std::sync::Arc;

use tracing::error;

use switchyard_core::{BoxedBot, BoxedEvent};

use crate::error::{BoxError, DispatchSignal};
use crate::handler::HandlerId;
use crate::outcome::Outcome;
use crate::registry::GroupKey;

/// Callback invoked once for every handler failure.
///
/// Receives the bot handle, the update being dispatched and the error.
pub type ErrorReporter = Arc<dyn Fn(&BoxedBot, &BoxedEvent, &BoxError) + Send + Sync>;

/// Classifies a handler error.
///
/// Walks `err` and its `source()` chain; the first [`DispatchSignal`] found
/// decides the outcome. Errors without a signal become
/// [`Outcome::Failed`].
pub fn classify(err: BoxError) -> Outcome {
    match find_signal(&*err) {
        Some(signal) => signal.into(),
        None => Outcome::Failed(err),
    }
}

/// Returns the first control signal in the error chain, if any.
pub fn find_signal(err: &(dyn StdError + 'static)) -> Option<DispatchSignal> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(signal) = e.downcast_ref::<DispatchSignal>() {
            return Some(*signal);
        }
        current = e.source();
    }
    None
}

/// Reports handler failures to the configured reporter or the default sink.
#[derive(Clone, Default)]
pub struct ErrorPolicy {
    reporter: Option<ErrorReporter>,
}

impl ErrorPolicy {
    /// Creates a policy that logs failures through `tracing`.
    pub fn new() -> Self {
        Self { reporter: None }
    }

    /// Creates a policy that hands failures to `reporter`.
    pub fn with_reporter(reporter: ErrorReporter) -> Self {
        Self {
            reporter: Some(reporter),
        }
    }

    /// Returns `true` if a custom reporter is installed.
    pub fn has_reporter(&self) -> bool {
        self.reporter.is_some()
    }

    /// Reports a single failure.
    pub fn report(
        &self,
        bot: &BoxedBot,
        event: &BoxedEvent,
        handler: &HandlerId,
        group: GroupKey,
        err: &BoxError,
    ) {
        match &self.reporter {
            Some(reporter) => reporter(bot, event, err),
            None => error!(
                bot = bot.id(),
                event_name = event.event_name(),
                handler = %handler,
                group,
                "An error occurred: {err}"
            ),
        }
    }
}

impl std::fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("has_reporter", &self.has_reporter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestEvent, mock_bot};
    use parking_lot::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("rejected: {reason}")]
    struct Rejected {
        reason: &'static str,
        #[source]
        signal: DispatchSignal,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Rejected);

    #[derive(Debug, thiserror::Error)]
    #[error("end")]
    struct LooksLikeASignal;

    #[test]
    fn test_bare_signals() {
        assert!(matches!(
            classify(DispatchSignal::EndGroups.into()),
            Outcome::EndGroups
        ));
        assert!(matches!(
            classify(DispatchSignal::ContinueGroup.into()),
            Outcome::ContinueGroup
        ));
        assert!(matches!(
            classify(DispatchSignal::SkipCurrentGroup.into()),
            Outcome::SkipGroup
        ));
    }

    #[test]
    fn test_wrapped_signal_is_found_through_sources() {
        let err = Outer(Rejected {
            reason: "banned",
            signal: DispatchSignal::EndGroups,
        });
        assert!(matches!(classify(err.into()), Outcome::EndGroups));
    }

    #[test]
    fn test_classification_ignores_message_text() {
        assert!(matches!(
            classify(LooksLikeASignal.into()),
            Outcome::Failed(_)
        ));
        assert!(matches!(classify("end".into()), Outcome::Failed(_)));
    }

    #[test]
    fn test_reporter_receives_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let policy = ErrorPolicy::with_reporter(Arc::new(
            move |bot: &BoxedBot, event: &BoxedEvent, err: &BoxError| {
                sink.lock()
                    .push(format!("{}/{}/{}", bot.id(), event.event_name(), err));
            },
        ));

        let err: BoxError = "boom".into();
        policy.report(
            &mock_bot(),
            &TestEvent::boxed("message"),
            &HandlerId::new("a"),
            0,
            &err,
        );

        assert!(policy.has_reporter());
        assert_eq!(*seen.lock(), vec!["test-bot/message/boom".to_string()]);
    }

    #[test]
    fn test_default_sink_does_not_panic() {
        let policy = ErrorPolicy::new();
        let err: BoxError = "boom".into();
        policy.report(
            &mock_bot(),
            &TestEvent::boxed("message"),
            &HandlerId::new("a"),
            3,
            &err,
        );
        assert!(!policy.has_reporter());
    }
}
