//! Update dispatcher for the Switchyard framework.
//!
//! The [`Dispatcher`] owns the [`GroupRegistry`] and drains the update
//! channel. For every update:
//!
//! 1. Groups are visited in ascending key order
//! 2. Inside a group, handlers are visited in registration order
//! 3. A handler whose `check` fails is skipped
//! 4. A matching handler gets a fresh [`Context`] and its [`Outcome`] decides
//!    what happens next (see [`crate::outcome`])
//!
//! ```rust,ignore
//! use switchyard_framework::{Dispatcher, HandlerBuilder, Outcome};
//!
//! let dispatcher = Dispatcher::new();
//!
//! // Group -1: runs first, can veto everything else
//! dispatcher.add_to_group(-1, HandlerBuilder::new()
//!     .id("antispam")
//!     .check(|event| is_spam(event))
//!     .handle(|_bot, _ctx| async { Outcome::EndGroups }));
//!
//! // Group 0: the default group
//! dispatcher.add(HandlerBuilder::new()
//!     .on::<Message>()
//!     .handle(|bot, ctx| async move { reply(bot, ctx).await }));
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(100);
//! dispatcher.run(bot, rx).await;
//! ```
//!
//! # Concurrent registration
//!
//! Registration methods take `&self` and may be called from any task while
//! [`run`](Dispatcher::run) is active. The registry is guarded by a
//! read/write lock; each update is dispatched against a snapshot taken when
//! it starts, so changes apply from the next update on.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{FutureExt, Stream, StreamExt};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{Instrument, Level, debug, info, span, trace};

use switchyard_core::{BoxedBot, BoxedEvent};

use crate::context::Context;
use crate::error::{BoxError, HandlerPanicked};
use crate::handler::{BoxedHandler, HandlerId};
use crate::outcome::Outcome;
use crate::policy::{ErrorPolicy, ErrorReporter};
use crate::registry::{GroupKey, GroupRegistry};

/// What happened to a single update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Sequence number assigned to the update.
    pub sequence: u64,
    /// Number of `handle` calls made.
    pub invoked: usize,
    /// Number of failures reported.
    pub failures: usize,
    /// Whether a handler ended dispatch with [`Outcome::EndGroups`].
    pub halted: bool,
}

/// Counters accumulated over the dispatcher's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Updates dispatched.
    pub updates: u64,
    /// `handle` calls made.
    pub invocations: u64,
    /// Failures reported.
    pub failures: u64,
    /// Updates cut short by [`Outcome::EndGroups`].
    pub halted: u64,
}

#[derive(Default)]
struct StatsCounters {
    updates: AtomicU64,
    invocations: AtomicU64,
    failures: AtomicU64,
    halted: AtomicU64,
}

impl StatsCounters {
    fn record(&self, report: &DispatchReport) {
        self.updates.fetch_add(1, Ordering::Relaxed);
        self.invocations
            .fetch_add(report.invoked as u64, Ordering::Relaxed);
        self.failures
            .fetch_add(report.failures as u64, Ordering::Relaxed);
        if report.halted {
            self.halted.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            updates: self.updates.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            halted: self.halted.load(Ordering::Relaxed),
        }
    }
}

struct DispatcherInner {
    registry: RwLock<GroupRegistry>,
    policy: ErrorPolicy,
    catch_panics: bool,
    sequence: AtomicU64,
    stats: StatsCounters,
}

/// The central update dispatcher.
///
/// `Dispatcher` is a cheap handle: clones share the same registry, error
/// policy and statistics, so one clone can run the loop while another keeps
/// registering handlers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Creates a dispatcher that logs handler failures through `tracing`.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a dispatcher that hands handler failures to `reporter`.
    pub fn with_reporter<F>(reporter: F) -> Self
    where
        F: Fn(&BoxedBot, &BoxedEvent, &BoxError) + Send + Sync + 'static,
    {
        Self::builder().error_reporter(reporter).build()
    }

    /// Returns a builder for custom dispatcher settings.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    // ─── Registration ─────────────────────────────────────────────────────────

    /// Appends `handler` to group `key`. Returns the handler's id.
    pub fn add_to_group(&self, key: GroupKey, handler: BoxedHandler) -> HandlerId {
        self.inner.registry.write().add_to_group(key, handler)
    }

    /// Appends `handler` to the default group `0`. Returns the handler's id.
    pub fn add(&self, handler: BoxedHandler) -> HandlerId {
        self.inner.registry.write().add(handler)
    }

    /// Removes the whole group `key`. Returns `false` if it did not exist.
    pub fn remove_group(&self, key: GroupKey) -> bool {
        self.inner.registry.write().remove_group(key)
    }

    /// Removes the first handler with id `id`. Returns `false` if none matched.
    pub fn remove_handler(&self, id: &HandlerId) -> bool {
        self.inner.registry.write().remove_handler(id)
    }

    /// Returns the active group keys in ascending order.
    pub fn group_keys(&self) -> Vec<GroupKey> {
        self.inner.registry.read().group_keys()
    }

    /// Returns the total number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Returns the lifetime counters.
    pub fn stats(&self) -> DispatchStats {
        self.inner.stats.snapshot()
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────────

    /// Drains `updates` until the channel is closed, dispatching each update
    /// in arrival order.
    pub async fn run(&self, bot: BoxedBot, mut updates: mpsc::Receiver<BoxedEvent>) {
        info!(bot = bot.id(), "Dispatcher started");
        while let Some(event) = updates.recv().await {
            self.process_update(&bot, event).await;
        }
        info!(bot = bot.id(), "Update channel closed, dispatcher stopped");
    }

    /// Like [`run`](Self::run), for any stream of updates.
    pub async fn run_stream<S>(&self, bot: BoxedBot, updates: S)
    where
        S: Stream<Item = BoxedEvent>,
    {
        info!(bot = bot.id(), "Dispatcher started");
        let mut updates = std::pin::pin!(updates);
        while let Some(event) = updates.next().await {
            self.process_update(&bot, event).await;
        }
        info!(bot = bot.id(), "Update stream ended, dispatcher stopped");
    }

    /// Dispatches a single update through every group.
    pub async fn process_update(&self, bot: &BoxedBot, event: BoxedEvent) -> DispatchReport {
        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let span = span!(
            Level::DEBUG,
            "dispatch",
            event_name = %event.event_name(),
            sequence
        );

        let report = self
            .dispatch_groups(bot, &event, sequence)
            .instrument(span)
            .await;
        self.inner.stats.record(&report);
        report
    }

    async fn dispatch_groups(
        &self,
        bot: &BoxedBot,
        event: &BoxedEvent,
        sequence: u64,
    ) -> DispatchReport {
        let groups = self.inner.registry.read().snapshot();
        let mut report = DispatchReport {
            sequence,
            ..Default::default()
        };

        'groups: for (key, handlers) in &groups {
            for handler in handlers {
                if !handler.check(event) {
                    continue;
                }

                let id = handler.id();
                let ctx = Context::new(event.clone(), Arc::clone(bot), *key, id.clone(), sequence);
                trace!(group = key, handler = %id, "Invoking handler");
                report.invoked += 1;

                match self.invoke(handler, bot, ctx).await {
                    Outcome::Handled | Outcome::SkipGroup => {
                        trace!(group = key, handler = %id, "Group finished");
                        continue 'groups;
                    }
                    Outcome::EndGroups => {
                        debug!(group = key, handler = %id, "Handler ended dispatch");
                        report.halted = true;
                        break 'groups;
                    }
                    Outcome::ContinueGroup => {}
                    Outcome::Failed(err) => {
                        report.failures += 1;
                        self.inner.policy.report(bot, event, &id, *key, &err);
                    }
                }
            }
        }

        report
    }

    async fn invoke(&self, handler: &BoxedHandler, bot: &BoxedBot, ctx: Context) -> Outcome {
        if !self.inner.catch_panics {
            return handler.handle(bot, ctx).await;
        }
        match AssertUnwindSafe(handler.handle(bot, ctx))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(payload) => Outcome::failed(HandlerPanicked::from_payload(payload)),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &*self.inner.registry.read())
            .field("policy", &self.inner.policy)
            .field("catch_panics", &self.inner.catch_panics)
            .finish()
    }
}

/// Builder for [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    policy: ErrorPolicy,
    catch_panics: bool,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    /// Creates a builder with the default settings: failures are logged and
    /// panicking handlers are reported as failures.
    pub fn new() -> Self {
        Self {
            policy: ErrorPolicy::new(),
            catch_panics: true,
        }
    }

    /// Routes handler failures to `reporter` instead of the log.
    pub fn error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&BoxedBot, &BoxedEvent, &BoxError) + Send + Sync + 'static,
    {
        self.policy = ErrorPolicy::with_reporter(Arc::new(reporter));
        self
    }

    /// Routes handler failures to an already shared reporter.
    pub fn shared_error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.policy = ErrorPolicy::with_reporter(reporter);
        self
    }

    /// Whether a panicking handler is reported as a failure (default) or
    /// unwinds through the dispatch loop.
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// Builds the dispatcher with an empty registry.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            inner: Arc::new(DispatcherInner {
                registry: RwLock::new(GroupRegistry::new()),
                policy: self.policy,
                catch_panics: self.catch_panics,
                sequence: AtomicU64::new(0),
                stats: StatsCounters::default(),
            }),
        }
    }
}
