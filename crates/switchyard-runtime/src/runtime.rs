//! Runtime orchestration.
//!
//! The runtime ties configuration, logging and the dispatcher together and
//! owns the bounded update channel between the producer and the loop.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! let runtime = SwitchyardRuntime::new();
//! runtime.dispatcher().add(my_handler);
//!
//! let (sender, receiver) = runtime.channel();
//! tokio::spawn(produce_updates(sender));
//!
//! // Returns once every sender has been dropped.
//! let stats = runtime.run(bot, receiver).await;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use switchyard_core::{BoxedBot, BoxedEvent, Event};
use switchyard_framework::{BoxError, DispatchStats, Dispatcher, ErrorReporter};

use crate::config::{ConfigLoader, SwitchyardConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Switchyard runtime.
pub struct SwitchyardRuntime {
    config: SwitchyardConfig,
    dispatcher: Dispatcher,
}

impl SwitchyardRuntime {
    /// Creates a runtime from the configuration found in the current
    /// directory, falling back to defaults if it cannot be loaded.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                SwitchyardConfig::default()
            });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Installs the global log subscriber unless one is already present.
    pub fn from_config(config: &SwitchyardConfig) -> Self {
        Self::with_reporter(config, None)
    }

    fn with_reporter(config: &SwitchyardConfig, reporter: Option<ErrorReporter>) -> Self {
        logging::init_from_config(&config.logging);

        let mut builder = Dispatcher::builder().catch_panics(config.dispatcher.catch_panics);
        if let Some(reporter) = reporter {
            builder = builder.shared_error_reporter(reporter);
        }

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            channel_capacity = config.dispatcher.channel_capacity,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            dispatcher: builder.build(),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &SwitchyardConfig {
        &self.config
    }

    /// Returns the dispatcher, for registering handlers and groups.
    ///
    /// Registration keeps working while [`run`](Self::run) is active.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Creates a bounded update channel sized from
    /// `dispatcher.channel_capacity`.
    pub fn channel(&self) -> (EventSender, EventReceiver) {
        let (tx, rx) = mpsc::channel(self.config.dispatcher.channel_capacity.max(1));
        (EventSender { inner: tx }, EventReceiver { inner: rx })
    }

    /// Runs the dispatch loop until every [`EventSender`] has been dropped
    /// and the queued updates are drained.
    pub async fn run(&self, bot: BoxedBot, receiver: EventReceiver) -> DispatchStats {
        info!(bot = bot.id(), "Switchyard runtime is now running");
        self.dispatcher.run(bot, receiver.inner).await;

        let stats = self.dispatcher.stats();
        info!(
            updates = stats.updates,
            invocations = stats.invocations,
            failures = stats.failures,
            halted = stats.halted,
            "Switchyard runtime stopped"
        );
        stats
    }
}

impl Default for SwitchyardRuntime {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Update channel
// =============================================================================

/// Producer side of the update channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::Sender<BoxedEvent>,
}

impl EventSender {
    /// Sends an update, waiting while the channel is full.
    pub async fn send<E: Event>(&self, event: E) -> RuntimeResult<()> {
        self.send_boxed(BoxedEvent::new(event)).await
    }

    /// Sends an already boxed update.
    pub async fn send_boxed(&self, event: BoxedEvent) -> RuntimeResult<()> {
        self.inner
            .send(event)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Returns `true` once the receiving loop is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Consumer side of the update channel, handed to [`SwitchyardRuntime::run`].
#[derive(Debug)]
pub struct EventReceiver {
    inner: mpsc::Receiver<BoxedEvent>,
}

impl EventReceiver {
    /// Returns the underlying tokio receiver, for use with
    /// [`Dispatcher::run`] directly.
    pub fn into_inner(self) -> mpsc::Receiver<BoxedEvent> {
        self.inner
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `SwitchyardRuntime` with custom configuration.
///
/// ```rust,ignore
/// let runtime = SwitchyardRuntime::builder()
///     .config_file("config/switchyard.toml")
///     .profile("production")
///     .error_reporter(|bot, event, err| alert(bot, event, err))
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    error_reporter: Option<ErrorReporter>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            error_reporter: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a configuration on top of files and environment.
    pub fn config(mut self, config: SwitchyardConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Routes handler failures to `reporter` instead of the log.
    pub fn error_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&BoxedBot, &BoxedEvent, &BoxError) + Send + Sync + 'static,
    {
        self.error_reporter = Some(Arc::new(reporter));
        self
    }

    /// Loads the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<SwitchyardRuntime> {
        let config = self.config_loader.load()?;
        Ok(SwitchyardRuntime::with_reporter(&config, self.error_reporter))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use switchyard_core::Bot;
    use switchyard_framework::{HandlerBuilder, Outcome};

    use crate::config::ConfigError;

    struct Ping(u32);

    impl Event for Ping {
        fn event_name(&self) -> &'static str {
            "ping"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NullBot;

    impl Bot for NullBot {
        fn id(&self) -> &str {
            "null"
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn quiet_config() -> SwitchyardConfig {
        let mut config = SwitchyardConfig::default();
        config.dispatcher.channel_capacity = 4;
        config
    }

    #[tokio::test]
    async fn test_run_until_senders_dropped() {
        let runtime = SwitchyardRuntime::from_config(&quiet_config());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        runtime.dispatcher().add(HandlerBuilder::new().on::<Ping>().handle(
            move |_bot, ctx| {
                let counter = Arc::clone(&counter);
                async move {
                    let n = ctx.event_as::<Ping>().map_or(0, |p| p.0);
                    counter.fetch_add(n as usize, Ordering::SeqCst);
                }
            },
        ));

        let (sender, receiver) = runtime.channel();
        let producer = tokio::spawn(async move {
            for n in 1..=3 {
                sender.send(Ping(n)).await.unwrap();
            }
        });

        let stats = runtime.run(Arc::new(NullBot), receiver).await;
        producer.await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 6);
        assert_eq!(stats.updates, 3);
        assert_eq!(stats.invocations, 3);
    }

    #[tokio::test]
    async fn test_send_after_loop_gone() {
        let runtime = SwitchyardRuntime::from_config(&quiet_config());
        let (sender, receiver) = runtime.channel();
        drop(receiver);

        assert!(sender.is_closed());
        assert!(matches!(
            sender.send(Ping(1)).await,
            Err(RuntimeError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn test_builder_reporter_and_config() {
        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let mut config = quiet_config();
        config.dispatcher.catch_panics = false;

        let runtime = SwitchyardRuntime::builder()
            .search_path(std::env::temp_dir().join("switchyard-runtime-test-none"))
            .without_env()
            .config(config)
            .error_reporter(move |_bot, _event, _err| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        assert_eq!(runtime.config().dispatcher.channel_capacity, 4);
        assert!(!runtime.config().dispatcher.catch_panics);

        runtime
            .dispatcher()
            .add(HandlerBuilder::new().handle(|_bot, _ctx| async { Outcome::failed("nope") }));
        let (sender, receiver) = runtime.channel();
        sender.send(Ping(1)).await.unwrap();
        drop(sender);

        let stats = runtime.run(Arc::new(NullBot), receiver).await;
        assert_eq!(stats.failures, 1);
        assert_eq!(reported.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_builder_surfaces_config_errors() {
        let result = SwitchyardRuntime::builder()
            .config_file("definitely-missing.toml")
            .build();

        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::FileNotFound(_)))
        ));
    }
}
