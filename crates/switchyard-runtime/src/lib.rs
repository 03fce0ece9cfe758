//! Switchyard Runtime - configuration, logging and orchestration.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `SwitchyardConfig`)
//! - Logging setup on top of `tracing-subscriber` (`LoggingBuilder`)
//! - The runtime that owns the update channel and drives the dispatcher
//!   (`SwitchyardRuntime`)
//!
//! ```ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::builder().profile("production").build()?;
//!     runtime.dispatcher().add(my_handler());
//!
//!     let (sender, receiver) = runtime.channel();
//!     tokio::spawn(read_updates(sender));
//!
//!     runtime.run(bot, receiver).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DispatcherConfig, LoggingConfig, SwitchyardConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{EventReceiver, EventSender, RuntimeBuilder, SwitchyardRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
