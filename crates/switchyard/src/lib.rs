//! # Switchyard
//!
//! An in-process update dispatcher for bot-style applications.
//!
//! ## Overview
//!
//! A producer pushes decoded updates into a channel. The dispatcher drains it
//! one update at a time and routes each update through priority-ordered
//! groups of handlers:
//!
//! ```text
//! ┌──────────┐   channel   ┌────────────┐     group -1: [antispam]            (lowest key first)
//! │ Producer │────────────▶│ Dispatcher │────▶ group  0: [commands, echo, ...]
//! └──────────┘             └────────────┘     group 10: [logger]
//! ```
//!
//! - Within a group, the first handler whose check matches handles the
//!   update; the rest of the group is skipped.
//! - Every group gets its chance, unless a handler ends dispatch.
//! - Handlers steer this with an [`Outcome`](framework::Outcome):
//!   `Handled`, `SkipGroup`, `ContinueGroup`, `EndGroups` or `Failed`.
//! - Failures go to an error reporter and never stop the loop.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::new();
//!
//!     runtime.dispatcher().add_to_group(-1, HandlerBuilder::new()
//!         .check(|event| is_spam(event))
//!         .handle(|_bot, _ctx| async { Outcome::EndGroups }));
//!
//!     runtime.dispatcher().add(HandlerBuilder::new()
//!         .on::<Message>()
//!         .handle(|bot, ctx| async move { reply(bot, ctx).await }));
//!
//!     let (sender, receiver) = runtime.channel();
//!     tokio::spawn(read_updates(sender));
//!     runtime.run(bot, receiver).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use switchyard_runtime::{EventSender, SwitchyardConfig, SwitchyardRuntime};

    // Updates and bots
    pub use switchyard_core::{Bot, BoxedBot, BoxedEvent, Event};

    // Handlers and routing
    pub use switchyard_framework::{
        BoxError, Context, DispatchSignal, Dispatcher, GroupKey, Handler, HandlerBuilder,
        HandlerId, IntoOutcome, Outcome, ServiceHandler,
    };
}
