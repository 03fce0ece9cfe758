//! # Switchyard Framework
//!
//! The dispatching layer of Switchyard.
//!
//! This layer provides:
//! - The [`Handler`] contract and its [`Outcome`] routing decisions
//! - The [`GroupRegistry`] that orders handlers into integer-keyed groups
//! - The [`Dispatcher`] that drains an update channel and walks the groups
//! - The error policy that separates control signals from failures
//! - Closure ([`HandlerBuilder`]) and tower ([`ServiceHandler`]) adapters
//!
//! Transport, update decoding and the bot's own API are out of scope: updates
//! arrive as [`BoxedEvent`](switchyard_core::BoxedEvent)s from whatever
//! producer owns the channel.

pub mod builder;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod outcome;
pub mod policy;
pub mod registry;
pub mod service;

#[cfg(test)]
mod testing;

pub use builder::{CheckFn, HandlerBuilder};
pub use context::Context;
pub use dispatcher::{DispatchReport, DispatchStats, Dispatcher, DispatcherBuilder};
pub use error::{BoxError, DispatchSignal, HandlerPanicked};
pub use handler::{BoxedHandler, Handler, HandlerId, boxed};
pub use outcome::{IntoOutcome, Outcome};
pub use policy::{ErrorPolicy, ErrorReporter, classify};
pub use registry::{DEFAULT_GROUP, GroupKey, GroupRegistry};
pub use service::ServiceHandler;
