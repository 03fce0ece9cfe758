//! Handler contract for the Switchyard framework.
//!
//! A [`Handler`] is a matcher plus an action:
//!
//! 1. [`check`](Handler::check) decides whether the handler is eligible for
//!    an update. It must be pure and cheap.
//! 2. [`handle`](Handler::handle) does the work and returns an [`Outcome`]
//!    that steers the rest of the dispatch.
//!
//! Each handler also carries a [`HandlerId`], chosen by whoever builds it,
//! which is only used to remove it again.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_framework::{Context, Handler, HandlerId, Outcome};
//! use switchyard_core::{BoxedBot, BoxedEvent};
//!
//! struct Greeter;
//!
//! #[async_trait::async_trait]
//! impl Handler for Greeter {
//!     fn id(&self) -> HandlerId {
//!         HandlerId::new("greeter")
//!     }
//!
//!     fn check(&self, event: &BoxedEvent) -> bool {
//!         event.event_name() == "message"
//!     }
//!
//!     async fn handle(&self, _bot: &BoxedBot, ctx: Context) -> Outcome {
//!         println!("hello from group {}", ctx.group());
//!         Outcome::Handled
//!     }
//! }
//! ```
//!
//! Closures can be turned into handlers with
//! [`HandlerBuilder`](crate::builder::HandlerBuilder), and tower services
//! with [`ServiceHandler`](crate::service::ServiceHandler).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use switchyard_core::{BoxedBot, BoxedEvent};

use crate::context::Context;
use crate::outcome::Outcome;

/// Opaque identifier of a registered handler.
///
/// Identity is the string value: two ids built from the same string are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(Arc<str>);

impl HandlerId {
    /// Creates an id from a caller-chosen name.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Creates a random, practically unique id.
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({:?})", &*self.0)
    }
}

impl From<&str> for HandlerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// The core trait for update handlers.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Returns this handler's id. Must be stable for the handler's lifetime.
    fn id(&self) -> HandlerId;

    /// Returns `true` if this handler should run for `event`.
    ///
    /// Must be free of side effects: the dispatcher may call it for updates
    /// the handler never gets to handle.
    fn check(&self, event: &BoxedEvent) -> bool;

    /// Handles the update.
    ///
    /// `ctx` is built fresh for this call and dropped when it returns.
    async fn handle(&self, bot: &BoxedBot, ctx: Context) -> Outcome;
}

/// A type-erased handler that can be stored in the registry.
pub type BoxedHandler = Arc<dyn Handler>;

/// Boxes any handler.
pub fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}
