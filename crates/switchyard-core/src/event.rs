//! Event system for Switchyard.
//!
//! An [`Event`] is one inbound unit of activity delivered by the producer.
//! The dispatcher treats it as opaque: it only ever needs a name for logging
//! and a way for handlers to get the concrete type back.
//!
//! ```rust,ignore
//! use switchyard_core::{BoxedEvent, Event};
//! use std::any::Any;
//!
//! struct Message {
//!     text: String,
//! }
//!
//! impl Event for Message {
//!     fn event_name(&self) -> &'static str {
//!         "message"
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let event = BoxedEvent::new(Message { text: "hi".into() });
//! assert_eq!(event.downcast_ref::<Message>().unwrap().text, "hi");
//! ```

use std::any::Any;
use std::sync::Arc;

/// The base trait for all updates routed by the dispatcher.
///
/// Events are type-erased as `dyn Event` and can be downcast to concrete
/// types using [`as_any`](Event::as_any).
pub trait Event: Any + Send + Sync {
    /// Returns the human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the producer-assigned update identifier, if the producer has one.
    fn update_id(&self) -> Option<i64> {
        None
    }
}

/// A type-erased, immutable container for events.
///
/// `BoxedEvent` wraps any [`Event`] in an `Arc`, so handing the same update to
/// many handlers never copies it.
///
/// `BoxedEvent` implements `Deref<Target = dyn Event>`:
///
/// ```rust,ignore
/// let event: BoxedEvent = /* ... */;
/// let name = event.event_name();
/// ```
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Creates a new `BoxedEvent` from any type implementing `Event`.
    pub fn new<E: Event + 'static>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Returns the inner `Arc<dyn Event>`.
    pub fn inner(&self) -> &Arc<dyn Event> {
        &self.inner
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event + 'static>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }

    /// Returns `true` if the wrapped event is of type `E`.
    pub fn is<E: Event + 'static>(&self) -> bool {
        self.inner.as_any().is::<E>()
    }
}

impl<E: Event + 'static> From<E> for BoxedEvent {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .field("update_id", &self.update_id())
            .finish()
    }
}
