//! Per-invocation context.
//!
//! A [`Context`] is built by the dispatcher for every single handler call.
//! It wraps the update together with the metadata the dispatcher has about
//! that call: which group is being evaluated, which handler is running, and
//! the update's sequence number. It carries no state from one update, or one
//! handler, to the next.

use switchyard_core::{BoxedBot, BoxedEvent, Event};

use crate::handler::HandlerId;
use crate::registry::GroupKey;

/// The context passed to [`Handler::handle`](crate::Handler::handle).
#[derive(Debug, Clone)]
pub struct Context {
    event: BoxedEvent,
    bot: BoxedBot,
    group: GroupKey,
    handler: HandlerId,
    sequence: u64,
}

impl Context {
    /// Creates a new context for one handler invocation.
    pub fn new(
        event: BoxedEvent,
        bot: BoxedBot,
        group: GroupKey,
        handler: HandlerId,
        sequence: u64,
    ) -> Self {
        Self {
            event,
            bot,
            group,
            handler,
            sequence,
        }
    }

    /// Returns the update being dispatched.
    pub fn event(&self) -> &BoxedEvent {
        &self.event
    }

    /// Downcasts the update to a concrete event type.
    pub fn event_as<E: Event>(&self) -> Option<&E> {
        self.event.downcast_ref::<E>()
    }

    /// Returns the bot the update was received for.
    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    /// Returns the key of the group being evaluated.
    pub fn group(&self) -> GroupKey {
        self.group
    }

    /// Returns the id of the handler this context was built for.
    pub fn handler_id(&self) -> &HandlerId {
        &self.handler
    }

    /// Returns the dispatcher-assigned sequence number of the update.
    ///
    /// Sequence numbers start at 1 and increase by one per update.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consumes the context, returning the update.
    pub fn into_event(self) -> BoxedEvent {
        self.event
    }
}
