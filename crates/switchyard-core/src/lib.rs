//! # Switchyard Core
//!
//! Foundation types shared by every Switchyard layer.
//!
//! The dispatcher never inspects the updates it routes or the bot it routes
//! them for. Both are consumed through the narrow, type-erased interfaces
//! defined here:
//!
//! - **Event System**: opaque inbound updates with runtime downcasting
//!   ([`Event`], [`BoxedEvent`])
//! - **Bot Handle**: the external session handed to handlers ([`Bot`],
//!   [`BoxedBot`])
//!
//! ```text
//! ┌──────────┐     ┌─────────┐     ┌────────────┐     ┌──────────┐
//! │ Producer │────▶│ Channel │────▶│ Dispatcher │────▶│ Handlers │
//! └──────────┘     └─────────┘     └────────────┘     └──────────┘
//! ```

pub mod bot;
pub mod event;

pub use bot::{Bot, BoxedBot};
pub use event::{BoxedEvent, Event};
