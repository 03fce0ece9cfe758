//! Bot handle trait.
//!
//! A [`Bot`] is the external session the producer received updates for.
//! Switchyard never calls into it; it is threaded through to handlers and to
//! the error reporter so they can act on the remote service.

use std::any::Any;
use std::sync::Arc;

/// The bot handle passed to handlers and error reporters.
///
/// Concrete implementations (an HTTP client, a websocket session, ...)
/// provide their own API surface; handlers recover it through
/// [`as_any`](Bot::as_any) and `Arc::downcast`.
pub trait Bot: Send + Sync + 'static {
    /// Returns the bot's unique identifier.
    fn id(&self) -> &str;

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    ///
    /// Implementors should simply return `self`:
    ///
    /// ```rust,ignore
    /// fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
    ///     self
    /// }
    /// ```
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;

impl std::fmt::Debug for dyn Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot").field("id", &self.id()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBot {
        token: &'static str,
    }

    impl Bot for EchoBot {
        fn id(&self) -> &str {
            "echo"
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_downcast_boxed_bot() {
        let bot: BoxedBot = Arc::new(EchoBot { token: "secret" });
        assert_eq!(bot.id(), "echo");
        assert_eq!(format!("{bot:?}"), "Bot { id: \"echo\" }");

        let concrete = Arc::clone(&bot)
            .as_any()
            .downcast::<EchoBot>()
            .ok()
            .map(|b| b.token);
        assert_eq!(concrete, Some("secret"));
    }
}
