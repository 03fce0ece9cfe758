//! Error types for the Switchyard framework.

use thiserror::Error;

pub use tower::BoxError;

/// Control signals a handler can raise through its error channel.
///
/// These are routing instructions, not failures, and never reach the error
/// reporter. They are recognised by type anywhere in an error's `source()`
/// chain, so a custom error may wrap one and still steer dispatch:
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error)]
/// #[error("user is banned")]
/// struct Banned(#[source] DispatchSignal);
///
/// // Classified exactly like a bare `DispatchSignal::EndGroups`.
/// return Err(Banned(DispatchSignal::EndGroups).into());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DispatchSignal {
    /// Stop dispatching the current update; no further groups run.
    #[error("end all groups")]
    EndGroups,

    /// Keep evaluating the remaining handlers of the current group.
    #[error("continue current group")]
    ContinueGroup,

    /// Stop the current group and move on to the next one.
    #[error("skip current group")]
    SkipCurrentGroup,
}

/// Raised in place of a handler whose future panicked.
#[derive(Debug, Clone, Error)]
#[error("handler panicked: {message}")]
pub struct HandlerPanicked {
    /// The panic payload, if it was a string.
    pub message: String,
}

impl HandlerPanicked {
    /// Builds the error from a caught panic payload.
    pub fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}
