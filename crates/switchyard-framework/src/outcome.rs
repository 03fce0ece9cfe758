//! Handler outcomes.
//!
//! Every handler invocation resolves to an [`Outcome`], which tells the
//! dispatch loop where to go next:
//!
//! | Outcome          | Current group           | Later groups |
//! |------------------|-------------------------|--------------|
//! | `Handled`        | stop                    | run          |
//! | `SkipGroup`      | stop                    | run          |
//! | `ContinueGroup`  | next handler runs       | run          |
//! | `EndGroups`      | stop                    | skipped      |
//! | `Failed(_)`      | reported, next handler  | run          |

use crate::error::{BoxError, DispatchSignal};
use crate::policy;

/// The routing decision produced by a handler.
#[derive(Debug)]
pub enum Outcome {
    /// The update was handled; the rest of this group is skipped.
    Handled,
    /// Leave this group without handling; the next group runs.
    SkipGroup,
    /// Let the next handler of this group try as well.
    ContinueGroup,
    /// Stop dispatching this update altogether.
    EndGroups,
    /// The handler failed. The failure is reported and the next handler of
    /// this group is tried.
    Failed(BoxError),
}

impl Outcome {
    /// Builds a failed outcome from any error.
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }

    /// Returns `true` if the dispatch loop should leave the current group.
    pub fn stops_group(&self) -> bool {
        matches!(self, Self::Handled | Self::SkipGroup | Self::EndGroups)
    }

    /// Returns `true` for [`Outcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<DispatchSignal> for Outcome {
    fn from(signal: DispatchSignal) -> Self {
        match signal {
            DispatchSignal::EndGroups => Self::EndGroups,
            DispatchSignal::ContinueGroup => Self::ContinueGroup,
            DispatchSignal::SkipCurrentGroup => Self::SkipGroup,
        }
    }
}

/// Conversion from handler return values into an [`Outcome`].
///
/// - `Outcome` is passed through.
/// - `()` means the update was handled.
/// - `Result<T, E>`: `Ok` converts the inner value, `Err` is classified, so
///   returning `Err(DispatchSignal::EndGroups.into())` works like returning
///   `Outcome::EndGroups`.
pub trait IntoOutcome: Send + 'static {
    /// Converts `self` into the routing decision.
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Handled
    }
}

impl IntoOutcome for DispatchSignal {
    fn into_outcome(self) -> Outcome {
        self.into()
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError> + Send + 'static,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => policy::classify(e.into()),
        }
    }
}
