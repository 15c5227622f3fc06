//! The three-state result container for cancellable asynchronous operations.

use std::fmt;

/// The result of an operation that can succeed, fail, or be cancelled.
///
/// This is the return channel for every asynchronous operation in the
/// service. Cancellation is deliberately distinct from failure so that
/// clients can tell "nothing went wrong, I just stopped caring" apart from
/// "something went wrong".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellableOutcome<T> {
    /// The operation completed and produced a value.
    Success(T),
    /// The operation could not complete; the message is client-facing.
    Failure(String),
    /// The operation was abandoned before completion.
    Cancelled,
}

/// The discriminant of a [`CancellableOutcome`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// A `Success` outcome.
    Success,
    /// A `Failure` outcome.
    Failure,
    /// A `Cancelled` outcome.
    Cancelled,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Success => write!(f, "success"),
            OutcomeKind::Failure => write!(f, "failure"),
            OutcomeKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl<T> CancellableOutcome<T> {
    /// Returns the discriminant of this outcome.
    pub fn kind(&self) -> OutcomeKind {
        match self {
            CancellableOutcome::Success(_) => OutcomeKind::Success,
            CancellableOutcome::Failure(_) => OutcomeKind::Failure,
            CancellableOutcome::Cancelled => OutcomeKind::Cancelled,
        }
    }

    /// Returns `true` if this outcome is `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, CancellableOutcome::Success(_))
    }

    /// Returns `true` if this outcome is `Cancelled`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancellableOutcome::Cancelled)
    }

    /// Returns the success value, discarding failure/cancellation.
    pub fn success(self) -> Option<T> {
        match self {
            CancellableOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Transforms the success value, leaving `Failure` and `Cancelled`
    /// unchanged (the failure message is preserved verbatim).
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CancellableOutcome<U> {
        match self {
            CancellableOutcome::Success(value) => CancellableOutcome::Success(f(value)),
            CancellableOutcome::Failure(message) => CancellableOutcome::Failure(message),
            CancellableOutcome::Cancelled => CancellableOutcome::Cancelled,
        }
    }

    /// Chains a transform that itself produces a `CancellableOutcome`.
    ///
    /// This is how phase-1 (context acquisition) and phase-2
    /// (operation-specific computation) compose: the transform only runs on
    /// `Success`; `Failure` and `Cancelled` pass through unchanged.
    pub fn and_then<U>(
        self,
        f: impl FnOnce(T) -> CancellableOutcome<U>,
    ) -> CancellableOutcome<U> {
        match self {
            CancellableOutcome::Success(value) => f(value),
            CancellableOutcome::Failure(message) => CancellableOutcome::Failure(message),
            CancellableOutcome::Cancelled => CancellableOutcome::Cancelled,
        }
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for CancellableOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => CancellableOutcome::Success(value),
            Err(err) => CancellableOutcome::Failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_transforms_success() {
        let outcome = CancellableOutcome::Success(2).map(|n| n * 10);
        assert_eq!(outcome, CancellableOutcome::Success(20));
    }

    #[test]
    fn map_preserves_failure_kind_and_message() {
        let outcome: CancellableOutcome<i32> =
            CancellableOutcome::Failure("bad arguments".to_string());
        let mapped = outcome.map(|n| n * 10);
        assert_eq!(mapped, CancellableOutcome::Failure("bad arguments".to_string()));
    }

    #[test]
    fn map_preserves_cancelled_kind() {
        let outcome: CancellableOutcome<i32> = CancellableOutcome::Cancelled;
        let mapped = outcome.map(|n| n * 10);
        assert_eq!(mapped.kind(), OutcomeKind::Cancelled);
    }

    #[test]
    fn and_then_chains_success() {
        let outcome =
            CancellableOutcome::Success(5).and_then(|n| CancellableOutcome::Success(n + 1));
        assert_eq!(outcome, CancellableOutcome::Success(6));
    }

    #[test]
    fn and_then_can_introduce_failure() {
        let outcome: CancellableOutcome<i32> = CancellableOutcome::Success(5)
            .and_then(|_| CancellableOutcome::Failure("phase 2 broke".to_string()));
        assert_eq!(outcome.kind(), OutcomeKind::Failure);
    }

    #[test]
    fn and_then_is_identity_on_kind_for_non_success() {
        let failure: CancellableOutcome<i32> = CancellableOutcome::Failure("oops".to_string());
        let chained = failure.and_then(|_| CancellableOutcome::Success("unreachable"));
        assert_eq!(chained, CancellableOutcome::Failure("oops".to_string()));

        let cancelled: CancellableOutcome<i32> = CancellableOutcome::Cancelled;
        let chained = cancelled.and_then(|_| CancellableOutcome::Success("unreachable"));
        assert_eq!(chained.kind(), OutcomeKind::Cancelled);
    }

    #[test]
    fn from_result() {
        let ok: CancellableOutcome<i32> = Ok::<_, std::io::Error>(7).into();
        assert_eq!(ok, CancellableOutcome::Success(7));

        let err: CancellableOutcome<i32> =
            Err::<i32, _>(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into();
        assert_eq!(err, CancellableOutcome::Failure("gone".to_string()));
    }

    #[test]
    fn success_accessor() {
        assert_eq!(CancellableOutcome::Success(1).success(), Some(1));
        let cancelled: CancellableOutcome<i32> = CancellableOutcome::Cancelled;
        assert_eq!(cancelled.success(), None);
    }
}
