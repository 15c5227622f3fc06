//! Cooperative cancellation flag shared between a scheduler and a worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag polled cooperatively at safe points.
///
/// Triggering is one-shot and idempotent. The worker is never interrupted:
/// it is legal for it to finish its work after the flag is raised and have
/// the result discarded by the scheduler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, untriggered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Calling this more than once has no further effect.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once the flag has been raised.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        assert!(!CancelFlag::new().is_triggered());
    }

    #[test]
    fn trigger_is_idempotent() {
        let flag = CancelFlag::new();
        flag.trigger();
        flag.trigger();
        assert!(flag.is_triggered());
    }

    #[test]
    fn clones_share_state() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.trigger();
        assert!(flag.is_triggered());
    }
}
