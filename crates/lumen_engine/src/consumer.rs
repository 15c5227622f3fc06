//! The exactly-once delivery channel between the coordinator and a client.

use crate::context::AnalysisContext;
use lumen_analysis::AnalysisSnapshot;
use lumen_common::CancellableOutcome;
use parking_lot::Mutex;
use std::sync::Arc;

/// The client's result callback. Invoked exactly once, ever, with one of
/// `Success`/`Failure`/`Cancelled`.
pub type ContextCallback = Box<dyn FnOnce(CancellableOutcome<Arc<AnalysisContext>>) + Send>;

/// Predicate deciding whether a consumer accepts a context built for a
/// slightly different but compatible source snapshot. Only consulted for
/// contexts built from in-memory edits.
///
/// Must be cheap: the coordinator evaluates it while holding its metadata
/// lock, so a slow predicate stalls every concurrent request.
pub type SnapshotPredicate = Box<dyn Fn(&AnalysisSnapshot) -> bool + Send + Sync>;

enum DeliveryState {
    /// Waiting; holds the callback.
    Pending(ContextCallback),
    /// The client cancelled; `Cancelled` has been delivered.
    Cancelled,
    /// A result has been delivered. Terminal.
    Delivered,
}

struct Shared {
    state: Mutex<DeliveryState>,
    /// Hook installed while this consumer is attached to an in-flight
    /// build; run on cancellation so the build learns it lost a waiter.
    detach: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// One client's attachment to a context request.
///
/// Carries the result callback and, optionally, a snapshot-compatibility
/// predicate. Delivery is exactly-once: a second delivery attempt to a
/// consumer that already received a result is a coordinator bug and aborts
/// the process. Delivery to a consumer that cancelled is a legal race and
/// is silently discarded.
pub struct Consumer {
    shared: Arc<Shared>,
    accepts_from_memory: Option<SnapshotPredicate>,
}

/// One-shot, idempotent cancellation for a single [`Consumer`].
///
/// Once triggered, the consumer's only callback invocation carries
/// `Cancelled` — never a late `Success` or `Failure`. Triggering after
/// delivery has no effect.
#[derive(Clone)]
pub struct CancellationHandle {
    shared: Arc<Shared>,
}

impl Consumer {
    /// Creates a consumer around a result callback, returning it together
    /// with the client's cancellation handle.
    pub fn new(callback: ContextCallback) -> (Self, CancellationHandle) {
        let shared = Arc::new(Shared {
            state: Mutex::new(DeliveryState::Pending(callback)),
            detach: Mutex::new(None),
        });
        let handle = CancellationHandle {
            shared: Arc::clone(&shared),
        };
        (
            Self {
                shared,
                accepts_from_memory: None,
            },
            handle,
        )
    }

    /// Attaches a predicate for accepting contexts built from in-memory
    /// edits. Without one, such contexts are never served to this consumer.
    pub fn with_snapshot_predicate(mut self, predicate: SnapshotPredicate) -> Self {
        self.accepts_from_memory = Some(predicate);
        self
    }

    /// Whether this consumer can be served the given cached snapshot.
    ///
    /// On-disk-built snapshots are acceptable to everyone; in-memory-built
    /// ones require an accepting predicate.
    pub fn accepts(&self, snapshot: &AnalysisSnapshot) -> bool {
        if !snapshot.is_from_memory() {
            return true;
        }
        self.accepts_from_memory
            .as_ref()
            .is_some_and(|predicate| predicate(snapshot))
    }

    /// Delivers the result to the client.
    ///
    /// # Panics
    ///
    /// Panics if this consumer was already delivered a result: that is a
    /// correctness bug in the coordinator, not a recoverable condition.
    pub fn deliver(&self, outcome: CancellableOutcome<Arc<AnalysisContext>>) {
        let callback = {
            let mut state = self.shared.state.lock();
            match std::mem::replace(&mut *state, DeliveryState::Delivered) {
                DeliveryState::Pending(callback) => callback,
                DeliveryState::Cancelled => {
                    // Legal race: the build finished after the client
                    // cancelled. The result is discarded.
                    *state = DeliveryState::Cancelled;
                    return;
                }
                DeliveryState::Delivered => {
                    panic!("consumer delivered twice: coordinator invariant violated")
                }
            }
        };
        // The consumer is detached from any build by virtue of being
        // delivered; the hook must not fire later.
        self.shared.detach.lock().take();
        callback(outcome);
    }

    /// Installs the detach hook for the in-flight build this consumer was
    /// just attached to. If the consumer cancelled before the attachment
    /// completed, the hook runs immediately.
    pub(crate) fn set_detach_hook(&self, hook: Box<dyn FnOnce() + Send>) {
        // Hold the state lock across installation so a concurrent cancel
        // cannot slip between the check and the store and orphan the hook.
        let state = self.shared.state.lock();
        if matches!(*state, DeliveryState::Cancelled) {
            drop(state);
            hook();
        } else {
            *self.shared.detach.lock() = Some(hook);
        }
    }
}

impl CancellationHandle {
    /// Cancels the consumer.
    ///
    /// If no result has been delivered yet, the callback fires immediately
    /// with `Cancelled` and the consumer is detached from any in-flight
    /// build. Cancelling more than once, or after delivery, has no effect.
    /// The build itself is not aborted unless no consumers remain attached.
    pub fn cancel(&self) {
        let callback = {
            let mut state = self.shared.state.lock();
            match std::mem::replace(&mut *state, DeliveryState::Cancelled) {
                DeliveryState::Pending(callback) => Some(callback),
                DeliveryState::Cancelled => None,
                DeliveryState::Delivered => {
                    *state = DeliveryState::Delivered;
                    None
                }
            }
        };
        let Some(callback) = callback else {
            return;
        };
        if let Some(hook) = self.shared.detach.lock().take() {
            hook();
        }
        callback(CancellableOutcome::Cancelled);
    }
}
