//! The single-flight scheduler that owns the mutable cache slot.

use crate::consumer::Consumer;
use crate::context::AnalysisContext;
use crate::deps::DependencyState;
use lumen_analysis::{Analyzer, InvocationKey};
use lumen_common::{CancelFlag, CancellableOutcome};
use lumen_config::ServiceConfig;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Monotonic counters describing the coordinator's decisions so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Analyzer builds started (cache misses).
    pub builds_started: u64,
    /// Requests served from the cached context without an analyzer call.
    pub cache_hits: u64,
    /// Requests attached to an already in-flight build.
    pub joins: u64,
    /// Times the current context was invalidated (dependency change or
    /// external notification).
    pub invalidations: u64,
}

#[derive(Default)]
struct StatCounters {
    builds_started: AtomicU64,
    cache_hits: AtomicU64,
    joins: AtomicU64,
    invalidations: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> CoordinatorStats {
        CoordinatorStats {
            builds_started: self.builds_started.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            joins: self.joins.load(Ordering::SeqCst),
            invalidations: self.invalidations.load(Ordering::SeqCst),
        }
    }
}

/// An in-progress build ticket that identical requests attach to instead of
/// starting a redundant build.
struct InFlight {
    id: u64,
    key: InvocationKey,
    waiters: Arc<Mutex<Vec<Consumer>>>,
    attached: Arc<AtomicUsize>,
    cancel: CancelFlag,
}

/// The one mutable cache slot plus the in-flight build tickets.
#[derive(Default)]
struct Slot {
    current: Option<Arc<AnalysisContext>>,
    in_flight: Vec<InFlight>,
}

struct Inner {
    analyzer: Arc<dyn Analyzer>,
    options: RwLock<ServiceConfig>,
    slot: Mutex<Slot>,
    /// External "files changed" notification. Set without the metadata lock
    /// so notification producers never block; drained into the current
    /// context's own flag on the next request.
    externally_invalidated: AtomicBool,
    stats: StatCounters,
    next_build_id: AtomicU64,
}

/// For a given `(key, offset)` demand, produces exactly one validated
/// [`AnalysisContext`] per distinct concurrent demand and delivers it (or a
/// failure/cancellation) to every attached [`Consumer`].
///
/// The coordinator is the sole serialization point for cache-slot mutation
/// and build initiation. Its metadata lock is held only for bookkeeping —
/// never while the analyzer runs. Cheap and cloneable; clones share state.
#[derive(Clone)]
pub struct BuildCoordinator {
    inner: Arc<Inner>,
}

impl BuildCoordinator {
    /// Creates a coordinator over the given analyzer collaborator.
    pub fn new(analyzer: Arc<dyn Analyzer>, config: ServiceConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                analyzer,
                options: RwLock::new(config),
                slot: Mutex::new(Slot::default()),
                externally_invalidated: AtomicBool::new(false),
                stats: StatCounters::default(),
                next_build_id: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a coordinator with the default service configuration.
    pub fn with_defaults(analyzer: Arc<dyn Analyzer>) -> Self {
        Self::new(analyzer, ServiceConfig::default())
    }

    /// Replaces the runtime tuning options.
    pub fn set_options(&self, config: ServiceConfig) {
        *self.inner.options.write() = config;
    }

    /// The current runtime tuning options.
    pub fn options(&self) -> ServiceConfig {
        *self.inner.options.read()
    }

    /// Notifies the coordinator that files on disk may have changed.
    ///
    /// Lock-free: a single atomic store, safe to call from any thread at
    /// any time (e.g. a filesystem watcher callback). The next request
    /// re-validates against this.
    pub fn mark_invalidated(&self) {
        self.inner.externally_invalidated.store(true, Ordering::Release);
    }

    /// A snapshot of the decision counters.
    pub fn stats(&self) -> CoordinatorStats {
        self.inner.stats.snapshot()
    }

    /// Requests a validated context for `(key, offset)`.
    ///
    /// Never blocks the caller beyond brief bookkeeping. The result is
    /// delivered asynchronously through the consumer's callback: either
    /// synchronously right here (cache hit), or later from the build thread
    /// (join or fresh build).
    pub fn request(&self, key: InvocationKey, offset: usize, consumer: Consumer) {
        let config = *self.inner.options.read();
        let mut slot = self.inner.slot.lock();

        // Drain the external notification into the current context.
        if self.inner.externally_invalidated.swap(false, Ordering::AcqRel) {
            if let Some(ctx) = &slot.current {
                ctx.mark_invalidated();
                self.inner.stats.invalidations.fetch_add(1, Ordering::SeqCst);
                debug!(key = %ctx.key().digest(), "context invalidated by external notification");
            }
        }

        if let Some(ctx) = slot.current.clone() {
            if !ctx.is_invalidated() && *ctx.key() == key {
                if ctx.deps_due(config.dependency_check_interval)
                    && ctx.refresh_deps(self.inner.analyzer.as_ref())
                {
                    ctx.mark_invalidated();
                    self.inner.stats.invalidations.fetch_add(1, Ordering::SeqCst);
                    debug!(key = %key.digest(), "dependencies changed; context invalidated");
                }

                if !ctx.is_invalidated()
                    && ctx.reuse_count() < config.max_ast_reuse_count
                    && ctx.is_locally_reanalyzable(offset)
                    && consumer.accepts(ctx.snapshot())
                {
                    let reuse = ctx.increment_reuse();
                    self.inner.stats.cache_hits.fetch_add(1, Ordering::SeqCst);
                    drop(slot);
                    debug!(key = %key.digest(), offset, reuse, "cache hit");
                    consumer.deliver(CancellableOutcome::Success(ctx));
                    return;
                }
            }
        }

        // Single-flight: attach to an in-flight build for an equal key.
        // An abandoned build (all of its consumers cancelled, so its shared
        // cancel flag is already raised) cannot be joined: the one-shot flag
        // stays raised and the analyzer may bail at its next safe point, so
        // a late joiner would inherit a cancellation it never asked for.
        // Such tickets are treated as absent and a fresh build starts.
        if let Some(build) = slot
            .in_flight
            .iter()
            .find(|b| b.key == key && !b.cancel.is_triggered())
        {
            Self::attach(build, consumer);
            self.inner.stats.joins.fetch_add(1, Ordering::SeqCst);
            debug!(key = %key.digest(), build = build.id, "joined in-flight build");
            return;
        }

        // Fresh build.
        let id = self.inner.next_build_id.fetch_add(1, Ordering::SeqCst);
        let build = InFlight {
            id,
            key: key.clone(),
            waiters: Arc::new(Mutex::new(Vec::new())),
            attached: Arc::new(AtomicUsize::new(0)),
            cancel: CancelFlag::new(),
        };
        Self::attach(&build, consumer);
        let waiters = Arc::clone(&build.waiters);
        let cancel = build.cancel.clone();
        slot.in_flight.push(build);
        self.inner.stats.builds_started.fetch_add(1, Ordering::SeqCst);
        drop(slot);
        debug!(key = %key.digest(), build = id, "starting analyzer build");

        let inner = Arc::clone(&self.inner);
        std::thread::spawn(move || run_build(&inner, id, key, waiters, cancel));
    }

    /// Adds a consumer to a build's waiter list and wires its cancellation
    /// so the build is abandoned once zero consumers remain attached.
    fn attach(build: &InFlight, consumer: Consumer) {
        let attached = Arc::clone(&build.attached);
        let cancel = build.cancel.clone();
        let id = build.id;
        attached.fetch_add(1, Ordering::SeqCst);
        consumer.set_detach_hook(Box::new(move || {
            if attached.fetch_sub(1, Ordering::SeqCst) == 1 {
                debug!(build = id, "last consumer detached; abandoning build");
                cancel.trigger();
            }
        }));
        build.waiters.lock().push(consumer);
    }
}

/// Runs one analyzer build to completion and fans the result out.
///
/// Executes on a dedicated thread; the metadata lock is only taken after
/// the analyzer returns, to install the result and collect waiters.
fn run_build(
    inner: &Arc<Inner>,
    id: u64,
    key: InvocationKey,
    waiters: Arc<Mutex<Vec<Consumer>>>,
    cancel: CancelFlag,
) {
    let outcome = inner
        .analyzer
        .build_context(&key, cancel.clone())
        .map(|snapshot| {
            let dep_paths = inner.analyzer.list_dependencies(&snapshot);
            let deps = DependencyState::capture(inner.analyzer.as_ref(), dep_paths);
            Arc::new(AnalysisContext::new(key.clone(), snapshot, deps))
        });

    let waiters: Vec<Consumer> = {
        let mut slot = inner.slot.lock();
        slot.in_flight.retain(|b| b.id != id);

        match &outcome {
            CancellableOutcome::Success(ctx) if !cancel.is_triggered() => {
                // Last build to complete wins the slot. The superseded
                // context stays alive while second-phase references exist.
                slot.current = Some(Arc::clone(ctx));
                debug!(key = %key.digest(), build = id, "installed new context");
            }
            CancellableOutcome::Success(_) => {
                debug!(build = id, "abandoned build finished; result discarded");
            }
            CancellableOutcome::Failure(message) => {
                // Never cached; any previous context stays current.
                debug!(build = id, %message, "build failed");
            }
            CancellableOutcome::Cancelled => {
                debug!(build = id, "build cancelled");
            }
        }

        std::mem::take(&mut *waiters.lock())
    };

    // Fan out without any lock held. Consumers that cancelled while the
    // build ran discard this silently.
    for consumer in waiters {
        consumer.deliver(outcome.clone());
    }
}
