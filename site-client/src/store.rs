use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::watch;

/// Holder for one store's state bundle.
///
/// Readers take snapshots or subscribe; only the owning store writes. Each
/// request takes an epoch from `begin`, and its completion is applied only if
/// no newer request has begun since.
pub(crate) struct StateCell<S> {
    state: watch::Sender<S>,
    epoch: AtomicU64,
    in_flight: AtomicUsize,
}

impl<S: Clone> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            epoch: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    pub fn update(&self, modify: impl FnOnce(&mut S)) {
        self.state.send_modify(modify);
    }

    /// Starts a request and returns its epoch.
    pub fn begin(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Latest epoch handed out by `begin`.
    pub fn current(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// Applies `modify` only if `epoch` is still the latest. Returns whether it
    /// was applied.
    pub fn apply_if_current(&self, epoch: u64, modify: impl FnOnce(&mut S)) -> bool {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            modify(state);
            true
        })
    }

    /// Marks one more operation in flight; returns the new count.
    pub fn enter(&self) -> usize {
        self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Marks one operation finished; returns how many remain.
    pub fn leave(&self) -> usize {
        self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1)
    }
}
