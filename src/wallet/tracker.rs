//! Key Pair Lease Tracking
//!
//! Every `KeyPair` holds a lease from a `KeyTracker`. The lease is taken
//! when the key pair is derived and returned exactly once when it is
//! dropped, on success and on every error path. `CountingTracker` keeps
//! counters so callers can audit for leaked key material.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Accounting hook for key pair allocation
pub trait KeyTracker: Send + Sync + fmt::Debug {
    /// Register a new key pair. An error aborts the derivation.
    fn acquire(&self) -> Result<u64, String>;

    /// Return a lease. Called exactly once per successful `acquire`.
    fn release(&self, lease_id: u64);
}

/// Tracker that accepts everything and records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

impl KeyTracker for NoopTracker {
    fn acquire(&self) -> Result<u64, String> {
        Ok(0)
    }

    fn release(&self, _lease_id: u64) {}
}

/// Tracker that counts live, acquired and released leases
#[derive(Debug, Default)]
pub struct CountingTracker {
    next_id: AtomicU64,
    live: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_acquire: AtomicBool,
}

impl CountingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pairs currently allocated
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Make subsequent `acquire` calls fail, simulating exhaustion
    pub fn set_fail_acquire(&self, fail: bool) {
        self.fail_acquire.store(fail, Ordering::SeqCst);
    }
}

impl KeyTracker for CountingTracker {
    fn acquire(&self) -> Result<u64, String> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err("key pair allocation refused".to_string());
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn release(&self, _lease_id: u64) {
        self.released.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// RAII handle returning its lease on drop
pub struct KeyLease {
    tracker: Arc<dyn KeyTracker>,
    id: u64,
}

impl KeyLease {
    pub(crate) fn acquire(tracker: Arc<dyn KeyTracker>) -> Result<Self, String> {
        let id = tracker.acquire()?;
        Ok(Self { tracker, id })
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for KeyLease {
    fn drop(&mut self) {
        self.tracker.release(self.id);
    }
}

impl fmt::Debug for KeyLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLease").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_released_on_drop() {
        let tracker = Arc::new(CountingTracker::new());
        {
            let lease = KeyLease::acquire(tracker.clone()).unwrap();
            assert_eq!(lease.id(), 1);
            assert_eq!(tracker.live(), 1);
        }
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.acquired(), 1);
        assert_eq!(tracker.released(), 1);
    }

    #[test]
    fn test_failed_acquire_takes_nothing() {
        let tracker = Arc::new(CountingTracker::new());
        tracker.set_fail_acquire(true);
        assert!(KeyLease::acquire(tracker.clone()).is_err());
        assert_eq!(tracker.acquired(), 0);
        assert_eq!(tracker.released(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let tracker = Arc::new(CountingTracker::new());
        let a = KeyLease::acquire(tracker.clone()).unwrap();
        let b = KeyLease::acquire(tracker.clone()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(tracker.live(), 2);
    }
}
