//! Atomic counters for boundary observability.
//!
//! All counters use relaxed ordering. They are advisory/diagnostic, not
//! synchronization primitives; the permit itself provides the ordering.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-permit boundary counters.
#[derive(Debug)]
pub struct BoundaryMetrics {
    /// Successful `enter`/`try_enter` acquisitions.
    pub entries: AtomicU64,
    /// Native calls run through a release window.
    pub blocking_calls: AtomicU64,
    /// Permit releases performed by a boundary guard.
    pub releases: AtomicU64,
    /// Permit reacquisitions performed by a boundary guard.
    pub reacquires: AtomicU64,
    /// Reacquisitions that happened while a panic was unwinding out of the call.
    pub unwinding_reacquires: AtomicU64,
    /// Threads currently parked inside a release window.
    pub in_flight: AtomicU64,
    /// High-water mark of `in_flight`.
    pub peak_in_flight: AtomicU64,
}

impl BoundaryMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: AtomicU64::new(0),
            blocking_calls: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            reacquires: AtomicU64::new(0),
            unwinding_reacquires: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            peak_in_flight: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub(crate) fn note_release(&self) {
        Self::inc(&self.releases);
        let now = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::Relaxed);
    }

    pub(crate) fn note_reacquire(&self, unwinding: bool) {
        Self::inc(&self.reacquires);
        if unwinding {
            Self::inc(&self.unwinding_reacquires);
        }
        // Saturating: a snapshot taken mid-window must never observe wraparound.
        let _ = self
            .in_flight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(1))
            });
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> BoundarySnapshot {
        BoundarySnapshot {
            entries: Self::get(&self.entries),
            blocking_calls: Self::get(&self.blocking_calls),
            releases: Self::get(&self.releases),
            reacquires: Self::get(&self.reacquires),
            unwinding_reacquires: Self::get(&self.unwinding_reacquires),
            in_flight: Self::get(&self.in_flight),
            peak_in_flight: Self::get(&self.peak_in_flight),
        }
    }
}

impl Default for BoundaryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`BoundaryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundarySnapshot {
    pub entries: u64,
    pub blocking_calls: u64,
    pub releases: u64,
    pub reacquires: u64,
    pub unwinding_reacquires: u64,
    pub in_flight: u64,
    pub peak_in_flight: u64,
}

impl BoundarySnapshot {
    /// True when every release has been matched by a reacquire.
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.releases == self.reacquires && self.in_flight == 0
    }

    /// Counter deltas since `earlier`.
    #[must_use]
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            entries: self.entries.saturating_sub(earlier.entries),
            blocking_calls: self.blocking_calls.saturating_sub(earlier.blocking_calls),
            releases: self.releases.saturating_sub(earlier.releases),
            reacquires: self.reacquires.saturating_sub(earlier.reacquires),
            unwinding_reacquires: self
                .unwinding_reacquires
                .saturating_sub(earlier.unwinding_reacquires),
            in_flight: self.in_flight,
            peak_in_flight: self.peak_in_flight,
        }
    }
}

impl std::fmt::Display for BoundarySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "entries={} calls={} releases={} reacquires={} unwinding={} in_flight={} peak={}",
            self.entries,
            self.blocking_calls,
            self.releases,
            self.reacquires,
            self.unwinding_reacquires,
            self.in_flight,
            self.peak_in_flight
        )
    }
}
