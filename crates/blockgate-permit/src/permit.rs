//! Execution permit capability and the blocking-call boundary.
//!
//! ```text
//! enter() ──► PermitHeld ──blocking(op)──► BoundaryGuard::release
//!                                              │  op() runs, permit free
//!                                              ▼
//!                                          Drop: reacquire
//! ```
//!
//! The permit is an explicit value handed to whoever performs native calls.
//! Holding it is proven by a [`PermitHeld`]; releasing it is scoped by a
//! [`BoundaryGuard`], whose `Drop` reacquires on every exit path out of the
//! native call, unwinding included.

use std::cell::{RefCell, UnsafeCell};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PermitMode;
use crate::error::BoundaryError;
use crate::metrics::{BoundaryMetrics, BoundarySnapshot};
use crate::raw::{HostHooks, LocalPermit, NoPermit, PermitKind, RawPermit};

const NO_HOLDER: u64 = 0;

static NEXT_PERMIT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_THREAD_TOKEN: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_TOKEN: u64 = NEXT_THREAD_TOKEN.fetch_add(1, Ordering::Relaxed);
    // Ids of permits this thread has released and not yet reacquired.
    static OPEN_WINDOWS: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Process-unique, never-zero token for the calling thread.
fn current_thread_token() -> u64 {
    THREAD_TOKEN.with(|token| *token)
}

fn open_window(permit_id: u64) {
    let _ = OPEN_WINDOWS.try_with(|windows| windows.borrow_mut().push(permit_id));
}

fn close_window(permit_id: u64) {
    let _ = OPEN_WINDOWS.try_with(|windows| {
        let mut windows = windows.borrow_mut();
        if let Some(pos) = windows.iter().rposition(|&id| id == permit_id) {
            windows.remove(pos);
        }
    });
}

/// The runtime's global execution permit.
pub struct ExecutionPermit {
    id: u64,
    raw: Box<dyn RawPermit>,
    exclusive: bool,
    // Token of the thread currently holding the permit. Only maintained for
    // exclusive backends; a passthrough permit has no single holder.
    holder: AtomicU64,
    metrics: BoundaryMetrics,
}

impl ExecutionPermit {
    /// Wrap an arbitrary backend.
    #[must_use]
    pub fn new<R: RawPermit + 'static>(raw: R) -> Self {
        let exclusive = raw.exclusive();
        Self {
            id: NEXT_PERMIT_ID.fetch_add(1, Ordering::Relaxed),
            raw: Box::new(raw),
            exclusive,
            holder: AtomicU64::new(NO_HOLDER),
            metrics: BoundaryMetrics::new(),
        }
    }

    /// Crate-owned single permit.
    #[must_use]
    pub fn local() -> Self {
        Self::new(LocalPermit::new())
    }

    /// Permit owned by the host runtime.
    #[must_use]
    pub fn host(hooks: HostHooks) -> Self {
        Self::new(hooks)
    }

    /// Permit that does nothing, for runtimes without a global lock.
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(NoPermit)
    }

    /// Build the permit a given mode calls for.
    ///
    /// `Host` without installed hooks has nothing to release and degrades to
    /// a passthrough.
    #[must_use]
    pub fn for_mode(mode: PermitMode, hooks: Option<HostHooks>) -> Self {
        match (mode, hooks) {
            (PermitMode::Host, Some(hooks)) => Self::host(hooks),
            _ => Self::passthrough(),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> PermitKind {
        self.raw.kind()
    }

    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    #[must_use]
    pub fn metrics(&self) -> &BoundaryMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn stats(&self) -> BoundarySnapshot {
        self.metrics.snapshot()
    }

    /// Whether the calling thread is the recorded holder.
    ///
    /// Always false for passthrough permits.
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.exclusive && self.holder.load(Ordering::Acquire) == current_thread_token()
    }

    /// Whether the calling thread released this permit through a
    /// [`BoundaryGuard`] that has not been dropped yet, i.e. it is running
    /// inside a native call's window.
    ///
    /// A thread in that state no longer holds the permit and must not release
    /// it again.
    #[must_use]
    pub fn is_released_by_current_thread(&self) -> bool {
        OPEN_WINDOWS
            .try_with(|windows| windows.borrow().contains(&self.id))
            .unwrap_or(false)
    }

    /// Acquire the permit, blocking until it is available.
    ///
    /// Fails with [`BoundaryError::Reentrant`] instead of self-deadlocking
    /// when the calling thread already holds it.
    pub fn enter(&self) -> Result<PermitHeld<'_>, BoundaryError> {
        self.check_not_reentrant()?;
        self.raw.acquire();
        Ok(self.claim())
    }

    /// Acquire the permit if it is free right now.
    pub fn try_enter(&self) -> Result<Option<PermitHeld<'_>>, BoundaryError> {
        self.check_not_reentrant()?;
        if self.raw.try_acquire() {
            Ok(Some(self.claim()))
        } else {
            Ok(None)
        }
    }

    /// Run `f` with the permit held, releasing it afterward.
    pub fn with<F, R>(&self, f: F) -> Result<R, BoundaryError>
    where
        F: FnOnce(&mut PermitHeld<'_>) -> R,
    {
        let mut held = self.enter()?;
        Ok(f(&mut held))
    }

    /// Proof of holding for a thread that entered from the host runtime with
    /// the permit already taken. Dropping the proof does not release.
    ///
    /// # Safety
    ///
    /// The calling thread must hold the permit for the whole lifetime of the
    /// returned value, and no other [`PermitHeld`] for this permit may be
    /// alive on this thread. In particular the thread must not be inside one
    /// of the permit's release windows
    /// ([`is_released_by_current_thread`](Self::is_released_by_current_thread)).
    #[must_use]
    pub unsafe fn assume_held(&self) -> PermitHeld<'_> {
        let previous_holder = if self.exclusive {
            self.holder.swap(current_thread_token(), Ordering::AcqRel)
        } else {
            NO_HOLDER
        };
        PermitHeld {
            permit: self,
            owned: false,
            previous_holder,
            _not_send: PhantomData,
        }
    }

    fn check_not_reentrant(&self) -> Result<(), BoundaryError> {
        if self.is_held_by_current_thread() {
            return Err(BoundaryError::Reentrant { permit_id: self.id });
        }
        Ok(())
    }

    fn claim(&self) -> PermitHeld<'_> {
        if self.exclusive {
            self.holder.store(current_thread_token(), Ordering::Release);
        }
        BoundaryMetrics::inc(&self.metrics.entries);
        PermitHeld {
            permit: self,
            owned: true,
            previous_holder: NO_HOLDER,
            _not_send: PhantomData,
        }
    }
}

impl std::fmt::Debug for ExecutionPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPermit")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("holder", &self.holder.load(Ordering::Relaxed))
            .field("stats", &self.stats())
            .finish()
    }
}

/// Proof that the current thread holds an [`ExecutionPermit`].
///
/// Not `Send`: the permit belongs to the thread that acquired it.
pub struct PermitHeld<'p> {
    permit: &'p ExecutionPermit,
    owned: bool,
    previous_holder: u64,
    _not_send: PhantomData<*const ()>,
}

impl<'p> PermitHeld<'p> {
    #[must_use]
    pub fn permit(&self) -> &'p ExecutionPermit {
        self.permit
    }

    /// Run a native blocking operation with the permit released.
    ///
    /// `op` runs exactly once on this thread; its result comes back
    /// untouched. The permit is reacquired before this returns, on every
    /// path. Taking `&mut self` means nothing borrowed from this proof (such
    /// as a [`Managed`] reference) can be alive while the permit is out.
    pub fn blocking<F, R>(&mut self, op: F) -> R
    where
        F: FnOnce() -> R,
    {
        BoundaryMetrics::inc(&self.permit.metrics.blocking_calls);
        // SAFETY: `self` proves this thread holds the permit, and the `&mut`
        // borrow keeps every guarded reference dead until the guard drops.
        let _window = unsafe { BoundaryGuard::release(self.permit) };
        op()
    }
}

impl Drop for PermitHeld<'_> {
    fn drop(&mut self) {
        if self.owned {
            if self.permit.exclusive {
                self.permit.holder.store(NO_HOLDER, Ordering::Release);
            }
            // SAFETY: an owned proof is only created after a successful acquire.
            unsafe { self.permit.raw.release() };
        } else if self.permit.exclusive {
            self.permit
                .holder
                .store(self.previous_holder, Ordering::Release);
        }
    }
}

impl std::fmt::Debug for PermitHeld<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitHeld")
            .field("permit_id", &self.permit.id)
            .field("owned", &self.owned)
            .finish()
    }
}

/// Scoped release window.
///
/// Constructing it releases the permit; dropping it reacquires. Exactly one
/// release pairs with exactly one reacquire.
#[must_use = "dropping the guard reacquires the permit immediately"]
pub struct BoundaryGuard<'p> {
    permit: &'p ExecutionPermit,
    holder: u64,
    _not_send: PhantomData<*const ()>,
}

impl<'p> BoundaryGuard<'p> {
    /// Release `permit` until the returned guard is dropped.
    ///
    /// # Safety
    ///
    /// The calling thread must hold `permit`, and must not touch any value
    /// the permit guards until the guard is dropped.
    pub unsafe fn release(permit: &'p ExecutionPermit) -> Self {
        let holder = if permit.exclusive {
            permit.holder.swap(NO_HOLDER, Ordering::AcqRel)
        } else {
            NO_HOLDER
        };
        permit.metrics.note_release();
        // SAFETY: forwarded caller contract.
        unsafe { permit.raw.release() };
        open_window(permit.id);
        Self {
            permit,
            holder,
            _not_send: PhantomData,
        }
    }
}

impl Drop for BoundaryGuard<'_> {
    fn drop(&mut self) {
        self.permit.raw.acquire();
        close_window(self.permit.id);
        if self.permit.exclusive {
            self.permit.holder.store(self.holder, Ordering::Release);
        }
        self.permit
            .metrics
            .note_reacquire(std::thread::panicking());
    }
}

/// A runtime-managed value: only reachable while its permit is held.
pub struct Managed<T> {
    permit_id: u64,
    value: UnsafeCell<T>,
}

// SAFETY: every access goes through a `PermitHeld` of an exclusive permit, so
// at most one thread touches `value` at a time.
unsafe impl<T: Send> Sync for Managed<T> {}

impl<T> Managed<T> {
    /// Bind `value` to `permit`.
    pub fn new(permit: &ExecutionPermit, value: T) -> Result<Self, BoundaryError> {
        if !permit.is_exclusive() {
            return Err(BoundaryError::NotExclusive {
                permit_id: permit.id(),
            });
        }
        Ok(Self {
            permit_id: permit.id(),
            value: UnsafeCell::new(value),
        })
    }

    #[must_use]
    pub fn permit_id(&self) -> u64 {
        self.permit_id
    }

    fn check(&self, held: &PermitHeld<'_>) -> Result<(), BoundaryError> {
        let actual = held.permit.id();
        if actual != self.permit_id {
            return Err(BoundaryError::ForeignPermit {
                expected: self.permit_id,
                actual,
            });
        }
        Ok(())
    }

    pub fn get<'a>(&'a self, held: &'a PermitHeld<'_>) -> Result<&'a T, BoundaryError> {
        self.check(held)?;
        // SAFETY: the permit is held by this thread and exclusive; mutable
        // access needs `&mut PermitHeld`, which this shared borrow excludes.
        Ok(unsafe { &*self.value.get() })
    }

    pub fn get_mut<'a>(&'a self, held: &'a mut PermitHeld<'_>) -> Result<&'a mut T, BoundaryError> {
        self.check(held)?;
        // SAFETY: as in `get`, and the unique borrow of `held` excludes any
        // other reference obtained through it.
        Ok(unsafe { &mut *self.value.get() })
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T> std::fmt::Debug for Managed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Managed")
            .field("permit_id", &self.permit_id)
            .finish_non_exhaustive()
    }
}
