//! Raw permit backends.
//!
//! A [`RawPermit`] is the bare lock: acquire and release, no bookkeeping.
//! [`ExecutionPermit`](crate::ExecutionPermit) layers ownership tracking and
//! counters on top of one of these.

use parking_lot::lock_api::RawMutex as _;

/// Host runtime hook: `void hook(void)`.
pub type HookFn = unsafe extern "C" fn();

/// Which backend a permit runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitKind {
    /// Crate-owned lock.
    Local,
    /// Host runtime release/acquire hooks.
    Host,
    /// No lock at all.
    Passthrough,
}

impl PermitKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Host => "host",
            Self::Passthrough => "passthrough",
        }
    }
}

/// The bare global execution permit.
///
/// Implementations must uphold the runtime's invariant: while `exclusive()`
/// is true, at most one thread is between a returned `acquire` and the
/// matching `release`.
pub trait RawPermit: Send + Sync {
    /// Block until the calling thread holds the permit.
    fn acquire(&self);

    /// Try to take the permit without blocking.
    ///
    /// Backends that cannot poll (host hooks) fall back to a blocking
    /// acquire and return `true`.
    fn try_acquire(&self) -> bool {
        self.acquire();
        true
    }

    /// Give the permit back.
    ///
    /// # Safety
    ///
    /// The calling thread must currently hold the permit.
    unsafe fn release(&self);

    /// Whether holding this permit excludes every other holder.
    fn exclusive(&self) -> bool;

    /// Backend label.
    fn kind(&self) -> PermitKind;
}

/// Crate-owned single permit backed by a `parking_lot` raw mutex.
///
/// Unlike `std::sync::Mutex`, a raw mutex can be unlocked from code that
/// does not hold a guard object, which is exactly the release/reacquire
/// shape of a boundary window.
pub struct LocalPermit {
    raw: parking_lot::RawMutex,
}

impl LocalPermit {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: parking_lot::RawMutex::INIT,
        }
    }

    /// Whether any thread currently holds the permit.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for LocalPermit {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPermit")
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl RawPermit for LocalPermit {
    fn acquire(&self) {
        self.raw.lock();
    }

    fn try_acquire(&self) -> bool {
        self.raw.try_lock()
    }

    unsafe fn release(&self) {
        // SAFETY: caller holds the permit, i.e. this thread locked `raw`.
        unsafe { self.raw.unlock() };
    }

    fn exclusive(&self) -> bool {
        true
    }

    fn kind(&self) -> PermitKind {
        PermitKind::Local
    }
}

/// Permit owned by the host runtime, driven through two C hooks.
///
/// Typical hooks are the runtime's "leave the runtime system" and "enter the
/// runtime system" entry points. The hooks are trusted to implement the
/// single-holder invariant.
#[derive(Debug, Clone, Copy)]
pub struct HostHooks {
    release: HookFn,
    acquire: HookFn,
}

impl HostHooks {
    /// Wrap a release/acquire pair.
    ///
    /// # Safety
    ///
    /// Both functions must be safe to call from any thread attached to the
    /// host runtime; `release` must only be invoked by the current holder and
    /// `acquire` must block until the caller holds the permit.
    #[must_use]
    pub const unsafe fn new(release: HookFn, acquire: HookFn) -> Self {
        Self { release, acquire }
    }

    /// Build from nullable C function pointers. Returns `None` if either is
    /// null.
    ///
    /// # Safety
    ///
    /// Same contract as [`HostHooks::new`].
    #[must_use]
    pub unsafe fn from_nullable(release: Option<HookFn>, acquire: Option<HookFn>) -> Option<Self> {
        match (release, acquire) {
            // SAFETY: forwarded caller contract.
            (Some(release), Some(acquire)) => Some(unsafe { Self::new(release, acquire) }),
            _ => None,
        }
    }
}

impl RawPermit for HostHooks {
    fn acquire(&self) {
        // SAFETY: contract established in `HostHooks::new`.
        unsafe { (self.acquire)() };
    }

    unsafe fn release(&self) {
        // SAFETY: caller holds the permit; hook contract from `HostHooks::new`.
        unsafe { (self.release)() };
    }

    fn exclusive(&self) -> bool {
        true
    }

    fn kind(&self) -> PermitKind {
        PermitKind::Host
    }
}

/// Permit for runtimes without a global lock. Every operation is a no-op.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoPermit;

impl RawPermit for NoPermit {
    fn acquire(&self) {}

    fn try_acquire(&self) -> bool {
        true
    }

    unsafe fn release(&self) {}

    fn exclusive(&self) -> bool {
        false
    }

    fn kind(&self) -> PermitKind {
        PermitKind::Passthrough
    }
}
