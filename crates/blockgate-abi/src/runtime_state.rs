//! Process-wide state behind the ABI entrypoints.
//!
//! Holds the host runtime hooks, the messaging vtable, and the execution
//! permit built from them. C callers cannot carry a Rust capability around,
//! so this module is the one place the permit is looked up; everything past
//! it receives the permit explicitly.

use std::sync::Arc;

use blockgate_permit::{
    BoundarySnapshot, ExecutionPermit, HostHooks, PermitKind, PermitMode, permit_mode,
    set_permit_mode,
};
use parking_lot::RwLock;

use crate::messaging_abi::MessagingVtable;

static HOOKS: RwLock<Option<HostHooks>> = RwLock::new(None);
static MESSAGING: RwLock<Option<MessagingVtable>> = RwLock::new(None);
// Built lazily from the mode and hooks; dropped whenever either changes so
// the next call picks up the new backend. Threads mid-call keep the old one
// alive through their Arc.
static PERMIT: RwLock<Option<Arc<ExecutionPermit>>> = RwLock::new(None);

/// The permit ABI entrypoints run native calls under.
pub(crate) fn global_permit() -> Arc<ExecutionPermit> {
    if let Some(permit) = PERMIT.read().as_ref() {
        return Arc::clone(permit);
    }
    let mut slot = PERMIT.write();
    if let Some(permit) = slot.as_ref() {
        return Arc::clone(permit);
    }
    let hooks = *HOOKS.read();
    let permit = Arc::new(ExecutionPermit::for_mode(permit_mode(), hooks));
    *slot = Some(Arc::clone(&permit));
    permit
}

pub(crate) fn install_hooks(hooks: Option<HostHooks>) {
    *HOOKS.write() = hooks;
    *PERMIT.write() = None;
}

pub(crate) fn switch_mode(mode: PermitMode) {
    set_permit_mode(mode);
    *PERMIT.write() = None;
}

pub(crate) fn install_messaging(vtable: Option<MessagingVtable>) {
    *MESSAGING.write() = vtable;
}

/// Installed messaging functions, falling back to the linked libzmq.
pub(crate) fn messaging() -> Option<MessagingVtable> {
    let installed = *MESSAGING.read();
    installed.or_else(MessagingVtable::linked)
}

/// Counters of the permit currently in use.
#[must_use]
pub fn boundary_snapshot() -> BoundarySnapshot {
    global_permit().stats()
}

/// Backend of the permit currently in use.
#[must_use]
pub fn permit_kind() -> PermitKind {
    global_permit().kind()
}

/// Forget hooks, vtable and permit. Test-only entrypoint.
#[doc(hidden)]
pub fn reset_state_for_tests() {
    *HOOKS.write() = None;
    *MESSAGING.write() = None;
    *PERMIT.write() = None;
}
