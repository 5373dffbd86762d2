//! Generic blocking-call boundary and runtime hook installation.

use std::ffi::{c_int, c_void};

use blockgate_core::errno;
use blockgate_permit::{ExecutionPermit, HookFn, HostHooks, PermitMode};

use crate::errno_abi::{get_errno, set_errno};
use crate::runtime_state;

/// A native blocking operation taking one opaque argument.
pub type NativeOp = unsafe extern "C" fn(*mut c_void) -> c_int;

/// What the native call left behind: its return code and the errno it set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallOutcome {
    pub ret: c_int,
    pub errno: c_int,
}

/// Run `op` with `permit` released and hand back its result.
///
/// errno is read inside the window, right after `op` returns, and written
/// back once the permit has been reacquired.
///
/// A call made from inside another call's `op` on the same thread finds the
/// permit already released and runs `op` directly.
///
/// # Safety
///
/// The calling thread must hold `permit` (for a host permit: it entered from
/// the host runtime with the runtime lock taken) or be inside one of its
/// release windows. `op` must be safe to call.
pub(crate) unsafe fn run_blocking<F>(permit: &ExecutionPermit, op: F) -> c_int
where
    F: FnOnce() -> c_int,
{
    if permit.is_released_by_current_thread() {
        return op();
    }
    // SAFETY: forwarded caller contract, and the check above rules out an
    // open window; no other proof is alive on this thread.
    let mut held = unsafe { permit.assume_held() };
    let outcome = held.blocking(|| {
        let ret = op();
        CallOutcome {
            ret,
            errno: get_errno(),
        }
    });
    drop(held);
    set_errno(outcome.errno);
    outcome.ret
}

/// Call `op(arg)` with the runtime's execution permit released.
///
/// Returns whatever `op` returns, with errno as `op` left it. A null `op`
/// fails with `EINVAL` without touching the permit.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_call_blocking(op: Option<NativeOp>, arg: *mut c_void) -> c_int {
    let Some(op) = op else {
        set_errno(errno::EINVAL);
        return -1;
    };
    let permit = runtime_state::global_permit();
    // SAFETY: C callers enter holding the runtime lock; `op` and `arg` come
    // from the caller together.
    unsafe { run_blocking(&permit, || op(arg)) }
}

/// Install the host runtime's release/acquire pair.
///
/// Both hooks are required. Calls already inside a window keep the permit
/// they started with; later calls use the new hooks.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_install_runtime_hooks(
    release: Option<HookFn>,
    acquire: Option<HookFn>,
) -> c_int {
    // SAFETY: the host vouches that the hooks release and reacquire its lock.
    match unsafe { HostHooks::from_nullable(release, acquire) } {
        Some(hooks) => {
            runtime_state::install_hooks(Some(hooks));
            0
        }
        None => {
            set_errno(errno::EINVAL);
            -1
        }
    }
}

/// Forget the host hooks; later calls run as a passthrough.
#[unsafe(no_mangle)]
pub extern "C" fn blockgate_clear_runtime_hooks() {
    runtime_state::install_hooks(None);
}

/// Switch the permit mode at runtime: `0` releases through the host hooks,
/// `1` turns every call into a passthrough. Anything else fails with
/// `EINVAL`. Calls already inside a window finish on the old permit.
#[unsafe(no_mangle)]
pub extern "C" fn blockgate_set_permit_mode(mode: c_int) -> c_int {
    let mode = match mode {
        0 => PermitMode::Host,
        1 => PermitMode::Off,
        _ => {
            set_errno(errno::EINVAL);
            return -1;
        }
    };
    runtime_state::switch_mode(mode);
    0
}

/// 1 when every release so far has been matched by a reacquire.
#[unsafe(no_mangle)]
pub extern "C" fn blockgate_boundary_balanced() -> c_int {
    c_int::from(runtime_state::boundary_snapshot().is_balanced())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_blocking_restores_errno_set_inside_the_window() {
        let permit = ExecutionPermit::local();
        let outer = permit.enter().unwrap();
        set_errno(0);
        // SAFETY: `outer` holds the permit on this thread.
        let rc = unsafe {
            run_blocking(&permit, || {
                set_errno(errno::EAGAIN);
                -1
            })
        };
        assert_eq!(rc, -1);
        assert_eq!(get_errno(), errno::EAGAIN);
        drop(outer);
        assert!(permit.stats().is_balanced());
        assert_eq!(permit.stats().releases, 1);
    }

    #[test]
    fn nested_run_blocking_does_not_release_twice() {
        let permit = ExecutionPermit::local();
        let outer = permit.enter().unwrap();
        // SAFETY: `outer` holds the permit; the inner call runs inside the
        // outer window.
        let rc = unsafe {
            run_blocking(&permit, || {
                let inner = run_blocking(&permit, || 5);
                inner + 1
            })
        };
        assert_eq!(rc, 6);
        assert_eq!(permit.stats().releases, 1);
        assert_eq!(permit.stats().reacquires, 1);
        assert!(permit.is_held_by_current_thread());
        drop(outer);
    }

    #[test]
    fn run_blocking_releases_the_local_permit() {
        let permit = std::sync::Arc::new(ExecutionPermit::local());
        let _outer = permit.enter().unwrap();
        let other = std::sync::Arc::clone(&permit);
        // SAFETY: `_outer` holds the permit on this thread.
        let free = unsafe {
            run_blocking(&permit, move || {
                let got = std::thread::spawn(move || other.try_enter().unwrap().is_some())
                    .join()
                    .unwrap();
                c_int::from(got)
            })
        };
        assert_eq!(free, 1);
        assert!(permit.is_held_by_current_thread());
    }
}
