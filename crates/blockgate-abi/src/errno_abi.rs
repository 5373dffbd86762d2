//! Thread errno access.
//!
//! The boundary captures errno inside the release window and writes it back
//! after reacquiring, so whatever the reacquire path does to errno never
//! reaches the caller.

use std::ffi::c_int;

#[cfg(any(target_os = "linux", target_os = "android"))]
#[inline]
fn errno_location() -> *mut c_int {
    // SAFETY: always returns the calling thread's errno slot.
    unsafe { libc::__errno_location() }
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
#[inline]
fn errno_location() -> *mut c_int {
    // SAFETY: always returns the calling thread's errno slot.
    unsafe { libc::__error() }
}

#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
#[inline]
fn errno_location() -> *mut c_int {
    // SAFETY: always returns the calling thread's errno slot.
    unsafe { libc::__errno() }
}

/// Current thread errno.
#[inline]
pub(crate) fn get_errno() -> c_int {
    // SAFETY: thread-local slot, valid for the life of the thread.
    unsafe { *errno_location() }
}

/// Overwrite the current thread errno.
#[inline]
pub(crate) fn set_errno(val: c_int) {
    // SAFETY: thread-local slot, valid for the life of the thread.
    unsafe { *errno_location() = val };
}
