//! Error number definitions.
//!
//! POSIX values in the target platform's numbering, plus the messaging
//! library's own codes, which live above `ZMQ_HAUSNUMERO` so they never
//! collide with the OS.

pub const ENOENT: i32 = libc::ENOENT;
pub const EINTR: i32 = libc::EINTR;
pub const EAGAIN: i32 = libc::EAGAIN;
pub const EWOULDBLOCK: i32 = libc::EWOULDBLOCK;
pub const EFAULT: i32 = libc::EFAULT;
pub const EINVAL: i32 = libc::EINVAL;
pub const ENOSYS: i32 = libc::ENOSYS;
pub const ENOTSUP: i32 = libc::ENOTSUP;

/// Base of the messaging library's private error range.
pub const ZMQ_HAUSNUMERO: i32 = 156_384_712;

/// Operation not valid in the socket's current state.
pub const EFSM: i32 = ZMQ_HAUSNUMERO + 51;
/// Peer speaks an incompatible protocol.
pub const ENOCOMPATPROTO: i32 = ZMQ_HAUSNUMERO + 52;
/// The owning context was terminated.
pub const ETERM: i32 = ZMQ_HAUSNUMERO + 53;
/// No I/O thread available.
pub const EMTHREAD: i32 = ZMQ_HAUSNUMERO + 54;

/// Whether `errno` is one of the messaging library's private codes.
#[must_use]
pub const fn is_messaging_errno(errno: i32) -> bool {
    errno > ZMQ_HAUSNUMERO
}
