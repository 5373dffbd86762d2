//! Message send/receive across the blocking-call boundary.
//!
//! `zmq_msg_send` and `zmq_msg_recv` block until the peer is ready unless
//! `ZMQ_NOBLOCK` is passed. The wrappers here release the runtime permit
//! for exactly the duration of the native call and forward its return code
//! and errno untouched.

use std::ffi::{c_int, c_void};

use blockgate_core::{errno, messaging};

use crate::boundary_abi::run_blocking;
use crate::errno_abi::set_errno;
use crate::runtime_state;

/// Opaque message storage, laid out like libzmq's `zmq_msg_t`.
#[repr(C, align(8))]
#[derive(Debug)]
pub struct ZmqMsg {
    _bytes: [u8; messaging::ZMQ_MSG_T_SIZE],
}

impl ZmqMsg {
    /// All-zero storage, ready for the native `zmq_msg_init`.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            _bytes: [0; messaging::ZMQ_MSG_T_SIZE],
        }
    }
}

const _: () = assert!(std::mem::size_of::<ZmqMsg>() == messaging::ZMQ_MSG_T_SIZE);

/// `int (*)(zmq_msg_t *msg, void *socket, int flags)`
pub type MsgIoFn = unsafe extern "C" fn(*mut ZmqMsg, *mut c_void, c_int) -> c_int;

/// Native send/recv entrypoints the wrappers forward to.
#[derive(Debug, Clone, Copy)]
pub struct MessagingVtable {
    pub send: MsgIoFn,
    pub recv: MsgIoFn,
}

/// Version of the linked libzmq, for checking it against [`ZmqMsg`].
#[cfg(feature = "link-libzmq")]
#[must_use]
pub fn linked_version() -> (c_int, c_int) {
    linked::version()
}

#[cfg(feature = "link-libzmq")]
mod linked {
    use super::{MsgIoFn, ZmqMsg};
    use std::ffi::{c_int, c_void};

    #[link(name = "zmq")]
    unsafe extern "C" {
        pub fn zmq_msg_send(msg: *mut ZmqMsg, socket: *mut c_void, flags: c_int) -> c_int;
        pub fn zmq_msg_recv(msg: *mut ZmqMsg, socket: *mut c_void, flags: c_int) -> c_int;
        pub fn zmq_version(major: *mut c_int, minor: *mut c_int, patch: *mut c_int);
    }

    /// `(major, minor)` of the libzmq actually loaded.
    pub(super) fn version() -> (c_int, c_int) {
        let (mut major, mut minor, mut patch) = (0, 0, 0);
        // SAFETY: zmq_version only writes through the three pointers.
        unsafe { zmq_version(&mut major, &mut minor, &mut patch) };
        (major, minor)
    }

    pub(super) const SEND: MsgIoFn = zmq_msg_send;
    pub(super) const RECV: MsgIoFn = zmq_msg_recv;
}

impl MessagingVtable {
    /// The statically linked libzmq, when built with `link-libzmq`.
    ///
    /// `None` when the loaded library predates the `zmq_msg_t` layout
    /// [`ZmqMsg`] mirrors.
    #[cfg(feature = "link-libzmq")]
    pub(crate) fn linked() -> Option<Self> {
        let (major, minor) = linked::version();
        if !messaging::msg_layout_matches(major, minor) {
            return None;
        }
        Some(Self {
            send: linked::SEND,
            recv: linked::RECV,
        })
    }

    #[cfg(not(feature = "link-libzmq"))]
    pub(crate) fn linked() -> Option<Self> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Send,
    Recv,
}

unsafe fn forward(dir: Direction, msg: *mut ZmqMsg, socket: *mut c_void, flags: c_int) -> c_int {
    let Some(vtable) = runtime_state::messaging() else {
        set_errno(errno::ENOSYS);
        return -1;
    };
    let native = match dir {
        Direction::Send => vtable.send,
        Direction::Recv => vtable.recv,
    };
    let permit = runtime_state::global_permit();
    // SAFETY: C callers enter holding the runtime lock; the pointers are the
    // caller's and go to the native function unmodified.
    unsafe { run_blocking(&permit, || native(msg, socket, flags)) }
}

/// Install native send/recv functions. Both are required.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_install_messaging(
    send: Option<MsgIoFn>,
    recv: Option<MsgIoFn>,
) -> c_int {
    match (send, recv) {
        (Some(send), Some(recv)) => {
            runtime_state::install_messaging(Some(MessagingVtable { send, recv }));
            0
        }
        _ => {
            set_errno(errno::EINVAL);
            -1
        }
    }
}

/// Send `msg` on `socket`, releasing the runtime permit while the call blocks.
///
/// Returns the byte count, or `-1` with errno as the native call set it.
/// `-1`/`ENOSYS` when no native send is available.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_msg_send(
    msg: *mut ZmqMsg,
    socket: *mut c_void,
    flags: c_int,
) -> c_int {
    // SAFETY: forwarded caller contract.
    unsafe { forward(Direction::Send, msg, socket, flags) }
}

/// Receive into `msg` from `socket`, releasing the runtime permit while the
/// call blocks.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_msg_recv(
    msg: *mut ZmqMsg,
    socket: *mut c_void,
    flags: c_int,
) -> c_int {
    // SAFETY: forwarded caller contract.
    unsafe { forward(Direction::Recv, msg, socket, flags) }
}
