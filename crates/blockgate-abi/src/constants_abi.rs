//! Zero-argument getters for the messaging library's build-time constants.

use std::ffi::{CStr, c_char, c_int};

use blockgate_core::constants::SIZEOF_ZMQ_MSG_T;
use blockgate_core::errno;
use blockgate_core::messaging::*;

use crate::errno_abi::set_errno;
use crate::macros::constant_accessors;

constant_accessors! {
    blockgate_sizeof_zmq_msg_t => SIZEOF_ZMQ_MSG_T,
    blockgate_zmq_noblock => ZMQ_NOBLOCK,
    blockgate_zmq_dontwait => ZMQ_DONTWAIT,
    blockgate_zmq_sndmore => ZMQ_SNDMORE,
    blockgate_zmq_identity => ZMQ_IDENTITY,
    blockgate_zmq_subscribe => ZMQ_SUBSCRIBE,
    blockgate_zmq_rcvmore => ZMQ_RCVMORE,
    blockgate_zmq_fd => ZMQ_FD,
    blockgate_zmq_events => ZMQ_EVENTS,
    blockgate_zmq_linger => ZMQ_LINGER,
    blockgate_zmq_pollin => ZMQ_POLLIN,
    blockgate_zmq_pollout => ZMQ_POLLOUT,
    blockgate_zmq_pollerr => ZMQ_POLLERR,
    blockgate_zmq_pair => ZMQ_PAIR,
    blockgate_zmq_pub => ZMQ_PUB,
    blockgate_zmq_sub => ZMQ_SUB,
    blockgate_zmq_req => ZMQ_REQ,
    blockgate_zmq_rep => ZMQ_REP,
    blockgate_zmq_dealer => ZMQ_DEALER,
    blockgate_zmq_router => ZMQ_ROUTER,
    blockgate_zmq_pull => ZMQ_PULL,
    blockgate_zmq_push => ZMQ_PUSH,
    blockgate_zmq_xpub => ZMQ_XPUB,
    blockgate_zmq_xsub => ZMQ_XSUB,
}

/// Look up a constant by its C name (`"ZMQ_LINGER"`) and store it in `*out`.
///
/// Returns 0 on success. `-1`/`EINVAL` for null pointers or a name that is
/// not UTF-8, `-1`/`ENOENT` for an unknown name.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn blockgate_constant(name: *const c_char, out: *mut c_int) -> c_int {
    if name.is_null() || out.is_null() {
        set_errno(errno::EINVAL);
        return -1;
    }
    // SAFETY: non-null, and the caller passes a NUL-terminated string.
    let name = unsafe { CStr::from_ptr(name) };
    let Ok(name) = name.to_str() else {
        set_errno(errno::EINVAL);
        return -1;
    };
    match blockgate_core::lookup(name) {
        Some(value) => {
            // SAFETY: non-null, and the caller passes writable storage.
            unsafe { out.write(value) };
            0
        }
        None => {
            set_errno(errno::ENOENT);
            -1
        }
    }
}
