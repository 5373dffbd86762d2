#![cfg(target_os = "linux")]

use std::ffi::{c_int, c_void};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use blockgate_abi::boundary_abi::blockgate_call_blocking;
use blockgate_abi::constants_abi::{
    ACCESSORS, blockgate_constant, blockgate_sizeof_zmq_msg_t, blockgate_zmq_noblock,
};
use blockgate_abi::messaging_abi::{
    blockgate_install_messaging, blockgate_msg_recv, blockgate_msg_send,
};
use blockgate_abi::{ZmqMsg, boundary_snapshot, reset_state_for_tests};
use blockgate_core::{NativeStatus, lookup};
use blockgate_permit::{PermitMode, set_permit_mode};

static TEST_GUARD_HELD: AtomicBool = AtomicBool::new(false);

struct TestGuard;

impl Drop for TestGuard {
    fn drop(&mut self) {
        TEST_GUARD_HELD.store(false, Ordering::Release);
    }
}

fn acquire_test_guard() -> TestGuard {
    loop {
        if TEST_GUARD_HELD
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return TestGuard;
        }
        std::thread::yield_now();
    }
}

fn errno() -> c_int {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

const SEND_SENTINEL: c_int = 1234;
const RECV_SENTINEL: c_int = 5678;

static LAST_MSG: AtomicUsize = AtomicUsize::new(0);
static LAST_SOCKET: AtomicUsize = AtomicUsize::new(0);
static LAST_FLAGS: AtomicU64 = AtomicU64::new(0);

unsafe extern "C" fn fake_send(msg: *mut ZmqMsg, socket: *mut c_void, flags: c_int) -> c_int {
    LAST_MSG.store(msg as usize, Ordering::SeqCst);
    LAST_SOCKET.store(socket as usize, Ordering::SeqCst);
    LAST_FLAGS.store(flags as u64, Ordering::SeqCst);
    SEND_SENTINEL
}

unsafe extern "C" fn fake_recv(msg: *mut ZmqMsg, socket: *mut c_void, flags: c_int) -> c_int {
    LAST_MSG.store(msg as usize, Ordering::SeqCst);
    LAST_SOCKET.store(socket as usize, Ordering::SeqCst);
    LAST_FLAGS.store(flags as u64, Ordering::SeqCst);
    if flags & blockgate_zmq_noblock() != 0 {
        // SAFETY: this thread's errno slot.
        unsafe { *libc::__errno_location() = libc::EAGAIN };
        return -1;
    }
    RECV_SENTINEL
}

#[cfg(not(feature = "link-libzmq"))]
#[test]
fn no_native_functions_means_enosys() {
    let _guard = acquire_test_guard();
    reset_state_for_tests();
    set_permit_mode(PermitMode::Host);
    let before = boundary_snapshot();

    let mut msg = ZmqMsg::zeroed();
    // SAFETY: nothing is dereferenced when no vtable is installed.
    let rc = unsafe { blockgate_msg_send(&mut msg, std::ptr::null_mut(), 0) };
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::ENOSYS);
    // SAFETY: as above.
    let rc = unsafe { blockgate_msg_recv(&mut msg, std::ptr::null_mut(), 0) };
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::ENOSYS);
    assert_eq!(boundary_snapshot().since(&before).releases, 0);
}

#[test]
fn send_and_recv_forward_arguments_and_results_untouched() {
    let _guard = acquire_test_guard();
    reset_state_for_tests();
    set_permit_mode(PermitMode::Host);
    // SAFETY: fake natives never dereference their arguments.
    assert_eq!(
        unsafe { blockgate_install_messaging(Some(fake_send), Some(fake_recv)) },
        0
    );
    let before = boundary_snapshot();

    let mut msg = ZmqMsg::zeroed();
    let msg_ptr: *mut ZmqMsg = &mut msg;
    let socket = 0xdead_0000_usize as *mut c_void;

    // SAFETY: see above.
    let rc = unsafe { blockgate_msg_send(msg_ptr, socket, 2) };
    assert_eq!(rc, SEND_SENTINEL);
    assert_eq!(LAST_MSG.load(Ordering::SeqCst), msg_ptr as usize);
    assert_eq!(LAST_SOCKET.load(Ordering::SeqCst), socket as usize);
    assert_eq!(LAST_FLAGS.load(Ordering::SeqCst), 2);

    // SAFETY: see above.
    let rc = unsafe { blockgate_msg_recv(msg_ptr, socket, 0) };
    assert_eq!(rc, RECV_SENTINEL);

    // SAFETY: see above.
    let rc = unsafe { blockgate_msg_recv(msg_ptr, socket, blockgate_zmq_noblock()) };
    assert_eq!(rc, -1);
    let status = NativeStatus::from_return(rc, errno());
    assert_eq!(status, NativeStatus::WouldBlock);

    let delta = boundary_snapshot().since(&before);
    assert_eq!(delta.releases, 3);
    assert_eq!(delta.reacquires, 3);
    assert!(boundary_snapshot().is_balanced());
}

#[test]
fn install_messaging_requires_both_functions() {
    let _guard = acquire_test_guard();
    reset_state_for_tests();
    // SAFETY: null is rejected before anything is stored.
    let rc = unsafe { blockgate_install_messaging(Some(fake_send), None) };
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::EINVAL);
}

unsafe extern "C" fn nonblocking_recv(arg: *mut c_void) -> c_int {
    let fd = arg as usize as c_int;
    let mut buf = [0_u8; 16];
    // SAFETY: `buf` is valid for its length; `fd` is an open socket.
    let n = unsafe { libc::recv(fd, buf.as_mut_ptr().cast(), buf.len(), libc::MSG_DONTWAIT) };
    n as c_int
}

#[test]
fn real_would_block_recv_comes_back_as_eagain() {
    let _guard = acquire_test_guard();
    reset_state_for_tests();
    set_permit_mode(PermitMode::Host);

    let mut fds = [0 as c_int; 2];
    // SAFETY: `fds` has room for the two descriptors.
    let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, fds.as_mut_ptr()) };
    assert_eq!(rc, 0);

    // SAFETY: fds[0] is open for the duration of the call.
    let rc = unsafe {
        blockgate_call_blocking(Some(nonblocking_recv), fds[0] as usize as *mut c_void)
    };
    let err = errno();
    assert_eq!(rc, -1);
    assert!(err == libc::EAGAIN || err == libc::EWOULDBLOCK);
    assert!(NativeStatus::from_return(rc, err).is_transient());

    // SAFETY: both descriptors came from socketpair above.
    unsafe {
        libc::close(fds[0]);
        libc::close(fds[1]);
    }
}

#[test]
fn constant_getters_agree_with_the_table() {
    for (name, getter) in ACCESSORS {
        let mut out = -1;
        let cname = std::ffi::CString::new(*name).unwrap();
        // SAFETY: NUL-terminated name and writable `out`.
        let rc = unsafe { blockgate_constant(cname.as_ptr(), &mut out) };
        assert_eq!(rc, 0, "{name}");
        assert_eq!(out, getter());
        assert_eq!(Some(out), lookup(name));
    }
    assert_eq!(blockgate_sizeof_zmq_msg_t(), std::mem::size_of::<ZmqMsg>() as c_int);
}

#[test]
fn unknown_or_null_constant_names_fail() {
    let mut out = 0;
    // SAFETY: NUL-terminated name and writable `out`.
    let rc = unsafe { blockgate_constant(c"ZMQ_NOT_A_THING".as_ptr(), &mut out) };
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::ENOENT);

    // SAFETY: null name is rejected before any read.
    let rc = unsafe { blockgate_constant(std::ptr::null(), &mut out) };
    assert_eq!(rc, -1);
    assert_eq!(errno(), libc::EINVAL);
}

#[cfg(feature = "link-libzmq")]
#[test]
fn linked_library_matches_the_message_layout() {
    let (major, minor) = blockgate_abi::messaging_abi::linked_version();
    assert!(
        blockgate_core::messaging::msg_layout_matches(major, minor),
        "libzmq {major}.{minor} predates the {}-byte zmq_msg_t",
        blockgate_core::messaging::ZMQ_MSG_T_SIZE
    );
}
