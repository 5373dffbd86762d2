// Every export takes raw pointers or function pointers from C callers and
// documents its contract in prose.
#![allow(clippy::missing_safety_doc)]
//! # blockgate-abi
//!
//! extern "C" boundary layer for blockgate.
//!
//! This crate produces a `cdylib` (`libblockgate_abi.so`) that a host
//! runtime's native bindings call instead of the blocking messaging
//! functions directly. Each call releases the runtime's execution permit for
//! the duration of the native call and reacquires it before returning.
//!
//! # Architecture
//!
//! ```text
//! host binding -> ABI entry (this crate) -> release permit -> native call
//!                                        <- reacquire permit <- ret, errno
//! ```
//!
//! The permit backend follows `BLOCKGATE_PERMIT_MODE`: in **host** mode the
//! hooks installed with `blockgate_install_runtime_hooks` are used; in
//! **off** mode, or before any hooks are installed, calls pass straight
//! through.

mod errno_abi;
mod macros;
mod runtime_state;

pub mod boundary_abi;
pub mod constants_abi;
pub mod messaging_abi;

pub use boundary_abi::NativeOp;
pub use messaging_abi::{MessagingVtable, MsgIoFn, ZmqMsg};
pub use runtime_state::{boundary_snapshot, permit_kind, reset_state_for_tests};
