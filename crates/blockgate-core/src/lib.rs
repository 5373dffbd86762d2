//! # blockgate-core
//!
//! Build-time constants of the native messaging library, exposed as typed
//! enums and as one compile-time name→value table, plus the errno values and
//! status classification host binding layers use to translate native
//! sentinels. No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod constants;
pub mod errno;
pub mod messaging;
pub mod status;

pub use constants::{CONSTANTS, ConstantGroup, NamedConstant, lookup};
pub use messaging::{MessageFlag, PollEvent, SocketOption, SocketType};
pub use status::NativeStatus;
