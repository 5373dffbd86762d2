//! Native status classification for host binding layers.
//!
//! The boundary forwards a native return code and its errno verbatim. The
//! host's own binding layer then has to turn that sentinel pair into its
//! error representation; [`NativeStatus`] is the shared vocabulary for it.

use crate::errno;

/// Meaning of a `(return code, errno)` pair from a send/recv style call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeStatus {
    /// Non-negative return: byte count or success.
    Ok(i32),
    /// Non-blocking mode was requested and the call would have blocked.
    WouldBlock,
    /// A signal interrupted the call.
    Interrupted,
    /// The messaging context was terminated under the socket.
    ContextTerminated,
    /// Any other failure.
    Failed(i32),
}

impl NativeStatus {
    /// Classify a native return. `errno` is only consulted when `ret < 0`.
    #[must_use]
    pub const fn from_return(ret: i32, errno: i32) -> Self {
        if ret >= 0 {
            return Self::Ok(ret);
        }
        match errno {
            e if e == errno::EAGAIN || e == errno::EWOULDBLOCK => Self::WouldBlock,
            errno::EINTR => Self::Interrupted,
            errno::ETERM => Self::ContextTerminated,
            other => Self::Failed(other),
        }
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Whether retrying the same call later can succeed.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::WouldBlock | Self::Interrupted)
    }

    /// The errno this status stands for, if it is a failure.
    #[must_use]
    pub const fn errno(self) -> Option<i32> {
        match self {
            Self::Ok(_) => None,
            Self::WouldBlock => Some(errno::EAGAIN),
            Self::Interrupted => Some(errno::EINTR),
            Self::ContextTerminated => Some(errno::ETERM),
            Self::Failed(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_is_ok_regardless_of_errno() {
        assert_eq!(NativeStatus::from_return(0, errno::EAGAIN), NativeStatus::Ok(0));
        assert_eq!(NativeStatus::from_return(128, 0), NativeStatus::Ok(128));
    }

    #[test]
    fn negative_classifies_by_errno() {
        assert_eq!(
            NativeStatus::from_return(-1, errno::EAGAIN),
            NativeStatus::WouldBlock
        );
        assert_eq!(
            NativeStatus::from_return(-1, errno::EINTR),
            NativeStatus::Interrupted
        );
        assert_eq!(
            NativeStatus::from_return(-1, errno::ETERM),
            NativeStatus::ContextTerminated
        );
        assert_eq!(
            NativeStatus::from_return(-1, errno::EFSM),
            NativeStatus::Failed(errno::EFSM)
        );
    }

    #[test]
    fn would_block_follows_the_platform_errno() {
        assert_eq!(
            NativeStatus::from_return(-1, libc::EAGAIN),
            NativeStatus::WouldBlock
        );
        assert_eq!(
            NativeStatus::from_return(-1, libc::EWOULDBLOCK),
            NativeStatus::WouldBlock
        );
        assert_eq!(
            NativeStatus::from_return(-1, libc::ENOSYS),
            NativeStatus::Failed(libc::ENOSYS)
        );
    }

    #[test]
    fn transient_and_errno_views() {
        assert!(NativeStatus::WouldBlock.is_transient());
        assert!(NativeStatus::Interrupted.is_transient());
        assert!(!NativeStatus::ContextTerminated.is_transient());
        assert_eq!(NativeStatus::Ok(3).errno(), None);
        assert_eq!(NativeStatus::Failed(9).errno(), Some(9));
        assert_eq!(NativeStatus::WouldBlock.errno(), Some(errno::EAGAIN));
    }
}
