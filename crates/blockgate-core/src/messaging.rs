//! Messaging library constants.
//!
//! Values match libzmq 4.x `<zmq.h>`. The ABI crate surfaces each one to the
//! host through a zero-argument accessor; the typed enums below are the Rust
//! view of the same numbers.

// ---------------------------------------------------------------------------
// Message layout
// ---------------------------------------------------------------------------

/// `sizeof(zmq_msg_t)`: an opaque 64-byte union.
///
/// Fixed here rather than read from `<zmq.h>`. libzmq has used this layout
/// since 4.1; older releases had a smaller struct, see
/// [`msg_layout_matches`].
pub const ZMQ_MSG_T_SIZE: usize = 64;

/// First libzmq release (major, minor) whose `zmq_msg_t` is
/// [`ZMQ_MSG_T_SIZE`] bytes.
pub const ZMQ_MSG_T_SIZE_SINCE: (i32, i32) = (4, 1);

/// Whether a libzmq reporting `major.minor` from `zmq_version` lays out
/// `zmq_msg_t` the way [`ZMQ_MSG_T_SIZE`] assumes.
#[must_use]
pub const fn msg_layout_matches(major: i32, minor: i32) -> bool {
    let (since_major, since_minor) = ZMQ_MSG_T_SIZE_SINCE;
    major > since_major || (major == since_major && minor >= since_minor)
}

// ---------------------------------------------------------------------------
// Send/recv flags
// ---------------------------------------------------------------------------

/// Non-blocking send/recv (legacy name of `ZMQ_DONTWAIT`).
pub const ZMQ_NOBLOCK: i32 = 1;
/// Non-blocking send/recv.
pub const ZMQ_DONTWAIT: i32 = ZMQ_NOBLOCK;
/// More message parts follow.
pub const ZMQ_SNDMORE: i32 = 2;

// ---------------------------------------------------------------------------
// Socket options
// ---------------------------------------------------------------------------

/// Socket identity (routing id).
pub const ZMQ_IDENTITY: i32 = 5;
/// Subscription filter for SUB sockets.
pub const ZMQ_SUBSCRIBE: i32 = 6;
/// More message parts to receive.
pub const ZMQ_RCVMORE: i32 = 13;
/// File descriptor signalling readiness.
pub const ZMQ_FD: i32 = 14;
/// Pending socket events bitmask.
pub const ZMQ_EVENTS: i32 = 15;
/// Linger period on close.
pub const ZMQ_LINGER: i32 = 17;

// ---------------------------------------------------------------------------
// Poll events
// ---------------------------------------------------------------------------

pub const ZMQ_POLLIN: i32 = 1;
pub const ZMQ_POLLOUT: i32 = 2;
pub const ZMQ_POLLERR: i32 = 4;

// ---------------------------------------------------------------------------
// Socket types
// ---------------------------------------------------------------------------

pub const ZMQ_PAIR: i32 = 0;
pub const ZMQ_PUB: i32 = 1;
pub const ZMQ_SUB: i32 = 2;
pub const ZMQ_REQ: i32 = 3;
pub const ZMQ_REP: i32 = 4;
pub const ZMQ_DEALER: i32 = 5;
pub const ZMQ_ROUTER: i32 = 6;
pub const ZMQ_PULL: i32 = 7;
pub const ZMQ_PUSH: i32 = 8;
pub const ZMQ_XPUB: i32 = 9;
pub const ZMQ_XSUB: i32 = 10;

// ---------------------------------------------------------------------------
// Typed views
// ---------------------------------------------------------------------------

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $raw:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $raw ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Native integer value.
            #[must_use]
            pub const fn as_raw(self) -> i32 {
                self as i32
            }

            /// Map a native integer back to a variant.
            #[must_use]
            pub const fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $( $raw => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Symbolic name as spelled in the native header.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($raw), )+
                }
            }
        }
    };
}

raw_enum! {
    /// Socket type passed to socket creation.
    pub enum SocketType {
        Pair = ZMQ_PAIR,
        Pub = ZMQ_PUB,
        Sub = ZMQ_SUB,
        Req = ZMQ_REQ,
        Rep = ZMQ_REP,
        Dealer = ZMQ_DEALER,
        Router = ZMQ_ROUTER,
        Pull = ZMQ_PULL,
        Push = ZMQ_PUSH,
        XPub = ZMQ_XPUB,
        XSub = ZMQ_XSUB,
    }
}

raw_enum! {
    /// Socket option identifiers surfaced to the host.
    pub enum SocketOption {
        Identity = ZMQ_IDENTITY,
        Subscribe = ZMQ_SUBSCRIBE,
        RcvMore = ZMQ_RCVMORE,
        Fd = ZMQ_FD,
        Events = ZMQ_EVENTS,
        Linger = ZMQ_LINGER,
    }
}

raw_enum! {
    /// Poll event bits.
    pub enum PollEvent {
        In = ZMQ_POLLIN,
        Out = ZMQ_POLLOUT,
        Error = ZMQ_POLLERR,
    }
}

raw_enum! {
    /// Send/recv flag bits.
    pub enum MessageFlag {
        /// Return immediately with `EAGAIN` instead of blocking.
        NoBlock = ZMQ_NOBLOCK,
        SndMore = ZMQ_SNDMORE,
    }
}

impl PollEvent {
    /// Combine events into the bitmask native poll calls take.
    #[must_use]
    pub fn mask(events: &[Self]) -> i32 {
        events.iter().fold(0, |acc, ev| acc | ev.as_raw())
    }

    /// Events set in `mask`.
    #[must_use]
    pub fn from_mask(mask: i32) -> Vec<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|ev| mask & ev.as_raw() != 0)
            .collect()
    }
}

impl MessageFlag {
    /// Combine flags into the integer send/recv calls take.
    #[must_use]
    pub fn mask(flags: &[Self]) -> i32 {
        flags.iter().fold(0, |acc, f| acc | f.as_raw())
    }
}
