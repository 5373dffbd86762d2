//! Compile-time name→value table of every surfaced constant.
//!
//! One table replaces a per-constant accessor for hosts that can look values
//! up by name. Names are exactly the native header spelling.

use crate::messaging::*;

/// `sizeof(zmq_msg_t)` as the host sees it.
pub const SIZEOF_ZMQ_MSG_T: i32 = ZMQ_MSG_T_SIZE as i32;

/// Which part of the native API a constant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantGroup {
    Layout,
    MessageFlag,
    SocketOption,
    PollEvent,
    SocketType,
}

impl ConstantGroup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::MessageFlag => "message_flag",
            Self::SocketOption => "socket_option",
            Self::PollEvent => "poll_event",
            Self::SocketType => "socket_type",
        }
    }
}

/// One entry of [`CONSTANTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedConstant {
    pub name: &'static str,
    pub value: i32,
    pub group: ConstantGroup,
}

macro_rules! constant_table {
    ($( $group:ident: $($c:ident),+ ; )+) => {
        &[
            $($(
                NamedConstant {
                    name: stringify!($c),
                    value: $c,
                    group: ConstantGroup::$group,
                },
            )+)+
        ]
    };
}

/// Every constant, grouped, in a stable order.
pub const CONSTANTS: &[NamedConstant] = constant_table! {
    Layout: SIZEOF_ZMQ_MSG_T;
    MessageFlag: ZMQ_NOBLOCK, ZMQ_DONTWAIT, ZMQ_SNDMORE;
    SocketOption: ZMQ_IDENTITY, ZMQ_SUBSCRIBE, ZMQ_RCVMORE, ZMQ_FD, ZMQ_EVENTS, ZMQ_LINGER;
    PollEvent: ZMQ_POLLIN, ZMQ_POLLOUT, ZMQ_POLLERR;
    SocketType: ZMQ_PAIR, ZMQ_PUB, ZMQ_SUB, ZMQ_REQ, ZMQ_REP, ZMQ_DEALER, ZMQ_ROUTER,
        ZMQ_PULL, ZMQ_PUSH, ZMQ_XPUB, ZMQ_XSUB;
};

/// Value of the constant spelled `name`.
#[must_use]
pub fn lookup(name: &str) -> Option<i32> {
    CONSTANTS.iter().find(|c| c.name == name).map(|c| c.value)
}

/// Entries belonging to `group`.
pub fn in_group(group: ConstantGroup) -> impl Iterator<Item = &'static NamedConstant> {
    CONSTANTS.iter().filter(move |c| c.group == group)
}
