//! Permit misuse errors.
//!
//! Native call failures never show up here: the boundary forwards native
//! results verbatim. These only describe misuse of the permit capability.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The calling thread already holds this permit.
    #[error("execution permit {permit_id} is already held by the current thread")]
    Reentrant { permit_id: u64 },
    /// A managed value was accessed with proof of a different permit.
    #[error("managed value belongs to permit {expected}, caller holds permit {actual}")]
    ForeignPermit { expected: u64, actual: u64 },
    /// Managed values need a permit that excludes other holders.
    #[error("permit {permit_id} is a passthrough permit and cannot guard managed values")]
    NotExclusive { permit_id: u64 },
}
