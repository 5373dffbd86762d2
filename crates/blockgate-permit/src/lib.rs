//! Execution permit and blocking-call boundary for blockgate.
//!
//! A managed runtime with a single global execution permit stalls every
//! other task when one thread blocks inside a native call while holding it.
//! This crate moves the permit out of ambient global state and into an
//! explicit capability, and scopes each native call with a guard that
//! releases the permit before the call and reacquires it on every way out.
//!
//! # Architecture
//!
//! - **Raw backends** (`raw`): crate-owned lock, host runtime hooks, or a
//!   passthrough for runtimes without a global lock
//! - **Permit** (`permit`): [`ExecutionPermit`] capability, [`PermitHeld`]
//!   proof of holding, [`BoundaryGuard`] release window, [`Managed`] values
//! - **Configuration** (`config`): process-wide [`PermitMode`]
//! - **Metrics** (`metrics`): release/reacquire counters
//!
//! ```
//! use blockgate_permit::ExecutionPermit;
//!
//! let permit = ExecutionPermit::local();
//! let mut held = permit.enter().unwrap();
//! let rc = held.blocking(|| -1);
//! assert_eq!(rc, -1);
//! assert!(permit.stats().is_balanced());
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod permit;
pub mod raw;

pub use config::{PermitMode, permit_mode, set_permit_mode};
pub use error::BoundaryError;
pub use metrics::{BoundaryMetrics, BoundarySnapshot};
pub use permit::{BoundaryGuard, ExecutionPermit, Managed, PermitHeld};
pub use raw::{HookFn, HostHooks, LocalPermit, NoPermit, PermitKind, RawPermit};
