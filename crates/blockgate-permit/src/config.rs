//! Permit mode configuration.
//!
//! The mode is set via the `BLOCKGATE_PERMIT_MODE` environment variable:
//! - `host` (default): the host runtime owns a single global execution permit.
//!   Native blocking calls release it through the installed host hooks and
//!   reacquire it afterward.
//! - `off`: the host runtime has no global lock (for example a work-stealing
//!   scheduler). The boundary degrades to a passthrough and native calls are
//!   invoked directly.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`permit_mode`].
pub const PERMIT_MODE_ENV: &str = "BLOCKGATE_PERMIT_MODE";

/// How the boundary treats the host runtime's execution permit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitMode {
    /// Release and reacquire the host runtime's global permit around each
    /// native blocking call.
    #[default]
    Host,
    /// No global permit exists. Native calls pass straight through.
    Off,
}

impl PermitMode {
    /// Parse from string (case-insensitive). Unknown values map to `Host`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" | "passthrough" | "disabled" => Self::Off,
            _ => Self::Host,
        }
    }

    /// Stable lowercase label, used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Off => "off",
        }
    }

    /// Returns true if native calls should release the permit.
    #[must_use]
    pub const fn releases_permit(self) -> bool {
        matches!(self, Self::Host)
    }
}

// Atomic cache: 0=unresolved, 1=Host, 2=Off. An atomic rather than a
// OnceLock because `set_permit_mode` replaces the value after resolution.
static CACHED_MODE: AtomicU8 = AtomicU8::new(MODE_UNRESOLVED);

const MODE_UNRESOLVED: u8 = 0;
const MODE_HOST: u8 = 1;
const MODE_OFF: u8 = 2;

fn mode_to_u8(mode: PermitMode) -> u8 {
    match mode {
        PermitMode::Host => MODE_HOST,
        PermitMode::Off => MODE_OFF,
    }
}

fn u8_to_mode(v: u8) -> PermitMode {
    match v {
        MODE_OFF => PermitMode::Off,
        _ => PermitMode::Host,
    }
}

/// Get the configured permit mode (reads the env var on first call, caches
/// thereafter).
///
/// If an override lands while the environment is being read, the override
/// wins.
#[must_use]
pub fn permit_mode() -> PermitMode {
    let cached = CACHED_MODE.load(Ordering::Acquire);
    if cached != MODE_UNRESOLVED {
        return u8_to_mode(cached);
    }

    let mode = std::env::var(PERMIT_MODE_ENV)
        .map(|v| PermitMode::from_str_loose(&v))
        .unwrap_or_default();
    match CACHED_MODE.compare_exchange(
        MODE_UNRESOLVED,
        mode_to_u8(mode),
        Ordering::AcqRel,
        Ordering::Acquire,
    ) {
        Ok(_) => mode,
        Err(current) => u8_to_mode(current),
    }
}

/// Override the cached mode for the rest of the process.
///
/// Hosts that embed the library and configure it programmatically call this
/// instead of exporting the env var. Only permits built afterwards see the
/// new mode; an existing [`ExecutionPermit`](crate::ExecutionPermit) keeps
/// the backend it was built with, so owners of a cached permit must rebuild
/// it (the C entrypoint `blockgate_set_permit_mode` does).
pub fn set_permit_mode(mode: PermitMode) {
    CACHED_MODE.store(mode_to_u8(mode), Ordering::Release);
}
