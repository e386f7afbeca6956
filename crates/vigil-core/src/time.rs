//! Time-source capability
//!
//! Every timing decision in the protocol (cooldowns, watchdog timeouts)
//! samples the clock through this trait at the moment of the operation that
//! uses it. Values are never cached across calls, which is what precludes
//! time-of-check/time-of-use races in `finalise_recovery` and `trigger`.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time.
///
/// Implementations must be monotonically non-decreasing as observed through
/// consecutive calls; the protocol's bookkeeping timestamps inherit that
/// property from the source.
pub trait TimeSource: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now_secs(&self) -> u64;
}

/// Production time source reading the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a new system time source
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}

/// Blanket implementation for Arc<T> where T: TimeSource
impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_secs(&self) -> u64 {
        (**self).now_secs()
    }
}
