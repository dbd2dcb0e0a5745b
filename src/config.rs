//! Global configuration for range handling.
//!
//! This module provides a thread-safe global switch that decides how stores
//! treat empty ranges (`from == to`) without threading a flag through every
//! call site.

use crate::error::{Result, SegmentsError};
use crate::segment::Position;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for strict range validation.
///
/// When enabled, an empty range (`from == to`) passed to `add` or `set` is
/// rejected with [`SegmentsError::EmptyRange`]. When disabled (the default)
/// it is a no-op, which is what the half-open semantics imply.
///
/// This is set once at startup and read on every mutation.
static STRICT_RANGES: AtomicBool = AtomicBool::new(false);

/// Enable or disable strict range validation.
///
/// # Example
///
/// ```
/// use intensity_segments::config;
///
/// // Enable at startup before applying any operation
/// config::set_strict_ranges(true);
/// assert!(config::is_strict_ranges());
/// config::set_strict_ranges(false);
/// ```
#[inline]
pub fn set_strict_ranges(enabled: bool) {
    STRICT_RANGES.store(enabled, Ordering::Release);
}

/// Check if strict range validation is enabled.
#[inline]
pub fn is_strict_ranges() -> bool {
    STRICT_RANGES.load(Ordering::Acquire)
}

/// Validate a half-open range before it is applied.
///
/// Returns `Ok(true)` if the range is non-empty and should be applied,
/// `Ok(false)` if it is empty and should be skipped, and an error if
/// `from > to` or if the range is empty under strict validation.
#[inline]
pub fn check_range(from: Position, to: Position) -> Result<bool> {
    if from > to {
        return Err(SegmentsError::InvalidRange { from, to });
    }
    if from == to {
        if is_strict_ranges() {
            return Err(SegmentsError::EmptyRange { at: from });
        }
        return Ok(false);
    }
    Ok(true)
}
