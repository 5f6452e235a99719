//! Construction errors.
//!
//! Misses are never errors: lookups and removals on an absent key return
//! `None`. Only building a map can fail.

use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SetupError {
    /// The bucket array for `capacity` slots could not be allocated.
    Allocation { capacity: usize },
    /// Load factor was zero, negative, NaN or infinite.
    InvalidLoadFactor(f32),
    /// The requested capacity has no representable power of two above it.
    CapacityOverflow(usize),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Allocation { capacity } => {
                write!(f, "failed to allocate a bucket array of {} slots", capacity)
            }
            SetupError::InvalidLoadFactor(lf) => {
                write!(f, "load factor must be finite and greater than zero, got {}", lf)
            }
            SetupError::CapacityOverflow(requested) => {
                write!(f, "capacity {} cannot be rounded up to a power of two", requested)
            }
        }
    }
}

impl std::error::Error for SetupError {}
