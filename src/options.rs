//! Map configuration and its validation.

use crate::error::SetupError;

/// Smallest bucket count a map is ever built with.
pub const MIN_CAPACITY: usize = 16;
pub const DEFAULT_CAPACITY: usize = 16;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Which order the traversal list exposes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OrderingMode {
    /// First-inserted first; reads and overwrites never reorder.
    #[default]
    InsertionOrder,
    /// Most-recently inserted, read or overwritten first.
    AccessOrder,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapOptions {
    /// Initial bucket count hint, rounded up to a power of two (at least 16).
    pub capacity: usize,
    /// Grow once `len > capacity * load_factor`.
    pub load_factor: f32,
    pub ordering: OrderingMode,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            ordering: OrderingMode::InsertionOrder,
        }
    }
}

impl MapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options in access order, the usual LRU backbone setup.
    pub fn lru() -> Self {
        Self::default().with_ordering(OrderingMode::AccessOrder)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingMode) -> Self {
        self.ordering = ordering;
        self
    }

    /// Check the options and return the bucket count the map starts with.
    pub(crate) fn resolve(&self) -> Result<usize, SetupError> {
        if !(self.load_factor.is_finite() && self.load_factor > 0.0) {
            return Err(SetupError::InvalidLoadFactor(self.load_factor));
        }
        resolve_capacity(self.capacity)
    }
}

pub(crate) fn resolve_capacity(requested: usize) -> Result<usize, SetupError> {
    requested
        .max(MIN_CAPACITY)
        .checked_next_power_of_two()
        .ok_or(SetupError::CapacityOverflow(requested))
}

/// Largest size that does not trigger a resize.
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    (capacity as f64 * load_factor as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_up_with_floor() {
        for (req, want) in [
            (0, 16),
            (1, 16),
            (15, 16),
            (16, 16),
            (17, 32),
            (100, 128),
            (1024, 1024),
        ] {
            assert_eq!(resolve_capacity(req), Ok(want), "request {}", req);
        }
    }

    #[test]
    fn capacity_overflow_is_reported() {
        assert_eq!(
            resolve_capacity(usize::MAX),
            Err(SetupError::CapacityOverflow(usize::MAX))
        );
    }

    #[test]
    fn bad_load_factors_fail_fast() {
        for lf in [0.0, -0.5, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let opts = MapOptions::new().with_load_factor(lf);
            assert!(
                matches!(opts.resolve(), Err(SetupError::InvalidLoadFactor(_))),
                "load factor {} must be rejected",
                lf
            );
        }
    }

    #[test]
    fn load_factor_above_one_is_allowed() {
        let opts = MapOptions::new().with_load_factor(4.0);
        assert_eq!(opts.resolve(), Ok(16));
        assert_eq!(threshold_for(16, 4.0), 64);
    }

    #[test]
    fn threshold_truncates() {
        assert_eq!(threshold_for(16, 0.75), 12);
        assert_eq!(threshold_for(4, 0.75), 3);
        assert_eq!(threshold_for(16, 0.1), 1);
    }

    #[test]
    fn builders_compose() {
        let o = MapOptions::lru().with_capacity(40).with_load_factor(0.5);
        assert_eq!(o.ordering, OrderingMode::AccessOrder);
        assert_eq!(o.capacity, 40);
        assert_eq!(o.resolve(), Ok(64));
        assert_eq!(MapOptions::default().ordering, OrderingMode::InsertionOrder);
    }
}
