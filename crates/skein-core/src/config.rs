//! Parcel configuration parameters.

use crate::error::{ParcelError, Result};
use crate::layout::{align4, is_aligned};

/// Configuration for a parcel's backing storage.
///
/// Controls the initial allocation, the growth policy applied when a
/// write runs past the current capacity, and the hard capacity ceiling.
/// Validated by `Parcel::with_config`; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParcelConfig {
    /// Bytes allocated at construction.
    ///
    /// Default: 0. Must be a multiple of 4 and no larger than `max_capacity`.
    pub initial_capacity: usize,

    /// Upper bound on capacity in bytes.
    ///
    /// Default: 64MB. Any operation that would need more storage fails
    /// with `InvalidArgument` instead of allocating.
    pub max_capacity: usize,

    /// Capacity growth on overflow, as a percentage of the required size.
    ///
    /// Default: 150 (grow to 3/2 of the write's end offset). Must be
    /// at least 100.
    pub growth_percent: u32,
}

impl ParcelConfig {
    /// Default initial capacity.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 0;

    /// Default capacity ceiling: 64MB.
    pub const DEFAULT_MAX_CAPACITY: usize = 64 * 1024 * 1024;

    /// Default growth percentage.
    pub const DEFAULT_GROWTH_PERCENT: u32 = 150;

    /// Create a config with all defaults.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
            growth_percent: Self::DEFAULT_GROWTH_PERCENT,
        }
    }

    /// Builder-style override of the initial capacity.
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    /// Builder-style override of the capacity ceiling.
    pub fn with_max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = bytes;
        self
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !is_aligned(self.max_capacity) {
            return Err(ParcelError::invalid(format!(
                "max_capacity {} is not a multiple of 4",
                self.max_capacity
            )));
        }
        if !is_aligned(self.initial_capacity) {
            return Err(ParcelError::invalid(format!(
                "initial_capacity {} is not a multiple of 4",
                self.initial_capacity
            )));
        }
        if self.initial_capacity > self.max_capacity {
            return Err(ParcelError::invalid(format!(
                "initial_capacity {} exceeds max_capacity {}",
                self.initial_capacity, self.max_capacity
            )));
        }
        if self.growth_percent < 100 {
            return Err(ParcelError::invalid(format!(
                "growth_percent {} must be at least 100",
                self.growth_percent
            )));
        }
        Ok(())
    }

    /// Capacity to allocate so that `required` bytes fit.
    ///
    /// Applies the growth percentage and clamps to `max_capacity`.
    /// Fails if `required` itself exceeds the ceiling.
    pub fn grown_capacity(&self, required: usize) -> Result<usize> {
        let required = align4(required);
        if required > self.max_capacity {
            return Err(ParcelError::invalid(format!(
                "requested {required} bytes, capacity limit is {} bytes",
                self.max_capacity
            )));
        }
        let scaled = required.saturating_mul(self.growth_percent as usize) / 100;
        Ok(align4(scaled.max(required)).min(self.max_capacity))
    }
}

impl Default for ParcelConfig {
    fn default() -> Self {
        Self::new()
    }
}
