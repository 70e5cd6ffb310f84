//! Cell alignment rules.
//!
//! Every value written into a parcel occupies a whole number of 4-byte
//! cells. Sizes and capacities are always multiples of [`CELL`].

/// Width of one storage cell in bytes.
pub const CELL: usize = 4;

/// Round `n` up to the next multiple of [`CELL`].
///
/// Saturates at the largest aligned `usize` instead of overflowing.
pub fn align4(n: usize) -> usize {
    match n.checked_add(CELL - 1) {
        Some(v) => v & !(CELL - 1),
        None => usize::MAX & !(CELL - 1),
    }
}

/// Whether `n` is a multiple of [`CELL`].
pub fn is_aligned(n: usize) -> bool {
    n % CELL == 0
}
