//! Raw snapshots: marshall, unmarshall, and append.
//!
//! Snapshots carry bytes only. The span table and reference table stay
//! behind, so anything loaded from a snapshot is untyped and references
//! in it no longer resolve.

use skein_core::{align4, ParcelError, Result};
use tracing::debug;

use crate::parcel::Parcel;

/// Validate that `[offset, offset + length)` lies within `len` bytes.
fn checked_range(len: usize, offset: usize, length: usize) -> Result<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= len => Ok(end),
        _ => Err(ParcelError::invalid(format!(
            "range [{offset}, {offset}+{length}) is outside {len} bytes"
        ))),
    }
}

impl Parcel {
    /// Copy of the written bytes `[0, size)`.
    pub fn marshall(&self) -> Vec<u8> {
        self.storage.written().to_vec()
    }

    /// Replace this parcel's contents with `bytes[offset..offset + length]`.
    ///
    /// The size becomes `length` rounded up to a cell (zero padded) and the
    /// cursor returns to 0. All type and reference information is dropped.
    pub fn unmarshall(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<()> {
        let end = checked_range(bytes.len(), offset, length)?;
        let size = align4(length);
        if size > self.config.max_capacity {
            return Err(ParcelError::invalid(format!(
                "snapshot of {length} bytes exceeds capacity limit of {} bytes",
                self.config.max_capacity
            )));
        }
        self.spans.clear();
        self.references.clear();
        self.storage.set_size(0);
        if size > self.storage.capacity() {
            self.storage.set_capacity(size);
        }
        self.storage.set_size(size);
        self.storage
            .slice_mut(0, length)
            .copy_from_slice(&bytes[offset..end]);
        self.position = 0;
        debug!(bytes = length, "parcel unmarshalled");
        Ok(())
    }

    /// Append `other`'s bytes `[offset, offset + length)` at this parcel's
    /// end.
    ///
    /// The cursor moves to the new end. The appended bytes are untyped.
    /// To append a parcel to itself, clone it first.
    pub fn append_from(&mut self, other: &Parcel, offset: usize, length: usize) -> Result<()> {
        let end = checked_range(other.data_size(), offset, length)?;
        let start = self.storage.size();
        self.ensure_size(start + length)?;
        self.storage
            .slice_mut(start, length)
            .copy_from_slice(&other.storage.written()[offset..end]);
        self.position = self.storage.size();
        debug!(bytes = length, at = start, "parcel appended");
        Ok(())
    }
}
