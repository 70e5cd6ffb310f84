//! Growable, zero-initialised byte storage with a logical size.
//!
//! [`Storage`] owns the parcel's bytes. Its physical length is the
//! parcel capacity; `size` marks how much of it has been written.
//! Bytes between `size` and `capacity` are never observable: growing
//! the size always zero-fills the newly exposed range first.

/// Backing byte store for a parcel.
#[derive(Clone, Debug, Default)]
pub(crate) struct Storage {
    /// Physical allocation. `data.len()` is the capacity.
    data: Vec<u8>,
    /// Logical end of written data. Always `<= data.len()`.
    size: usize,
}

impl Storage {
    /// Create storage with `capacity` zeroed bytes and size 0.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            size: 0,
        }
    }

    /// Allocated bytes.
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Logically written bytes.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Reallocate to exactly `capacity` bytes.
    ///
    /// Bytes below the new capacity are kept; bytes above it are dropped
    /// for good. Size is clamped to the new capacity.
    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.data.resize(capacity, 0);
        self.data.shrink_to(capacity);
        self.size = self.size.min(capacity);
    }

    /// Set the logical size.
    ///
    /// Growing zero-fills `[old_size, size)` so stale bytes left behind by
    /// an earlier shrink never reappear.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the capacity. Callers grow first.
    pub(crate) fn set_size(&mut self, size: usize) {
        assert!(
            size <= self.data.len(),
            "size {size} exceeds capacity {}",
            self.data.len()
        );
        if size > self.size {
            self.data[self.size..size].fill(0);
        }
        self.size = size;
    }

    /// Shared slice of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the capacity.
    pub(crate) fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Mutable slice of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the capacity.
    pub(crate) fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.data[offset..offset + len]
    }

    /// The written prefix `[0, size)`.
    pub(crate) fn written(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Read a little-endian `i32` at `offset`.
    pub(crate) fn i32_at(&self, offset: usize) -> i32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.slice(offset, 4));
        i32::from_le_bytes(buf)
    }

    /// Read a little-endian `i64` at `offset`.
    pub(crate) fn i64_at(&self, offset: usize) -> i64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.slice(offset, 8));
        i64::from_le_bytes(buf)
    }

    /// Read a little-endian `f32` at `offset`.
    pub(crate) fn f32_at(&self, offset: usize) -> f32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.slice(offset, 4));
        f32::from_le_bytes(buf)
    }

    /// Read a little-endian `f64` at `offset`.
    pub(crate) fn f64_at(&self, offset: usize) -> f64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.slice(offset, 8));
        f64::from_le_bytes(buf)
    }
}
