//! The parcel: cursor, size/capacity bookkeeping, and checked typed I/O.
//!
//! Every typed write goes through [`Parcel::write_span`], which rejects
//! partial overwrites and records a new span. Every typed read goes
//! through [`Parcel::claim`], which type-checks against the span at the
//! cursor and applies the past-the-end rules:
//!
//! - cursor at or beyond `size`: zero value, cursor unchanged;
//! - fewer than `width` bytes left: zero value, cursor moves to `size`;
//! - otherwise decode and advance by `width`.

use std::fmt;

use skein_core::{align4, ParcelConfig, ParcelError, Result, SpanInfo, SpanKind};
use tracing::debug;

use crate::reference::StrongRef;
use crate::span::{Lookup, Span, SpanTable};
use crate::storage::Storage;

/// Width of every length/count prefix.
pub(crate) const PREFIX: usize = 4;

/// Length sentinel encoding a null string, array, or container.
pub const NULL_LENGTH: i32 = -1;

/// An emulated marshalling buffer.
///
/// Stores raw little-endian bytes plus a span table recording where each
/// value starts, how long it is, and what type it was written as.
///
/// Invariants after every operation: `capacity >= size`,
/// `position <= size`, and both sizes are multiples of 4. The only way
/// to break `position <= size` is an explicit
/// [`set_data_position`](Self::set_data_position) past the end; the next
/// write there zero-fills the gap.
#[derive(Clone)]
pub struct Parcel {
    pub(crate) config: ParcelConfig,
    pub(crate) storage: Storage,
    pub(crate) position: usize,
    pub(crate) spans: SpanTable,
    /// Strong references written into this parcel, indexed by the
    /// value stored in each flattened reference.
    pub(crate) references: Vec<StrongRef>,
}

impl Parcel {
    /// Create an empty parcel with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(ParcelConfig::new())
    }

    /// Create an empty parcel with a custom configuration.
    pub fn with_config(config: ParcelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ParcelConfig) -> Self {
        Self {
            storage: Storage::new(config.initial_capacity),
            config,
            position: 0,
            spans: SpanTable::new(),
            references: Vec::new(),
        }
    }

    /// The configuration this parcel was built with.
    pub fn config(&self) -> &ParcelConfig {
        &self.config
    }

    /// Discard all contents and return to the freshly constructed state.
    pub fn recycle(&mut self) {
        self.storage = Storage::new(self.config.initial_capacity);
        self.position = 0;
        self.spans.clear();
        self.references.clear();
    }

    // ── Cursor ──────────────────────────────────────────────────

    /// Current read/write cursor.
    pub fn data_position(&self) -> usize {
        self.position
    }

    /// Move the cursor.
    ///
    /// Any position is accepted. Reads past `size` yield zero/null; a
    /// position inside a value only fails once something is read or
    /// written there.
    pub fn set_data_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Bytes logically written.
    pub fn data_size(&self) -> usize {
        self.storage.size()
    }

    /// Bytes allocated.
    pub fn data_capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Bytes left between the cursor and the end of data.
    pub fn data_avail(&self) -> usize {
        self.storage.size().saturating_sub(self.position)
    }

    // ── Size and capacity ───────────────────────────────────────

    /// Set the logical size, rounded up to a multiple of 4.
    ///
    /// Grows capacity if needed but never shrinks it. Newly exposed bytes
    /// read as zero. Values cut by the new end are forgotten, and the
    /// cursor is clamped to the new size.
    pub fn set_data_size(&mut self, size: usize) -> Result<()> {
        let size = self.checked_limit(size)?;
        if size > self.storage.capacity() {
            self.resize_capacity(size);
        }
        self.spans.truncate(size);
        self.storage.set_size(size);
        self.position = self.position.min(size);
        Ok(())
    }

    /// Set the allocated capacity, rounded up to a multiple of 4.
    ///
    /// This is the only operation that shrinks storage. Shrinking below
    /// the current size clamps size and cursor; bytes past the new
    /// capacity are discarded and never come back.
    pub fn set_data_capacity(&mut self, capacity: usize) -> Result<()> {
        let capacity = self.checked_limit(capacity)?;
        self.resize_capacity(capacity);
        self.spans.truncate(self.storage.size());
        self.position = self.position.min(capacity);
        Ok(())
    }

    fn checked_limit(&self, bytes: usize) -> Result<usize> {
        let aligned = align4(bytes);
        if aligned > self.config.max_capacity {
            return Err(ParcelError::invalid(format!(
                "requested {aligned} bytes, capacity limit is {} bytes",
                self.config.max_capacity
            )));
        }
        Ok(aligned)
    }

    fn resize_capacity(&mut self, capacity: usize) {
        let old = self.storage.capacity();
        if old != capacity {
            debug!(old, new = capacity, "parcel capacity changed");
            self.storage.set_capacity(capacity);
        }
    }

    /// Extend size to cover `end` (rounded to a cell), growing capacity
    /// by the configured policy.
    pub(crate) fn ensure_size(&mut self, end: usize) -> Result<()> {
        if end <= self.storage.size() {
            return Ok(());
        }
        let size = align4(end);
        if size > self.storage.capacity() {
            let capacity = self.config.grown_capacity(size)?;
            self.resize_capacity(capacity);
        }
        self.storage.set_size(size);
        Ok(())
    }

    // ── Checked write / read paths ──────────────────────────────

    /// Run a write of several values as one unit.
    ///
    /// If `write` fails, everything it recorded is discarded: the cursor
    /// returns to where it began, data appended past the old end is
    /// dropped, and bytes it had already overwritten in place are zeroed
    /// and left untyped.
    pub(crate) fn write_rolled_back<T>(
        &mut self,
        write: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let start = self.position;
        let old_size = self.storage.size();
        let old_references = self.references.len();
        let result = write(self);
        if result.is_err() {
            let end = self.position.max(start);
            debug!(start, end, "rolling back partial write");
            self.spans.remove_within(start, end);
            if self.storage.size() > old_size {
                self.spans.truncate(old_size);
                self.storage.set_size(old_size);
            }
            let overwritten = end.min(old_size).saturating_sub(start);
            if overwritten > 0 {
                self.storage.slice_mut(start, overwritten).fill(0);
            }
            self.references.truncate(old_references);
            self.position = start;
        }
        result
    }

    /// Write `bytes` at the cursor as one value of `kind`.
    pub(crate) fn write_span(&mut self, kind: SpanKind, bytes: &[u8]) -> Result<()> {
        debug_assert!(
            kind.fixed_width().map_or(true, |w| w == bytes.len()),
            "{kind} written with {} bytes",
            bytes.len()
        );
        let start = self.position;
        let end = start
            .checked_add(bytes.len())
            .ok_or_else(|| ParcelError::invalid("write end overflows"))?;
        if let Some(span) = self.spans.conflict(start, end) {
            let span = self.describe(span);
            debug!(offset = start, kind = %span.kind, "partial overwrite rejected");
            return Err(ParcelError::OverwriteViolation {
                offset: start,
                span,
            });
        }
        self.ensure_size(end)?;
        self.storage.slice_mut(start, bytes.len()).copy_from_slice(bytes);
        self.spans.insert(Span::new(start, end, kind));
        self.position = end;
        Ok(())
    }

    /// Reserve `width` bytes at the cursor for a read of `kind`.
    ///
    /// Returns the offset to decode from, or `None` when the data runs
    /// out (the caller then yields its zero value).
    pub(crate) fn claim(&mut self, kind: SpanKind, width: usize) -> Result<Option<usize>> {
        let start = self.position;
        let size = self.storage.size();
        if start >= size {
            return Ok(None);
        }
        self.check_read(start, kind)?;
        if start + width > size {
            // Trailing partial field: consume it without decoding.
            self.position = size;
            return Ok(None);
        }
        self.position = start + width;
        Ok(Some(start))
    }

    /// [`claim`](Self::claim) sized by the kind's fixed width.
    fn claim_scalar(&mut self, kind: SpanKind) -> Result<Option<usize>> {
        let width = kind
            .fixed_width()
            .ok_or_else(|| ParcelError::invalid(format!("{kind} is not a fixed-width value")))?;
        self.claim(kind, width)
    }

    fn check_read(&self, offset: usize, kind: SpanKind) -> Result<()> {
        match self.spans.lookup(offset) {
            Lookup::Untyped => Ok(()),
            Lookup::Start(span) if span.kind.reads_as(kind) => Ok(()),
            Lookup::Start(span) => {
                let found = self.describe(span);
                debug!(offset, expected = %kind, found = %found.kind, "type mismatch on read");
                Err(ParcelError::TypeMismatch {
                    offset,
                    expected: kind,
                    found,
                })
            }
            Lookup::Inside(span) => {
                let span = self.describe(span);
                debug!(offset, kind = %span.kind, "read inside a value");
                Err(ParcelError::OverwriteViolation { offset, span })
            }
        }
    }

    /// Build the diagnostic view of a span by decoding its bytes.
    fn describe(&self, span: Span) -> SpanInfo {
        let at = span.start;
        let value = match span.kind {
            SpanKind::Int => self.storage.i32_at(at).to_string(),
            SpanKind::Long => self.storage.i64_at(at).to_string(),
            SpanKind::Float => self.storage.f32_at(at).to_string(),
            SpanKind::Double => self.storage.f64_at(at).to_string(),
            SpanKind::Byte => (self.storage.i32_at(at) as i8).to_string(),
            SpanKind::Boolean => (self.storage.i32_at(at) != 0).to_string(),
            SpanKind::String | SpanKind::InterfaceToken => match self.decode_string_at(at) {
                Ok((Some(text), _)) => text,
                Ok((None, _)) => "null".to_string(),
                Err(_) => "<undecodable>".to_string(),
            },
            SpanKind::ByteArray => format!("{} bytes", span.end - span.start),
            SpanKind::StrongRef => match self.resolve_reference(at) {
                Some(reference) => reference.to_string(),
                None => "null".to_string(),
            },
        };
        SpanInfo {
            start: span.start,
            end: span.end,
            kind: span.kind,
            value,
        }
    }

    // ── Scalars ─────────────────────────────────────────────────

    /// Write a 32-bit integer.
    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.write_span(SpanKind::Int, &value.to_le_bytes())
    }

    /// Read a 32-bit integer (0 past the end of data).
    pub fn read_int(&mut self) -> Result<i32> {
        Ok(match self.claim_scalar(SpanKind::Int)? {
            Some(at) => self.storage.i32_at(at),
            None => 0,
        })
    }

    /// Write a 64-bit integer.
    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.write_span(SpanKind::Long, &value.to_le_bytes())
    }

    /// Read a 64-bit integer (0 past the end of data).
    ///
    /// With fewer than 8 bytes left the remaining bytes are consumed
    /// and 0 is returned.
    pub fn read_long(&mut self) -> Result<i64> {
        Ok(match self.claim_scalar(SpanKind::Long)? {
            Some(at) => self.storage.i64_at(at),
            None => 0,
        })
    }

    /// Write a 32-bit float.
    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_span(SpanKind::Float, &value.to_le_bytes())
    }

    /// Read a 32-bit float (0.0 past the end of data).
    pub fn read_float(&mut self) -> Result<f32> {
        Ok(match self.claim_scalar(SpanKind::Float)? {
            Some(at) => self.storage.f32_at(at),
            None => 0.0,
        })
    }

    /// Write a 64-bit float.
    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_span(SpanKind::Double, &value.to_le_bytes())
    }

    /// Read a 64-bit float (0.0 past the end of data).
    pub fn read_double(&mut self) -> Result<f64> {
        Ok(match self.claim_scalar(SpanKind::Double)? {
            Some(at) => self.storage.f64_at(at),
            None => 0.0,
        })
    }

    /// Write a byte. It still occupies a full 4-byte cell.
    pub fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_span(SpanKind::Byte, &i32::from(value).to_le_bytes())
    }

    /// Read a byte (0 past the end of data).
    pub fn read_byte(&mut self) -> Result<i8> {
        Ok(match self.claim_scalar(SpanKind::Byte)? {
            Some(at) => self.storage.i32_at(at) as i8,
            None => 0,
        })
    }

    /// Write a boolean as a 0/1 cell.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_span(SpanKind::Boolean, &i32::from(value).to_le_bytes())
    }

    /// Read a boolean (`false` past the end of data).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(match self.claim_scalar(SpanKind::Boolean)? {
            Some(at) => self.storage.i32_at(at) != 0,
            None => false,
        })
    }

    /// Write a UTF-16 code unit. Recorded as an integer cell.
    pub fn write_char(&mut self, value: u16) -> Result<()> {
        self.write_int(i32::from(value))
    }

    /// Read a UTF-16 code unit (0 past the end of data).
    pub fn read_char(&mut self) -> Result<u16> {
        Ok(self.read_int()? as u16)
    }

    // ── Strings ─────────────────────────────────────────────────

    /// Write a string, or the null sentinel for `None`.
    ///
    /// Layout: UTF-16 unit count, UTF-16LE units, a 2-byte NUL, padding
    /// to the next cell.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<()> {
        self.write_string_as(SpanKind::String, value)
    }

    /// Read a string.
    ///
    /// Returns `None` for the null sentinel (advancing 4 bytes) or when
    /// the cursor is at or past the end of data.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        self.read_string_as(SpanKind::String)
    }

    pub(crate) fn write_string_as(&mut self, kind: SpanKind, value: Option<&str>) -> Result<()> {
        let Some(text) = value else {
            return self.write_span(kind, &NULL_LENGTH.to_le_bytes());
        };
        let units: Vec<u16> = text.encode_utf16().collect();
        let len = i32::try_from(units.len())
            .map_err(|_| ParcelError::invalid(format!("string of {} units is too long", units.len())))?;
        let width = PREFIX + align4((units.len() + 1) * 2);
        let mut buf = Vec::with_capacity(width);
        buf.extend_from_slice(&len.to_le_bytes());
        for unit in &units {
            buf.extend_from_slice(&unit.to_le_bytes());
        }
        buf.resize(width, 0);
        self.write_span(kind, &buf)
    }

    pub(crate) fn read_string_as(&mut self, kind: SpanKind) -> Result<Option<String>> {
        let Some(start) = self.claim(kind, PREFIX)? else {
            return Ok(None);
        };
        match self.decode_string_at(start) {
            Ok((text, width)) => {
                self.position = start + width;
                Ok(text)
            }
            Err(e) => {
                self.position = start;
                Err(e)
            }
        }
    }

    /// Decode the string whose length prefix sits at `offset`.
    ///
    /// Returns the string (or `None` for the sentinel) and its encoded
    /// width. The prefix itself must lie within the data.
    fn decode_string_at(&self, offset: usize) -> Result<(Option<String>, usize)> {
        let len = self.storage.i32_at(offset);
        if len == NULL_LENGTH {
            return Ok((None, PREFIX));
        }
        let units = usize::try_from(len)
            .map_err(|_| ParcelError::malformed(offset, format!("negative string length {len}")))?;
        let width = PREFIX + align4((units + 1) * 2);
        let size = self.storage.size();
        if offset + width > size {
            return Err(ParcelError::malformed(
                offset,
                format!("string of {units} units runs past end of data ({size} bytes)"),
            ));
        }
        let utf16: Vec<u16> = self
            .storage
            .slice(offset + PREFIX, units * 2)
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let text = String::from_utf16(&utf16)
            .map_err(|e| ParcelError::malformed(offset, format!("invalid UTF-16 string: {e}")))?;
        Ok((Some(text), width))
    }

    /// Read a count prefix, mapping the null sentinel to `None`.
    ///
    /// `min_element_width` bounds the count by the bytes actually left so
    /// corrupt data cannot trigger a huge allocation.
    pub(crate) fn read_count(&mut self, min_element_width: usize) -> Result<Option<usize>> {
        let at = self.position;
        let raw = self.read_int()?;
        if raw == NULL_LENGTH {
            return Ok(None);
        }
        let count = usize::try_from(raw)
            .map_err(|_| ParcelError::malformed(at, format!("negative count {raw}")))?;
        if count.saturating_mul(min_element_width) > self.data_avail() {
            return Err(ParcelError::malformed(
                at,
                format!(
                    "count {count} exceeds the {} bytes remaining",
                    self.data_avail()
                ),
            ));
        }
        Ok(Some(count))
    }

    /// Write a count prefix for a slice that may be absent.
    pub(crate) fn write_count(&mut self, len: Option<usize>) -> Result<()> {
        match len {
            None => self.write_int(NULL_LENGTH),
            Some(len) => {
                let len = i32::try_from(len)
                    .map_err(|_| ParcelError::invalid(format!("{len} elements is too many")))?;
                self.write_int(len)
            }
        }
    }
}

impl Default for Parcel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parcel")
            .field("position", &self.position)
            .field("size", &self.storage.size())
            .field("capacity", &self.storage.capacity())
            .field("spans", &self.spans.len())
            .field("references", &self.references.len())
            .finish()
    }
}
