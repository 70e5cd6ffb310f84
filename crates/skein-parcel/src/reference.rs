//! Strong references: opaque handles flattened into a parcel.
//!
//! A parcel cannot store a live object in its bytes, so it keeps a
//! reference table alongside them. Writing a [`StrongRef`] appends it to
//! the table and records the table index in a 20-byte flat object:
//!
//! ```text
//! [presence i32 = 1] [table index i32] [12 reserved zero bytes]
//! ```
//!
//! A null reference is just `[presence i32 = 0]`. The table is not part
//! of the raw snapshot, so references read back as `None` after
//! `unmarshall`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use skein_core::{ParcelError, Result, SpanKind};

use crate::parcel::Parcel;
use crate::span::Lookup;

/// Encoded width of a present reference.
pub(crate) const FLAT_REFERENCE_WIDTH: usize = 20;

/// Encoded width of a null reference.
const NULL_REFERENCE_WIDTH: usize = 4;

/// Counter for unique [`StrongRef`] identities.
static REFERENCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// An opaque object handle that can be written into a parcel.
///
/// Equality is identity: two handles are equal only if one was cloned
/// from the other. Cloning is cheap.
#[derive(Clone)]
pub struct StrongRef {
    id: u64,
    descriptor: Arc<str>,
}

impl StrongRef {
    /// Allocate a fresh handle with an empty descriptor.
    pub fn new() -> Self {
        Self::with_descriptor("")
    }

    /// Allocate a fresh handle labelled with an interface descriptor.
    pub fn with_descriptor(descriptor: impl Into<Arc<str>>) -> Self {
        Self {
            id: REFERENCE_COUNTER.fetch_add(1, Ordering::Relaxed),
            descriptor: descriptor.into(),
        }
    }

    /// The process-unique identity of this handle.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The interface descriptor given at construction.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl Default for StrongRef {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for StrongRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StrongRef {}

impl fmt::Debug for StrongRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrongRef")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl fmt::Display for StrongRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descriptor.is_empty() {
            write!(f, "StrongRef#{}", self.id)
        } else {
            write!(f, "{}#{}", self.descriptor, self.id)
        }
    }
}

impl Parcel {
    /// Write a strong reference, or a null flag for `None`.
    ///
    /// Rewriting a present reference in place reuses its table slot, so
    /// the table only grows with references that are still reachable.
    pub fn write_strong_ref(&mut self, reference: Option<&StrongRef>) -> Result<()> {
        let Some(reference) = reference else {
            return self.write_span(SpanKind::StrongRef, &0i32.to_le_bytes());
        };
        let slot = self.replaced_slot().unwrap_or(self.references.len());
        let index =
            i32::try_from(slot).map_err(|_| ParcelError::invalid("reference table is full"))?;
        let mut flat = [0u8; FLAT_REFERENCE_WIDTH];
        flat[..4].copy_from_slice(&1i32.to_le_bytes());
        flat[4..8].copy_from_slice(&index.to_le_bytes());
        self.write_span(SpanKind::StrongRef, &flat)?;
        match self.references.get_mut(slot) {
            Some(entry) => *entry = reference.clone(),
            None => self.references.push(reference.clone()),
        }
        Ok(())
    }

    /// Table slot of the present reference recorded at the cursor.
    fn replaced_slot(&self) -> Option<usize> {
        let at = self.position;
        match self.spans.lookup(at) {
            Lookup::Start(span)
                if span.kind == SpanKind::StrongRef
                    && span.end - span.start == FLAT_REFERENCE_WIDTH =>
            {
                let index = usize::try_from(self.storage.i32_at(at + 4)).ok()?;
                (index < self.references.len()).then_some(index)
            }
            _ => None,
        }
    }

    /// Read a strong reference.
    ///
    /// Yields `None` for a null flag, past the end of data, or when the
    /// index does not resolve in this parcel's reference table.
    pub fn read_strong_ref(&mut self) -> Result<Option<StrongRef>> {
        let Some(start) = self.claim(SpanKind::StrongRef, NULL_REFERENCE_WIDTH)? else {
            return Ok(None);
        };
        if self.storage.i32_at(start) == 0 {
            return Ok(None);
        }
        let size = self.storage.size();
        if start + FLAT_REFERENCE_WIDTH > size {
            self.position = size;
            return Ok(None);
        }
        self.position = start + FLAT_REFERENCE_WIDTH;
        Ok(self.resolve_reference(start))
    }

    /// Look up the reference flattened at `offset`, if present.
    pub(crate) fn resolve_reference(&self, offset: usize) -> Option<StrongRef> {
        if self.storage.i32_at(offset) == 0 || offset + FLAT_REFERENCE_WIDTH > self.storage.size() {
            return None;
        }
        let index = usize::try_from(self.storage.i32_at(offset + 4)).ok()?;
        self.references.get(index).cloned()
    }

    /// Number of slots in this parcel's reference table.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}
