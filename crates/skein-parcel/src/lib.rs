//! Emulated marshalling buffer for the Skein workspace.
//!
//! A [`Parcel`] is a growable byte buffer with a read/write cursor.
//! Values are written at the cursor in a fixed little-endian layout and
//! read back in the same order. Alongside the bytes the parcel records a
//! span table: the range and declared type of every value written. The
//! table lets the parcel reject writes that would cut an earlier value in
//! half and reads that ask for the wrong type.
//!
//! # Architecture
//!
//! ```text
//! Parcel
//! ├── Storage     (zeroed bytes; len = capacity, size = written prefix)
//! ├── SpanTable   (sorted, disjoint typed ranges over Storage)
//! ├── position    (cursor)
//! └── references  (StrongRef table indexed from flattened references)
//! ```
//!
//! Typed I/O lives on `Parcel` in per-concern modules: scalars and strings
//! in [`parcel`], arrays in `array`, references in [`reference`], tagged
//! objects in [`parcelable`], containers in [`value`], interface tokens in
//! `token`, and raw snapshots in `bulk`.
//!
//! # Example
//!
//! ```
//! use skein_parcel::Parcel;
//!
//! let mut p = Parcel::new();
//! p.write_int(7)?;
//! p.write_string(Some("hello"))?;
//! p.set_data_position(0);
//! assert_eq!(p.read_int()?, 7);
//! assert_eq!(p.read_string()?.as_deref(), Some("hello"));
//! # Ok::<(), skein_parcel::ParcelError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod array;
mod bulk;
pub mod parcel;
pub mod parcelable;
pub mod reference;
mod span;
mod storage;
mod token;
pub mod value;

pub use parcel::{Parcel, NULL_LENGTH};
pub use parcelable::{CreatorRegistry, Parcelable, ParcelableCreator};
pub use reference::StrongRef;
pub use value::{Bundle, Value, ValueMap, ValueTag, MAX_NESTING};

pub use skein_core::{ParcelConfig, ParcelError, Result, SpanInfo, SpanKind};
