//! Skein: an emulated marshalling buffer.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Skein sub-crates. For most users, adding `skein` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use skein::prelude::*;
//!
//! let mut parcel = Parcel::new();
//! parcel.write_interface_token("com.example.IGreeter")?;
//! parcel.write_string(Some("hello"))?;
//! parcel.write_long(111)?;
//!
//! parcel.set_data_position(0);
//! parcel.enforce_interface("com.example.IGreeter")?;
//! assert_eq!(parcel.read_string()?.as_deref(), Some("hello"));
//!
//! // Landing in the middle of the long is caught.
//! let here = parcel.data_position();
//! parcel.set_data_position(here + 4);
//! assert!(matches!(
//!     parcel.read_int(),
//!     Err(ParcelError::OverwriteViolation { .. })
//! ));
//! # Ok::<(), ParcelError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skein-core` | Span kinds, alignment, configuration, errors |
//! | [`parcel`] | `skein-parcel` | `Parcel`, references, tagged objects, containers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary shared by every crate (`skein-core`).
///
/// Contains [`types::SpanKind`], [`types::ParcelConfig`], and the
/// [`types::ParcelError`] type.
pub use skein_core as types;

/// The marshalling buffer and its codecs (`skein-parcel`).
///
/// [`parcel::Parcel`] is the entry point; tagged objects are read back
/// through a caller-owned [`parcel::CreatorRegistry`].
pub use skein_parcel as parcel;

/// Common imports for typical Skein usage.
///
/// ```rust
/// use skein::prelude::*;
/// ```
pub mod prelude {
    // Buffer
    pub use skein_parcel::{Parcel, StrongRef, NULL_LENGTH};

    // Tagged objects
    pub use skein_parcel::{CreatorRegistry, Parcelable, ParcelableCreator};

    // Containers
    pub use skein_parcel::{Bundle, Value, ValueMap, ValueTag};

    // Core types and errors
    pub use skein_core::{ParcelConfig, ParcelError, SpanInfo, SpanKind};
}
