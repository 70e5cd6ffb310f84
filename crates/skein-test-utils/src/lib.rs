//! Test utilities and fixture types for Skein development.
//!
//! Provides fixture [`Parcelable`](skein_parcel::Parcelable) types, a
//! registry preloaded with them, and assertion helpers for the parcel
//! invariants.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use skein_parcel::{CreatorRegistry, Parcel};

pub use fixtures::{Account, Counter, FailingParcelable};

/// Registry with every fixture creator registered.
pub fn fixture_registry() -> CreatorRegistry {
    CreatorRegistry::new().with::<Account>().with::<Counter>()
}

/// Assert the structural invariants every parcel keeps between calls.
///
/// `position <= size` is only checked when `strict_position` is set,
/// since an explicit seek may legally move the cursor past the end.
pub fn assert_invariants(parcel: &Parcel, strict_position: bool) {
    let size = parcel.data_size();
    let capacity = parcel.data_capacity();
    assert!(capacity >= size, "capacity {capacity} < size {size}");
    assert_eq!(size % 4, 0, "size {size} not cell aligned");
    assert_eq!(capacity % 4, 0, "capacity {capacity} not cell aligned");
    assert!(
        capacity <= parcel.config().max_capacity,
        "capacity {capacity} above limit {}",
        parcel.config().max_capacity
    );
    if strict_position {
        let position = parcel.data_position();
        assert!(position <= size, "position {position} > size {size}");
    }
}

/// Marshall `parcel` and load the bytes into a fresh parcel.
pub fn reload(parcel: &Parcel) -> Parcel {
    let bytes = parcel.marshall();
    let mut fresh = Parcel::new();
    fresh
        .unmarshall(&bytes, 0, bytes.len())
        .expect("snapshot of a live parcel always reloads");
    fresh
}
