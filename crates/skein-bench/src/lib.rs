//! Benchmark workloads for the Skein marshalling buffer.
//!
//! Provides deterministic parcel builders shared by the benches:
//!
//! - [`mixed_parcel`]: interleaved scalars and strings
//! - [`sample_bundle`]: a nested bundle with arrays

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use skein_core::Result;
use skein_parcel::{Bundle, Parcel, Value};

/// Write `records` rows of (int, long, string, double) into a fresh parcel.
pub fn mixed_parcel(records: usize) -> Result<Parcel> {
    let mut parcel = Parcel::new();
    for i in 0..records {
        parcel.write_int(i as i32)?;
        parcel.write_long((i as i64) << 20)?;
        parcel.write_string(Some(format!("record-{i}").as_str()))?;
        parcel.write_double(i as f64 * 0.5)?;
    }
    Ok(parcel)
}

/// Read back the rows written by [`mixed_parcel`], returning a checksum.
pub fn read_mixed(parcel: &mut Parcel, records: usize) -> Result<i64> {
    parcel.set_data_position(0);
    let mut sum = 0i64;
    for _ in 0..records {
        sum += i64::from(parcel.read_int()?);
        sum += parcel.read_long()?;
        sum += parcel.read_string()?.map_or(0, |s| s.len() as i64);
        sum += parcel.read_double()? as i64;
    }
    Ok(sum)
}

/// A bundle with `entries` keys, every fourth one a nested bundle.
pub fn sample_bundle(entries: usize) -> Bundle {
    let mut bundle = Bundle::new();
    for i in 0..entries {
        let key = format!("key-{i}");
        match i % 4 {
            0 => bundle.put_int(key, i as i32),
            1 => bundle.put_string(key, format!("value-{i}")),
            2 => bundle.put(key, Value::IntArray((0..16).collect())),
            _ => {
                let mut inner = Bundle::new();
                inner.put_long("id", i as i64).put_bool("flag", i % 2 == 0);
                bundle.put_bundle(key, inner)
            }
        };
    }
    bundle
}
