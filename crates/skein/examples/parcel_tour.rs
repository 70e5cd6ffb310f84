//! Walk through the main parcel operations with debug logging enabled.
//!
//! Run with `RUST_LOG=skein_parcel=trace` to see span replacement and
//! capacity changes as they happen.

use std::sync::Arc;

use skein::prelude::*;
use skein_test_utils::{fixture_registry, Account};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ParcelError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = ParcelConfig::new().with_max_capacity(4096);
    let mut parcel = Parcel::with_config(config)?;

    parcel.write_interface_token("com.example.IAccountService")?;
    parcel.write_parcelable(Some(&Account::new("ada", "com.example")))?;

    let mut extras = Bundle::new();
    extras
        .put_string("origin", "tour")
        .put_int("attempt", 1)
        .put_parcelable("backup", Arc::new(Account::new("bob", "com.example")));
    parcel.write_bundle(Some(&extras))?;
    info!(
        size = parcel.data_size(),
        capacity = parcel.data_capacity(),
        "request written"
    );

    parcel.set_data_position(0);
    parcel.enforce_interface("com.example.IAccountService")?;
    let registry = fixture_registry();
    let account = parcel.read_parcelable_as::<Account>()?;
    let bundle = parcel.read_bundle(&registry)?;
    info!(?account, entries = bundle.map_or(0, |b| b.len()), "request read");

    // A snapshot keeps bytes only; the copy reads untyped.
    let bytes = parcel.marshall();
    let mut copy = Parcel::new();
    copy.unmarshall(&bytes, 0, bytes.len())?;
    info!(bytes = bytes.len(), "snapshot reloaded");

    // Offset 4 is inside the interface token, so this write is refused.
    parcel.set_data_position(4);
    if let Err(e) = parcel.write_int(0) {
        info!(error = %e, "overwrite rejected");
    }
    Ok(())
}
