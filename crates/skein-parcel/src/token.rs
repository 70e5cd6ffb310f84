//! Interface tokens: a string header naming the protocol a parcel speaks.

use skein_core::{ParcelError, Result, SpanKind};
use tracing::debug;

use crate::parcel::Parcel;

impl Parcel {
    /// Write `interface` as this parcel's interface token.
    pub fn write_interface_token(&mut self, interface: &str) -> Result<()> {
        self.write_string_as(SpanKind::InterfaceToken, Some(interface))
    }

    /// Read the interface token at the cursor and check it equals
    /// `expected`.
    ///
    /// A missing or null token is a mismatch too.
    pub fn enforce_interface(&mut self, expected: &str) -> Result<()> {
        let actual = self.read_string_as(SpanKind::InterfaceToken)?;
        if actual.as_deref() == Some(expected) {
            return Ok(());
        }
        debug!(expected, actual = ?actual, "interface token rejected");
        Err(ParcelError::AuthorizationFailure {
            expected: expected.to_string(),
            actual,
        })
    }
}
