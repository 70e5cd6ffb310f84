//! Fixture parcelables.
//!
//! - [`Account`]: two strings, registered as `"skein.test.Account"`.
//! - [`Counter`]: a single `i32`, registered as `"skein.test.Counter"`.
//! - [`FailingParcelable`]: fails on write, never registered.

use std::any::Any;

use skein_core::{ParcelError, Result};
use skein_parcel::{Parcel, Parcelable, ParcelableCreator};

/// A named account with a type label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub account_type: String,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_type: account_type.into(),
        }
    }
}

impl Parcelable for Account {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_string(Some(self.name.as_str()))?;
        parcel.write_string(Some(self.account_type.as_str()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParcelableCreator for Account {
    const TYPE_NAME: &'static str = "skein.test.Account";

    fn create_from_parcel(parcel: &mut Parcel) -> Result<Self> {
        Ok(Self {
            name: parcel.read_string()?.unwrap_or_default(),
            account_type: parcel.read_string()?.unwrap_or_default(),
        })
    }
}

/// A single integer payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counter {
    pub contents: i32,
}

impl Counter {
    pub fn new(contents: i32) -> Self {
        Self { contents }
    }
}

impl Parcelable for Counter {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_int(self.contents)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ParcelableCreator for Counter {
    const TYPE_NAME: &'static str = "skein.test.Counter";

    fn create_from_parcel(parcel: &mut Parcel) -> Result<Self> {
        Ok(Self {
            contents: parcel.read_int()?,
        })
    }
}

/// Writes one integer, then fails deterministically.
#[derive(Debug, Default)]
pub struct FailingParcelable;

impl Parcelable for FailingParcelable {
    fn type_name(&self) -> &str {
        "skein.test.Failing"
    }

    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_int(1)?;
        Err(ParcelError::invalid("fixture refuses to flatten"))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
