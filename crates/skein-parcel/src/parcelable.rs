//! Tagged objects and the creator registry.
//!
//! A [`Parcelable`] knows how to flatten itself into a parcel. Reading one
//! back polymorphically needs a constructor looked up by type name; those
//! live in a [`CreatorRegistry`] that the caller builds and passes in.
//! There is no process-wide registry.
//!
//! Encodings:
//!
//! ```text
//! parcelable     [type name: string | null] [fields...]
//! typed object   [presence i32 0/1] [fields...]
//! typed list     [count i32 | -1] ([presence i32 0/1] [fields...])*
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use skein_core::{ParcelError, Result};

use crate::parcel::Parcel;

/// A value that can flatten itself into a parcel.
pub trait Parcelable: fmt::Debug + Send + Sync + 'static {
    /// Identifier written ahead of the fields by
    /// [`Parcel::write_parcelable`] and used to find a creator on read.
    fn type_name(&self) -> &str;

    /// Write this value's fields at the parcel cursor.
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

/// A [`Parcelable`] that can be rebuilt from its fields.
pub trait ParcelableCreator: Parcelable + Sized {
    /// The name this type registers under. Must match what
    /// [`Parcelable::type_name`] returns.
    const TYPE_NAME: &'static str;

    /// Read this type's fields from the parcel cursor.
    fn create_from_parcel(parcel: &mut Parcel) -> Result<Self>;
}

type CreateFn = fn(&mut Parcel) -> Result<Arc<dyn Parcelable>>;

fn create_erased<T: ParcelableCreator>(parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>> {
    Ok(Arc::new(T::create_from_parcel(parcel)?))
}

/// Lookup table from type name to constructor.
///
/// ```
/// # use skein_parcel::CreatorRegistry;
/// let registry = CreatorRegistry::new();
/// assert!(registry.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct CreatorRegistry {
    creators: IndexMap<&'static str, CreateFn>,
}

impl CreatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under [`ParcelableCreator::TYPE_NAME`].
    ///
    /// Registering the same name twice replaces the earlier creator.
    pub fn register<T: ParcelableCreator>(&mut self) -> &mut Self {
        self.creators.insert(T::TYPE_NAME, create_erased::<T>);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<T: ParcelableCreator>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Whether a creator exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.creators.contains_key(name)
    }

    /// Number of registered creators.
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Whether no creators are registered.
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.creators.keys().copied()
    }

    /// Build the object named `name` from the parcel cursor.
    pub fn create(&self, name: &str, parcel: &mut Parcel) -> Result<Arc<dyn Parcelable>> {
        let create = self
            .creators
            .get(name)
            .ok_or_else(|| ParcelError::UnknownParcelable {
                name: name.to_string(),
            })?;
        create(parcel)
    }
}

impl fmt::Debug for CreatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.creators.keys()).finish()
    }
}

impl Parcel {
    /// Write a tagged object: its type name, then its fields.
    ///
    /// `None` is written as a null type name. If the object fails to
    /// write its fields, the name is removed again.
    pub fn write_parcelable(&mut self, value: Option<&dyn Parcelable>) -> Result<()> {
        match value {
            None => self.write_string(None),
            Some(value) => self.write_rolled_back(|p| {
                p.write_string(Some(value.type_name()))?;
                value.write_to_parcel(p)
            }),
        }
    }

    /// Read a tagged object, constructing it through `registry`.
    ///
    /// Fails with [`ParcelError::UnknownParcelable`] when the name has no
    /// registered creator.
    pub fn read_parcelable(
        &mut self,
        registry: &CreatorRegistry,
    ) -> Result<Option<Arc<dyn Parcelable>>> {
        let at = self.position;
        let Some(name) = self.read_string()? else {
            return Ok(None);
        };
        match registry.create(&name, self) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.position = at;
                Err(e)
            }
        }
    }

    /// Read a tagged object that must be of type `T`.
    pub fn read_parcelable_as<T: ParcelableCreator>(&mut self) -> Result<Option<T>> {
        let at = self.position;
        let Some(name) = self.read_string()? else {
            return Ok(None);
        };
        if name != T::TYPE_NAME {
            self.position = at;
            return Err(ParcelError::ParcelableMismatch {
                expected: T::TYPE_NAME.to_string(),
                found: name,
            });
        }
        T::create_from_parcel(self).map(Some)
    }

    /// Write an object of a statically known type: a presence flag, then
    /// its fields. No type name is recorded.
    pub fn write_typed_object<T: Parcelable>(&mut self, value: Option<&T>) -> Result<()> {
        match value {
            None => self.write_int(0),
            Some(value) => self.write_rolled_back(|p| {
                p.write_int(1)?;
                value.write_to_parcel(p)
            }),
        }
    }

    /// Read an object written by [`write_typed_object`](Self::write_typed_object).
    pub fn read_typed_object<T: ParcelableCreator>(&mut self) -> Result<Option<T>> {
        if self.read_int()? == 0 {
            return Ok(None);
        }
        T::create_from_parcel(self).map(Some)
    }

    /// Write a list of same-typed objects. Each element carries a presence
    /// flag but no type name.
    pub fn write_typed_list<T: Parcelable>(&mut self, values: Option<&[T]>) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(values.map(<[T]>::len))?;
            for value in values.into_iter().flatten() {
                p.write_typed_object(Some(value))?;
            }
            Ok(())
        })
    }

    /// Read a list written by [`write_typed_list`](Self::write_typed_list).
    ///
    /// Absent elements are kept as `None`.
    pub fn create_typed_list<T: ParcelableCreator>(&mut self) -> Result<Option<Vec<Option<T>>>> {
        let Some(count) = self.read_count(4)? else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_typed_object::<T>()?);
        }
        Ok(Some(out))
    }
}

/// Structural equality for tagged objects: same type name and identical
/// flattened fields.
pub(crate) fn parcelable_eq(a: &dyn Parcelable, b: &dyn Parcelable) -> bool {
    if a.type_name() != b.type_name() {
        return false;
    }
    let flatten = |value: &dyn Parcelable| {
        let mut parcel = Parcel::new();
        value.write_to_parcel(&mut parcel).map(|()| parcel.marshall())
    };
    match (flatten(a), flatten(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
