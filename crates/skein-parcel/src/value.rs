//! Dynamically typed values and the containers built from them.
//!
//! A [`Value`] is written as an `i32` [`ValueTag`] followed by the
//! payload's own encoding. Maps, bundles, and lists are sequences of
//! tagged values:
//!
//! ```text
//! map     [count | -1] ([key: string] [tag][value])*
//! bundle  [count | -1] ([key: string] [tag][value])*
//! list    [count | -1] ([tag][value])*
//! ```
//!
//! A failed container write is rolled back, so a half-written map or
//! bundle never reads back as a shorter valid one.

use std::sync::Arc;

use indexmap::IndexMap;
use skein_core::{ParcelError, Result};

use crate::parcel::Parcel;
use crate::parcelable::{parcelable_eq, CreatorRegistry, Parcelable};
use crate::reference::StrongRef;

/// Deepest container nesting accepted on read.
pub const MAX_NESTING: usize = 64;

/// String-keyed map of values in insertion order.
pub type ValueMap = IndexMap<String, Value>;

/// Wire tag identifying a [`Value`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
#[allow(missing_docs)]
pub enum ValueTag {
    Null = -1,
    String = 0,
    Int = 1,
    Map = 2,
    Bundle = 3,
    Parcelable = 4,
    Short = 5,
    Long = 6,
    Float = 7,
    Double = 8,
    Boolean = 9,
    List = 11,
    ByteArray = 13,
    StringArray = 14,
    StrongRef = 15,
    IntArray = 18,
    LongArray = 19,
    Byte = 20,
    BooleanArray = 23,
    FloatArray = 26,
    DoubleArray = 28,
}

impl TryFrom<i32> for ValueTag {
    /// The unrecognised tag.
    type Error = i32;

    fn try_from(raw: i32) -> std::result::Result<Self, i32> {
        Ok(match raw {
            -1 => Self::Null,
            0 => Self::String,
            1 => Self::Int,
            2 => Self::Map,
            3 => Self::Bundle,
            4 => Self::Parcelable,
            5 => Self::Short,
            6 => Self::Long,
            7 => Self::Float,
            8 => Self::Double,
            9 => Self::Boolean,
            11 => Self::List,
            13 => Self::ByteArray,
            14 => Self::StringArray,
            15 => Self::StrongRef,
            18 => Self::IntArray,
            19 => Self::LongArray,
            20 => Self::Byte,
            23 => Self::BooleanArray,
            26 => Self::FloatArray,
            28 => Self::DoubleArray,
            other => return Err(other),
        })
    }
}

/// A dynamically typed value.
///
/// Payload-carrying variants are never null; a null string, array,
/// container, object, or reference is [`Value::Null`].
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum Value {
    Null,
    String(String),
    Int(i32),
    Map(ValueMap),
    Bundle(Bundle),
    Parcelable(Arc<dyn Parcelable>),
    Short(i16),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    List(Vec<Value>),
    ByteArray(Vec<u8>),
    StringArray(Vec<Option<String>>),
    StrongRef(StrongRef),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Byte(i8),
    BooleanArray(Vec<bool>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
}

impl Value {
    /// The wire tag for this variant.
    pub fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::String(_) => ValueTag::String,
            Self::Int(_) => ValueTag::Int,
            Self::Map(_) => ValueTag::Map,
            Self::Bundle(_) => ValueTag::Bundle,
            Self::Parcelable(_) => ValueTag::Parcelable,
            Self::Short(_) => ValueTag::Short,
            Self::Long(_) => ValueTag::Long,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::Boolean(_) => ValueTag::Boolean,
            Self::List(_) => ValueTag::List,
            Self::ByteArray(_) => ValueTag::ByteArray,
            Self::StringArray(_) => ValueTag::StringArray,
            Self::StrongRef(_) => ValueTag::StrongRef,
            Self::IntArray(_) => ValueTag::IntArray,
            Self::LongArray(_) => ValueTag::LongArray,
            Self::Byte(_) => ValueTag::Byte,
            Self::BooleanArray(_) => ValueTag::BooleanArray,
            Self::FloatArray(_) => ValueTag::FloatArray,
            Self::DoubleArray(_) => ValueTag::DoubleArray,
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Bundle(a), Self::Bundle(b)) => a == b,
            (Self::Parcelable(a), Self::Parcelable(b)) => parcelable_eq(&**a, &**b),
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::ByteArray(a), Self::ByteArray(b)) => a == b,
            (Self::StringArray(a), Self::StringArray(b)) => a == b,
            (Self::StrongRef(a), Self::StrongRef(b)) => a == b,
            (Self::IntArray(a), Self::IntArray(b)) => a == b,
            (Self::LongArray(a), Self::LongArray(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::BooleanArray(a), Self::BooleanArray(b)) => a == b,
            (Self::FloatArray(a), Self::FloatArray(b)) => a == b,
            (Self::DoubleArray(a), Self::DoubleArray(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    String => String,
    i32 => Int,
    ValueMap => Map,
    Bundle => Bundle,
    i16 => Short,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    bool => Boolean,
    Vec<Value> => List,
    Vec<u8> => ByteArray,
    Vec<Option<String>> => StringArray,
    StrongRef => StrongRef,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    i8 => Byte,
    Vec<bool> => BooleanArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A string-keyed bag of values with typed accessors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bundle {
    entries: ValueMap,
}

impl Bundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The underlying map.
    pub fn as_map(&self) -> &ValueMap {
        &self.entries
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or replace `key`. Replacing keeps the original position.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// String stored under `key`.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// `i32` stored under `key`.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// `i64` stored under `key`.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// `f64` stored under `key`.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean stored under `key`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Nested bundle stored under `key`.
    pub fn get_bundle(&self, key: &str) -> Option<&Bundle> {
        match self.get(key)? {
            Value::Bundle(b) => Some(b),
            _ => None,
        }
    }

    /// Byte array stored under `key`.
    pub fn get_byte_array(&self, key: &str) -> Option<&[u8]> {
        match self.get(key)? {
            Value::ByteArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// String array stored under `key`.
    pub fn get_string_array(&self, key: &str) -> Option<&[Option<String>]> {
        match self.get(key)? {
            Value::StringArray(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Object stored under `key`, downcast to `T`.
    pub fn get_parcelable<T: Parcelable>(&self, key: &str) -> Option<&T> {
        match self.get(key)? {
            Value::Parcelable(p) => p.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Store a string.
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, Value::String(value.into()))
    }

    /// Store an `i32`.
    pub fn put_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.put(key, value)
    }

    /// Store an `i64`.
    pub fn put_long(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.put(key, value)
    }

    /// Store an `f64`.
    pub fn put_double(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.put(key, value)
    }

    /// Store a boolean.
    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put(key, value)
    }

    /// Store a nested bundle.
    pub fn put_bundle(&mut self, key: impl Into<String>, value: Bundle) -> &mut Self {
        self.put(key, value)
    }

    /// Store a byte array.
    pub fn put_byte_array(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.put(key, Value::ByteArray(value.into()))
    }

    /// Store an object.
    pub fn put_parcelable(&mut self, key: impl Into<String>, value: Arc<dyn Parcelable>) -> &mut Self {
        self.put(key, Value::Parcelable(value))
    }
}

impl FromIterator<(String, Value)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<ValueMap> for Bundle {
    fn from(entries: ValueMap) -> Self {
        Self { entries }
    }
}

impl Parcel {
    // ── Values ──────────────────────────────────────────────────

    /// Write a tag followed by the value's payload.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        self.write_rolled_back(|parcel| {
            parcel.write_int(value.tag() as i32)?;
            match value {
                Value::Null => Ok(()),
                Value::String(s) => parcel.write_string(Some(s.as_str())),
                Value::Int(v) => parcel.write_int(*v),
                Value::Map(m) => parcel.write_map(Some(m)),
                Value::Bundle(b) => parcel.write_bundle(Some(b)),
                Value::Parcelable(object) => parcel.write_parcelable(Some(&**object)),
                Value::Short(v) => parcel.write_int(i32::from(*v)),
                Value::Long(v) => parcel.write_long(*v),
                Value::Float(v) => parcel.write_float(*v),
                Value::Double(v) => parcel.write_double(*v),
                Value::Boolean(v) => parcel.write_bool(*v),
                Value::List(v) => parcel.write_list(Some(v.as_slice())),
                Value::ByteArray(v) => parcel.write_byte_array(Some(v.as_slice())),
                Value::StringArray(v) => parcel.write_string_array(Some(v.as_slice())),
                Value::StrongRef(r) => parcel.write_strong_ref(Some(r)),
                Value::IntArray(v) => parcel.write_int_array(Some(v.as_slice())),
                Value::LongArray(v) => parcel.write_long_array(Some(v.as_slice())),
                Value::Byte(v) => parcel.write_byte(*v),
                Value::BooleanArray(v) => parcel.write_bool_array(Some(v.as_slice())),
                Value::FloatArray(v) => parcel.write_float_array(Some(v.as_slice())),
                Value::DoubleArray(v) => parcel.write_double_array(Some(v.as_slice())),
            }
        })
    }

    /// Read a tagged value. Objects are built through `registry`.
    ///
    /// Past the end of data this yields [`Value::Null`].
    pub fn read_value(&mut self, registry: &CreatorRegistry) -> Result<Value> {
        self.read_value_nested(registry, 0)
    }

    fn read_value_nested(&mut self, registry: &CreatorRegistry, depth: usize) -> Result<Value> {
        let at = self.position;
        let raw = self.read_int()?;
        let tag = match ValueTag::try_from(raw) {
            Ok(tag) => tag,
            Err(raw) => {
                self.position = at;
                return Err(ParcelError::malformed(at, format!("unknown value tag {raw}")));
            }
        };
        let depth = depth + 1;
        if depth > MAX_NESTING {
            self.position = at;
            return Err(ParcelError::malformed(
                at,
                format!("values nested deeper than {MAX_NESTING} levels"),
            ));
        }
        Ok(match tag {
            ValueTag::Null => Value::Null,
            ValueTag::String => self.read_string()?.into(),
            ValueTag::Int => Value::Int(self.read_int()?),
            ValueTag::Map => self.read_entries(registry, depth)?.into(),
            ValueTag::Bundle => self.read_entries(registry, depth)?.map(Bundle::from).into(),
            ValueTag::Parcelable => match self.read_parcelable(registry)? {
                Some(p) => Value::Parcelable(p),
                None => Value::Null,
            },
            ValueTag::Short => Value::Short(self.read_int()? as i16),
            ValueTag::Long => Value::Long(self.read_long()?),
            ValueTag::Float => Value::Float(self.read_float()?),
            ValueTag::Double => Value::Double(self.read_double()?),
            ValueTag::Boolean => Value::Boolean(self.read_bool()?),
            ValueTag::List => self.read_list_nested(registry, depth)?.into(),
            ValueTag::ByteArray => self.create_byte_array()?.into(),
            ValueTag::StringArray => self.create_string_array()?.into(),
            ValueTag::StrongRef => self.read_strong_ref()?.into(),
            ValueTag::IntArray => self.create_int_array()?.into(),
            ValueTag::LongArray => self.create_long_array()?.into(),
            ValueTag::Byte => Value::Byte(self.read_byte()?),
            ValueTag::BooleanArray => self.create_bool_array()?.into(),
            ValueTag::FloatArray => self.create_float_array()?.into(),
            ValueTag::DoubleArray => self.create_double_array()?.into(),
        })
    }

    // ── Maps ────────────────────────────────────────────────────

    /// Write a map as a count followed by key/value pairs.
    pub fn write_map(&mut self, map: Option<&ValueMap>) -> Result<()> {
        let entries = map.map(|m| m.iter().map(|(k, v)| (k.as_str(), v)));
        self.write_entries(entries, map.map(IndexMap::len))
    }

    /// Read a map written by [`write_map`](Self::write_map).
    pub fn read_map(&mut self, registry: &CreatorRegistry) -> Result<Option<ValueMap>> {
        self.read_entries(registry, 0)
    }

    fn write_entries<'a>(
        &mut self,
        entries: Option<impl Iterator<Item = (&'a str, &'a Value)>>,
        len: Option<usize>,
    ) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(len)?;
            for (key, value) in entries.into_iter().flatten() {
                p.write_string(Some(key))?;
                p.write_value(value)?;
            }
            Ok(())
        })
    }

    fn read_entries(
        &mut self,
        registry: &CreatorRegistry,
        depth: usize,
    ) -> Result<Option<ValueMap>> {
        let at = self.position;
        // null key + value tag
        let Some(count) = self.read_count(8)? else {
            return Ok(None);
        };
        let mut entries = ValueMap::with_capacity(count);
        for _ in 0..count {
            let key_at = self.position;
            let key = match self.read_string() {
                Ok(Some(key)) => key,
                Ok(None) => {
                    self.position = at;
                    return Err(ParcelError::malformed(key_at, "entry key is null"));
                }
                Err(e) => {
                    self.position = at;
                    return Err(e);
                }
            };
            match self.read_value_nested(registry, depth) {
                Ok(value) => {
                    entries.insert(key, value);
                }
                Err(e) => {
                    self.position = at;
                    return Err(e);
                }
            }
        }
        Ok(Some(entries))
    }

    // ── Bundles ─────────────────────────────────────────────────

    /// Write a bundle: same layout as a map.
    pub fn write_bundle(&mut self, bundle: Option<&Bundle>) -> Result<()> {
        self.write_entries(bundle.map(|b| b.iter()), bundle.map(Bundle::len))
    }

    /// Read a bundle written by [`write_bundle`](Self::write_bundle).
    ///
    /// A null key is [`ParcelError::MalformedData`]. On error the cursor
    /// is left where the bundle began.
    pub fn read_bundle(&mut self, registry: &CreatorRegistry) -> Result<Option<Bundle>> {
        Ok(self.read_entries(registry, 0)?.map(Bundle::from))
    }

    // ── Lists ───────────────────────────────────────────────────

    /// Write a list of tagged values.
    pub fn write_list(&mut self, values: Option<&[Value]>) -> Result<()> {
        self.write_rolled_back(|p| {
            p.write_count(values.map(<[Value]>::len))?;
            for value in values.into_iter().flatten() {
                p.write_value(value)?;
            }
            Ok(())
        })
    }

    /// Read a list written by [`write_list`](Self::write_list).
    pub fn read_list(&mut self, registry: &CreatorRegistry) -> Result<Option<Vec<Value>>> {
        self.read_list_nested(registry, 0)
    }

    fn read_list_nested(
        &mut self,
        registry: &CreatorRegistry,
        depth: usize,
    ) -> Result<Option<Vec<Value>>> {
        let Some(count) = self.read_count(4)? else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_value_nested(registry, depth)?);
        }
        Ok(Some(out))
    }

    /// Write a list of strings. Same layout as a string array.
    pub fn write_string_list<S: AsRef<str>>(&mut self, values: Option<&[Option<S>]>) -> Result<()> {
        self.write_string_array(values)
    }

    /// Read a list of strings.
    pub fn create_string_list(&mut self) -> Result<Option<Vec<Option<String>>>> {
        self.create_string_array()
    }

    /// Replace the contents of `list` with a string list read from the
    /// cursor, reusing its allocation. A null list leaves `list` empty.
    pub fn read_string_list(&mut self, list: &mut Vec<Option<String>>) -> Result<()> {
        let count = self.read_count(4)?.unwrap_or(0);
        list.clear();
        list.reserve(count);
        for _ in 0..count {
            list.push(self.read_string()?);
        }
        Ok(())
    }
}
