//! Span kinds: the declared type of a value recorded in a parcel.

use std::fmt;

/// The declared type of one logical value written into a parcel.
///
/// Every typed write records a span tagged with one of these kinds.
/// Typed reads compare the requested kind against the recorded one
/// with [`SpanKind::reads_as`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
    /// Single byte widened to a 4-byte cell.
    Byte,
    /// Boolean widened to a 4-byte cell.
    Boolean,
    /// Length-prefixed UTF-16 string (or the null sentinel).
    String,
    /// A string written as a protocol interface token.
    InterfaceToken,
    /// Raw payload of a byte array (the count prefix is a separate `Int`).
    ByteArray,
    /// Flattened strong reference (presence flag + table index).
    StrongRef,
}

impl SpanKind {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Byte => "Byte",
            Self::Boolean => "Boolean",
            Self::String => "String",
            Self::InterfaceToken => "InterfaceToken",
            Self::ByteArray => "byte[]",
            Self::StrongRef => "StrongRef",
        }
    }

    /// Encoded width in bytes for fixed-width kinds.
    ///
    /// Returns `None` for variable-length kinds (strings, byte payloads,
    /// strong references whose width depends on the presence flag).
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Int | Self::Float | Self::Byte | Self::Boolean => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::String | Self::InterfaceToken | Self::ByteArray | Self::StrongRef => None,
        }
    }

    /// Whether a span recorded as `self` may be read back as `requested`.
    ///
    /// Kinds must match exactly, except that an interface token is also
    /// readable as a plain string.
    pub fn reads_as(self, requested: SpanKind) -> bool {
        self == requested || (self == Self::InterfaceToken && requested == Self::String)
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
