//! Error types for parcel operations.
//!
//! Every variant signals caller misuse or undecodable data. None of them
//! are transient, so nothing in the workspace retries on error.

use std::error::Error;
use std::fmt;

use crate::kind::SpanKind;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ParcelError>;

/// Diagnostic snapshot of a recorded span.
///
/// Produced only when an error is raised; spans themselves never leave
/// the parcel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanInfo {
    /// First byte of the span.
    pub start: usize,
    /// One past the last byte of the span.
    pub end: usize,
    /// Declared type of the value.
    pub kind: SpanKind,
    /// Rendering of the stored value, decoded from the span's bytes.
    pub value: String,
}

impl fmt::Display for SpanInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" ({}) spanning [{},{})",
            self.value, self.kind, self.start, self.end
        )
    }
}

/// Errors that can occur during parcel operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParcelError {
    /// A write (or read) landed inside a previously written value without
    /// starting at that value's first byte.
    OverwriteViolation {
        /// Cursor position at which the access was attempted.
        offset: usize,
        /// The span that would have been cut.
        span: SpanInfo,
    },
    /// A typed read found a value of a different recorded type.
    TypeMismatch {
        /// Cursor position of the read.
        offset: usize,
        /// Kind the caller asked for.
        expected: SpanKind,
        /// The span actually recorded at `offset`.
        found: SpanInfo,
    },
    /// An interface token did not match the expected descriptor.
    AuthorizationFailure {
        /// Descriptor the reader required.
        expected: String,
        /// Token found in the parcel (`None` for a null or missing token).
        actual: Option<String>,
    },
    /// An argument was out of range (sizes, slices, array lengths, limits).
    InvalidArgument {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// A tagged object named a type missing from the creator registry.
    UnknownParcelable {
        /// The unregistered type name.
        name: String,
    },
    /// A tagged object named a different type than the caller requested.
    ParcelableMismatch {
        /// Type name the caller asked for.
        expected: String,
        /// Type name found in the parcel.
        found: String,
    },
    /// Raw bytes could not be decoded as the requested encoding.
    MalformedData {
        /// Offset at which decoding failed.
        offset: usize,
        /// Human-readable description of what went wrong.
        reason: String,
    },
}

impl ParcelError {
    /// Build an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build a [`MalformedData`](Self::MalformedData) error.
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            offset,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverwriteViolation { offset, span } => {
                write!(
                    f,
                    "cannot partially overwrite objects: {offset} in middle of {span}"
                )
            }
            Self::TypeMismatch {
                offset,
                expected,
                found,
            } => {
                write!(f, "looking for {expected} at position {offset}, found {found}")
            }
            Self::AuthorizationFailure { expected, actual } => match actual {
                Some(actual) => write!(
                    f,
                    "binder invocation to an incorrect interface: expected '{expected}', found '{actual}'"
                ),
                None => write!(
                    f,
                    "binder invocation to an incorrect interface: expected '{expected}', found no token"
                ),
            },
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::UnknownParcelable { name } => {
                write!(f, "no creator registered for parcelable '{name}'")
            }
            Self::ParcelableMismatch { expected, found } => {
                write!(f, "expected parcelable '{expected}', found '{found}'")
            }
            Self::MalformedData { offset, reason } => {
                write!(f, "malformed data at {offset}: {reason}")
            }
        }
    }
}

impl Error for ParcelError {}
