//! Core types for the Skein marshalling buffer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: span kinds,
//! cell alignment helpers, buffer configuration, and the error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod kind;
pub mod layout;

pub use config::ParcelConfig;
pub use error::{ParcelError, Result, SpanInfo};
pub use kind::SpanKind;
pub use layout::{align4, CELL};
