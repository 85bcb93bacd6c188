//! # hiearch-error
//!
//! Unified error handling for hiearch.
//!
//! ## Design
//!
//! - **ErrorKind**: what went wrong (e.g., DuplicateId, StyleCycle)
//! - **Error Context**: the offending ids and paths, as ordered key/value pairs
//! - **Error Source**: wrap underlying errors without leaking raw types
//!
//! Resolution is all-or-nothing, so every error is fatal and there is no
//! retry status.
//!
//! ## Usage
//!
//! ```rust
//! use hiearch_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::MissingReference, "missing node id: db")
//!         .with_operation("store::check_references")
//!         .with_context("kind", "node")
//!         .with_context("id", "db"))
//! }
//! ```

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using hiearch Error
pub type Result<T> = std::result::Result<T, Error>;
