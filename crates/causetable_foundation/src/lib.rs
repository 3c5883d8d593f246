//! Core values and error types for causetable.
//!
//! This crate provides:
//! - [`Value`] - A discrete category value stored in observation columns
//! - [`Error`] - Rich error types with context
//! - [`ErrorCategory`] - The coarse error classes callers match on

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod value;

pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind};
pub use value::Value;

/// Result type alias using causetable's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
