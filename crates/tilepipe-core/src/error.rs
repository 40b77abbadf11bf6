//! Error types for tilepipe operations.
//!
//! One taxonomy serves the whole pipeline: build-time validation, region
//! preparation, and generate-time production all return [`Error`] values
//! directly to the caller. Nothing is retried internally and there is no
//! shared error state - a failure belongs to exactly one call.
//!
//! # Usage
//!
//! ```rust
//! use tilepipe_core::{Error, Result};
//!
//! fn check_band(band: i32, bands: i32) -> Result<()> {
//!     if band >= bands {
//!         return Err(Error::out_of_bounds(format!(
//!             "band {band} outside image with {bands} bands"
//!         )));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a pipeline stage.
///
/// # Categories
///
/// - **Validation**: [`OutOfBounds`](Error::OutOfBounds),
///   [`ParamRange`](Error::ParamRange),
///   [`UnsupportedCoding`](Error::UnsupportedCoding),
///   [`InvalidDescriptor`](Error::InvalidDescriptor)
/// - **Generate-time**: [`Upstream`](Error::Upstream)
/// - **I/O preconditions**: [`Io`](Error::Io)
#[derive(Debug, Error)]
pub enum Error {
    /// Requested geometry or band range falls outside the source extent.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Source pixel data is not in a directly addressable coding.
    #[error("unsupported coding: {0}")]
    UnsupportedCoding(String),

    /// A parameter is outside the defensive numeric bound.
    ///
    /// Checked before any other validation so that downstream arithmetic
    /// never sees values that could overflow.
    #[error("parameter {name} = {value} outside [{min}, {max}]")]
    ParamRange {
        /// Parameter name as exposed by the operation.
        name: &'static str,
        /// The rejected value.
        value: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },

    /// An image descriptor does not describe a usable buffer.
    ///
    /// Build-time only: empty extent, zero bands, or byte sizes that
    /// overflow.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A preceding pipeline stage failed; the failure is opaque here.
    #[error("upstream stage failed: {0}")]
    Upstream(String),

    /// A source or destination could not be placed into a readable or
    /// writable state.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation that could not be expressed as one of
    /// the categories above. Prefer specific variants when possible.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Creates an [`Error::UnsupportedCoding`] error.
    #[inline]
    pub fn unsupported_coding(msg: impl Into<String>) -> Self {
        Self::UnsupportedCoding(msg.into())
    }

    /// Creates an [`Error::InvalidDescriptor`] error.
    #[inline]
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Creates an [`Error::Upstream`] error.
    #[inline]
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds(_))
    }

    /// Returns `true` if this is a range-gate error.
    #[inline]
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::ParamRange { .. })
    }

    /// Returns `true` if this failure was propagated from a preceding stage.
    #[inline]
    pub fn is_upstream_error(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Returns `true` if this is an I/O precondition error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds() {
        let err = Error::out_of_bounds("rect (2, 3, 40x50) outside image 10x10");
        assert!(err.is_bounds_error());
        assert!(err.to_string().contains("40x50"));
    }

    #[test]
    fn test_param_range_display() {
        let err = Error::ParamRange {
            name: "width",
            value: 0,
            min: 1,
            max: 100_000_000,
        };
        assert!(err.is_range_error());
        let msg = err.to_string();
        assert!(msg.contains("width"));
        assert!(msg.contains("100000000"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no pixels");
        let err: Error = io_err.into();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_upstream() {
        let err = Error::upstream("stage poisoned");
        assert!(err.is_upstream_error());
    }
}
