//! Validation guards shared by the extraction operations.
//!
//! Every operation runs its gate once, at build time, before any buffer is
//! touched: first the defensive numeric range check, then structural checks
//! against the source descriptor. A gate failure has no side effects - the
//! operation simply never comes into existence.
//!
//! # Example
//!
//! ```rust
//! use tilepipe_ops::guard;
//!
//! assert!(guard::ensure_extent_range("width", 640).is_ok());
//! assert!(guard::ensure_extent_range("width", 0).is_err());
//! ```

use tilepipe_core::{Error, ImageDescriptor, PipelineNode, Result};

/// Sanity bound on all geometry parameters.
///
/// Values beyond this are rejected before any other validation runs, so
/// later coordinate arithmetic can never overflow.
pub const PARAM_RANGE: i64 = 100_000_000;

/// Checks a signed offset parameter against `[-PARAM_RANGE, PARAM_RANGE]`.
pub fn ensure_offset_range(name: &'static str, value: i32) -> Result<()> {
    ensure_range(name, value, -PARAM_RANGE, PARAM_RANGE)
}

/// Checks a zero-based index parameter against `[0, PARAM_RANGE]`.
pub fn ensure_index_range(name: &'static str, value: i32) -> Result<()> {
    ensure_range(name, value, 0, PARAM_RANGE)
}

/// Checks a size or count parameter against `[1, PARAM_RANGE]`.
pub fn ensure_extent_range(name: &'static str, value: i32) -> Result<()> {
    ensure_range(name, value, 1, PARAM_RANGE)
}

fn ensure_range(name: &'static str, value: i32, min: i64, max: i64) -> Result<()> {
    let value = i64::from(value);
    if value < min || value > max {
        return Err(Error::ParamRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Checks that the source's pixels can be indexed by fixed-size elements.
///
/// Opaque (compressed or packed) codings make per-element addressing
/// undefined, so both extraction kinds reject them here.
pub fn ensure_known_coding(op: &str, desc: &ImageDescriptor) -> Result<()> {
    if !desc.coding.is_addressable() {
        return Err(Error::unsupported_coding(format!(
            "{op}: source coding is {}, expected native",
            desc.coding
        )));
    }
    Ok(())
}

/// Checks that `node` can supply pixel data on demand.
pub fn ensure_readable(op: &str, node: &PipelineNode) -> Result<()> {
    if node.is_failed() {
        return Err(Error::Io(std::io::Error::other(format!(
            "{op}: source stage previously failed and cannot supply pixels"
        ))));
    }
    Ok(())
}

/// Checks that `desc` can back a writable output buffer.
pub fn ensure_writable(op: &str, desc: &ImageDescriptor) -> Result<()> {
    if desc.byte_len().is_err() {
        return Err(Error::Io(std::io::Error::other(format!(
            "{op}: output descriptor {desc} cannot back a pixel buffer"
        ))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilepipe_core::{BandFormat, Coding};

    #[test]
    fn test_offset_range() {
        assert!(ensure_offset_range("left", -100_000_000).is_ok());
        assert!(ensure_offset_range("left", 100_000_000).is_ok());
        assert!(ensure_offset_range("left", -100_000_001).is_err());
        assert!(ensure_offset_range("left", 100_000_001).is_err());
    }

    #[test]
    fn test_extent_range() {
        assert!(ensure_extent_range("width", 1).is_ok());
        let err = ensure_extent_range("width", 0).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_index_range() {
        assert!(ensure_index_range("band", 0).is_ok());
        assert!(ensure_index_range("band", -1).is_err());
    }

    #[test]
    fn test_known_coding() {
        let mut desc = ImageDescriptor::new(4, 4, 3, BandFormat::U8);
        assert!(ensure_known_coding("extract_area", &desc).is_ok());

        desc.coding = Coding::Opaque;
        let err = ensure_known_coding("extract_area", &desc).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCoding(_)));
    }

    #[test]
    fn test_writable_rejects_overflow() {
        let desc = ImageDescriptor::new(i32::MAX, i32::MAX, 4, BandFormat::F64);
        let err = ensure_writable("extract_area", &desc).unwrap_err();
        assert!(err.is_io_error());
    }
}
