//! Per-element pixel formats and coding.
//!
//! A pixel in a tilepipe image is `bands` interleaved elements, all of the
//! same [`BandFormat`]. [`Coding`] records whether that layout actually holds:
//! only [`Coding::Native`] data can be addressed element-by-element, which is
//! what the extraction algorithms rely on.
//!
//! # Usage
//!
//! ```rust
//! use tilepipe_core::{BandFormat, Coding};
//!
//! assert_eq!(BandFormat::U8.bytes(), 1);
//! assert_eq!(BandFormat::F32.bytes(), 4);
//! assert!(Coding::Native.is_addressable());
//! assert!(!Coding::Opaque.is_addressable());
//! ```

/// Element type of one band of a pixel.
///
/// All bands of a pixel share one format, so the byte size of a pixel is
/// `format.bytes() * bands`. Only fixed-size scalar formats are supported;
/// anything else must be carried as [`Coding::Opaque`] data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BandFormat {
    /// 8-bit unsigned integer.
    #[default]
    U8,
    /// 8-bit signed integer.
    I8,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit signed integer.
    I16,
    /// 32-bit unsigned integer.
    U32,
    /// 32-bit signed integer.
    I32,
    /// 32-bit single-precision float.
    F32,
    /// 64-bit double-precision float.
    F64,
}

impl BandFormat {
    /// Size of one element in bytes.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Whether this is a floating-point format.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether this is an integer format.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }
}

impl std::fmt::Display for BandFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

/// How pixel data is encoded in memory.
///
/// Per-band extraction and pointer aliasing assume pixels are a flat run of
/// fixed-size elements. Data that is compressed, packed, or otherwise not
/// indexable without a decode step is `Opaque`, and the validation gate
/// rejects it before any generate call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Coding {
    /// Interleaved fixed-size elements, directly addressable.
    #[default]
    Native,
    /// Compressed or packed representation; needs a decode step first.
    Opaque,
}

impl Coding {
    /// Whether pixels can be indexed by fixed-size elements without decoding.
    #[inline]
    pub const fn is_addressable(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl std::fmt::Display for Coding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Opaque => write!(f, "opaque"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_format_bytes() {
        assert_eq!(BandFormat::U8.bytes(), 1);
        assert_eq!(BandFormat::I8.bytes(), 1);
        assert_eq!(BandFormat::U16.bytes(), 2);
        assert_eq!(BandFormat::I16.bytes(), 2);
        assert_eq!(BandFormat::U32.bytes(), 4);
        assert_eq!(BandFormat::I32.bytes(), 4);
        assert_eq!(BandFormat::F32.bytes(), 4);
        assert_eq!(BandFormat::F64.bytes(), 8);
    }

    #[test]
    fn test_band_format_classes() {
        assert!(BandFormat::F32.is_float());
        assert!(!BandFormat::F32.is_integer());
        assert!(BandFormat::U16.is_integer());
        assert!(!BandFormat::U16.is_float());
    }

    #[test]
    fn test_coding_addressable() {
        assert!(Coding::Native.is_addressable());
        assert!(!Coding::Opaque.is_addressable());
    }
}
