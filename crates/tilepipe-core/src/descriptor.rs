//! Image descriptors: the immutable header of a pipeline stage.
//!
//! An [`ImageDescriptor`] is everything a downstream consumer needs to
//! interpret a stage's pixels: extent, band count, element format, coding,
//! and the origin offset that records how this stage's coordinate frame is
//! shifted relative to its ultimate source.
//!
//! # Origin offsets
//!
//! Cropping moves the coordinate frame: pixel (0, 0) of a crop is pixel
//! (left, top) of its input. `x_offset`/`y_offset` accumulate those shifts
//! (the crop origin is *subtracted*) so that a coordinate expressed in any
//! stage's frame can still be resolved against the original image, no matter
//! how many crops are chained.
//!
//! # Lifecycle
//!
//! A descriptor is derived once when an operation is built, after validation
//! succeeds, and never changes afterwards. Downstream stages hold it
//! read-only.
//!
//! # Usage
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor};
//!
//! let desc = ImageDescriptor::new(1920, 1080, 3, BandFormat::U8);
//! assert_eq!(desc.pixel_size(), 3);
//! assert_eq!(desc.scanline_size(), 1920 * 3);
//! ```

use crate::error::{Error, Result};
use crate::format::{BandFormat, Coding};
use crate::rect::Rect;

/// Geometry and pixel layout of one pipeline stage's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Number of interleaved bands per pixel.
    pub bands: i32,
    /// Element type shared by all bands.
    pub format: BandFormat,
    /// How pixel data is encoded.
    pub coding: Coding,
    /// Horizontal shift of this frame relative to the original source.
    pub x_offset: i32,
    /// Vertical shift of this frame relative to the original source.
    pub y_offset: i32,
}

impl ImageDescriptor {
    /// Creates a descriptor with native coding and zero origin offset.
    #[inline]
    pub const fn new(width: i32, height: i32, bands: i32, format: BandFormat) -> Self {
        Self {
            width,
            height,
            bands,
            format,
            coding: Coding::Native,
            x_offset: 0,
            y_offset: 0,
        }
    }

    /// Size of one element in bytes.
    #[inline]
    pub const fn element_size(&self) -> usize {
        self.format.bytes()
    }

    /// Size of one whole pixel in bytes (`element_size * bands`).
    #[inline]
    pub const fn pixel_size(&self) -> usize {
        self.format.bytes() * self.bands as usize
    }

    /// Size of one full-width row in bytes.
    #[inline]
    pub const fn scanline_size(&self) -> usize {
        self.pixel_size() * self.width as usize
    }

    /// The whole-image rectangle, anchored at (0, 0).
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Total byte size of the fully materialized image.
    ///
    /// Fails with [`Error::InvalidDescriptor`] if the descriptor is empty or
    /// the size overflows.
    pub fn byte_len(&self) -> Result<usize> {
        self.validate()?;
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.pixel_size()))
            .ok_or_else(|| {
                Error::invalid_descriptor(format!(
                    "byte size of {}x{} x {} bands overflows",
                    self.width, self.height, self.bands
                ))
            })
    }

    /// Checks that this descriptor describes a usable pixel buffer.
    ///
    /// Extent and band count must be positive and per-pixel sizes must not
    /// overflow. Coding is *not* checked here - opaque images are legal to
    /// describe, the validation gate of each operation decides whether it
    /// can consume them.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::invalid_descriptor(format!(
                "empty extent {}x{}",
                self.width, self.height
            )));
        }
        if self.bands <= 0 {
            return Err(Error::invalid_descriptor(format!(
                "band count {} must be positive",
                self.bands
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} {} band(s) of {} ({}), offset ({}, {})",
            self.width,
            self.height,
            self.bands,
            self.format,
            self.coding,
            self.x_offset,
            self.y_offset
        )
    }
}
