//! Rectangular area extraction (cropping).
//!
//! Cropping never touches pixel bytes. The output's layout is byte-identical
//! to the input's - only the visible rectangle and the coordinate frame
//! change - so each generate call translates the requested rectangle into
//! the input frame, prepares that window upstream, and aliases the output
//! region onto the prepared memory.
//!
//! # Coordinate frames
//!
//! The crop origin is *subtracted* from the input's origin offset. That sign
//! is deliberate: it makes frames compose through chained crops, so a
//! coordinate in the innermost frame can still be resolved against the
//! original image.
//!
//! # Example
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor, PipelineNode};
//! use tilepipe_ops::extract_area;
//!
//! let desc = ImageDescriptor::new(10, 10, 4, BandFormat::U8);
//! let image = PipelineNode::from_memory(desc, vec![0u8; 400]).unwrap();
//!
//! let crop = extract_area(&image, 2, 3, 4, 5).unwrap();
//! assert_eq!(crop.descriptor().width, 4);
//! assert_eq!(crop.descriptor().height, 5);
//! assert_eq!(crop.descriptor().x_offset, -2);
//! ```

use std::sync::Arc;

use tilepipe_core::{DemandHint, Error, Kernel, PipelineNode, Region, Result, Sequence};

use crate::guard;

/// Builds a crop stage over `input`.
///
/// `(left, top, width, height)` is the area to keep, in the input's
/// coordinate frame. The area must lie fully inside the input.
///
/// # Errors
///
/// - [`Error::ParamRange`] - a parameter is outside the defensive bound
///   (including `width`/`height` < 1)
/// - [`Error::OutOfBounds`] - the area is not contained in the input
/// - [`Error::UnsupportedCoding`] - the input is not directly addressable
/// - [`Error::Io`] - the input cannot supply, or the output cannot accept,
///   pixel data
pub fn extract_area(
    input: &Arc<PipelineNode>,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
) -> Result<Arc<PipelineNode>> {
    guard::ensure_offset_range("left", left)?;
    guard::ensure_offset_range("top", top)?;
    guard::ensure_extent_range("width", width)?;
    guard::ensure_extent_range("height", height)?;

    let src = *input.descriptor();
    if left < 0 || top < 0 || left + width > src.width || top + height > src.height {
        return Err(Error::out_of_bounds(format!(
            "extract_area: area ({left}, {top}, {width}x{height}) outside image {}x{}",
            src.width, src.height
        )));
    }
    guard::ensure_readable("extract_area", input)?;
    guard::ensure_known_coding("extract_area", &src)?;

    let mut desc = src;
    desc.width = width;
    desc.height = height;
    // Subtract the crop origin so chained crops compose.
    desc.x_offset -= left;
    desc.y_offset -= top;
    guard::ensure_writable("extract_area", &desc)?;

    tracing::debug!(left, top, width, height, "extract_area built");
    PipelineNode::new(
        desc,
        DemandHint::ThinStrip,
        Box::new(AreaKernel {
            input: Arc::clone(input),
            left,
            top,
        }),
    )
}

struct AreaKernel {
    input: Arc<PipelineNode>,
    left: i32,
    top: i32,
}

impl Kernel for AreaKernel {
    fn start(&self) -> Result<Sequence> {
        Ok(Sequence::One(self.input.region()))
    }

    fn generate(&self, out: &mut Region, seq: &mut Sequence) -> Result<()> {
        let rect = out.valid();

        // Translate demand in the output frame into the input frame.
        let iarea = rect.translate(self.left, self.top);
        let input = seq.input_mut()?;
        input.prepare(&iarea)?;

        // Attach the output to the prepared input; no bytes move.
        out.alias_to(input, &rect, iarea.left, iarea.top)
    }
}
