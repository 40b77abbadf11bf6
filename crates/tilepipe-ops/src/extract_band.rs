//! Band-range extraction.
//!
//! Selecting a subset of bands changes the per-pixel byte layout, so unlike
//! cropping this can never alias: each generate call prepares the same
//! spatial rectangle upstream and then gathers `n * element_size` bytes out
//! of every source pixel into freshly owned output rows.
//!
//! The gather is the hot loop of this operation - it runs once per pixel of
//! every requested tile. Per pixel it does exactly one bounded copy and two
//! pointer advances (source by the full input pixel, destination by the
//! output pixel); there is no per-byte branching.
//!
//! # Example
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor, PipelineNode};
//! use tilepipe_ops::extract_band;
//!
//! let desc = ImageDescriptor::new(10, 10, 4, BandFormat::U8);
//! let image = PipelineNode::from_memory(desc, vec![0u8; 400]).unwrap();
//!
//! // Keep bands 1 and 2; geometry is untouched.
//! let pair = extract_band(&image, 1, 2).unwrap();
//! assert_eq!(pair.descriptor().bands, 2);
//! assert_eq!(pair.descriptor().width, 10);
//! ```

use std::sync::Arc;

use tilepipe_core::{
    DemandHint, Error, Kernel, PipelineNode, Region, Result, Sequence,
};

use crate::guard;

/// Builds a stage that keeps bands `[band, band + n)` of `input`.
///
/// Spatial geometry and origin offsets pass through unchanged; only the
/// band count (and therefore the pixel size) differs.
///
/// # Errors
///
/// - [`Error::ParamRange`] - `band` or `n` outside the defensive bound
///   (including `n` < 1 and `band` < 0)
/// - [`Error::OutOfBounds`] - `band + n` exceeds the input's band count
/// - [`Error::UnsupportedCoding`] - the input is not directly addressable
/// - [`Error::Io`] - the input cannot supply, or the output cannot accept,
///   pixel data
pub fn extract_band(input: &Arc<PipelineNode>, band: i32, n: i32) -> Result<Arc<PipelineNode>> {
    guard::ensure_index_range("band", band)?;
    guard::ensure_extent_range("n", n)?;

    let src = *input.descriptor();
    if band + n > src.bands {
        return Err(Error::out_of_bounds(format!(
            "extract_band: bands [{band}, {}) outside image with {} bands",
            band + n,
            src.bands
        )));
    }
    guard::ensure_readable("extract_band", input)?;
    guard::ensure_known_coding("extract_band", &src)?;

    let mut desc = src;
    desc.bands = n;
    guard::ensure_writable("extract_band", &desc)?;

    tracing::debug!(band, n, "extract_band built");
    PipelineNode::new(
        desc,
        DemandHint::ThinStrip,
        Box::new(BandKernel {
            input: Arc::clone(input),
            band,
        }),
    )
}

/// Builds a stage that keeps the single band `band` of `input`.
///
/// Shorthand for `extract_band(input, band, 1)`.
#[inline]
pub fn extract_band_one(input: &Arc<PipelineNode>, band: i32) -> Result<Arc<PipelineNode>> {
    extract_band(input, band, 1)
}

struct BandKernel {
    input: Arc<PipelineNode>,
    band: i32,
}

impl Kernel for BandKernel {
    fn start(&self) -> Result<Sequence> {
        Ok(Sequence::One(self.input.region()))
    }

    fn generate(&self, out: &mut Region, seq: &mut Sequence) -> Result<()> {
        // Band selection does not alter spatial extent; ask upstream for
        // exactly the rectangle we were asked for.
        let rect = out.valid();
        let input = seq.input_mut()?;
        input.prepare(&rect)?;

        let src_desc = self.input.descriptor();
        let element_size = src_desc.element_size();
        let in_pixel = src_desc.pixel_size();
        let out_pixel = out.node().descriptor().pixel_size();
        let band_offset = self.band as usize * element_size;

        out.ensure_owned();
        for y in rect.top..rect.bottom() {
            let src_row = input.addr(rect.left, y)?;
            let dst_row = out.row_mut(y)?;

            // Strided gather: out_pixel contiguous bytes from each source
            // pixel, source advancing by the full input pixel.
            for x in 0..rect.width as usize {
                let s = x * in_pixel + band_offset;
                let d = x * out_pixel;
                dst_row[d..d + out_pixel].copy_from_slice(&src_row[s..s + out_pixel]);
            }
        }
        Ok(())
    }
}
