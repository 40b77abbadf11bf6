//! Materialization sinks: pull a whole pipeline into contiguous bytes.
//!
//! Sinks are the demand side of the protocol. They walk an image in
//! horizontal strips (sized by the node's [`DemandHint`]), preparing one
//! region per strip and copying rows out. The parallel variant gives every
//! rayon worker its own [`Region`] - and therefore its own per-worker
//! sequence state - so nothing is shared between workers and strips complete
//! in no particular order.
//!
//! A failure in any strip fails the whole call; no partially filled buffer
//! is ever returned.
//!
//! # Example
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor, PipelineNode};
//! use tilepipe_ops::sink;
//!
//! let desc = ImageDescriptor::new(8, 8, 1, BandFormat::U8);
//! let image = PipelineNode::from_memory(desc, vec![3u8; 64]).unwrap();
//! let bytes = sink::materialize(&image).unwrap();
//! assert_eq!(bytes, vec![3u8; 64]);
//! ```
//!
//! [`DemandHint`]: tilepipe_core::DemandHint

use std::sync::Arc;

use tilepipe_core::{PipelineNode, Rect, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "parallel")]
use tilepipe_core::Error;

/// Renders `node` to a contiguous buffer with a single worker.
///
/// Rows are laid out top to bottom with no padding between scanlines.
pub fn materialize(node: &Arc<PipelineNode>) -> Result<Vec<u8>> {
    let desc = *node.descriptor();
    let mut out = vec![0u8; desc.byte_len()?];
    let scanline = desc.scanline_size();
    let strip = node.demand_hint().strip_height(desc.height);

    tracing::debug!(desc = %desc, strip, "materialize");

    let mut region = node.region();
    let mut top = 0;
    while top < desc.height {
        let height = strip.min(desc.height - top);
        region.prepare(&Rect::new(0, top, desc.width, height))?;
        for y in top..top + height {
            out[y as usize * scanline..][..scanline].copy_from_slice(region.row(y)?);
        }
        top += height;
    }
    Ok(out)
}

/// Renders `node` to a contiguous buffer using rayon workers.
///
/// The image is split into strips of `strip_height` rows; each worker
/// thread drives its own region, so upstream handles are reused within a
/// worker and never shared across workers. Output is identical to
/// [`materialize`].
#[cfg(feature = "parallel")]
pub fn materialize_parallel(node: &Arc<PipelineNode>, strip_height: i32) -> Result<Vec<u8>> {
    if strip_height < 1 {
        return Err(Error::ParamRange {
            name: "strip_height",
            value: i64::from(strip_height),
            min: 1,
            max: crate::guard::PARAM_RANGE,
        });
    }

    let desc = *node.descriptor();
    let mut out = vec![0u8; desc.byte_len()?];
    let scanline = desc.scanline_size();
    let chunk_bytes = scanline * strip_height as usize;

    tracing::debug!(desc = %desc, strip_height, "materialize_parallel");

    out.par_chunks_mut(chunk_bytes)
        .enumerate()
        .try_for_each_init(
            || node.region(),
            |region, (index, chunk)| {
                let top = index as i32 * strip_height;
                let height = strip_height.min(desc.height - top);
                region.prepare(&Rect::new(0, top, desc.width, height))?;
                for (row, y) in (top..top + height).enumerate() {
                    chunk[row * scanline..][..scanline].copy_from_slice(region.row(y)?);
                }
                Ok::<_, Error>(())
            },
        )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilepipe_core::{BandFormat, ImageDescriptor};

    fn gradient_image(width: i32, height: i32, bands: i32) -> (Arc<PipelineNode>, Vec<u8>) {
        let desc = ImageDescriptor::new(width, height, bands, BandFormat::U8);
        let pixels: Vec<u8> = (0..desc.byte_len().unwrap()).map(|i| i as u8).collect();
        let node = PipelineNode::from_memory(desc, pixels.clone()).unwrap();
        (node, pixels)
    }

    #[test]
    fn test_materialize_identity() {
        let (node, pixels) = gradient_image(16, 16, 3);
        assert_eq!(materialize(&node).unwrap(), pixels);
    }

    #[test]
    fn test_materialize_drives_extraction() {
        let (node, pixels) = gradient_image(16, 16, 1);
        let crop = crate::extract_area(&node, 4, 4, 8, 8).unwrap();
        let bytes = materialize(&crop).unwrap();
        assert_eq!(bytes.len(), 64);
        // Row 0 of the crop is row 4 of the source, columns 4..12.
        assert_eq!(bytes[..8], pixels[4 * 16 + 4..4 * 16 + 12]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let (node, _) = gradient_image(32, 47, 2);
        let crop = crate::extract_area(&node, 3, 5, 20, 40).unwrap();
        let sequential = materialize(&crop).unwrap();
        for strip_height in [1, 7, 16, 64] {
            assert_eq!(materialize_parallel(&crop, strip_height).unwrap(), sequential);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_rejects_bad_strip_height() {
        let (node, _) = gradient_image(8, 8, 1);
        assert!(materialize_parallel(&node, 0).unwrap_err().is_range_error());
    }
}
