//! End-to-end properties of the extraction operations.

use std::sync::Arc;

use tilepipe_core::{
    BandFormat, Error, ImageDescriptor, Kernel, PipelineNode, Rect, Region, Result, Sequence,
};
use tilepipe_ops::{extract_area, extract_band, sink};

const WIDTH: i32 = 10;
const HEIGHT: i32 = 10;
const BANDS: i32 = 4;

/// Band b of pixel (x, y) is ((y * 10 + x) * 4 + b) mod 256.
fn source() -> Arc<PipelineNode> {
    let desc = ImageDescriptor::new(WIDTH, HEIGHT, BANDS, BandFormat::U8);
    let pixels = (0..desc.byte_len().unwrap()).map(|i| i as u8).collect();
    PipelineNode::from_memory(desc, pixels).unwrap()
}

fn value(x: i32, y: i32, band: i32) -> u8 {
    (((y * WIDTH + x) * BANDS) + band) as u8
}

fn read_pixel(node: &Arc<PipelineNode>, x: i32, y: i32) -> Vec<u8> {
    let mut region = node.region();
    region.prepare(&Rect::new(x, y, 1, 1)).unwrap();
    region.pixel(x, y).unwrap().to_vec()
}

#[test]
fn area_extraction_translates_every_pixel() {
    let (left, top, width, height) = (2, 3, 4, 5);
    let crop = extract_area(&source(), left, top, width, height).unwrap();

    let mut region = crop.region();
    region.prepare(&Rect::from_size(width, height)).unwrap();
    for y in 0..height {
        for x in 0..width {
            let px = region.pixel(x, y).unwrap();
            for b in 0..BANDS {
                assert_eq!(px[b as usize], value(left + x, top + y, b));
            }
        }
    }
}

#[test]
fn band_extraction_shifts_every_channel() {
    let (band, n) = (1, 2);
    let pair = extract_band(&source(), band, n).unwrap();

    let mut region = pair.region();
    region.prepare(&Rect::from_size(WIDTH, HEIGHT)).unwrap();
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let px = region.pixel(x, y).unwrap();
            for c in 0..n {
                assert_eq!(px[c as usize], value(x, y, band + c));
            }
        }
    }
}

#[test]
fn area_and_band_extraction_commute() {
    let src = source();

    let crop_then_band = {
        let crop = extract_area(&src, 2, 1, 5, 6).unwrap();
        extract_band(&crop, 1, 2).unwrap()
    };
    let band_then_crop = {
        let pair = extract_band(&src, 1, 2).unwrap();
        extract_area(&pair, 2, 1, 5, 6).unwrap()
    };

    assert_eq!(
        *crop_then_band.descriptor(),
        *band_then_crop.descriptor()
    );
    assert_eq!(
        sink::materialize(&crop_then_band).unwrap(),
        sink::materialize(&band_then_crop).unwrap()
    );
}

#[test]
fn full_image_extraction_is_identity() {
    let src = source();
    let full = extract_area(&src, 0, 0, WIDTH, HEIGHT).unwrap();
    assert_eq!(
        sink::materialize(&full).unwrap(),
        sink::materialize(&src).unwrap()
    );
    assert_eq!(full.descriptor().x_offset, 0);
    assert_eq!(full.descriptor().y_offset, 0);
}

#[test]
fn full_band_extraction_is_identity() {
    let src = source();
    let full = extract_band(&src, 0, BANDS).unwrap();
    assert_eq!(
        sink::materialize(&full).unwrap(),
        sink::materialize(&src).unwrap()
    );
}

#[test]
fn area_boundary_exact_fit() {
    let src = source();
    // left + width == source.width is accepted...
    assert!(extract_area(&src, 6, 0, 4, HEIGHT).is_ok());
    // ...one more column is not.
    let err = extract_area(&src, 6, 0, 5, HEIGHT).unwrap_err();
    assert!(err.is_bounds_error());
}

#[test]
fn band_boundary_exact_fit() {
    let src = source();
    assert!(extract_band(&src, 1, 3).is_ok());
    let err = extract_band(&src, 1, 4).unwrap_err();
    assert!(err.is_bounds_error());
}

#[test]
fn concrete_area_scenario() {
    // 10x10, 4 channels, 1-byte elements; extract_area(2, 3, 4, 5).
    let crop = extract_area(&source(), 2, 3, 4, 5).unwrap();
    let desc = crop.descriptor();
    assert_eq!((desc.width, desc.height, desc.bands), (4, 5, 4));

    let px = read_pixel(&crop, 0, 0);
    let src_px = read_pixel(&source(), 2, 3);
    assert_eq!(px, src_px);
}

#[test]
fn concrete_band_scenario() {
    // 4-channel source; extract_band(1, 2) keeps channels 1 and 2.
    let pair = extract_band(&source(), 1, 2).unwrap();
    assert_eq!(pair.descriptor().bands, 2);

    let px = read_pixel(&pair, 7, 4);
    assert_eq!(px, vec![value(7, 4, 1), value(7, 4, 2)]);
}

#[test]
fn zero_width_is_rejected_before_bounds_logic() {
    let err = extract_area(&source(), 0, 0, 0, 5).unwrap_err();
    assert!(err.is_range_error() || err.is_bounds_error());
}

#[test]
fn deep_chain_resolves_through_every_frame() {
    let src = source();
    let a = extract_area(&src, 1, 1, 8, 8).unwrap();
    let b = extract_band(&a, 2, 2).unwrap();
    let c = extract_area(&b, 2, 3, 4, 4).unwrap();

    assert_eq!(c.descriptor().x_offset, -3);
    assert_eq!(c.descriptor().y_offset, -4);

    let px = read_pixel(&c, 0, 0);
    // (0, 0) of c is (3, 4) of the source, bands 2 and 3.
    assert_eq!(px, vec![value(3, 4, 2), value(3, 4, 3)]);
}

/// A leaf stage whose generate always fails, standing in for a broken
/// upstream producer.
struct BrokenSource;

impl Kernel for BrokenSource {
    fn start(&self) -> Result<Sequence> {
        Ok(Sequence::Leaf)
    }

    fn generate(&self, _out: &mut Region, _seq: &mut Sequence) -> Result<()> {
        Err(Error::upstream("device stopped responding"))
    }
}

#[test]
fn upstream_failure_propagates_and_poisons() {
    let desc = ImageDescriptor::new(8, 8, 2, BandFormat::U8);
    let broken = PipelineNode::new(desc, Default::default(), Box::new(BrokenSource)).unwrap();
    let crop = extract_area(&broken, 0, 0, 4, 4).unwrap();

    let err = sink::materialize(&crop).unwrap_err();
    assert!(err.is_upstream_error());
    assert!(broken.is_failed());
    assert!(crop.is_failed());

    // The poisoned chain now fails fast.
    let err = sink::materialize(&crop).unwrap_err();
    assert!(err.is_upstream_error());

    // And a poisoned source is rejected at build time by the gate.
    let err = extract_area(&broken, 0, 0, 2, 2).unwrap_err();
    assert!(err.is_io_error());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_and_sequential_sinks_agree() {
    let src = source();
    let chain = extract_band(&extract_area(&src, 1, 2, 8, 7).unwrap(), 1, 3).unwrap();
    let sequential = sink::materialize(&chain).unwrap();
    for strip in [1, 2, 5, 100] {
        assert_eq!(sink::materialize_parallel(&chain, strip).unwrap(), sequential);
    }
}
