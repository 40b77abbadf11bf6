//! # tilepipe-ops
//!
//! Extraction operations for demand-driven tile pipelines.
//!
//! Every operation here follows one contract: validate its parameters once
//! at build time, derive an output [`ImageDescriptor`], and install a
//! generate kernel that fills arbitrary output rectangles by translating
//! them into upstream requests.
//!
//! # Operations
//!
//! - [`extract_area`] - Crop a rectangle out of an image (zero-copy: output
//!   regions alias the prepared input)
//! - [`extract_band`] - Select a contiguous range of bands (strided gather)
//! - [`extract_band_one`] - Single-band convenience wrapper
//!
//! # Example
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor, PipelineNode};
//! use tilepipe_ops::{extract_area, extract_band, sink};
//!
//! let desc = ImageDescriptor::new(10, 10, 4, BandFormat::U8);
//! let image = PipelineNode::from_memory(desc, vec![0u8; 400]).unwrap();
//!
//! // Nothing is computed yet; both calls only validate and derive geometry.
//! let cropped = extract_area(&image, 2, 3, 4, 5).unwrap();
//! let green = extract_band(&cropped, 1, 1).unwrap();
//!
//! // Pulling pixels drives the whole chain.
//! let bytes = sink::materialize(&green).unwrap();
//! assert_eq!(bytes.len(), 4 * 5);
//! ```
//!
//! [`ImageDescriptor`]: tilepipe_core::ImageDescriptor

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod extract_area;
pub mod extract_band;
pub mod guard;
pub mod sink;

pub use extract_area::extract_area;
pub use extract_band::{extract_band, extract_band_one};
pub use tilepipe_core::{Error, Result};
