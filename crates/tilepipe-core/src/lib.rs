//! # tilepipe-core
//!
//! Core types for demand-driven, tile-based image pipelines.
//!
//! Images in a tilepipe graph are never fully materialized up front. Each
//! stage is a [`PipelineNode`] that knows how to fill an arbitrary output
//! rectangle on request, pulling exactly the upstream pixels it needs.
//! This crate provides the pieces that protocol is built from:
//!
//! - [`Rect`] - Signed pixel rectangles (coordinate frames can shift negative)
//! - [`BandFormat`], [`Coding`] - Per-element type and addressability
//! - [`ImageDescriptor`] - Geometry, layout, and origin offset of a stage
//! - [`Region`] - A prepared rectangular window of pixels, owned or aliased
//! - [`PipelineNode`], [`Kernel`], [`Sequence`] - The generate protocol
//!
//! ## Demand flow
//!
//! ```text
//! caller          output Region        upstream Region(s)
//!   |  prepare(R)      |                      |
//!   |----------------->| translate R          |
//!   |                  |-------- prepare ---->|  (may recurse further up)
//!   |                  |<-- alias or gather --|
//!   |<---- filled -----|                      |
//! ```
//!
//! Preparing a region may block while upstream stages compute. Each worker
//! thread drives its own [`Region`] (and therefore its own [`Sequence`]), so
//! nodes share nothing mutable after they are built.
//!
//! ## Crate Structure
//!
//! This crate is the foundation of tilepipe and has no internal dependencies.
//! Operations live in `tilepipe-ops` and are built entirely on this API.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod descriptor;
pub mod error;
pub mod format;
pub mod node;
pub mod rect;
pub mod region;

// Re-exports for convenience
pub use descriptor::ImageDescriptor;
pub use error::{Error, Result};
pub use format::{BandFormat, Coding};
pub use node::{DemandHint, Kernel, PipelineNode, Sequence};
pub use rect::Rect;
pub use region::Region;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use tilepipe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::descriptor::ImageDescriptor;
    pub use crate::error::{Error, Result};
    pub use crate::format::{BandFormat, Coding};
    pub use crate::node::{DemandHint, Kernel, PipelineNode, Sequence};
    pub use crate::rect::Rect;
    pub use crate::region::Region;
}
