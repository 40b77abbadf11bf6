//! Regions: prepared rectangular windows of pixel data.
//!
//! A [`Region`] is the unit of demand in a tilepipe graph. A caller asks a
//! region to [`prepare`](Region::prepare) some rectangle; the owning node's
//! kernel then either fills freshly owned bytes or points the region at an
//! upstream region's memory. Preparing may recurse arbitrarily far up the
//! pipeline and may block while upstream stages compute.
//!
//! # Owned vs aliased backing
//!
//! Output buffers come in two flavours:
//!
//! - **Owned** - freshly produced bytes, e.g. the strided gather of a band
//!   extraction. Reused across prepares; reallocated only when a downstream
//!   alias still holds the previous allocation.
//! - **Aliased** - a view into another region's storage at an offset, used
//!   when the pixel layout is byte-identical (area extraction). The `Arc`
//!   backing ties the view's lifetime to the upstream buffer, so an alias
//!   can never dangle.
//!
//! Downstream code must handle both without assuming an aliased view is
//! mutable.
//!
//! # Threading
//!
//! A region belongs to one worker. Concurrent workers each create their own
//! region on the same node; the node itself carries no mutable state beyond
//! its failure flag.
//!
//! # Usage
//!
//! ```rust
//! use tilepipe_core::{BandFormat, ImageDescriptor, PipelineNode, Rect};
//!
//! let desc = ImageDescriptor::new(4, 4, 1, BandFormat::U8);
//! let node = PipelineNode::from_memory(desc, vec![7u8; 16]).unwrap();
//!
//! let mut region = node.region();
//! region.prepare(&Rect::new(1, 1, 2, 2)).unwrap();
//! assert_eq!(region.pixel(1, 1).unwrap(), &[7]);
//! ```

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::node::PipelineNode;
use crate::rect::Rect;

/// Backing storage of a region's pixels.
enum RegionData {
    /// No prepare has succeeded yet.
    Empty,
    /// Freshly produced bytes, row stride = `stride`.
    Owned { buf: Arc<Vec<u8>>, stride: usize },
    /// View into another region's storage, starting `start` bytes in.
    Aliased {
        buf: Arc<Vec<u8>>,
        start: usize,
        stride: usize,
    },
}

/// A rectangular window of pixels on a [`PipelineNode`], produced on demand.
pub struct Region {
    node: Arc<PipelineNode>,
    valid: Rect,
    data: RegionData,
    /// Worker-local generate state, created lazily on first prepare and
    /// dropped with the region when the worker retires.
    seq: Option<Box<crate::node::Sequence>>,
}

impl Region {
    /// Creates an unprepared region on `node`.
    ///
    /// Usually reached through [`PipelineNode::region`].
    pub fn new(node: Arc<PipelineNode>) -> Self {
        Self {
            node,
            valid: Rect::default(),
            data: RegionData::Empty,
            seq: None,
        }
    }

    /// The node this region draws from.
    #[inline]
    pub fn node(&self) -> &Arc<PipelineNode> {
        &self.node
    }

    /// The rectangle of currently valid pixels.
    ///
    /// Empty until the first successful [`prepare`](Region::prepare).
    #[inline]
    pub fn valid(&self) -> Rect {
        self.valid
    }

    /// Whether the region currently references another region's memory.
    #[inline]
    pub fn is_aliased(&self) -> bool {
        matches!(self.data, RegionData::Aliased { .. })
    }

    /// Whether any prepare has succeeded since the last failure.
    #[inline]
    pub fn is_prepared(&self) -> bool {
        !matches!(self.data, RegionData::Empty)
    }

    /// Ensures `rect` holds valid pixel data, computing it if necessary.
    ///
    /// This is the demand entry point. The rectangle must lie fully inside
    /// the node's bounds. On success the region's [`valid`](Region::valid)
    /// rectangle equals `rect`; on failure the region holds no defined
    /// pixels and, for generate-time failures, the node is poisoned so
    /// later prepares fail fast.
    ///
    /// May block: filling the rectangle can recurse through every upstream
    /// stage of the pipeline.
    pub fn prepare(&mut self, rect: &Rect) -> Result<()> {
        let node = Arc::clone(&self.node);
        let desc = node.descriptor();
        if rect.is_empty() || !desc.bounds().contains_rect(rect) {
            return Err(Error::out_of_bounds(format!(
                "{} outside image {}x{}",
                rect, desc.width, desc.height
            )));
        }
        node.check_active()?;

        tracing::trace!(rect = %rect, "prepare region");

        let mut seq = match self.seq.take() {
            Some(seq) => seq,
            None => Box::new(node.kernel().start()?),
        };
        self.valid = *rect;
        let result = node.kernel().generate(self, &mut seq);
        self.seq = Some(seq);

        if let Err(err) = result {
            // No partial output is ever valid.
            self.data = RegionData::Empty;
            node.poison();
            return Err(err);
        }
        Ok(())
    }

    /// Points this region at `source`'s memory instead of copying.
    ///
    /// After the call this region's valid rectangle is `rect` (in this
    /// region's coordinate frame) and pixel `(rect.left, rect.top)` resolves
    /// to `source`'s pixel `(ox, oy)`. `source` must already hold a window
    /// that covers `rect.width x rect.height` pixels at `(ox, oy)`, and both
    /// nodes must share a byte-identical pixel layout.
    pub fn alias_to(&mut self, source: &Region, rect: &Rect, ox: i32, oy: i32) -> Result<()> {
        let dst_desc = self.node.descriptor();
        let src_desc = source.node.descriptor();
        if dst_desc.format != src_desc.format || dst_desc.bands != src_desc.bands {
            return Err(Error::other(
                "aliasing requires byte-identical pixel layouts",
            ));
        }

        let window = Rect::new(ox, oy, rect.width, rect.height);
        let (buf, base, stride) = match &source.data {
            RegionData::Owned { buf, stride } => (buf, 0usize, *stride),
            RegionData::Aliased { buf, start, stride } => (buf, *start, *stride),
            RegionData::Empty => {
                return Err(Error::other("cannot alias an unprepared region"));
            }
        };
        if !source.valid.contains_rect(&window) {
            return Err(Error::out_of_bounds(format!(
                "alias window {} outside prepared source {}",
                window, source.valid
            )));
        }

        let pixel_size = src_desc.pixel_size();
        let start = base
            + (oy - source.valid.top) as usize * stride
            + (ox - source.valid.left) as usize * pixel_size;
        self.valid = *rect;
        self.data = RegionData::Aliased {
            buf: Arc::clone(buf),
            start,
            stride,
        };
        Ok(())
    }

    /// Points this region at a raw backing buffer. Used by leaf sources.
    pub(crate) fn set_alias(&mut self, buf: Arc<Vec<u8>>, start: usize, stride: usize) {
        self.data = RegionData::Aliased { buf, start, stride };
    }

    /// Makes sure the region owns writable storage for its valid rectangle.
    ///
    /// Reuses the previous allocation when nothing else holds it; otherwise
    /// (a downstream alias is still alive) allocates fresh bytes, leaving
    /// the old buffer to its readers.
    pub fn ensure_owned(&mut self) {
        let pixel_size = self.node.descriptor().pixel_size();
        let stride = self.valid.width as usize * pixel_size;
        let needed = stride * self.valid.height as usize;

        if let RegionData::Owned { buf, stride: s } = &mut self.data {
            if let Some(bytes) = Arc::get_mut(buf) {
                bytes.clear();
                bytes.resize(needed, 0);
                *s = stride;
                return;
            }
        }
        self.data = RegionData::Owned {
            buf: Arc::new(vec![0u8; needed]),
            stride,
        };
    }

    /// Read access from pixel `(x, y)` to the end of that row of the valid
    /// rectangle. Coordinates are in the region's frame.
    pub fn addr(&self, x: i32, y: i32) -> Result<&[u8]> {
        if !self.valid.contains(x, y) {
            return Err(Error::out_of_bounds(format!(
                "({x}, {y}) outside prepared region {}",
                self.valid
            )));
        }
        let pixel_size = self.node.descriptor().pixel_size();
        let (buf, base, stride): (&Vec<u8>, usize, usize) = match &self.data {
            RegionData::Owned { buf, stride } => (buf, 0, *stride),
            RegionData::Aliased { buf, start, stride } => (buf, *start, *stride),
            RegionData::Empty => return Err(Error::other("region has not been prepared")),
        };
        let offset = base
            + (y - self.valid.top) as usize * stride
            + (x - self.valid.left) as usize * pixel_size;
        let len = (self.valid.right() - x) as usize * pixel_size;
        Ok(&buf[offset..offset + len])
    }

    /// Read access to one full row of the valid rectangle.
    #[inline]
    pub fn row(&self, y: i32) -> Result<&[u8]> {
        self.addr(self.valid.left, y)
    }

    /// Read access to a single pixel's bytes.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Result<&[u8]> {
        let pixel_size = self.node.descriptor().pixel_size();
        Ok(&self.addr(x, y)?[..pixel_size])
    }

    /// Write access to one full row. The region must own its storage
    /// (see [`ensure_owned`](Region::ensure_owned)).
    pub fn row_mut(&mut self, y: i32) -> Result<&mut [u8]> {
        if y < self.valid.top || y >= self.valid.bottom() {
            return Err(Error::out_of_bounds(format!(
                "row {y} outside prepared region {}",
                self.valid
            )));
        }
        let pixel_size = self.node.descriptor().pixel_size();
        let row_len = self.valid.width as usize * pixel_size;
        let top = self.valid.top;
        match &mut self.data {
            RegionData::Owned { buf, stride } => {
                let offset = (y - top) as usize * *stride;
                let bytes = Arc::get_mut(buf).ok_or_else(|| {
                    Error::other("region storage is shared; call ensure_owned before writing")
                })?;
                Ok(&mut bytes[offset..offset + row_len])
            }
            _ => Err(Error::other("row_mut requires owned region storage")),
        }
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backing = match self.data {
            RegionData::Empty => "empty",
            RegionData::Owned { .. } => "owned",
            RegionData::Aliased { .. } => "aliased",
        };
        f.debug_struct("Region")
            .field("valid", &self.valid)
            .field("backing", &backing)
            .finish()
    }
}
