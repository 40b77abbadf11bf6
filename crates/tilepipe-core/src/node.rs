//! Pipeline nodes and the generate protocol.
//!
//! A [`PipelineNode`] is one stage of a lazy image pipeline: an immutable
//! [`ImageDescriptor`] for its output, a [`DemandHint`] telling schedulers
//! what request shapes it likes, and a [`Kernel`] that fills requested
//! rectangles. Operations plug in through the `Kernel` trait - there is no
//! runtime type registry; the trait object *is* the dispatch table.
//!
//! # Lifecycle
//!
//! ```text
//! Unbuilt --validate--> Validated --construct--> Active
//!                           |                      |
//!                           v                generate failure
//!                       (build Err)                |
//!                                                  v
//!                                               Failed (absorbing)
//! ```
//!
//! Build failures never construct a node, so an `Arc<PipelineNode>` in hand
//! is always at least `Active`. A generate-time failure (upstream error,
//! production error) flips the node to `Failed` permanently; later prepares
//! fail fast without touching any buffer.
//!
//! # Worker state
//!
//! Each driving [`Region`] carries a [`Sequence`] created by the kernel's
//! [`start`](Kernel::start), lazily on first prepare. For a single-input
//! operation that is just a reusable region on the upstream node, so
//! repeated requests from one worker reuse one upstream handle. Sequences
//! are never shared between workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::descriptor::ImageDescriptor;
use crate::error::{Error, Result};
use crate::region::Region;

/// Request-shape preference a node declares to the scheduler.
///
/// Hints shape scheduling, never correctness: any in-bounds rectangle can
/// be prepared regardless of the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DemandHint {
    /// Squarish tiles; good default for point operations.
    #[default]
    SmallTile,
    /// Narrow horizontal strips; preferred by pass-through operations that
    /// alias or stream rows.
    ThinStrip,
    /// Tall horizontal strips; for operations that need vertical context.
    FatStrip,
    /// No preference; typically whole-image sources.
    Any,
}

impl DemandHint {
    /// Suggested strip height for sequential scans of an image this tall.
    #[inline]
    pub fn strip_height(&self, image_height: i32) -> i32 {
        let preferred = match self {
            Self::ThinStrip => 16,
            Self::SmallTile => 64,
            Self::FatStrip => 128,
            Self::Any => image_height,
        };
        preferred.min(image_height).max(1)
    }
}

/// Per-worker state threaded through generate calls.
///
/// Created lazily by [`Kernel::start`] the first time a worker's region
/// prepares, and dropped with that region when the worker retires.
pub enum Sequence {
    /// Stage with no upstream input.
    Leaf,
    /// Reusable handle on a single upstream input.
    One(Region),
}

impl Sequence {
    /// The upstream region handle of a single-input stage.
    pub fn input_mut(&mut self) -> Result<&mut Region> {
        match self {
            Self::One(region) => Ok(region),
            Self::Leaf => Err(Error::other("stage has no upstream input")),
        }
    }
}

/// Per-operation pixel production logic.
///
/// Implementations must be `Send + Sync`: many workers call `generate`
/// concurrently, each with its own output region and [`Sequence`]. All
/// mutable state belongs in the sequence.
pub trait Kernel: Send + Sync {
    /// Creates the per-worker state for this stage.
    fn start(&self) -> Result<Sequence>;

    /// Fills `out`'s valid rectangle.
    ///
    /// `out.valid()` is already set to the requested rectangle, guaranteed
    /// in-bounds. The kernel either aliases `out` onto upstream memory or
    /// fills owned storage row by row. On error the caller discards any
    /// partial output and poisons the node.
    fn generate(&self, out: &mut Region, seq: &mut Sequence) -> Result<()>;
}

const STATE_ACTIVE: u8 = 0;
const STATE_FAILED: u8 = 1;

/// One stage of a demand-driven pipeline.
pub struct PipelineNode {
    desc: ImageDescriptor,
    hint: DemandHint,
    kernel: Box<dyn Kernel>,
    state: AtomicU8,
}

impl PipelineNode {
    /// Builds a node from a validated descriptor and a kernel.
    ///
    /// Fails if the descriptor does not describe a usable image; in that
    /// case no node exists at all.
    pub fn new(
        desc: ImageDescriptor,
        hint: DemandHint,
        kernel: Box<dyn Kernel>,
    ) -> Result<Arc<Self>> {
        desc.validate()?;
        tracing::debug!(desc = %desc, ?hint, "pipeline node built");
        Ok(Arc::new(Self {
            desc,
            hint,
            kernel,
            state: AtomicU8::new(STATE_ACTIVE),
        }))
    }

    /// Builds a leaf node over a fully materialized pixel buffer.
    ///
    /// Regions prepared on this node alias directly into `pixels`; nothing
    /// is copied. The buffer length must match the descriptor exactly.
    pub fn from_memory(desc: ImageDescriptor, pixels: Vec<u8>) -> Result<Arc<Self>> {
        let expected = desc.byte_len()?;
        if pixels.len() != expected {
            return Err(Error::invalid_descriptor(format!(
                "buffer holds {} bytes, descriptor {} needs {}",
                pixels.len(),
                desc,
                expected
            )));
        }
        let kernel = MemoryKernel {
            pixels: Arc::new(pixels),
            stride: desc.scanline_size(),
            pixel_size: desc.pixel_size(),
        };
        Self::new(desc, DemandHint::Any, Box::new(kernel))
    }

    /// The immutable output descriptor of this stage.
    #[inline]
    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.desc
    }

    /// The request-shape preference this stage declared.
    #[inline]
    pub fn demand_hint(&self) -> DemandHint {
        self.hint
    }

    /// Creates a new worker region on this node.
    #[inline]
    pub fn region(self: &Arc<Self>) -> Region {
        Region::new(Arc::clone(self))
    }

    /// Whether this node has entered the absorbing `Failed` state.
    #[inline]
    pub fn is_failed(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_FAILED
    }

    pub(crate) fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    pub(crate) fn check_active(&self) -> Result<()> {
        if self.is_failed() {
            return Err(Error::upstream(format!(
                "stage {} previously failed",
                self.desc
            )));
        }
        Ok(())
    }

    pub(crate) fn poison(&self) {
        if self.state.swap(STATE_FAILED, Ordering::AcqRel) == STATE_ACTIVE {
            tracing::warn!(desc = %self.desc, "pipeline node entered failed state");
        }
    }
}

impl std::fmt::Debug for PipelineNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineNode")
            .field("desc", &self.desc)
            .field("hint", &self.hint)
            .field("failed", &self.is_failed())
            .finish()
    }
}

/// Leaf kernel over a materialized buffer; regions alias into it.
struct MemoryKernel {
    pixels: Arc<Vec<u8>>,
    stride: usize,
    pixel_size: usize,
}

impl Kernel for MemoryKernel {
    fn start(&self) -> Result<Sequence> {
        Ok(Sequence::Leaf)
    }

    fn generate(&self, out: &mut Region, _seq: &mut Sequence) -> Result<()> {
        let rect = out.valid();
        let start = rect.top as usize * self.stride + rect.left as usize * self.pixel_size;
        out.set_alias(Arc::clone(&self.pixels), start, self.stride);
        Ok(())
    }
}
