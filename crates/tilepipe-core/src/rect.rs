//! Rectangle type for image regions and coordinate frames.
//!
//! Everything in a tilepipe graph is addressed through rectangles: the
//! extent of a stage's output, the window of pixels a [`Region`] currently
//! holds, and the area an operation requests from its upstream source.
//!
//! # Coordinate System
//!
//! Standard image convention: (0, 0) at the top-left, X grows right, Y grows
//! down. Coordinates are **signed** - chained crops rebase origin offsets
//! and those can legitimately go negative.
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  valid   │
//!   │   │  region  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use tilepipe_core::Rect;
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert!(rect.contains(15, 25));
//!
//! // Translate demand into an upstream coordinate frame
//! let upstream = rect.translate(32, 8);
//! assert_eq!(upstream, Rect::new(42, 28, 100, 50));
//! ```
//!
//! # Used By
//!
//! - [`crate::region::Region`] - The window of valid pixels
//! - [`crate::descriptor::ImageDescriptor`] - Whole-image bounds
//!
//! [`Region`]: crate::region::Region

/// A rectangle defined by its top-left corner and dimensions.
///
/// # Invariants
///
/// - `width` and `height` should be > 0 for a valid rectangle
/// - A rectangle with zero or negative extent is considered empty
///
/// # Example
///
/// ```rust
/// use tilepipe_core::Rect;
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.right(), 110);
/// assert_eq!(rect.bottom(), 70);
/// assert_eq!(rect.area(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub left: i32,
    /// Y coordinate of the top edge (inclusive)
    pub top: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin with the given dimensions.
    ///
    /// Convenience constructor for whole-image rectangles.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the X coordinate of the right edge (exclusive).
    ///
    /// This is `left + width`, the first column NOT in the rectangle.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Returns the Y coordinate of the bottom edge (exclusive).
    ///
    /// This is `top + height`, the first row NOT in the rectangle.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Returns the area of the rectangle in pixels, or 0 if empty.
    #[inline]
    pub const fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if the point (x, y) is inside this rectangle.
    ///
    /// Inclusive on the left/top edges, exclusive on the right/bottom.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tilepipe_core::Rect;
    ///
    /// let rect = Rect::new(10, 10, 100, 100);
    /// assert!(rect.contains(10, 10));
    /// assert!(rect.contains(109, 109));
    /// assert!(!rect.contains(110, 110));
    /// ```
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains another.
    ///
    /// An empty `other` is never contained.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles don't overlap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tilepipe_core::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 50, 100, 100);
    /// assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));
    /// ```
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Returns the bounding box that contains both rectangles.
    #[inline]
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Returns this rectangle translated by (dx, dy).
    ///
    /// This is the workhorse of demand translation: an output request is
    /// shifted into an upstream coordinate frame without scaling.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.left, self.top, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_new() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.left, 10);
        assert_eq!(r.top, 20);
        assert_eq!(r.width, 100);
        assert_eq!(r.height, 50);
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
    }

    #[test]
    fn test_rect_negative_origin() {
        let r = Rect::new(-30, -10, 50, 20);
        assert_eq!(r.right(), 20);
        assert_eq!(r.bottom(), 10);
        assert!(r.contains(-30, -10));
        assert!(!r.contains(20, 10));
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::new(0, 0, 0, 5).is_empty());
        assert!(Rect::new(0, 0, 5, -1).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
        assert_eq!(Rect::new(0, 0, 0, 5).area(), 0);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10, 10, 100, 100);
        assert!(r.contains(10, 10));
        assert!(r.contains(109, 109));
        assert!(!r.contains(110, 110));
        assert!(!r.contains(5, 50));
    }

    #[test]
    fn test_rect_contains_rect() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains_rect(&Rect::new(10, 10, 50, 50)));
        assert!(outer.contains_rect(&outer));
        assert!(!outer.contains_rect(&Rect::new(60, 60, 50, 50)));
        assert!(!outer.contains_rect(&Rect::new(10, 10, 0, 50)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));

        let c = Rect::new(200, 200, 50, 50);
        assert!(a.intersect(&c).is_none());
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0, 0, 50, 50);
        let b = Rect::new(100, 100, 50, 50);
        assert_eq!(a.union(&b), Rect::new(0, 0, 150, 150));

        let empty = Rect::default();
        assert_eq!(a.union(&empty), a);
    }

    #[test]
    fn test_rect_translate() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.translate(5, -30), Rect::new(15, -10, 100, 50));
    }
}
