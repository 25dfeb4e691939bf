#![forbid(unsafe_code)]

//! Viewport geometry and intersection ratios.
//!
//! Rectangles are in CSS pixels. Element rectangles handed to
//! [`intersection_ratio`] are viewport-relative (as `getBoundingClientRect`
//! reports them), so the root rectangle always starts at the origin.
//!
//! # Invariants
//!
//! 1. `intersection_ratio` is always within `[0.0, 1.0]`.
//! 2. A zero-area target intersects iff its origin lies inside the effective
//!    root, in which case its ratio is `1.0`.
//! 3. A negative root margin shrinks the effective root; a margin that would
//!    invert the root yields an empty root and ratio `0.0` for every target.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Whether the rectangle has no area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Overlap of two rectangles, or `None` when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Translate vertically.
    #[must_use]
    pub fn offset_y(&self, dy: f64) -> Rect {
        Rect::new(self.x, self.y + dy, self.width, self.height)
    }
}

/// Margin applied to the viewport before intersecting, CSS `rootMargin` order.
///
/// Positive values grow the root, negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Margin that only moves the bottom edge.
    #[must_use]
    pub const fn bottom(px: f64) -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: px,
            left: 0.0,
        }
    }

    /// Render as a CSS `rootMargin` string.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }

    /// Apply to a root rectangle.
    #[must_use]
    pub fn apply(&self, root: Rect) -> Rect {
        let x = root.x - self.left;
        let y = root.y - self.top;
        let width = (root.width + self.left + self.right).max(0.0);
        let height = (root.height + self.top + self.bottom).max(0.0);
        Rect::new(x, y, width, height)
    }
}

/// Scroll and size state of the page viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Inner width of the window.
    pub width: f64,
    /// Inner height of the window.
    pub height: f64,
    /// Vertical scroll offset (`pageYOffset`).
    pub scroll_y: f64,
    /// Total scrollable height of the document.
    pub scroll_height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
            scroll_height: height,
        }
    }

    /// The viewport as a root rectangle at the origin.
    #[must_use]
    pub fn root_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.height).max(0.0)
    }
}

/// Fraction of `target` visible inside `root` after applying `margin`.
#[must_use]
pub fn intersection_ratio(target: &Rect, root: &Rect, margin: &RootMargin) -> f64 {
    let effective = margin.apply(*root);
    if effective.is_empty() {
        return 0.0;
    }
    if target.is_empty() {
        return if effective.contains_point(target.x, target.y) {
            1.0
        } else {
            0.0
        };
    }
    match target.intersection(&effective) {
        Some(overlap) => (overlap.area() / target.area()).clamp(0.0, 1.0),
        None => 0.0,
    }
}
