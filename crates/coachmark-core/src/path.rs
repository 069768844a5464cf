#![forbid(unsafe_code)]

//! Cut-out mask paths.
//!
//! A [`MaskPath`] is the outline drawn by the dimmed overlay: the full
//! overlay bounds plus zero or more holes. Coverage follows the even-odd
//! rule, so a point inside the bounds and inside exactly one hole is clear,
//! while a point inside two overlapping holes is dimmed again.
//!
//! # Invariants
//!
//! 1. A point outside the bounds is never dimmed.
//! 2. `lerp(to, 0.0)` reproduces `self` and `lerp(to, 1.0)` reproduces `to`
//!    (up to hole collapse for unmatched holes, which are zero-sized at the
//!    endpoint and therefore clear nothing).
//! 3. Interpolated rectangles never have negative extent.

use crate::geometry::{CornerRadii, Point, Rect};

/// One closed region of a mask path.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Rectangle with per-corner radii. Circles are rounded rectangles whose
    /// radii equal half the side.
    RoundedRect { rect: Rect, radii: CornerRadii },
    /// Arbitrary closed polygon, vertices in order.
    Polygon(Vec<Point>),
}

impl Shape {
    /// Plain rectangle.
    pub fn rect(rect: Rect) -> Self {
        Self::RoundedRect {
            rect,
            radii: CornerRadii::ZERO,
        }
    }

    /// Rounded rectangle; radii are clamped to half the shorter side.
    pub fn rounded_rect(rect: Rect, radii: CornerRadii) -> Self {
        Self::RoundedRect {
            rect,
            radii: radii.clamped_to(&rect),
        }
    }

    /// Circle of `radius` around `center`. Negative radii collapse to zero.
    pub fn circle(center: Point, radius: f64) -> Self {
        let r = radius.max(0.0);
        Self::RoundedRect {
            rect: Rect::new(center.x - r, center.y - r, 2.0 * r, 2.0 * r),
            radii: CornerRadii::uniform(r),
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::RoundedRect { rect, .. } => *rect,
            Self::Polygon(points) => {
                let Some(first) = points.first() else {
                    return Rect::ZERO;
                };
                let (mut min, mut max) = (*first, *first);
                for p in &points[1..] {
                    min.x = min.x.min(p.x);
                    min.y = min.y.min(p.y);
                    max.x = max.x.max(p.x);
                    max.y = max.y.max(p.y);
                }
                Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
            }
        }
    }

    /// Geometric center used when a shape grows from or collapses to nothing.
    pub fn center(&self) -> Point {
        match self {
            Self::RoundedRect { rect, .. } => rect.center(),
            Self::Polygon(points) if points.is_empty() => Point::ORIGIN,
            Self::Polygon(points) => {
                let n = points.len() as f64;
                let (sx, sy) = points
                    .iter()
                    .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
                Point::new(sx / n, sy / n)
            }
        }
    }

    /// Zero-sized version of this shape at its center.
    pub fn collapsed(&self) -> Self {
        let c = self.center();
        match self {
            Self::RoundedRect { .. } => Self::RoundedRect {
                rect: Rect::new(c.x, c.y, 0.0, 0.0),
                radii: CornerRadii::ZERO,
            },
            Self::Polygon(points) => Self::Polygon(vec![c; points.len()]),
        }
    }

    /// Check if `p` lies inside the shape.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::RoundedRect { rect, radii } => rounded_rect_contains(rect, radii, p),
            Self::Polygon(points) => polygon_contains(points, p),
        }
    }

    /// Interpolate toward `other`.
    ///
    /// Matching kinds interpolate component-wise. Polygons with different
    /// vertex counts, and shapes of different kinds, snap to `other`.
    pub fn lerp(&self, other: &Shape, t: f64) -> Shape {
        match (self, other) {
            (
                Self::RoundedRect { rect: a, radii: ra },
                Self::RoundedRect { rect: b, radii: rb },
            ) => {
                let rect = a.lerp(b, t);
                Self::RoundedRect {
                    rect,
                    radii: ra.lerp(rb, t).clamped_to(&rect),
                }
            }
            (Self::Polygon(a), Self::Polygon(b)) if a.len() == b.len() => {
                Self::Polygon(a.iter().zip(b).map(|(p, q)| p.lerp(*q, t)).collect())
            }
            _ => other.clone(),
        }
    }
}

fn rounded_rect_contains(rect: &Rect, radii: &CornerRadii, p: Point) -> bool {
    if !rect.contains(p) {
        return false;
    }
    let corners = [
        (radii.top_left, rect.left() + radii.top_left, rect.top() + radii.top_left),
        (
            radii.top_right,
            rect.right() - radii.top_right,
            rect.top() + radii.top_right,
        ),
        (
            radii.bottom_right,
            rect.right() - radii.bottom_right,
            rect.bottom() - radii.bottom_right,
        ),
        (
            radii.bottom_left,
            rect.left() + radii.bottom_left,
            rect.bottom() - radii.bottom_left,
        ),
    ];
    for (i, (r, cx, cy)) in corners.into_iter().enumerate() {
        if r <= 0.0 {
            continue;
        }
        let in_corner_box = match i {
            0 => p.x < cx && p.y < cy,
            1 => p.x > cx && p.y < cy,
            2 => p.x > cx && p.y > cy,
            _ => p.x < cx && p.y > cy,
        };
        if in_corner_box {
            let (dx, dy) = (p.x - cx, p.y - cy);
            return dx * dx + dy * dy <= r * r;
        }
    }
    true
}

fn polygon_contains(points: &[Point], p: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

// ---------------------------------------------------------------------------
// MaskPath
// ---------------------------------------------------------------------------

/// Overlay outline: bounds plus holes, filled with the even-odd rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaskPath {
    bounds: Rect,
    holes: Vec<Shape>,
}

impl MaskPath {
    /// A path covering `bounds` with no holes.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            holes: Vec::new(),
        }
    }

    /// Builder-style hole insertion.
    #[must_use]
    pub fn with_hole(mut self, hole: Shape) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn push_hole(&mut self, hole: Shape) {
        self.holes.push(hole);
    }

    pub fn extend_holes(&mut self, holes: impl IntoIterator<Item = Shape>) {
        self.holes.extend(holes);
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn holes(&self) -> &[Shape] {
        &self.holes
    }

    /// A path with empty bounds draws nothing.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Number of sub-paths containing `p` (bounds included).
    pub fn winding_count(&self, p: Point) -> usize {
        if !self.bounds.contains(p) {
            return 0;
        }
        1 + self.holes.iter().filter(|h| h.contains(p)).count()
    }

    /// Even-odd fill test.
    pub fn is_dimmed(&self, p: Point) -> bool {
        self.winding_count(p) % 2 == 1
    }

    /// Interpolate toward `to`.
    ///
    /// Holes are paired by index. Holes present only in `self` shrink to
    /// their center; holes present only in `to` grow from theirs.
    pub fn lerp(&self, to: &MaskPath, t: f64) -> MaskPath {
        let t = t.clamp(0.0, 1.0);
        let n = self.holes.len().max(to.holes.len());
        let mut holes = Vec::with_capacity(n);
        for i in 0..n {
            let hole = match (self.holes.get(i), to.holes.get(i)) {
                (Some(a), Some(b)) => a.lerp(b, t),
                (Some(a), None) => a.lerp(&a.collapsed(), t),
                (None, Some(b)) => b.collapsed().lerp(b, t),
                (None, None) => continue,
            };
            holes.push(hole);
        }
        MaskPath {
            bounds: self.bounds.lerp(&to.bounds, t),
            holes,
        }
    }

    /// Rasterize into a row-major alpha bitmap of `width * height` pixels.
    ///
    /// Each pixel is sampled at its center in path coordinates; dimmed
    /// pixels get `alpha`, clear pixels get 0.
    pub fn rasterize(&self, width: usize, height: usize, alpha: u8) -> Vec<u8> {
        let mut out = vec![0u8; width * height];
        for row in 0..height {
            let y = row as f64 + 0.5;
            for col in 0..width {
                let p = Point::new(col as f64 + 0.5, y);
                if self.is_dimmed(p) {
                    out[row * width + col] = alpha;
                }
            }
        }
        out
    }
}
