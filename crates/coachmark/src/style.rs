#![forbid(unsafe_code)]

//! Highlight styles: how a target's frame becomes a cut-out.
//!
//! A style answers two questions for a step: which hole to punch into the
//! mask for a given target frame, and which frame companion content should
//! lay out against. Built-in styles cover the common shapes; anything else
//! plugs in through [`CutoutStrategy`].

use std::fmt;
use std::rc::Rc;

use coachmark_core::geometry::{CornerRadii, Corners, Insets, Point, Rect};
use coachmark_core::path::Shape;

use crate::host::Element;
use crate::tracker::{ElementTracker, LayoutAnchor};

/// Custom cut-out geometry.
pub trait CutoutStrategy {
    /// Hole for a target whose frame (in overlay coordinates) is `frame`.
    /// `None` draws no hole.
    fn cutout(&self, frame: Rect, target: &dyn Element) -> Option<Shape>;

    /// Frame companion content lays out against.
    fn layout_anchor(&self, _target: &dyn Element, tracker: &ElementTracker) -> LayoutAnchor {
        tracker.anchor()
    }
}

/// Corner radius of a rounded-rect cut-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerRadius {
    Fixed(f64),
    /// Target's own radius plus `delta`.
    FollowTarget { delta: f64 },
    /// Target's own radius times `multiplier`.
    ScaleTarget { multiplier: f64 },
}

impl Default for CornerRadius {
    fn default() -> Self {
        Self::Fixed(0.0)
    }
}

impl CornerRadius {
    /// Resolve against the target's own radius. Never negative.
    pub fn resolve(self, target_radius: f64) -> f64 {
        let base = target_radius.max(0.0);
        let r = match self {
            Self::Fixed(r) => r,
            Self::FollowTarget { delta } => base + delta,
            Self::ScaleTarget { multiplier } => base * multiplier,
        };
        r.max(0.0)
    }
}

/// Rounded-rectangle cut-out parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundedRectStyle {
    pub radius: CornerRadius,
    /// Applied to the target frame; negative values grow the cut-out.
    pub insets: Insets,
    /// Corners that get the radius; the rest stay square.
    pub corners: Corners,
}

impl RoundedRectStyle {
    pub fn new(radius: CornerRadius) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    #[must_use]
    pub fn corners(mut self, corners: Corners) -> Self {
        self.corners = corners;
        self
    }
}

/// Circle radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleRadius {
    Fixed(f64),
    /// `min(width, height) * factor / 2`.
    ScaledToTarget { factor: f64 },
}

impl Default for CircleRadius {
    fn default() -> Self {
        Self::Fixed(50.0)
    }
}

impl CircleRadius {
    pub fn resolve(self, frame: Rect) -> f64 {
        match self {
            Self::Fixed(r) => r.max(0.0),
            Self::ScaledToTarget { factor } => (frame.min_side() * factor / 2.0).max(0.0),
        }
    }
}

/// Circle cut-out parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CircleStyle {
    pub radius: CircleRadius,
    /// Offset of the circle center from the target center.
    pub center_offset: Point,
}

impl CircleStyle {
    pub fn new(radius: CircleRadius) -> Self {
        Self {
            radius,
            center_offset: Point::ORIGIN,
        }
    }

    #[must_use]
    pub fn center_offset(mut self, offset: Point) -> Self {
        self.center_offset = offset;
        self
    }
}

/// How a step highlights its target.
#[derive(Clone, Default)]
pub enum HighlightStyle {
    /// Exact target frame.
    #[default]
    Rectangle,
    RoundedRect(RoundedRectStyle),
    Circle(CircleStyle),
    /// Dim everything; still anchors companion content to the target.
    NoHighlight,
    Custom(Rc<dyn CutoutStrategy>),
}

impl HighlightStyle {
    /// Hole for a target with `frame` in overlay coordinates.
    pub fn cutout(&self, frame: Rect, target: &dyn Element) -> Option<Shape> {
        match self {
            Self::Rectangle => Some(Shape::rect(frame)),
            Self::RoundedRect(style) => {
                let rect = frame.inset(style.insets);
                let r = style.radius.resolve(target.corner_radius());
                Some(Shape::rounded_rect(rect, CornerRadii::masked(r, style.corners)))
            }
            Self::Circle(style) => {
                let center = frame
                    .center()
                    .offset(style.center_offset.x, style.center_offset.y);
                Some(Shape::circle(center, style.radius.resolve(frame)))
            }
            Self::NoHighlight => None,
            Self::Custom(strategy) => strategy.cutout(frame, target),
        }
    }

    /// Frame companion content lays out against.
    pub fn layout_anchor(&self, target: &dyn Element, tracker: &ElementTracker) -> LayoutAnchor {
        match self {
            Self::Custom(strategy) => strategy.layout_anchor(target, tracker),
            _ => tracker.anchor(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::RoundedRect(_) => "rounded_rect",
            Self::Circle(_) => "circle",
            Self::NoHighlight => "no_highlight",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for HighlightStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundedRect(s) => f.debug_tuple("RoundedRect").field(s).finish(),
            Self::Circle(s) => f.debug_tuple("Circle").field(s).finish(),
            other => f.write_str(other.name()),
        }
    }
}
