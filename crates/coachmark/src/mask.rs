#![forbid(unsafe_code)]

//! Mask surface: the dimmed layer with the spotlight cut-out.
//!
//! The surface stores the last commanded outline (the model value) and,
//! while a transition runs, a [`PathTween`] that produces what is actually
//! on screen. Every new cut-out starts from [`MaskSurface::displayed_path`],
//! so interrupting a transition never makes the outline jump.
//!
//! # Refresh coalescing
//!
//! Host layout passes only *schedule* a refresh. The controller collects it
//! on its next pump with [`MaskSurface::take_scheduled_refresh`], so any
//! number of layout passes within one turn cost one refresh. A layout pass
//! that lands mid-transition is remembered instead and reported as a single
//! catch-up refresh when the transition settles.
//!
//! # Touch routing
//!
//! | Situation | Result |
//! |-----------|--------|
//! | point outside the surface, or no step configured | pass-through |
//! | step forwards touches and the target is hit | forwarded to the target node |
//! | otherwise | the mask consumes the touch |
//!
//! Companion views sit above the mask; the controller asks them first.

use std::fmt;

use coachmark_core::animation::{Animation, EasingFn, PathTween, linear};
use coachmark_core::color::Rgba;
use coachmark_core::geometry::{Point, Rect};
use coachmark_core::path::MaskPath;
use web_time::Duration;

use crate::host::{NodeId, WeakElement};

/// Where a touch on the mask ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskHit {
    /// The mask consumed the touch.
    Mask,
    /// Redirected to a node inside the target.
    Forwarded(NodeId),
}

/// Progress report from [`MaskSurface::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskTick {
    /// No transition running.
    Idle,
    Animating,
    /// The transition just finished. `catch_up` asks for exactly one more
    /// refresh because layout changed while it ran.
    Settled { catch_up: bool },
}

/// Touch behavior of the current step.
pub(crate) struct CutoutRouting {
    pub(crate) target: Option<WeakElement>,
    pub(crate) forwards_touches: bool,
    pub(crate) dismisses_on_outside_tap: bool,
}

/// Dimmed overlay layer.
pub struct MaskSurface {
    bounds: Rect,
    color: Rgba,
    opacity: f32,
    duration: Duration,
    easing: EasingFn,
    model: Option<MaskPath>,
    transition: Option<PathTween>,
    refresh_scheduled: bool,
    needs_refresh_after_animation: bool,
    routing: Option<CutoutRouting>,
}

impl MaskSurface {
    pub fn new(bounds: Rect, color: Rgba) -> Self {
        Self {
            bounds,
            color,
            opacity: 1.0,
            duration: Duration::from_millis(crate::config::DEFAULT_ANIMATION_DURATION_MS),
            easing: linear,
            model: None,
            transition: None,
            refresh_scheduled: false,
            needs_refresh_after_animation: false,
            routing: None,
        }
    }

    /// Duration and easing of subsequent cut-out transitions.
    pub fn set_transition(&mut self, duration: Duration, easing: EasingFn) {
        self.duration = duration;
        self.easing = easing;
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Layer opacity, used for the show fade.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Last commanded outline.
    pub fn cutout(&self) -> Option<&MaskPath> {
        self.model.as_ref()
    }

    /// Outline currently on screen.
    pub fn displayed_path(&self) -> Option<MaskPath> {
        match &self.transition {
            Some(tween) => Some(tween.sample()),
            None => self.model.clone(),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn needs_refresh_after_animation(&self) -> bool {
        self.needs_refresh_after_animation
    }

    /// Replace the outline. With `animated`, interpolate from whatever is
    /// displayed right now. Returns `true` if a transition started.
    pub fn set_cutout(&mut self, path: Option<MaskPath>, animated: bool) -> bool {
        let from = self.displayed_path();
        self.transition = None;
        self.refresh_scheduled = false;
        self.needs_refresh_after_animation = false;
        self.model = path;
        if !animated {
            return false;
        }
        let (Some(from), Some(to)) = (from, self.model.clone()) else {
            return false;
        };
        if from == to || self.duration.is_zero() {
            return false;
        }
        tracing::debug!(
            target: "coachmark.mask",
            from_holes = from.holes().len(),
            to_holes = to.holes().len(),
            duration_ms = self.duration.as_millis() as u64,
            "cut-out transition started"
        );
        self.transition = Some(PathTween::new(from, to, self.duration).easing(self.easing));
        true
    }

    /// Advance the running transition.
    pub fn tick(&mut self, dt: Duration) -> MaskTick {
        let Some(tween) = self.transition.as_mut() else {
            return MaskTick::Idle;
        };
        tween.tick(dt);
        if !tween.is_complete() {
            return MaskTick::Animating;
        }
        self.transition = None;
        let catch_up = std::mem::take(&mut self.needs_refresh_after_animation);
        MaskTick::Settled { catch_up }
    }

    /// Host layout happened; schedule a refresh or remember one for later.
    pub fn note_layout_pass(&mut self) {
        if self.is_animating() {
            self.needs_refresh_after_animation = true;
        } else {
            self.refresh_scheduled = true;
        }
    }

    /// Consume a scheduled refresh. A transition that began since the
    /// layout pass defers it to the catch-up instead.
    pub fn take_scheduled_refresh(&mut self) -> bool {
        if !std::mem::take(&mut self.refresh_scheduled) {
            return false;
        }
        if self.is_animating() {
            self.needs_refresh_after_animation = true;
            return false;
        }
        true
    }

    pub(crate) fn set_routing(&mut self, routing: Option<CutoutRouting>) {
        self.routing = routing;
    }

    pub(crate) fn set_routing_target(&mut self, target: Option<WeakElement>) {
        if let Some(routing) = self.routing.as_mut() {
            routing.target = target;
        }
    }

    /// Whether a touch consumed by the mask should dismiss the guide.
    pub fn emits_outside_tap(&self) -> bool {
        self.routing
            .as_ref()
            .is_some_and(|r| r.dismisses_on_outside_tap)
    }

    /// Route a touch at `point` (overlay coordinates). `space` is the node
    /// whose coordinates the overlay shares. `None` passes the touch through.
    pub fn hit_test(&self, point: Point, space: NodeId) -> Option<MaskHit> {
        if !self.bounds.contains(point) {
            return None;
        }
        let routing = self.routing.as_ref()?;
        if routing.forwards_touches {
            let target = routing.target.as_ref().and_then(|t| t.upgrade());
            if let Some(target) = target.filter(|t| t.is_attached()) {
                if let Some(node) = target.hit_test(point, space) {
                    return Some(MaskHit::Forwarded(node));
                }
            }
        }
        Some(MaskHit::Mask)
    }

    /// Fill alpha at `point`, honoring opacity; zero inside holes.
    pub fn coverage_at(&self, point: Point) -> u8 {
        match self.displayed_path() {
            Some(path) if path.is_dimmed(point) => self.color.scaled_alpha(self.opacity),
            _ => 0,
        }
    }

    /// Row-major alpha bitmap of the displayed outline.
    pub fn render_alpha(&self, width: usize, height: usize) -> Vec<u8> {
        let alpha = self.color.scaled_alpha(self.opacity);
        match self.displayed_path() {
            Some(path) => path.rasterize(width, height, alpha),
            None => vec![0; width * height],
        }
    }

    /// Drop outline, transition, routing and pending refreshes.
    pub fn reset(&mut self) {
        self.model = None;
        self.transition = None;
        self.routing = None;
        self.refresh_scheduled = false;
        self.needs_refresh_after_animation = false;
        self.opacity = 1.0;
    }
}

impl fmt::Debug for MaskSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskSurface")
            .field("bounds", &self.bounds)
            .field("color", &self.color)
            .field("opacity", &self.opacity)
            .field("holes", &self.model.as_ref().map(|p| p.holes().len()))
            .field("animating", &self.is_animating())
            .field("refresh_scheduled", &self.refresh_scheduled)
            .field("needs_refresh_after_animation", &self.needs_refresh_after_animation)
            .finish()
    }
}
