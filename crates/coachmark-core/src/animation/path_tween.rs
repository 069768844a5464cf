#![forbid(unsafe_code)]

//! Interpolation between two mask paths.

use std::time::Duration;

use super::{Animation, EasingFn, Fade};
use crate::path::MaskPath;

/// Animates a [`MaskPath`] from one outline to another.
///
/// [`PathTween::sample`] returns the outline currently on screen, so a new
/// transition can start from wherever an interrupted one left off.
#[derive(Debug, Clone)]
pub struct PathTween {
    from: MaskPath,
    to: MaskPath,
    progress: Fade,
}

impl PathTween {
    pub fn new(from: MaskPath, to: MaskPath, duration: Duration) -> Self {
        Self {
            from,
            to,
            progress: Fade::new(duration),
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.progress = self.progress.easing(easing);
        self
    }

    pub fn start(&self) -> &MaskPath {
        &self.from
    }

    pub fn end(&self) -> &MaskPath {
        &self.to
    }

    /// Outline at the current progress.
    pub fn sample(&self) -> MaskPath {
        if self.progress.is_complete() {
            return self.to.clone();
        }
        self.from.lerp(&self.to, f64::from(self.progress.value()))
    }
}

impl Animation for PathTween {
    fn tick(&mut self, dt: Duration) {
        self.progress.tick(dt);
    }

    fn is_complete(&self) -> bool {
        self.progress.is_complete()
    }

    fn value(&self) -> f32 {
        self.progress.value()
    }

    fn reset(&mut self) {
        self.progress.reset();
    }

    fn overshoot(&self) -> Duration {
        self.progress.overshoot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::path::Shape;

    fn path_with(hole: Rect) -> MaskPath {
        MaskPath::new(Rect::from_size(300.0, 300.0)).with_hole(Shape::rect(hole))
    }

    #[test]
    fn sample_tracks_progress() {
        let a = path_with(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = path_with(Rect::new(100.0, 0.0, 10.0, 10.0));
        let mut tween = PathTween::new(a.clone(), b.clone(), Duration::from_millis(200));
        assert_eq!(tween.sample(), a);
        tween.tick(Duration::from_millis(100));
        assert_eq!(tween.sample().holes()[0].bounds().x, 50.0);
        tween.tick(Duration::from_millis(100));
        assert!(tween.is_complete());
        assert_eq!(tween.sample(), b);
    }

    #[test]
    fn zero_duration_tween_shows_destination() {
        let a = path_with(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = path_with(Rect::new(50.0, 50.0, 10.0, 10.0));
        let tween = PathTween::new(a, b.clone(), Duration::ZERO);
        assert!(tween.is_complete());
        assert_eq!(tween.sample(), b);
    }
}
