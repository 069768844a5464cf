#![forbid(unsafe_code)]

//! Coachmark: guided-tour overlays for retained-mode UI trees.
//!
//! # Role in Coachmark
//! This is the guide engine. It dims a host surface, punches a spotlight
//! cut-out around a target element, places caller-supplied companion
//! content next to it, and walks the user through an ordered list of steps.
//!
//! # Primary responsibilities
//! - **GuideController**: show/hide lifecycle, step transitions, dismissal.
//! - **MaskSurface**: dimmed layer, animated cut-out, touch routing.
//! - **ElementTracker**: follows a target's frame through layout changes.
//! - **HighlightStyle**: rectangle, rounded-rect, circle and custom cut-outs.
//! - **Plugins and completers**: lifecycle observers and auto-advance hooks.
//!
//! # How it fits in the system
//! The host toolkit implements [`host::Element`] and [`host::OverlayHost`],
//! drives the controller from its UI thread (`layout_pass`, `tick`,
//! `handle_tap`), and renders [`mask::MaskSurface`] however it draws.
//! Geometry and animation value types come from `coachmark-core`.

pub mod audio;
pub mod companion;
pub mod completer;
pub mod config;
pub mod controller;
pub mod host;
pub mod mask;
pub mod plugin;
pub mod shield;
pub mod step;
pub mod style;
pub mod tracker;

pub use companion::{CompanionAction, CompanionActions, CompanionView};
pub use completer::{AutoCompleter, CompletionTrigger, Control, ControlEventCompleter, ListenerId};
pub use config::{ConfigError, GuideConfig, IllegalTargetPolicy};
pub use controller::{
    DismissContext, DismissReason, GuideController, GuideControllerBuilder, HitTarget, StepChange,
};
pub use host::{Element, ElementRef, HostResolver, NodeId, OverlayHost, WeakElement};
pub use plugin::{GuideEvent, GuidePlugin, StepContext};
pub use shield::{GestureClaim, GestureShield};
pub use step::{Attachments, GuideStep};
pub use style::{CircleRadius, CircleStyle, CornerRadius, CutoutStrategy, HighlightStyle, RoundedRectStyle};
pub use tracker::{ElementTracker, LayoutAnchor};
