#![forbid(unsafe_code)]

//! Guide controller: the step state machine.
//!
//! The controller owns the steps, the mask surface, the element tracker and
//! the gesture shield, and mounts an overlay container on the host while a
//! guide is showing. Companion requests, completer triggers and tracker
//! loss arrive as messages on an internal channel and are applied on the
//! next [`GuideController::pump`].
//!
//! # Driving
//!
//! The host calls, from its UI thread:
//! - [`GuideController::layout_pass`] after every layout pass;
//! - [`GuideController::tick`] once per frame with the elapsed time;
//! - [`GuideController::pump`] whenever it wants pending requests applied
//!   without advancing time (`tick` pumps too);
//! - [`GuideController::hit_test`] / [`GuideController::handle_tap`] for
//!   touches that land on the overlay;
//! - [`GuideController::claim_gesture`] (or the installed
//!   [`GestureShield`] directly) before recognizing a gesture.
//!
//! # Invariants
//!
//! 1. `current_index()` is `None` exactly when the guide is not showing.
//! 2. Plugins see events in the order documented in [`crate::plugin`].
//! 3. `on_dismiss` fires exactly once per dismissal, after teardown.
//! 4. Messages from a step that has been torn down are ignored.
//! 5. Within one step at most one of "next", "skip" and "completer" takes
//!    effect.

use std::fmt;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use coachmark_core::animation::{Animation, Fade, ease_out};
use coachmark_core::color::Rgba;
use coachmark_core::geometry::Point;
use coachmark_core::path::MaskPath;
use web_time::{Duration, Instant};

use crate::companion::{CompanionAction, CompanionActions};
use crate::completer::CompletionTrigger;
use crate::config::{GuideConfig, IllegalTargetPolicy};
use crate::host::{
    ElementRef, HostBinding, HostResolver, NodeId, OverlayHost, TargetLegality, check_target,
};
use crate::mask::{CutoutRouting, MaskHit, MaskSurface, MaskTick};
use crate::plugin::{GuideEvent, GuidePlugin, PluginRegistry, StepContext};
use crate::shield::{GestureClaim, GestureShield};
use crate::step::GuideStep;
use crate::tracker::{ElementTracker, LayoutAnchor, attached_frame};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Why a guide was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// "Next" was requested on the last step.
    Completed,
    Skipped,
    OutsideTap,
    CompleterTriggered,
    /// [`GuideController::hide`] was called.
    Programmatic,
}

impl DismissReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::OutsideTap => "outside_tap",
            Self::CompleterTriggered => "completer_triggered",
            Self::Programmatic => "programmatic",
        }
    }
}

impl fmt::Display for DismissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot passed to the dismiss callback, taken before teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissContext {
    pub reason: DismissReason,
    /// Identifier of the step that was showing.
    pub step_id: Option<String>,
    pub last_step_index: Option<usize>,
    pub total_steps: usize,
}

/// Passed to the step-change callback after a companion "next" advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChange {
    pub index: usize,
    pub step_id: Option<String>,
    pub total_steps: usize,
}

/// Result of routing a touch through the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// No overlay here; deliver to the host as usual.
    PassThrough,
    /// A companion view node.
    Companion(NodeId),
    /// Redirected into the highlighted target.
    Forwarded(NodeId),
    /// Swallowed by the mask.
    Mask,
}

/// Controller mailbox.
#[derive(Debug)]
pub(crate) enum GuideMsg {
    Companion { epoch: u64, action: CompanionAction },
    CompleterTriggered { epoch: u64 },
    TargetLost { epoch: u64 },
}

impl GuideMsg {
    fn epoch(&self) -> u64 {
        match self {
            Self::Companion { epoch, .. }
            | Self::CompleterTriggered { epoch }
            | Self::TargetLost { epoch } => *epoch,
        }
    }
}

type DismissCallback = Box<dyn FnMut(&DismissContext)>;
type StepChangeCallback = Box<dyn FnMut(&StepChange)>;

struct Mounted {
    host: Rc<dyn OverlayHost>,
    container: NodeId,
    companion: Option<NodeId>,
    shown_at: Instant,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`GuideController`].
#[derive(Default)]
pub struct GuideControllerBuilder {
    host: Option<Rc<dyn OverlayHost>>,
    resolver: Option<Rc<dyn HostResolver>>,
    steps: Vec<GuideStep>,
    plugins: Vec<Rc<dyn GuidePlugin>>,
    config: GuideConfig,
}

impl GuideControllerBuilder {
    /// Mount on this host. Held weakly once built.
    #[must_use]
    pub fn host(mut self, host: &Rc<dyn OverlayHost>) -> Self {
        self.host = Some(Rc::clone(host));
        self
    }

    /// Fallback used when there is no explicit host, or it is gone.
    #[must_use]
    pub fn resolver(mut self, resolver: impl HostResolver + 'static) -> Self {
        self.resolver = Some(Rc::new(resolver));
        self
    }

    #[must_use]
    pub fn step(mut self, step: GuideStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = GuideStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    #[must_use]
    pub fn plugin(mut self, plugin: Rc<dyn GuidePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    #[must_use]
    pub fn config(mut self, config: GuideConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the controller.
    ///
    /// # Panics
    ///
    /// With [`IllegalTargetPolicy::Abort`], panics if a step targets the
    /// host itself or an element outside the host. With
    /// [`IllegalTargetPolicy::Drop`] such steps are left out. Steps with
    /// neither target nor companion are always left out.
    pub fn build(self) -> GuideController {
        for problem in self.config.validate() {
            tracing::warn!(target: "coachmark.guide", problem = %problem, "questionable guide config");
        }
        let (tx, rx) = mpsc::channel();
        let mut mask = MaskSurface::new(Default::default(), self.config.mask_color);
        mask.set_transition(self.config.duration(), self.config.transition_easing.as_fn());
        let mut controller = GuideController {
            binding: HostBinding::new(self.host.as_ref(), self.resolver),
            config: self.config,
            steps: Vec::with_capacity(self.steps.len()),
            plugins: PluginRegistry::default(),
            current: None,
            resume_index: None,
            mounted: None,
            mask,
            tracker: None,
            shield: GestureShield::new(),
            fade: None,
            epoch: 0,
            tx,
            rx,
            on_step_change: None,
            on_dismiss: None,
        };
        for step in self.steps {
            controller.add_step(step);
        }
        for plugin in self.plugins {
            controller.add_plugin(plugin);
        }
        controller
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives a guide over a host surface.
pub struct GuideController {
    config: GuideConfig,
    binding: HostBinding,
    steps: Vec<GuideStep>,
    plugins: PluginRegistry,
    current: Option<usize>,
    resume_index: Option<usize>,
    mounted: Option<Mounted>,
    mask: MaskSurface,
    tracker: Option<ElementTracker>,
    shield: GestureShield,
    fade: Option<Fade>,
    epoch: u64,
    tx: Sender<GuideMsg>,
    rx: Receiver<GuideMsg>,
    on_step_change: Option<StepChangeCallback>,
    on_dismiss: Option<DismissCallback>,
}

impl GuideController {
    pub fn builder() -> GuideControllerBuilder {
        GuideControllerBuilder::default()
    }

    /// Controller over `host` with `steps` and the default config.
    pub fn new(host: &Rc<dyn OverlayHost>, steps: impl IntoIterator<Item = GuideStep>) -> Self {
        Self::builder().host(host).steps(steps).build()
    }

    // -- registration --

    /// Append a step; `false` if it was not added.
    ///
    /// Steps without target or companion are dropped. Steps whose target is
    /// the host or lies outside it follow the configured
    /// [`IllegalTargetPolicy`].
    pub fn add_step(&mut self, step: GuideStep) -> bool {
        if !step.is_valid() {
            tracing::debug!(
                target: "coachmark.guide",
                step = ?step.identifier(),
                "dropping step without target or companion"
            );
            return false;
        }
        if let Some(problem) = self.target_problem(&step) {
            match self.config.illegal_target_policy {
                IllegalTargetPolicy::Abort => {
                    panic!("guide step {:?} rejected: {problem}", step.identifier())
                }
                IllegalTargetPolicy::Drop => {
                    tracing::warn!(
                        target: "coachmark.guide",
                        step = ?step.identifier(),
                        problem = %problem,
                        "dropping step"
                    );
                    return false;
                }
            }
        }
        self.steps.push(step);
        true
    }

    fn target_problem(&self, step: &GuideStep) -> Option<String> {
        let (target, host) = (step.resolve_target()?, self.binding.resolve()?);
        match check_target(&*target, &*host) {
            TargetLegality::Legal => None,
            verdict => Some(format!(
                "target {} is illegal for host {} ({verdict:?})",
                target.node_id(),
                host.node_id()
            )),
        }
    }

    /// Register a plugin; `false` if this instance is already registered.
    pub fn add_plugin(&mut self, plugin: Rc<dyn GuidePlugin>) -> bool {
        self.plugins.register(plugin)
    }

    /// Unregister a plugin by identity; `false` if it was not registered.
    /// Takes effect from the next dispatched event, even mid-guide.
    pub fn remove_plugin(&mut self, plugin: &Rc<dyn GuidePlugin>) -> bool {
        self.plugins.unregister(plugin)
    }

    pub fn set_on_dismiss(&mut self, f: impl FnMut(&DismissContext) + 'static) {
        self.on_dismiss = Some(Box::new(f));
    }

    pub fn set_on_step_change(&mut self, f: impl FnMut(&StepChange) + 'static) {
        self.on_step_change = Some(Box::new(f));
    }

    // -- configuration --

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn set_mask_color(&mut self, color: Rgba) {
        self.config.mask_color = color;
        self.mask.set_color(color);
    }

    pub fn set_animation_duration(&mut self, duration: Duration) {
        self.config = self.config.clone().animation_duration(duration);
        self.mask
            .set_transition(self.config.duration(), self.config.transition_easing.as_fn());
    }

    pub fn set_animates_step_transition(&mut self, animate: bool) {
        self.config.animates_step_transition = animate;
    }

    // -- queries --

    /// Index of the step on screen; `None` when not showing.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&GuideStep> {
        self.steps.get(index)
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_showing(&self) -> bool {
        self.mounted.is_some()
    }

    /// Overlay container node while showing.
    pub fn container(&self) -> Option<NodeId> {
        self.mounted.as_ref().map(|m| m.container)
    }

    /// Mask surface, for rendering.
    pub fn mask(&self) -> &MaskSurface {
        &self.mask
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.mask.opacity()
    }

    /// The shield this controller installs while showing.
    pub fn shield(&self) -> &GestureShield {
        &self.shield
    }

    // -- lifecycle --

    /// Mount the overlay and show the first (or resumed) step.
    ///
    /// Returns `false` when there are no steps or no host can be resolved,
    /// `true` if the guide is now (or already was) showing.
    pub fn show(&mut self, animated: bool) -> bool {
        if self.steps.is_empty() {
            tracing::debug!(target: "coachmark.guide", "show ignored: no steps");
            return false;
        }
        if self.is_showing() {
            return true;
        }
        let Some(host) = self.binding.resolve() else {
            tracing::warn!(target: "coachmark.guide", "show ignored: no host surface");
            return false;
        };
        let container = host.mount_overlay();
        self.mask.set_bounds(host.bounds());
        self.mask.set_opacity(1.0);
        self.shield.activate(container);
        host.install_shield(self.shield.clone());
        self.mounted = Some(Mounted {
            host,
            container,
            companion: None,
            shown_at: Instant::now(),
        });

        let index = self
            .resume_index
            .take()
            .filter(|i| *i < self.steps.len())
            .unwrap_or(0);
        let animated = animated && !self.config.duration().is_zero();
        tracing::info!(
            target: "coachmark.guide",
            step_index = index,
            total_steps = self.steps.len(),
            container = %container,
            animated,
            "guide shown"
        );
        self.dispatch(GuideEvent::GuideWillShow, index);
        if animated {
            self.mask.set_opacity(0.0);
            self.fade = Some(Fade::new(self.config.duration()).easing(ease_out));
            self.show_step(index);
        } else {
            self.show_step(index);
            self.dispatch(GuideEvent::GuideDidShow, index);
        }
        true
    }

    /// Show step `index`.
    ///
    /// Out of range returns `false`. While not showing, records `index` as
    /// the step the next [`show`](Self::show) starts from. Showing the
    /// current step again refreshes the overlay in place.
    pub fn show_step(&mut self, index: usize) -> bool {
        if index >= self.steps.len() {
            return false;
        }
        if !self.is_showing() {
            self.resume_index = Some(index);
            return true;
        }
        if self.current == Some(index) {
            self.dispatch(GuideEvent::StepWillShow, index);
            self.refresh_overlay(false);
            self.dispatch(GuideEvent::StepDidShow, index);
            return true;
        }
        if let Some(prev) = self.current {
            self.dispatch(GuideEvent::StepWillHide, prev);
            self.teardown_step(prev);
            self.dispatch(GuideEvent::StepDidHide, prev);
        }
        self.current = Some(index);
        tracing::debug!(
            target: "coachmark.guide",
            step_index = index,
            step = ?self.steps[index].identifier(),
            "step shown"
        );
        self.dispatch(GuideEvent::StepWillShow, index);
        self.configure_step(index);
        self.dispatch(GuideEvent::StepDidShow, index);
        true
    }

    /// Show the step after the current one; `false` past the end.
    pub fn show_next_step(&mut self) -> bool {
        let next = self.current.map_or(0, |i| i + 1);
        self.show_step(next)
    }

    /// Show the next step, or dismiss as completed past the end.
    pub fn advance(&mut self) -> bool {
        if self.show_next_step() {
            return true;
        }
        self.perform_dismiss(DismissReason::Completed);
        false
    }

    /// Dismiss programmatically. No-op when not showing.
    pub fn hide(&mut self) {
        if self.is_showing() {
            self.perform_dismiss(DismissReason::Programmatic);
        }
    }

    /// Recompute the cut-out for the current step.
    pub fn refresh_overlay(&mut self, animated: bool) {
        let Some(index) = self.current else {
            return;
        };
        let path = self.compute_mask_path(index);
        let started = self.mask.set_cutout(path, animated);
        tracing::debug!(
            target: "coachmark.mask",
            step_index = index,
            animated = started,
            "mask refreshed"
        );
    }

    // -- host driving --

    /// Apply pending requests and the coalesced layout refresh.
    pub fn pump(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.update(msg);
        }
        if self.mask.take_scheduled_refresh() {
            self.refresh_overlay(false);
        }
    }

    /// Advance animations by `dt`, then pump.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(fade) = self.fade.as_mut() {
            fade.tick(dt);
            let opacity = fade.value();
            let done = fade.is_complete();
            self.mask.set_opacity(opacity);
            if done {
                self.fade = None;
                if let Some(index) = self.current {
                    self.dispatch(GuideEvent::GuideDidShow, index);
                }
            }
        }
        if let MaskTick::Settled { catch_up: true } = self.mask.tick(dt) {
            tracing::debug!(target: "coachmark.mask", "catch-up refresh after transition");
            self.refresh_overlay(false);
        }
        self.pump();
    }

    /// Host finished a layout pass.
    pub fn layout_pass(&mut self) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        self.mask.set_bounds(mounted.host.bounds());
        let Some(index) = self.current else {
            return;
        };
        let target = self.steps[index].resolve_target();
        let unchanged = match (&target, &self.tracker) {
            (Some(t), Some(tracker)) => tracker.tracks(t) && !tracker.is_invalidated(),
            (Some(t), None) => !t.is_attached(),
            (None, None) => true,
            (None, Some(_)) => false,
        };
        if unchanged {
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.layout_pass();
            }
        } else {
            self.install_tracker(index);
            self.layout_companion(index);
        }
        self.mask.note_layout_pass();
    }

    /// Route a touch at `point` (host coordinates).
    pub fn hit_test(&self, point: Point) -> HitTarget {
        let Some(mounted) = self.mounted.as_ref() else {
            return HitTarget::PassThrough;
        };
        if let Some(companion) = self.current.and_then(|i| self.steps[i].companion_view()) {
            if let Some(node) = companion.hit_test(point) {
                return HitTarget::Companion(node);
            }
        }
        match self.mask.hit_test(point, mounted.host.node_id()) {
            None => HitTarget::PassThrough,
            Some(MaskHit::Mask) => HitTarget::Mask,
            Some(MaskHit::Forwarded(node)) => HitTarget::Forwarded(node),
        }
    }

    /// Route a tap; a tap swallowed by the mask dismisses the guide when
    /// the current step allows it.
    pub fn handle_tap(&mut self, point: Point) -> HitTarget {
        let hit = self.hit_test(point);
        if hit == HitTarget::Mask && self.mask.emits_outside_tap() {
            self.perform_dismiss(DismissReason::OutsideTap);
        }
        hit
    }

    /// Ask the shield whether a gesture owned by `owner` may recognize.
    pub fn claim_gesture(&self, owner: NodeId) -> GestureClaim {
        match self.mounted.as_ref() {
            Some(m) => self.shield.claim(owner, &*m.host),
            None => GestureClaim::Proceed,
        }
    }

    // -- internals --

    fn update(&mut self, msg: GuideMsg) {
        if !self.is_showing() || msg.epoch() != self.epoch {
            tracing::debug!(target: "coachmark.guide", msg = ?msg, epoch = self.epoch, "ignoring stale message");
            return;
        }
        match msg {
            GuideMsg::Companion {
                action: CompanionAction::Next,
                ..
            } => {
                if self.advance() {
                    self.notify_step_change();
                }
            }
            GuideMsg::Companion {
                action: CompanionAction::Skip,
                ..
            } => self.perform_dismiss(DismissReason::Skipped),
            GuideMsg::CompleterTriggered { .. } => {
                self.perform_dismiss(DismissReason::CompleterTriggered)
            }
            GuideMsg::TargetLost { .. } => {
                if let Some(index) = self.current {
                    self.install_tracker(index);
                    self.layout_companion(index);
                    self.mask.note_layout_pass();
                }
            }
        }
    }

    fn notify_step_change(&mut self) {
        let Some(index) = self.current else {
            return;
        };
        let change = StepChange {
            index,
            step_id: self.steps[index].identifier().map(str::to_owned),
            total_steps: self.steps.len(),
        };
        if let Some(cb) = self.on_step_change.as_mut() {
            cb(&change);
        }
    }

    fn dispatch(&self, event: GuideEvent, index: usize) {
        let (Some(mounted), Some(step)) = (self.mounted.as_ref(), self.steps.get(index)) else {
            return;
        };
        let ctx = StepContext {
            host: &mounted.host,
            container: mounted.container,
            target: step.resolve_target(),
            companion: step.companion_view(),
            step,
            step_index: index,
            total_steps: self.steps.len(),
        };
        tracing::trace!(target: "coachmark.guide", event = %event, step_index = index, "dispatch");
        self.plugins.dispatch(event, &ctx);
    }

    fn configure_step(&mut self, index: usize) {
        self.epoch += 1;
        let epoch = self.epoch;
        let Some((host, container)) = self
            .mounted
            .as_ref()
            .map(|m| (Rc::clone(&m.host), m.container))
        else {
            return;
        };

        let target = self.install_tracker(index);
        let step = &self.steps[index];
        self.mask.set_routing(Some(CutoutRouting {
            target: target.as_ref().map(Rc::downgrade),
            forwards_touches: step.is_forwarding_touches(),
            dismisses_on_outside_tap: step.is_dismissed_on_outside_tap(),
        }));
        let animated = self.config.animates_step_transition && step.can_animate_transition();
        self.refresh_overlay(animated);

        let trigger = CompletionTrigger::new(self.tx.clone(), epoch);
        if let Some(completer) = self.steps[index].completer_mut() {
            completer.enable(trigger);
        }

        if let Some(companion) = self.steps[index].companion_view().cloned() {
            companion.set_actions(Some(CompanionActions::new(self.tx.clone(), epoch)));
            host.attach_companion(container, companion.node_id());
            if let Some(m) = self.mounted.as_mut() {
                m.companion = Some(companion.node_id());
            }
            self.layout_companion(index);
        }
    }

    fn teardown_step(&mut self, index: usize) {
        self.epoch += 1;
        let step = &mut self.steps[index];
        if let Some(completer) = step.completer_mut() {
            completer.disable();
        }
        if let Some(companion) = step.companion_view() {
            companion.set_actions(None);
        }
        if let Some(m) = self.mounted.as_mut() {
            if let Some(node) = m.companion.take() {
                m.host.detach_companion(node);
            }
        }
        self.tracker = None;
        self.shield.set_target(None);
    }

    /// Track the step's current target; returns it. Detached targets are
    /// not tracked until they reattach.
    fn install_tracker(&mut self, index: usize) -> Option<ElementRef> {
        let space = self.mounted.as_ref()?.host.node_id();
        let target = self.steps[index].resolve_target();
        let tracker = target
            .as_ref()
            .filter(|t| t.is_attached())
            .map(|t| self.make_tracker(t, space));
        tracing::debug!(
            target: "coachmark.tracker",
            step_index = index,
            target_node = ?target.as_ref().map(|t| t.node_id()),
            tracking = tracker.is_some(),
            "tracker installed"
        );
        self.tracker = tracker;
        self.shield.set_target(target.as_ref().map(|t| t.node_id()));
        self.mask.set_routing_target(target.as_ref().map(Rc::downgrade));
        target
    }

    fn make_tracker(&self, target: &ElementRef, space: NodeId) -> ElementTracker {
        let tx = self.tx.clone();
        let epoch = self.epoch;
        ElementTracker::new(target, space).on_master_lost(move |_| {
            let _ = tx.send(GuideMsg::TargetLost { epoch });
        })
    }

    fn layout_companion(&self, index: usize) {
        let step = &self.steps[index];
        let Some(companion) = step.companion_view() else {
            return;
        };
        match (step.resolve_target(), self.tracker.as_ref()) {
            (Some(target), Some(tracker)) => {
                let anchor = step.highlight_style().layout_anchor(&*target, tracker);
                companion.update_layout(&anchor, Some(&*target));
            }
            _ => companion.update_layout(&LayoutAnchor::fixed(self.mask.bounds()), None),
        }
    }

    fn compute_mask_path(&self, index: usize) -> Option<MaskPath> {
        let mounted = self.mounted.as_ref()?;
        let bounds = self.mask.bounds();
        if bounds.is_empty() {
            return None;
        }
        let step = &self.steps[index];
        let mut path = MaskPath::new(bounds);
        if let Some(target) = step.resolve_target() {
            let hole = attached_frame(&*target, mounted.host.node_id())
                .and_then(|frame| step.highlight_style().cutout(frame, &*target));
            if let Some(hole) = hole {
                path.push_hole(hole);
            }
        }
        path.extend_holes(step.extra_regions().iter().cloned());
        Some(path)
    }

    fn perform_dismiss(&mut self, reason: DismissReason) {
        let Some(mounted) = self.mounted.as_ref() else {
            return;
        };
        let ctx = DismissContext {
            reason,
            step_id: self
                .current
                .and_then(|i| self.steps[i].identifier())
                .map(str::to_owned),
            last_step_index: self.current,
            total_steps: self.steps.len(),
        };
        tracing::info!(
            target: "coachmark.guide",
            reason = reason.as_str(),
            last_step_index = ?ctx.last_step_index,
            total_steps = ctx.total_steps,
            shown_ms = mounted.shown_at.elapsed().as_millis() as u64,
            "guide dismissed"
        );
        self.hide_internal();
        if let Some(cb) = self.on_dismiss.as_mut() {
            cb(&ctx);
        }
    }

    fn hide_internal(&mut self) {
        if self.mounted.is_none() {
            return;
        }
        let active = self.current;
        if let Some(index) = active {
            self.dispatch(GuideEvent::StepWillHide, index);
            self.dispatch(GuideEvent::GuideWillHide, index);
            let step = &mut self.steps[index];
            if let Some(completer) = step.completer_mut() {
                completer.disable();
            }
            if let Some(companion) = step.companion_view() {
                companion.set_actions(None);
            }
        }
        self.epoch += 1;
        self.shield.deactivate();
        if let Some(m) = self.mounted.as_mut() {
            m.host.remove_shield(self.shield.id());
            if let Some(node) = m.companion.take() {
                m.host.detach_companion(node);
            }
            m.host.unmount_overlay(m.container);
        }
        self.tracker = None;
        self.fade = None;
        self.mask.reset();
        if let Some(index) = active {
            self.dispatch(GuideEvent::StepDidHide, index);
            self.dispatch(GuideEvent::GuideDidHide, index);
        }
        self.mounted = None;
        self.current = None;
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for GuideController {
    fn drop(&mut self) {
        if self.is_showing() {
            tracing::debug!(target: "coachmark.guide", "controller dropped while showing");
            self.hide_internal();
        }
    }
}

impl fmt::Debug for GuideController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuideController")
            .field("steps", &self.steps.len())
            .field("current", &self.current)
            .field("showing", &self.is_showing())
            .field("binding", &self.binding)
            .field("plugins", &self.plugins)
            .field("mask", &self.mask)
            .field("epoch", &self.epoch)
            .finish()
    }
}
