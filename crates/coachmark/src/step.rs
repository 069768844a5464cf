#![forbid(unsafe_code)]

//! Guide steps.
//!
//! A [`GuideStep`] describes one screen of a guide: what to spotlight, how
//! to shape the spotlight, what to show next to it, and how the step may
//! complete. The target is reached through an accessor closure rather than
//! a stored reference, so a step keeps working when list cells are
//! recycled and the element at "row 3" is a different object each time.
//!
//! A step is valid when it resolves a target or carries a companion view.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use coachmark_core::path::Shape;

use crate::companion::CompanionView;
use crate::completer::AutoCompleter;
use crate::host::{Element, ElementRef};
use crate::style::HighlightStyle;

type TargetAccessor = Box<dyn Fn() -> Option<ElementRef>>;

/// Heterogeneous per-step data for plugins, looked up by type.
#[derive(Default)]
pub struct Attachments {
    items: Vec<Box<dyn Any>>,
}

impl Attachments {
    pub fn push<T: Any>(&mut self, value: T) {
        self.items.push(Box::new(value));
    }

    /// First attachment of type `T`.
    pub fn first<T: Any>(&self) -> Option<&T> {
        self.items.iter().find_map(|a| a.downcast_ref::<T>())
    }

    /// All attachments of type `T`, in insertion order.
    pub fn all<T: Any>(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|a| a.downcast_ref::<T>())
    }

    /// Remove every attachment of type `T`; returns how many were removed.
    pub fn remove_all<T: Any>(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|a| !a.is::<T>());
        before - self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachments")
            .field("len", &self.items.len())
            .finish()
    }
}

/// One step of a guide.
#[derive(Default)]
pub struct GuideStep {
    id: Option<String>,
    target: Option<TargetAccessor>,
    style: HighlightStyle,
    companion: Option<Rc<dyn CompanionView>>,
    completer: Option<Box<dyn AutoCompleter>>,
    dismisses_on_outside_tap: bool,
    forwards_touches_to_target: bool,
    extra_regions: Vec<Shape>,
    attachments: Attachments,
}

impl GuideStep {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Spotlight a specific element, held weakly.
    #[must_use]
    pub fn target(mut self, element: &ElementRef) -> Self {
        let weak: Weak<dyn Element> = Rc::downgrade(element);
        self.target = Some(Box::new(move || weak.upgrade()));
        self
    }

    /// Spotlight whatever element `accessor` returns at the time of asking.
    #[must_use]
    pub fn target_with(mut self, accessor: impl Fn() -> Option<ElementRef> + 'static) -> Self {
        self.target = Some(Box::new(accessor));
        self
    }

    #[must_use]
    pub fn style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn companion(mut self, companion: Rc<dyn CompanionView>) -> Self {
        self.companion = Some(companion);
        self
    }

    #[must_use]
    pub fn completer(mut self, completer: impl AutoCompleter + 'static) -> Self {
        self.completer = Some(Box::new(completer));
        self
    }

    #[must_use]
    pub fn dismisses_on_outside_tap(mut self, dismisses: bool) -> Self {
        self.dismisses_on_outside_tap = dismisses;
        self
    }

    #[must_use]
    pub fn forwards_touches_to_target(mut self, forwards: bool) -> Self {
        self.forwards_touches_to_target = forwards;
        self
    }

    /// Additional hole punched alongside the target's cut-out.
    #[must_use]
    pub fn extra_region(mut self, region: Shape) -> Self {
        self.extra_regions.push(region);
        self
    }

    #[must_use]
    pub fn attachment<T: Any>(mut self, value: T) -> Self {
        self.attachments.push(value);
        self
    }

    // -- accessors --

    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Ask the accessor for the current target.
    pub fn resolve_target(&self) -> Option<ElementRef> {
        self.target.as_ref().and_then(|f| f())
    }

    pub fn has_target_accessor(&self) -> bool {
        self.target.is_some()
    }

    pub fn highlight_style(&self) -> &HighlightStyle {
        &self.style
    }

    pub fn companion_view(&self) -> Option<&Rc<dyn CompanionView>> {
        self.companion.as_ref()
    }

    pub fn has_completer(&self) -> bool {
        self.completer.is_some()
    }

    pub(crate) fn completer_mut(&mut self) -> Option<&mut (dyn AutoCompleter + 'static)> {
        self.completer.as_deref_mut()
    }

    pub fn is_dismissed_on_outside_tap(&self) -> bool {
        self.dismisses_on_outside_tap
    }

    pub fn is_forwarding_touches(&self) -> bool {
        self.forwards_touches_to_target
    }

    pub fn extra_regions(&self) -> &[Shape] {
        &self.extra_regions
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Resolves a target or carries a companion.
    pub fn is_valid(&self) -> bool {
        self.companion.is_some() || self.resolve_target().is_some()
    }

    /// Whether a cut-out transition into this step has something to show.
    pub fn can_animate_transition(&self) -> bool {
        !self.extra_regions.is_empty() || self.resolve_target().is_some_and(|t| t.is_attached())
    }
}

impl fmt::Debug for GuideStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuideStep")
            .field("id", &self.id)
            .field("target", &self.resolve_target().map(|t| t.node_id()))
            .field("style", &self.style)
            .field("companion", &self.companion.as_ref().map(|c| c.node_id()))
            .field("completer", &self.completer.is_some())
            .field("dismisses_on_outside_tap", &self.dismisses_on_outside_tap)
            .field("forwards_touches_to_target", &self.forwards_touches_to_target)
            .field("extra_regions", &self.extra_regions.len())
            .field("attachments", &self.attachments)
            .finish()
    }
}
