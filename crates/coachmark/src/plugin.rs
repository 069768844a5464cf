#![forbid(unsafe_code)]

//! Lifecycle plugins.
//!
//! Plugins observe guide and step lifecycle events synchronously, in
//! registration order, with a [`StepContext`] describing the step involved.
//!
//! # Event order
//!
//! ```text
//! show:        guideWillShow, stepWillShow, stepDidShow, guideDidShow
//! step change: stepWillHide, stepDidHide, stepWillShow, stepDidShow
//! dismiss:     stepWillHide, guideWillHide, stepDidHide, guideDidHide
//! ```
//!
//! With an animated show, `guideDidShow` is delivered when the fade-in
//! completes.

use std::fmt;
use std::rc::Rc;

use crate::companion::CompanionView;
use crate::host::{ElementRef, NodeId, OverlayHost};
use crate::step::GuideStep;

/// Guide and step lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideEvent {
    GuideWillShow,
    GuideDidShow,
    GuideWillHide,
    GuideDidHide,
    StepWillShow,
    StepDidShow,
    StepWillHide,
    StepDidHide,
}

impl GuideEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GuideWillShow => "guideWillShow",
            Self::GuideDidShow => "guideDidShow",
            Self::GuideWillHide => "guideWillHide",
            Self::GuideDidHide => "guideDidHide",
            Self::StepWillShow => "stepWillShow",
            Self::StepDidShow => "stepDidShow",
            Self::StepWillHide => "stepWillHide",
            Self::StepDidHide => "stepDidHide",
        }
    }
}

impl fmt::Display for GuideEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot handed to plugins with every event.
pub struct StepContext<'a> {
    pub host: &'a Rc<dyn OverlayHost>,
    /// Overlay container node.
    pub container: NodeId,
    /// Live target, if the step has one.
    pub target: Option<ElementRef>,
    pub companion: Option<&'a Rc<dyn CompanionView>>,
    pub step: &'a GuideStep,
    pub step_index: usize,
    pub total_steps: usize,
}

impl fmt::Debug for StepContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("container", &self.container)
            .field("target", &self.target.as_ref().map(|t| t.node_id()))
            .field("companion", &self.companion.map(|c| c.node_id()))
            .field("step", &self.step.identifier())
            .field("step_index", &self.step_index)
            .field("total_steps", &self.total_steps)
            .finish()
    }
}

/// Observer of guide lifecycle events.
pub trait GuidePlugin {
    fn handle(&self, event: GuideEvent, ctx: &StepContext<'_>);
}

/// Ordered plugin list with identity de-duplication.
#[derive(Default)]
pub(crate) struct PluginRegistry {
    plugins: Vec<Rc<dyn GuidePlugin>>,
}

impl PluginRegistry {
    /// Register `plugin`; `false` if this exact instance is already present.
    pub(crate) fn register(&mut self, plugin: Rc<dyn GuidePlugin>) -> bool {
        if self.plugins.iter().any(|p| same_plugin(p, &plugin)) {
            return false;
        }
        self.plugins.push(plugin);
        true
    }

    /// Remove `plugin`; `false` if this exact instance was not registered.
    pub(crate) fn unregister(&mut self, plugin: &Rc<dyn GuidePlugin>) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| !same_plugin(p, plugin));
        self.plugins.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.plugins.len()
    }

    pub(crate) fn dispatch(&self, event: GuideEvent, ctx: &StepContext<'_>) {
        for plugin in &self.plugins {
            plugin.handle(event, ctx);
        }
    }
}

fn same_plugin(a: &Rc<dyn GuidePlugin>, b: &Rc<dyn GuidePlugin>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("len", &self.plugins.len())
            .finish()
    }
}
