#![forbid(unsafe_code)]

//! Plugin that records every lifecycle event.

use std::cell::RefCell;
use std::rc::Rc;

use coachmark::{GuideEvent, GuidePlugin, NodeId, StepContext};

/// One delivered event with the context fields tests care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event: GuideEvent,
    pub step_index: usize,
    pub step_id: Option<String>,
    pub target: Option<NodeId>,
    pub container: NodeId,
    pub total_steps: usize,
}

#[derive(Debug, Default)]
pub struct RecordingPlugin {
    log: RefCell<Vec<RecordedEvent>>,
}

impl RecordingPlugin {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn plugin(self: &Rc<Self>) -> Rc<dyn GuidePlugin> {
        Rc::clone(self) as Rc<dyn GuidePlugin>
    }

    pub fn records(&self) -> Vec<RecordedEvent> {
        self.log.borrow().clone()
    }

    pub fn events(&self) -> Vec<GuideEvent> {
        self.log.borrow().iter().map(|r| r.event).collect()
    }

    /// Events paired with their step index.
    pub fn events_with_index(&self) -> Vec<(GuideEvent, usize)> {
        self.log
            .borrow()
            .iter()
            .map(|r| (r.event, r.step_index))
            .collect()
    }

    pub fn count(&self, event: GuideEvent) -> usize {
        self.log.borrow().iter().filter(|r| r.event == event).count()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl GuidePlugin for RecordingPlugin {
    fn handle(&self, event: GuideEvent, ctx: &StepContext<'_>) {
        self.log.borrow_mut().push(RecordedEvent {
            event,
            step_index: ctx.step_index,
            step_id: ctx.step.identifier().map(str::to_owned),
            target: ctx.target.as_ref().map(|t| t.node_id()),
            container: ctx.container,
            total_steps: ctx.total_steps,
        });
    }
}
