#![forbid(unsafe_code)]

//! Fake interactive control.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use coachmark::{Control, ElementRef, ListenerId, NodeId};
use coachmark_core::event::ControlEvents;
use coachmark_core::geometry::Rect;

use crate::host::FakeHost;
use crate::tree::FakeNode;

type Listener = (ListenerId, ControlEvents, Rc<dyn Fn()>);

/// Button-like control living in a fake tree.
pub struct FakeControl {
    node: Rc<FakeNode>,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
}

impl FakeControl {
    /// Interactive control directly under `host`'s window.
    pub fn new(host: &FakeHost, label: &str, frame: Rect) -> Rc<Self> {
        Rc::new(Self {
            node: host.add_element(label, frame),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        })
    }

    /// Type-erased handle for completers.
    pub fn control(self: &Rc<Self>) -> Rc<dyn Control> {
        Rc::clone(self) as Rc<dyn Control>
    }

    /// Element handle for step targets.
    pub fn element(&self) -> ElementRef {
        self.node.element()
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver `events` to every listener whose mask matches.
    pub fn emit(&self, events: ControlEvents) {
        let matching: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, mask, _)| mask.matches(events))
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();
        tracing::trace!(
            target: "coachmark.harness",
            control = %self.node.id(),
            listeners = matching.len(),
            "control event"
        );
        for listener in matching {
            listener();
        }
    }
}

impl Control for FakeControl {
    fn node_id(&self) -> NodeId {
        self.node.id()
    }

    fn add_listener(&self, events: ControlEvents, listener: Rc<dyn Fn()>) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, events, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _, _)| *l != id);
    }
}
