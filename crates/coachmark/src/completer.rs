#![forbid(unsafe_code)]

//! Auto-completers: advance a step when the user does the real thing.
//!
//! A completer is enabled while its step is shown and disabled when the
//! step is hidden. When it observes its condition it calls
//! [`CompletionTrigger::trigger`], which dismisses the guide with reason
//! `completerTriggered` on the controller's next pump.
//!
//! # Invariants
//!
//! 1. A trigger delivers at most once, however often it is called.
//! 2. A trigger handed out for a step that is no longer shown is ignored.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::mpsc::Sender;

use coachmark_core::event::ControlEvents;

use crate::controller::GuideMsg;
use crate::host::NodeId;

/// One-shot completion signal for the current step.
#[derive(Clone)]
pub struct CompletionTrigger {
    tx: Sender<GuideMsg>,
    epoch: u64,
    fired: Rc<Cell<bool>>,
}

impl CompletionTrigger {
    pub(crate) fn new(tx: Sender<GuideMsg>, epoch: u64) -> Self {
        Self {
            tx,
            epoch,
            fired: Rc::new(Cell::new(false)),
        }
    }

    /// Signal completion. Only the first call has an effect.
    pub fn trigger(&self) {
        if self.fired.replace(true) {
            return;
        }
        let _ = self.tx.send(GuideMsg::CompleterTriggered { epoch: self.epoch });
    }

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

impl fmt::Debug for CompletionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionTrigger")
            .field("epoch", &self.epoch)
            .field("fired", &self.fired.get())
            .finish()
    }
}

/// Watches for a condition and fires its trigger when met.
pub trait AutoCompleter {
    /// Start observing. Called when the owning step is shown.
    fn enable(&mut self, trigger: CompletionTrigger);

    /// Stop observing. Called when the owning step is hidden.
    fn disable(&mut self);
}

// ---------------------------------------------------------------------------
// Control-event completer
// ---------------------------------------------------------------------------

/// Listener registration handle returned by a [`Control`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Interactive host element that emits [`ControlEvents`].
pub trait Control {
    fn node_id(&self) -> NodeId;

    /// Call `listener` whenever an event in `events` occurs.
    fn add_listener(&self, events: ControlEvents, listener: Rc<dyn Fn()>) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);
}

/// Completes a step when a control emits one of the given events.
///
/// Holds the control weakly; if it is gone when the step shows, the
/// completer simply never fires.
pub struct ControlEventCompleter {
    control: Weak<dyn Control>,
    events: ControlEvents,
    listener: Option<ListenerId>,
}

impl ControlEventCompleter {
    pub fn new(control: &Rc<dyn Control>, events: ControlEvents) -> Self {
        Self {
            control: Rc::downgrade(control),
            events,
            listener: None,
        }
    }

    pub fn events(&self) -> ControlEvents {
        self.events
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }
}

impl AutoCompleter for ControlEventCompleter {
    fn enable(&mut self, trigger: CompletionTrigger) {
        self.disable();
        let Some(control) = self.control.upgrade() else {
            return;
        };
        let id = control.add_listener(self.events, Rc::new(move || trigger.trigger()));
        self.listener = Some(id);
    }

    fn disable(&mut self) {
        let Some(id) = self.listener.take() else {
            return;
        };
        if let Some(control) = self.control.upgrade() {
            control.remove_listener(id);
        }
    }
}

impl fmt::Debug for ControlEventCompleter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlEventCompleter")
            .field("events", &self.events)
            .field("listener", &self.listener)
            .finish()
    }
}
