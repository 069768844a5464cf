#![forbid(unsafe_code)]

//! Recording companion view.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use coachmark::audio::{AudioError, AudioEventReceiver};
use coachmark::{CompanionActions, CompanionView, Element, LayoutAnchor, NodeId};
use coachmark_core::geometry::{Point, Rect};

use crate::host::FakeHost;
use crate::tree::FakeNode;

/// Gap between the anchor and the callout.
pub const CALLOUT_GAP: f64 = 8.0;

/// One `update_layout` call.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRecord {
    pub anchor: Rect,
    pub target: Option<NodeId>,
}

/// Audio notification seen by a companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioNote {
    Started,
    Stopped { played_to_end: bool },
    Failed(AudioError),
}

/// Callout with "next" and "skip" buttons.
///
/// The node starts detached; the controller parents it under the overlay.
/// Each layout places the callout just below the anchor, in host
/// coordinates.
pub struct FakeCompanion {
    node: Rc<FakeNode>,
    next_button: Rc<FakeNode>,
    skip_button: Rc<FakeNode>,
    space: NodeId,
    size: (f64, f64),
    actions: RefCell<Option<CompanionActions>>,
    anchor: RefCell<Option<LayoutAnchor>>,
    layouts: RefCell<Vec<LayoutRecord>>,
    audio: RefCell<Vec<AudioNote>>,
    revocations: Cell<usize>,
}

impl FakeCompanion {
    /// Callout of `width * height` for guides on `host`.
    pub fn new(host: &FakeHost, width: f64, height: f64) -> Rc<Self> {
        let tree = host.tree();
        let node = tree.node("companion", Rect::from_size(width, height));
        let half = width / 2.0;
        let next_button = tree.child(node.id(), "next", Rect::new(half, 0.0, half, height));
        let skip_button = tree.child(node.id(), "skip", Rect::new(0.0, 0.0, half, height));
        for id in [node.id(), next_button.id(), skip_button.id()] {
            tree.set_interactive(id, true);
        }
        Rc::new(Self {
            node,
            next_button,
            skip_button,
            space: host.root(),
            size: (width, height),
            actions: RefCell::new(None),
            anchor: RefCell::new(None),
            layouts: RefCell::new(Vec::new()),
            audio: RefCell::new(Vec::new()),
            revocations: Cell::new(0),
        })
    }

    /// Type-erased handle for steps.
    pub fn view(self: &Rc<Self>) -> Rc<dyn CompanionView> {
        Rc::clone(self) as Rc<dyn CompanionView>
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn next_button(&self) -> NodeId {
        self.next_button.id()
    }

    pub fn skip_button(&self) -> NodeId {
        self.skip_button.id()
    }

    pub fn is_attached(&self) -> bool {
        self.node.is_attached()
    }

    pub fn has_actions(&self) -> bool {
        self.actions.borrow().is_some()
    }

    /// Number of times the actions handle was revoked.
    pub fn revocations(&self) -> usize {
        self.revocations.get()
    }

    /// Press "next". `false` when no handle is installed.
    pub fn tap_next(&self) -> bool {
        self.actions
            .borrow()
            .as_ref()
            .map(CompanionActions::request_next)
            .is_some()
    }

    /// Press "skip". `false` when no handle is installed.
    pub fn tap_skip(&self) -> bool {
        self.actions
            .borrow()
            .as_ref()
            .map(CompanionActions::request_skip)
            .is_some()
    }

    /// Handle captured at the last `set_actions(Some(..))`, if still held.
    pub fn actions(&self) -> Option<CompanionActions> {
        self.actions.borrow().clone()
    }

    pub fn layouts(&self) -> Vec<LayoutRecord> {
        self.layouts.borrow().clone()
    }

    pub fn last_layout(&self) -> Option<LayoutRecord> {
        self.layouts.borrow().last().cloned()
    }

    /// Current frame of the anchor handed over in the last layout.
    pub fn anchor_frame(&self) -> Option<Rect> {
        self.anchor.borrow().as_ref().map(LayoutAnchor::frame)
    }

    /// Own frame in host coordinates.
    pub fn frame(&self) -> Option<Rect> {
        self.node.frame_in(self.space)
    }

    pub fn audio_notes(&self) -> Vec<AudioNote> {
        self.audio.borrow().clone()
    }
}

impl CompanionView for FakeCompanion {
    fn node_id(&self) -> NodeId {
        self.node.id()
    }

    fn set_actions(&self, actions: Option<CompanionActions>) {
        if actions.is_none() && self.actions.borrow().is_some() {
            self.revocations.set(self.revocations.get() + 1);
        }
        *self.actions.borrow_mut() = actions;
    }

    fn update_layout(&self, anchor: &LayoutAnchor, target: Option<&dyn Element>) {
        let frame = anchor.frame();
        let (width, height) = self.size;
        self.node.tree().set_frame(
            self.node.id(),
            Rect::new(frame.x, frame.bottom() + CALLOUT_GAP, width, height),
        );
        self.layouts.borrow_mut().push(LayoutRecord {
            anchor: frame,
            target: target.map(|t| t.node_id()),
        });
        *self.anchor.borrow_mut() = Some(anchor.clone());
    }

    fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.node.hit_test(point, self.space)
    }

    fn audio_receiver(&self) -> Option<&dyn AudioEventReceiver> {
        Some(self)
    }
}

impl AudioEventReceiver for FakeCompanion {
    fn audio_did_start(&self) {
        self.audio.borrow_mut().push(AudioNote::Started);
    }

    fn audio_did_stop(&self, played_to_end: bool) {
        self.audio
            .borrow_mut()
            .push(AudioNote::Stopped { played_to_end });
    }

    fn audio_did_fail(&self, error: &AudioError) {
        self.audio.borrow_mut().push(AudioNote::Failed(error.clone()));
    }
}
