#![forbid(unsafe_code)]

//! Element tracker: follows a target's frame without owning it.
//!
//! The tracker holds a weak reference to the target and republishes its
//! frame, converted into the overlay's coordinate space, on every host
//! layout pass through a shared [`LayoutAnchor`]. Companion views position
//! themselves against that anchor, so they follow the target for free.
//!
//! # Failure Modes
//!
//! - The target is dropped: the next layout pass fires the lost callback
//!   with `None`.
//! - The target is detached from the tree: the callback fires with the
//!   still-live element.
//!
//! Either way the tracker invalidates itself, stops updating the anchor
//! (which keeps the last known frame), and never fires again.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use coachmark_core::geometry::Rect;

use crate::host::{Element, ElementRef, NodeId, WeakElement};

/// Shared, live frame that companion content lays out against.
#[derive(Clone)]
pub struct LayoutAnchor {
    frame: Rc<Cell<Rect>>,
}

impl LayoutAnchor {
    /// An anchor pinned to `frame`.
    pub fn fixed(frame: Rect) -> Self {
        Self {
            frame: Rc::new(Cell::new(frame)),
        }
    }

    /// Current frame in overlay coordinates.
    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    pub(crate) fn set(&self, frame: Rect) {
        self.frame.set(frame);
    }

    /// Whether two handles observe the same frame.
    pub fn same_anchor(&self, other: &LayoutAnchor) -> bool {
        Rc::ptr_eq(&self.frame, &other.frame)
    }
}

impl fmt::Debug for LayoutAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayoutAnchor").field(&self.frame()).finish()
    }
}

/// Outcome of a tracker layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Tracking,
    /// Target gone or detached; the tracker is inert.
    Lost,
}

type LostCallback = Box<dyn FnOnce(Option<ElementRef>)>;

/// Mirrors a target element's frame into an overlay coordinate space.
pub struct ElementTracker {
    master: WeakElement,
    master_id: NodeId,
    space: NodeId,
    anchor: LayoutAnchor,
    on_lost: Option<LostCallback>,
    invalidated: bool,
}

impl ElementTracker {
    /// Start tracking `master`, with frames expressed in `space`.
    pub fn new(master: &ElementRef, space: NodeId) -> Self {
        let initial = master.frame_in(space).unwrap_or_default();
        Self {
            master: Rc::downgrade(master),
            master_id: master.node_id(),
            space,
            anchor: LayoutAnchor::fixed(initial),
            on_lost: None,
            invalidated: false,
        }
    }

    /// Register the one-shot callback fired when the target is lost.
    #[must_use]
    pub fn on_master_lost(mut self, f: impl FnOnce(Option<ElementRef>) + 'static) -> Self {
        self.on_lost = Some(Box::new(f));
        self
    }

    pub fn master(&self) -> Option<ElementRef> {
        self.master.upgrade()
    }

    pub fn master_id(&self) -> NodeId {
        self.master_id
    }

    /// Whether this tracker follows exactly `element`.
    pub fn tracks(&self, element: &ElementRef) -> bool {
        Weak::ptr_eq(&self.master, &Rc::downgrade(element))
    }

    pub fn anchor(&self) -> LayoutAnchor {
        self.anchor.clone()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Re-read the target's frame, or report its loss.
    pub fn layout_pass(&mut self) -> TrackerState {
        if self.invalidated {
            return TrackerState::Lost;
        }
        let Some(master) = self.master.upgrade() else {
            self.fire_lost(None);
            return TrackerState::Lost;
        };
        if !master.is_attached() {
            self.fire_lost(Some(master));
            return TrackerState::Lost;
        }
        if let Some(frame) = master.frame_in(self.space) {
            self.anchor.set(frame);
        }
        TrackerState::Tracking
    }

    fn fire_lost(&mut self, master: Option<ElementRef>) {
        self.invalidated = true;
        tracing::debug!(
            target: "coachmark.tracker",
            master = %self.master_id,
            dropped = master.is_none(),
            "tracked element lost"
        );
        if let Some(cb) = self.on_lost.take() {
            cb(master);
        }
    }
}

impl fmt::Debug for ElementTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementTracker")
            .field("master_id", &self.master_id)
            .field("space", &self.space)
            .field("anchor", &self.anchor)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}

/// Resolve the element's current frame, ignoring detached elements.
pub(crate) fn attached_frame(element: &dyn Element, space: NodeId) -> Option<Rect> {
    if element.is_attached() {
        element.frame_in(space)
    } else {
        None
    }
}
