#![forbid(unsafe_code)]

//! Gesture shield: keeps host gestures from firing under an active guide.
//!
//! While a guide is showing, the host asks the shield before recognizing any
//! gesture. Gestures owned by the overlay (its container and everything
//! below it) or by the current target (and everything below it) proceed;
//! every other gesture is blocked. The shield is a shared handle, so the
//! controller can retarget or deactivate it without reinstalling.
//!
//! # Invariants
//!
//! 1. An inactive shield never blocks.
//! 2. Retargeting takes effect on the next claim.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::{NodeId, OverlayHost};

static NEXT_SHIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an installed shield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShieldId(u64);

/// Shield verdict for one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureClaim {
    /// Let the gesture recognize normally.
    Proceed,
    /// The guide claims the gesture; the host must not recognize it.
    Blocked,
}

#[derive(Debug, Default)]
struct ShieldState {
    container: Option<NodeId>,
    target: Option<NodeId>,
}

/// Shared claim arbiter installed on the host while a guide shows.
#[derive(Debug, Clone)]
pub struct GestureShield {
    id: ShieldId,
    state: Rc<RefCell<ShieldState>>,
}

impl Default for GestureShield {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureShield {
    pub fn new() -> Self {
        Self {
            id: ShieldId(NEXT_SHIELD_ID.fetch_add(1, Ordering::Relaxed)),
            state: Rc::new(RefCell::new(ShieldState::default())),
        }
    }

    pub fn id(&self) -> ShieldId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().container.is_some()
    }

    /// Decide whether a gesture owned by `owner` may recognize.
    pub fn claim(&self, owner: NodeId, host: &dyn OverlayHost) -> GestureClaim {
        let state = self.state.borrow();
        let Some(container) = state.container else {
            return GestureClaim::Proceed;
        };
        let internal = host.contains_node(container, owner)
            || state
                .target
                .is_some_and(|target| host.contains_node(target, owner));
        if internal {
            GestureClaim::Proceed
        } else {
            GestureClaim::Blocked
        }
    }

    pub(crate) fn activate(&self, container: NodeId) {
        self.state.borrow_mut().container = Some(container);
    }

    pub(crate) fn set_target(&self, target: Option<NodeId>) {
        self.state.borrow_mut().target = target;
    }

    pub(crate) fn deactivate(&self) {
        let mut state = self.state.borrow_mut();
        state.container = None;
        state.target = None;
    }
}
