#![forbid(unsafe_code)]

//! Companion views: caller-supplied content shown next to the highlight.
//!
//! A companion is typically a callout with text and "Next"/"Skip" buttons.
//! The controller hands it a [`CompanionActions`] handle while its step is
//! on screen; the companion calls [`CompanionActions::request_next`] or
//! [`CompanionActions::request_skip`] and the controller picks the request
//! up on its next pump.

use std::sync::mpsc::Sender;

use coachmark_core::geometry::Point;

use crate::audio::AudioEventReceiver;
use crate::controller::GuideMsg;
use crate::host::{Element, NodeId};
use crate::tracker::LayoutAnchor;

/// What a companion asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionAction {
    Next,
    Skip,
}

/// Request handle given to a companion while its step is shown.
///
/// Requests made after the step was torn down are ignored.
#[derive(Debug, Clone)]
pub struct CompanionActions {
    tx: Sender<GuideMsg>,
    epoch: u64,
}

impl CompanionActions {
    pub(crate) fn new(tx: Sender<GuideMsg>, epoch: u64) -> Self {
        Self { tx, epoch }
    }

    pub fn request_next(&self) {
        self.send(CompanionAction::Next);
    }

    pub fn request_skip(&self) {
        self.send(CompanionAction::Skip);
    }

    fn send(&self, action: CompanionAction) {
        // The controller may already be gone; nothing to deliver to then.
        let _ = self.tx.send(GuideMsg::Companion {
            epoch: self.epoch,
            action,
        });
    }
}

/// Caller-supplied view attached under the overlay for one step.
pub trait CompanionView {
    fn node_id(&self) -> NodeId;

    /// Install (`Some`) or revoke (`None`) the request handle.
    fn set_actions(&self, actions: Option<CompanionActions>);

    /// Position against `anchor`. `target` is `None` when the step has no
    /// live target, in which case `anchor` covers the whole overlay.
    fn update_layout(&self, anchor: &LayoutAnchor, target: Option<&dyn Element>);

    /// Node hit at `point` (overlay coordinates). Transparent regions return
    /// `None` so touches fall through to the mask.
    fn hit_test(&self, point: Point) -> Option<NodeId>;

    /// Audio notifications, for companions that show playback state.
    fn audio_receiver(&self) -> Option<&dyn AudioEventReceiver> {
        None
    }
}
