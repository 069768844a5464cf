#![forbid(unsafe_code)]

//! Interaction event flags.
//!
//! Controls in the host tree report what happened to them as a set of
//! [`ControlEvents`]. Listeners subscribe with a mask and fire when any of
//! the masked events occurs.

use bitflags::bitflags;

bitflags! {
    /// Interaction events a control can emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ControlEvents: u16 {
        const TOUCH_DOWN = 1 << 0;
        const TOUCH_UP_INSIDE = 1 << 1;
        const TOUCH_UP_OUTSIDE = 1 << 2;
        const TOUCH_CANCEL = 1 << 3;
        const VALUE_CHANGED = 1 << 4;
        const PRIMARY_ACTION = 1 << 5;
        const EDITING_BEGAN = 1 << 6;
        const EDITING_CHANGED = 1 << 7;
        const EDITING_ENDED = 1 << 8;

        const ALL_TOUCH = Self::TOUCH_DOWN.bits()
            | Self::TOUCH_UP_INSIDE.bits()
            | Self::TOUCH_UP_OUTSIDE.bits()
            | Self::TOUCH_CANCEL.bits();
        const ALL_EDITING = Self::EDITING_BEGAN.bits()
            | Self::EDITING_CHANGED.bits()
            | Self::EDITING_ENDED.bits();
    }
}

impl ControlEvents {
    /// Check if an emitted set should wake a listener subscribed to `self`.
    #[inline]
    pub fn matches(self, emitted: ControlEvents) -> bool {
        self.intersects(emitted)
    }
}
