#![forbid(unsafe_code)]

//! Contracts between the guide engine and the host UI toolkit.
//!
//! The engine never owns the view tree. It observes target elements through
//! [`Element`], mounts its overlay through [`OverlayHost`], and finds the
//! surface to mount on through [`HostResolver`].
//!
//! # Ownership
//!
//! Targets are shared as [`ElementRef`] (`Rc<dyn Element>`). Anything that
//! outlives a single layout pass keeps a [`WeakElement`] instead, so a guide
//! never keeps a recycled or removed element alive.

use std::fmt;
use std::rc::{Rc, Weak};

use coachmark_core::geometry::{Point, Rect};

use crate::shield::{GestureShield, ShieldId};

/// Identity of a node in the host's view tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Strong handle to a target element.
pub type ElementRef = Rc<dyn Element>;

/// Weak handle to a target element.
pub type WeakElement = Weak<dyn Element>;

/// A node in the host tree that a step can spotlight.
pub trait Element {
    fn node_id(&self) -> NodeId;

    /// Whether the element currently has a parent.
    fn is_attached(&self) -> bool;

    /// Whether `ancestor` is a strict ancestor of this element.
    fn is_descendant_of(&self, ancestor: NodeId) -> bool;

    /// Frame converted into `space`'s coordinates, or `None` when the
    /// element is not under `space`.
    fn frame_in(&self, space: NodeId) -> Option<Rect>;

    /// Corner radius the element draws with.
    fn corner_radius(&self) -> f64 {
        0.0
    }

    /// Deepest interactive node under `point`, which is expressed in
    /// `space` coordinates. `None` when the point misses the element.
    fn hit_test(&self, point: Point, space: NodeId) -> Option<NodeId>;
}

/// The surface a guide mounts its overlay on.
pub trait OverlayHost {
    fn node_id(&self) -> NodeId;

    /// Bounds of the surface in its own coordinates.
    fn bounds(&self) -> Rect;

    /// Whether `node` is `ancestor` or lies below it.
    fn contains_node(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Add a full-bounds overlay container on top of existing content.
    fn mount_overlay(&self) -> NodeId;

    fn unmount_overlay(&self, container: NodeId);

    /// Parent a companion view under the overlay container.
    fn attach_companion(&self, container: NodeId, companion: NodeId);

    fn detach_companion(&self, companion: NodeId);

    /// Consult `shield` before recognizing any gesture until removed.
    fn install_shield(&self, shield: GestureShield);

    fn remove_shield(&self, shield: ShieldId);
}

/// Finds the surface to mount on when no explicit host was given.
pub trait HostResolver {
    fn resolve_host(&self) -> Option<Rc<dyn OverlayHost>>;
}

impl<F> HostResolver for F
where
    F: Fn() -> Option<Rc<dyn OverlayHost>>,
{
    fn resolve_host(&self) -> Option<Rc<dyn OverlayHost>> {
        self()
    }
}

/// Where a controller finds its host.
///
/// The explicit host is held weakly; once it is gone the resolver takes
/// over.
#[derive(Clone, Default)]
pub(crate) struct HostBinding {
    explicit: Option<Weak<dyn OverlayHost>>,
    resolver: Option<Rc<dyn HostResolver>>,
}

impl HostBinding {
    pub(crate) fn new(
        explicit: Option<&Rc<dyn OverlayHost>>,
        resolver: Option<Rc<dyn HostResolver>>,
    ) -> Self {
        Self {
            explicit: explicit.map(Rc::downgrade),
            resolver,
        }
    }

    pub(crate) fn resolve(&self) -> Option<Rc<dyn OverlayHost>> {
        self.explicit
            .as_ref()
            .and_then(Weak::upgrade)
            .or_else(|| self.resolver.as_ref().and_then(|r| r.resolve_host()))
    }
}

impl fmt::Debug for HostBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBinding")
            .field("explicit", &self.explicit.is_some())
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Why a target cannot be used on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetLegality {
    Legal,
    IsHost,
    OutsideHost,
}

pub(crate) fn check_target(target: &dyn Element, host: &dyn OverlayHost) -> TargetLegality {
    let host_id = host.node_id();
    if target.node_id() == host_id {
        TargetLegality::IsHost
    } else if !target.is_descendant_of(host_id) {
        TargetLegality::OutsideHost
    } else {
        TargetLegality::Legal
    }
}
