#![forbid(unsafe_code)]

//! Fake host surface backed by a [`FakeTree`].

use std::cell::RefCell;
use std::rc::Rc;

use coachmark::shield::ShieldId;
use coachmark::{ElementRef, GestureClaim, GestureShield, NodeId, OverlayHost};
use coachmark_core::geometry::Rect;

use crate::tree::{FakeNode, FakeTree};

/// Structural change the guide made to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Mount(NodeId),
    Unmount(NodeId),
    AttachCompanion { container: NodeId, companion: NodeId },
    DetachCompanion(NodeId),
    InstallShield,
    RemoveShield,
}

/// A window-like surface in a fake tree.
pub struct FakeHost {
    tree: FakeTree,
    root: Rc<FakeNode>,
    shields: RefCell<Vec<GestureShield>>,
    ops: RefCell<Vec<HostOp>>,
}

impl FakeHost {
    /// New window of `width * height` in a fresh tree.
    pub fn window(width: f64, height: f64) -> Rc<Self> {
        let tree = FakeTree::new();
        let root = tree.node("window", Rect::from_size(width, height));
        Self::on(&tree, root)
    }

    /// Host surface for an existing node.
    pub fn on(tree: &FakeTree, root: Rc<FakeNode>) -> Rc<Self> {
        Rc::new(Self {
            tree: tree.clone(),
            root,
            shields: RefCell::new(Vec::new()),
            ops: RefCell::new(Vec::new()),
        })
    }

    /// Type-erased handle for the controller.
    pub fn handle(self: &Rc<Self>) -> Rc<dyn OverlayHost> {
        Rc::clone(self) as Rc<dyn OverlayHost>
    }

    pub fn tree(&self) -> &FakeTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root.id()
    }

    /// The window itself as an element.
    pub fn root_element(&self) -> ElementRef {
        self.root.element()
    }

    /// Add an interactive element directly under the window.
    pub fn add_element(&self, label: &str, frame: Rect) -> Rc<FakeNode> {
        let node = self.tree.child(self.root.id(), label, frame);
        self.tree.set_interactive(node.id(), true);
        node
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.tree
            .set_frame(self.root.id(), Rect::from_size(width, height));
    }

    pub fn ops(&self) -> Vec<HostOp> {
        self.ops.borrow().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    pub fn shield_count(&self) -> usize {
        self.shields.borrow().len()
    }

    /// Overlay containers currently mounted under the window.
    pub fn overlay_count(&self) -> usize {
        self.tree
            .children(self.root.id())
            .into_iter()
            .filter(|c| self.tree.label(*c).as_deref() == Some("overlay"))
            .count()
    }

    /// Ask every installed shield about a gesture owned by `owner`.
    pub fn recognize_gesture(&self, owner: NodeId) -> GestureClaim {
        let blocked = self
            .shields
            .borrow()
            .iter()
            .any(|s| s.claim(owner, self) == GestureClaim::Blocked);
        if blocked {
            GestureClaim::Blocked
        } else {
            GestureClaim::Proceed
        }
    }
}

impl OverlayHost for FakeHost {
    fn node_id(&self) -> NodeId {
        self.root.id()
    }

    fn bounds(&self) -> Rect {
        self.tree
            .local_frame(self.root.id())
            .map(|f| Rect::from_size(f.width, f.height))
            .unwrap_or_default()
    }

    fn contains_node(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    fn mount_overlay(&self) -> NodeId {
        let id = self.tree.raw_child(self.root.id(), "overlay", self.bounds());
        tracing::trace!(target: "coachmark.harness", container = %id, "overlay mounted");
        self.ops.borrow_mut().push(HostOp::Mount(id));
        id
    }

    fn unmount_overlay(&self, container: NodeId) {
        self.tree.remove(container);
        tracing::trace!(target: "coachmark.harness", container = %container, "overlay unmounted");
        self.ops.borrow_mut().push(HostOp::Unmount(container));
    }

    fn attach_companion(&self, container: NodeId, companion: NodeId) {
        self.tree.attach(companion, container);
        self.ops.borrow_mut().push(HostOp::AttachCompanion {
            container,
            companion,
        });
    }

    fn detach_companion(&self, companion: NodeId) {
        self.tree.detach(companion);
        self.ops.borrow_mut().push(HostOp::DetachCompanion(companion));
    }

    fn install_shield(&self, shield: GestureShield) {
        self.shields.borrow_mut().push(shield);
        self.ops.borrow_mut().push(HostOp::InstallShield);
    }

    fn remove_shield(&self, shield: ShieldId) {
        self.shields.borrow_mut().retain(|s| s.id() != shield);
        self.ops.borrow_mut().push(HostOp::RemoveShield);
    }
}
