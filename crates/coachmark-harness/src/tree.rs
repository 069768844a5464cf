#![forbid(unsafe_code)]

//! In-memory view tree.
//!
//! Nodes live in a shared table keyed by [`NodeId`]; frames are relative to
//! the parent, as in most retained UI toolkits. Element handles
//! ([`FakeNode`]) are separate reference-counted objects, so a test can drop
//! the handle to simulate an element being deallocated while its slot in
//! the tree stays put, or detach the node while the handle lives on.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use coachmark::{Element, ElementRef, NodeId};
use coachmark_core::geometry::{Point, Rect};

// Ids are unique across trees, so nodes of different windows never alias.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct NodeData {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    frame: Rect,
    corner_radius: f64,
    interactive: bool,
}

#[derive(Debug, Default)]
struct TreeInner {
    nodes: AHashMap<NodeId, NodeData>,
}

impl TreeInner {
    fn alloc(&mut self, label: &str, frame: Rect) -> NodeId {
        let id = NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed));
        self.nodes.insert(
            id,
            NodeData {
                label: label.to_string(),
                parent: None,
                children: Vec::new(),
                frame,
                corner_radius: 0.0,
                interactive: false,
            },
        );
        id
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        self.unlink(child);
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(&child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != child);
        }
    }

    /// Whether `ancestor` is `node` or above it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Frame of `node` in `space` coordinates, if `space` contains it.
    fn frame_in(&self, node: NodeId, space: NodeId) -> Option<Rect> {
        let mut frame = self.nodes.get(&node)?.frame;
        let mut cursor = node;
        while cursor != space {
            let parent = self.nodes.get(&cursor)?.parent?;
            if parent == space {
                return Some(frame);
            }
            let pf = self.nodes.get(&parent)?.frame;
            frame = frame.offset(pf.x, pf.y);
            cursor = parent;
        }
        // node == space: its own bounds at the origin.
        Some(Rect::from_size(frame.width, frame.height))
    }

    /// Deepest interactive node under `point` (in `space` coordinates),
    /// searching from `node` down. Later siblings sit on top.
    fn hit(&self, node: NodeId, point: Point, space: NodeId) -> Option<NodeId> {
        let frame = self.frame_in(node, space)?;
        if !frame.contains(point) {
            return None;
        }
        let data = self.nodes.get(&node)?;
        for child in data.children.iter().rev() {
            if let Some(hit) = self.hit(*child, point, space) {
                return Some(hit);
            }
        }
        data.interactive.then_some(node)
    }
}

/// Shared handle to the tree.
#[derive(Debug, Clone, Default)]
pub struct FakeTree {
    inner: Rc<RefCell<TreeInner>>,
}

impl FakeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parentless node (a window or a detached view).
    pub fn node(&self, label: &str, frame: Rect) -> Rc<FakeNode> {
        let id = self.inner.borrow_mut().alloc(label, frame);
        Rc::new(FakeNode {
            id,
            tree: self.clone(),
        })
    }

    /// Create a node under `parent`.
    pub fn child(&self, parent: NodeId, label: &str, frame: Rect) -> Rc<FakeNode> {
        let node = self.node(label, frame);
        self.attach(node.id, parent);
        node
    }

    /// Create a node under `parent` without an element handle.
    pub fn raw_child(&self, parent: NodeId, label: &str, frame: Rect) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.alloc(label, frame);
        inner.link(id, parent);
        id
    }

    pub fn attach(&self, node: NodeId, parent: NodeId) {
        self.inner.borrow_mut().link(node, parent);
    }

    pub fn detach(&self, node: NodeId) {
        self.inner.borrow_mut().unlink(node);
    }

    /// Detach and forget `node` and its subtree.
    pub fn remove(&self, node: NodeId) {
        let mut inner = self.inner.borrow_mut();
        inner.unlink(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = inner.nodes.remove(&id) {
                stack.extend(data.children);
            }
        }
    }

    pub fn set_frame(&self, node: NodeId, frame: Rect) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.frame = frame;
        }
    }

    pub fn set_corner_radius(&self, node: NodeId, radius: f64) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.corner_radius = radius;
        }
    }

    pub fn set_interactive(&self, node: NodeId, interactive: bool) {
        if let Some(n) = self.inner.borrow_mut().nodes.get_mut(&node) {
            n.interactive = interactive;
        }
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(&node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn label(&self, node: NodeId) -> Option<String> {
        self.inner.borrow().nodes.get(&node).map(|n| n.label.clone())
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inner.borrow().contains(ancestor, node)
    }

    pub fn frame_in(&self, node: NodeId, space: NodeId) -> Option<Rect> {
        self.inner.borrow().frame_in(node, space)
    }

    pub fn local_frame(&self, node: NodeId) -> Option<Rect> {
        self.inner.borrow().nodes.get(&node).map(|n| n.frame)
    }

    pub fn hit_test(&self, root: NodeId, point: Point, space: NodeId) -> Option<NodeId> {
        self.inner.borrow().hit(root, point, space)
    }
}

/// Element handle for one tree node.
#[derive(Debug)]
pub struct FakeNode {
    id: NodeId,
    tree: FakeTree,
}

impl FakeNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &FakeTree {
        &self.tree
    }

    /// Type-erased handle for steps and trackers.
    pub fn element(self: &Rc<Self>) -> ElementRef {
        Rc::clone(self) as ElementRef
    }
}

impl Element for FakeNode {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn is_attached(&self) -> bool {
        self.tree.parent(self.id).is_some()
    }

    fn is_descendant_of(&self, ancestor: NodeId) -> bool {
        ancestor != self.id && self.tree.contains(ancestor, self.id)
    }

    fn frame_in(&self, space: NodeId) -> Option<Rect> {
        self.tree.frame_in(self.id, space)
    }

    fn corner_radius(&self) -> f64 {
        self.tree
            .inner
            .borrow()
            .nodes
            .get(&self.id)
            .map_or(0.0, |n| n.corner_radius)
    }

    fn hit_test(&self, point: Point, space: NodeId) -> Option<NodeId> {
        self.tree.hit_test(self.id, point, space)
    }
}
