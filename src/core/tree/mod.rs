//! The math edit tree.
//!
//! Nodes live in an arena and reference each other through plain handles;
//! ownership is strictly parent-to-child, and the arena owns deletion.
//! Only mutating sibling structure via [`Tree::adopt`] and [`Tree::disown`]
//! guarantees well-formedness: both restore sibling symmetry, parent
//! consistency, and the container's end pointers before returning.
//!
//! Structural misuse (adopting an attached node, overfilling a command's
//! fixed block count, disowning a detached node) is a programming error and
//! fails fast.

pub mod fragment;
pub mod node;
pub mod serialize;

pub use fragment::Fragment;
pub use node::{NodeKind, SymbolData};

use crate::core::direction::Dir;

/// Handle to a node slot in the arena. Copyable, non-owning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }

    /// Raw slot index, for host-side bookkeeping (drawable maps etc.).
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// First/last child pointers of a container, indexed by [`Dir`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ends {
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Ends {
    pub fn get(&self, dir: Dir) -> Option<NodeId> {
        match dir {
            Dir::L => self.left,
            Dir::R => self.right,
        }
    }

    fn set(&mut self, dir: Dir, val: Option<NodeId>) {
        match dir {
            Dir::L => self.left = val,
            Dir::R => self.right = val,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none()
    }
}

/// A single tree node: kind tag plus structural links.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) ends: Ends,
    /// Presentation hint: render a digit-grouping gap to the left of this
    /// node. Maintained by the grouping pass, never by structure edits.
    pub(crate) group_gap: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            left: None,
            right: None,
            ends: Ends::default(),
            group_gap: false,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn sib(&self, dir: Dir) -> Option<NodeId> {
        match dir {
            Dir::L => self.left,
            Dir::R => self.right,
        }
    }

    pub fn ends(&self) -> Ends {
        self.ends
    }

    pub fn group_gap(&self) -> bool {
        self.group_gap
    }
}

/// Arena of math nodes.
pub struct Tree {
    slots: Vec<Option<Node>>,
    free: Vec<u32>,
    created: Vec<NodeId>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            slots: Vec::new(),
            free: Vec::new(),
            created: Vec::new(),
        }
    }

    /// Allocate a fresh, detached node of the given kind.
    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize] = Some(Node::new(kind));
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(Node::new(kind)));
                NodeId((self.slots.len() - 1) as u32)
            }
        };
        self.created.push(id);
        id
    }

    /// Allocate a command node together with its fixed complement of child
    /// blocks. The block count never changes afterwards.
    pub fn new_command(&mut self, kind: NodeKind) -> NodeId {
        let arity = kind.arity();
        let cmd = self.new_node(kind);
        let mut prev = None;
        for _ in 0..arity {
            let block = self.new_node(NodeKind::Block);
            self.adopt(block, cmd, prev, None);
            prev = Some(block);
        }
        cmd
    }

    /// Drain the ids of nodes allocated since the last call, skipping any
    /// that have already been freed again. The presentation layer uses this
    /// to materialize drawables for new nodes.
    pub fn take_created(&mut self) -> Vec<NodeId> {
        let created = std::mem::take(&mut self.created);
        created.into_iter().filter(|id| self.is_alive(*id)).collect()
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots.get(id.idx()).map_or(false, Option::is_some)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.slots[id.idx()]
            .as_ref()
            .expect("dangling node handle")
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.idx()]
            .as_mut()
            .expect("dangling node handle")
    }

    pub(crate) fn set_end(&mut self, parent: NodeId, dir: Dir, val: Option<NodeId>) {
        self.node_mut(parent).ends.set(dir, val);
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// Replace a leaf's kind in place. Used by the incremental patch engine
    /// to retext digit nodes without touching structure.
    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        debug_assert_eq!(self.node(id).kind.arity(), kind.arity());
        self.node_mut(id).kind = kind;
    }

    pub(crate) fn set_group_gap(&mut self, id: NodeId, gap: bool) {
        self.node_mut(id).group_gap = gap;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn sib(&self, id: NodeId, dir: Dir) -> Option<NodeId> {
        self.node(id).sib(dir)
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    /// First (`L`) or last (`R`) child of a container.
    pub fn end(&self, id: NodeId, dir: Dir) -> Option<NodeId> {
        self.node(id).ends.get(dir)
    }

    /// Insert `id` under `parent` between the given (possibly absent)
    /// neighbors, updating neighbor links and the parent's ends.
    pub fn adopt(
        &mut self,
        id: NodeId,
        parent: NodeId,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) {
        assert!(
            self.node(id).parent.is_none(),
            "adopt of an already-attached node"
        );
        match left {
            Some(l) => {
                assert_eq!(self.node(l).parent, Some(parent), "left neighbor not under parent");
                assert_eq!(self.node(l).right, right, "left neighbor inconsistent with right");
            }
            None => {
                assert_eq!(self.node(parent).ends.get(Dir::L), right, "insertion point not at left end");
            }
        }
        match right {
            Some(r) => {
                assert_eq!(self.node(r).parent, Some(parent), "right neighbor not under parent");
            }
            None => {
                assert_eq!(self.node(parent).ends.get(Dir::R), left, "insertion point not at right end");
            }
        }

        // Fixed-arity enforcement: a command accepts only its own blocks,
        // and only until the declared count is reached.
        let parent_kind = self.node(parent).kind.clone();
        if parent_kind.is_block() {
            assert!(
                !self.node(id).kind.is_block(),
                "a block cannot be a direct child of a block"
            );
        } else {
            let arity = parent_kind.arity();
            assert!(arity > 0, "adopt into a childless symbol");
            assert!(
                self.node(id).kind.is_block(),
                "a command's children must be blocks"
            );
            assert!(
                self.child_count(parent) < arity,
                "adopt would exceed the command's fixed block count"
            );
        }

        {
            let n = self.node_mut(id);
            n.parent = Some(parent);
            n.left = left;
            n.right = right;
        }
        match left {
            Some(l) => self.node_mut(l).right = Some(id),
            None => self.node_mut(parent).ends.set(Dir::L, Some(id)),
        }
        match right {
            Some(r) => self.node_mut(r).left = Some(id),
            None => self.node_mut(parent).ends.set(Dir::R, Some(id)),
        }
    }

    /// Remove `id` from its parent's sibling list, restoring the remaining
    /// siblings' links and the parent's ends. The node itself stays alive
    /// and detached.
    pub fn disown(&mut self, id: NodeId) {
        let (parent, left, right) = {
            let n = self.node(id);
            (
                n.parent.expect("disown of a detached node"),
                n.left,
                n.right,
            )
        };
        match left {
            Some(l) => self.node_mut(l).right = right,
            None => self.node_mut(parent).ends.set(Dir::L, right),
        }
        match right {
            Some(r) => self.node_mut(r).left = left,
            None => self.node_mut(parent).ends.set(Dir::R, left),
        }
        let n = self.node_mut(id);
        n.parent = None;
        n.left = None;
        n.right = None;
    }

    /// Disown `id` and free it together with its whole subtree. Returns the
    /// former neighbors so the caller can reseat a cursor.
    pub fn remove(&mut self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        let left = self.left(id);
        let right = self.right(id);
        if self.parent(id).is_some() {
            self.disown(id);
        }
        self.free_subtree(id);
        (left, right)
    }

    /// Free a detached node and every descendant.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let mut child = self.end(cur, Dir::L);
            while let Some(c) = child {
                child = self.right(c);
                stack.push(c);
            }
            self.slots[cur.idx()] = None;
            self.free.push(cur.0);
        }
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).count()
    }

    /// Lazy, restartable left-to-right traversal of immediate children.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.end(parent, Dir::L),
        }
    }

    /// Left-to-right traversal with early termination: `visit` returns
    /// `false` to stop.
    pub fn each_child(&self, parent: NodeId, mut visit: impl FnMut(NodeId) -> bool) {
        let mut cur = self.end(parent, Dir::L);
        while let Some(id) = cur {
            cur = self.right(id);
            if !visit(id) {
                break;
            }
        }
    }

    /// Post-order traversal of the subtree rooted at `id` (children before
    /// their parent).
    pub fn post_order(&self, id: NodeId, visit: &mut impl FnMut(NodeId)) {
        let mut child = self.end(id, Dir::L);
        while let Some(c) = child {
            child = self.right(c);
            self.post_order(c, visit);
        }
        visit(id);
    }

    /// Whether a node renders as empty: a block with no children, a command
    /// whose blocks are all empty, or any childless symbol.
    pub fn is_empty(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::Block => self.node(id).ends.is_empty(),
            kind if kind.arity() > 0 => self.children(id).all(|b| self.is_empty(b)),
            _ => true,
        }
    }

    /// Walk invariants 1-2 over the subtree rooted at `root` and panic on
    /// the first violation. Debug/test aid.
    pub fn assert_valid(&self, root: NodeId) {
        let mut prev: Option<NodeId> = None;
        let mut cur = self.end(root, Dir::L);
        let mut count = 0usize;
        while let Some(id) = cur {
            assert_eq!(self.parent(id), Some(root), "parent consistency violated");
            assert_eq!(self.left(id), prev, "sibling symmetry violated");
            if let Some(p) = prev {
                assert_eq!(self.right(p), Some(id), "sibling symmetry violated");
            }
            count += 1;
            prev = Some(id);
            cur = self.right(id);
        }
        assert_eq!(self.end(root, Dir::R), prev, "right end pointer stale");
        let kind = self.kind(root);
        if !kind.is_block() && kind.arity() > 0 {
            assert_eq!(count, kind.arity(), "command block count drifted from arity");
        }
        let mut child = self.end(root, Dir::L);
        while let Some(c) = child {
            child = self.right(c);
            self.assert_valid(c);
        }
    }
}

/// Iterator over a container's immediate children, left to right.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.next?;
        self.next = self.tree.right(cur);
        Some(cur)
    }
}
