//! Bounded runs of contiguous siblings.
//!
//! A fragment is a transient, non-owning view of `[leftmost..rightmost]`
//! within one parent. Selections, clipboard payloads, and multi-node parser
//! results are all fragments; they own nothing until explicitly adopted
//! into a real parent.
//!
//! Unlike single-node [`Tree::adopt`]/[`Tree::disown`], fragment splicing
//! moves the run as a unit: the run's internal sibling links survive a
//! `disown` so the same fragment can be re-adopted elsewhere.

use crate::core::direction::Dir;
use crate::core::tree::{NodeId, Tree};

/// A possibly-empty run of contiguous siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    leftmost: Option<NodeId>,
    rightmost: Option<NodeId>,
}

impl Fragment {
    /// The empty fragment.
    pub fn empty() -> Self {
        Fragment {
            leftmost: None,
            rightmost: None,
        }
    }

    /// A fragment spanning `leftmost..=rightmost`. Both must be siblings
    /// under the same parent, with `rightmost` reachable from `leftmost`.
    pub fn new(leftmost: NodeId, rightmost: NodeId) -> Self {
        Fragment {
            leftmost: Some(leftmost),
            rightmost: Some(rightmost),
        }
    }

    /// A fragment covering exactly one node.
    pub fn single(node: NodeId) -> Self {
        Fragment::new(node, node)
    }

    pub fn is_empty(&self) -> bool {
        self.leftmost.is_none()
    }

    pub fn end(&self, dir: Dir) -> Option<NodeId> {
        match dir {
            Dir::L => self.leftmost,
            Dir::R => self.rightmost,
        }
    }

    pub fn leftmost(&self) -> Option<NodeId> {
        self.leftmost
    }

    pub fn rightmost(&self) -> Option<NodeId> {
        self.rightmost
    }

    /// Left-to-right traversal of the run with early termination. Works on
    /// attached and detached fragments alike (internal links are kept).
    pub fn each(&self, tree: &Tree, mut visit: impl FnMut(NodeId) -> bool) {
        let (Some(leftmost), Some(rightmost)) = (self.leftmost, self.rightmost) else {
            return;
        };
        let mut cur = Some(leftmost);
        while let Some(id) = cur {
            let next = if id == rightmost { None } else { tree.right(id) };
            if !visit(id) {
                break;
            }
            cur = next;
        }
    }

    /// Fold over the run, left to right.
    pub fn fold<A>(&self, tree: &Tree, init: A, mut f: impl FnMut(A, NodeId) -> A) -> A {
        let mut acc = Some(init);
        self.each(tree, |id| {
            acc = Some(f(acc.take().expect("fold accumulator"), id));
            true
        });
        acc.expect("fold accumulator")
    }

    /// Collect the run's node ids.
    pub fn nodes(&self, tree: &Tree) -> Vec<NodeId> {
        self.fold(tree, Vec::new(), |mut v, id| {
            v.push(id);
            v
        })
    }

    /// Splice the detached run under `parent` between the given neighbors.
    pub fn adopt(
        &self,
        tree: &mut Tree,
        parent: NodeId,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) {
        let (Some(leftmost), Some(rightmost)) = (self.leftmost, self.rightmost) else {
            return;
        };
        match left {
            Some(l) => {
                assert_eq!(tree.parent(l), Some(parent), "left neighbor not under parent");
                assert_eq!(tree.right(l), right, "left neighbor inconsistent with right");
            }
            None => {
                assert_eq!(tree.end(parent, Dir::L), right, "insertion point not at left end");
            }
        }
        match right {
            Some(r) => {
                assert_eq!(tree.parent(r), Some(parent), "right neighbor not under parent");
            }
            None => {
                assert_eq!(tree.end(parent, Dir::R), left, "insertion point not at right end");
            }
        }

        let ids = self.nodes(tree);
        for id in &ids {
            assert!(tree.parent(*id).is_none(), "adopt of an attached fragment");
        }
        if tree.kind(parent).is_block() {
            for id in &ids {
                assert!(
                    !tree.kind(*id).is_block(),
                    "a block cannot be a direct child of a block"
                );
            }
        } else {
            let arity = tree.kind(parent).arity();
            assert!(
                tree.child_count(parent) + ids.len() <= arity,
                "adopt would exceed the command's fixed block count"
            );
        }

        for id in &ids {
            tree.node_mut(*id).parent = Some(parent);
        }
        tree.node_mut(leftmost).left = left;
        tree.node_mut(rightmost).right = right;
        match left {
            Some(l) => tree.node_mut(l).right = Some(leftmost),
            None => tree.set_end(parent, Dir::L, Some(leftmost)),
        }
        match right {
            Some(r) => tree.node_mut(r).left = Some(rightmost),
            None => tree.set_end(parent, Dir::R, Some(rightmost)),
        }
    }

    /// Detach the whole run from its parent as one unit, restoring the
    /// remaining siblings' links and the parent's ends. The run's internal
    /// links stay intact.
    pub fn disown(&self, tree: &mut Tree) {
        let (Some(leftmost), Some(rightmost)) = (self.leftmost, self.rightmost) else {
            return;
        };
        let parent = tree
            .parent(leftmost)
            .expect("disown of a detached fragment");
        let outer_left = tree.left(leftmost);
        let outer_right = tree.right(rightmost);

        match outer_left {
            Some(l) => tree.node_mut(l).right = outer_right,
            None => tree.set_end(parent, Dir::L, outer_right),
        }
        match outer_right {
            Some(r) => tree.node_mut(r).left = outer_left,
            None => tree.set_end(parent, Dir::R, outer_left),
        }

        let ids = self.nodes(tree);
        for id in ids {
            tree.node_mut(id).parent = None;
        }
        tree.node_mut(leftmost).left = None;
        tree.node_mut(rightmost).right = None;
    }

    /// Detach and free every node in the run.
    pub fn remove(&self, tree: &mut Tree) {
        if self.is_empty() {
            return;
        }
        if self
            .leftmost
            .map_or(false, |lm| tree.parent(lm).is_some())
        {
            self.disown(tree);
        }
        let ids = self.nodes(tree);
        for id in ids {
            tree.free_subtree(id);
        }
    }

    /// Serialized LaTeX of the run.
    pub fn latex(&self, tree: &Tree) -> String {
        self.fold(tree, String::new(), |mut s, id| {
            s.push_str(&tree.latex(id));
            s
        })
    }

    /// Plain-text rendition of the run.
    pub fn text(&self, tree: &Tree) -> String {
        self.fold(tree, String::new(), |mut s, id| {
            s.push_str(&tree.text(id));
            s
        })
    }
}
