//! Selection state and the anticursor.
//!
//! Starting a selection pins an anticursor at the cursor's position and
//! records, for every ancestor, which child lies on the path down to it.
//! Each extension gesture moves the cursor boundary one unit and then
//! recomputes the selection as the sibling run between the cursor and the
//! anticursor under their lowest common ancestor; the ancestor map is what
//! lets that recomputation (and the shrink-into-a-command case) survive
//! structural mutation in between.

use fxhash::FxHashMap;

use crate::core::cursor::{Cursor, Point};
use crate::core::direction::Dir;
use crate::core::tree::{Fragment, NodeId, Tree};

/// A child-on-path entry of the anticursor's ancestor map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathStep {
    /// The anticursor point itself (entry for its immediate parent).
    Point,
    /// The child node leading towards the anticursor.
    Node(NodeId),
}

/// A shadow point pinned where a selection started.
#[derive(Debug)]
pub struct Anticursor {
    pub(crate) point: Point,
    pub(crate) ancestors: FxHashMap<NodeId, PathStep>,
}

impl Anticursor {
    pub(crate) fn from_point(tree: &Tree, point: Point) -> Self {
        let mut ancestors = FxHashMap::default();
        ancestors.insert(point.parent, PathStep::Point);
        let mut cur = point.parent;
        while let Some(parent) = tree.parent(cur) {
            ancestors.insert(parent, PathStep::Node(cur));
            cur = parent;
        }
        Anticursor { point, ancestors }
    }

    pub fn point(&self) -> Point {
        self.point
    }
}

/// Position of a selection boundary among one parent's children, on a
/// doubled scale so points (even values) interleave with nodes (odd).
fn boundary_pos(tree: &Tree, parent: NodeId, step: &BoundarySide) -> usize {
    let mut index_of = FxHashMap::default();
    for (i, child) in tree.children(parent).enumerate() {
        index_of.insert(child, i);
    }
    let child_count = index_of.len();
    match step {
        BoundarySide::Node(n) => 2 * index_of[n] + 1,
        BoundarySide::Point(point) => match point.right {
            Some(r) => 2 * index_of[&r],
            None => 2 * child_count,
        },
    }
}

enum BoundarySide {
    Node(NodeId),
    Point(Point),
}

impl Cursor {
    /// Pin the anticursor at the current position, beginning a selection
    /// gesture.
    pub fn start_selection(&mut self, tree: &Tree) {
        self.selection = None;
        self.anticursor = Some(Anticursor::from_point(tree, self.point()));
    }

    /// Finish the gesture, keeping any selection but dropping the
    /// anticursor.
    pub fn end_selection(&mut self) {
        self.anticursor = None;
    }

    /// Drop both selection and anticursor.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.anticursor = None;
    }

    /// Extend (or shrink) the selection one unit in `dir`, creating it if
    /// none exists.
    pub fn select_towards(&mut self, tree: &mut Tree, dir: Dir) {
        if self.anticursor.is_none() {
            self.start_selection(tree);
        }
        match self.get(dir) {
            Some(node) => {
                let unselecting = self
                    .selection
                    .map_or(false, |sel| sel.end(dir) == Some(node))
                    && self
                        .anticursor
                        .as_ref()
                        .map_or(false, |anti| anti.point.neighbor(!dir) != Some(node));
                if unselecting && tree.kind(node).has_blocks() {
                    self.unselect_into(tree, dir, node);
                } else {
                    // hop the node, leaving it on the selection side
                    self.set(!dir, Some(node));
                    self.set(dir, tree.sib(node, dir));
                }
            }
            None => {
                // block boundary: the whole owning command joins the
                // selection
                let block = self.parent;
                if let Some(cmd) = tree.parent(block) {
                    self.ins_dir_of(tree, dir, cmd);
                }
            }
        }
        self.selection = None;
        self.select(tree);
    }

    /// Re-seat the cursor just inside `node`, at the `!dir` end of the
    /// block leading down to the anticursor. Used when the selection
    /// shrinks back across a command the anticursor lives inside.
    pub fn unselect_into(&mut self, tree: &Tree, dir: Dir, node: NodeId) {
        let step = {
            let anti = self.anticursor.as_ref().expect("unselect without anticursor");
            *anti
                .ancestors
                .get(&node)
                .expect("node not on the anticursor's ancestor path")
        };
        match step {
            PathStep::Node(block) => self.ins_at_dir_end(tree, !dir, block),
            PathStep::Point => unreachable!("a command is never the anticursor's parent"),
        }
    }

    /// Recompute the selection as the run between the cursor and the
    /// anticursor. Returns false (and clears the selection) when the two
    /// coincide.
    pub fn select(&mut self, tree: &Tree) -> bool {
        let anti_point = match &self.anticursor {
            Some(anti) => anti.point,
            None => return false,
        };
        if self.point() == anti_point {
            self.selection = None;
            return false;
        }

        // lowest common ancestor: first cursor ancestor on the
        // anticursor's path, plus the cursor-side child reaching it
        let (lca, cursor_side) = {
            let anti = self.anticursor.as_ref().expect("anticursor");
            let mut side = BoundarySide::Point(self.point());
            let mut cur = self.parent;
            loop {
                if anti.ancestors.contains_key(&cur) {
                    break (cur, side);
                }
                let parent = tree.parent(cur).expect("cursor and anticursor share a root");
                side = BoundarySide::Node(cur);
                cur = parent;
            }
        };
        let anti_side = {
            let anti = self.anticursor.as_ref().expect("anticursor");
            match anti.ancestors[&lca] {
                PathStep::Point => BoundarySide::Point(anti_point),
                PathStep::Node(child) => BoundarySide::Node(child),
            }
        };

        let cursor_pos = boundary_pos(tree, lca, &cursor_side);
        let anti_pos = boundary_pos(tree, lca, &anti_side);
        let cursor_is_left = cursor_pos <= anti_pos;
        let (left_side, right_side) = if cursor_is_left {
            (&cursor_side, &anti_side)
        } else {
            (&anti_side, &cursor_side)
        };

        let leftmost = match left_side {
            BoundarySide::Node(n) => Some(*n),
            BoundarySide::Point(p) => p.right,
        };
        let rightmost = match right_side {
            BoundarySide::Node(n) => Some(*n),
            BoundarySide::Point(p) => p.left,
        };
        let (Some(leftmost), Some(rightmost)) = (leftmost, rightmost) else {
            self.selection = None;
            return false;
        };
        if boundary_pos(tree, lca, &BoundarySide::Node(leftmost))
            > boundary_pos(tree, lca, &BoundarySide::Node(rightmost))
        {
            self.selection = None;
            return false;
        }

        self.selection = Some(Fragment::new(leftmost, rightmost));
        // cursor sits at the boundary it has been extending
        self.parent = lca;
        if cursor_is_left {
            self.right = Some(leftmost);
            self.left = tree.left(leftmost);
        } else {
            self.left = Some(rightmost);
            self.right = tree.right(rightmost);
        }
        true
    }

    /// Select the entire content of `root`.
    pub fn select_all(&mut self, tree: &mut Tree, root: NodeId) {
        self.clear_selection();
        self.ins_at_dir_end(tree, Dir::L, root);
        self.start_selection(tree);
        self.ins_at_dir_end(tree, Dir::R, root);
        self.select(tree);
    }

    /// Detach the selected run and hand it back, collapsing the cursor to
    /// where the selection was.
    pub fn replace_selection(&mut self, tree: &mut Tree) -> Fragment {
        let Some(selection) = self.selection else {
            return Fragment::empty();
        };
        let leftmost = selection.leftmost().expect("non-empty selection");
        let rightmost = selection.rightmost().expect("non-empty selection");
        self.parent = tree.parent(leftmost).expect("selection is attached");
        self.left = tree.left(leftmost);
        self.right = tree.right(rightmost);
        selection.disown(tree);
        self.clear_selection();
        selection
    }

    /// Remove the selected run entirely.
    pub fn delete_selection(&mut self, tree: &mut Tree) {
        let fragment = self.replace_selection(tree);
        fragment.remove(tree);
    }
}
