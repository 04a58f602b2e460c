//! Directional movement and deletion.
//!
//! Both gestures dispatch on the node adjacent to the cursor: symbols are
//! hopped over or removed as one unit, block-owning commands are entered
//! (or removed outright once empty), and a cursor at a block boundary
//! exits to a sibling block or past the owning command.

use crate::core::cursor::Cursor;
use crate::core::direction::Dir;
use crate::core::tree::{Fragment, NodeId, Tree};

impl Cursor {
    /// Advance across the adjacent node in `dir`. A live selection
    /// collapses to its `dir` end instead.
    pub fn move_towards(&mut self, tree: &mut Tree, dir: Dir) {
        if let Some(selection) = self.selection {
            let end = selection.end(dir).expect("non-empty selection");
            self.ins_dir_of(tree, dir, end);
            self.clear_selection();
            return;
        }
        match self.get(dir) {
            Some(node) if tree.kind(node).has_blocks() => {
                // enter the nearest non-empty block, scanning from the side
                // we come in on; if all are empty, enter the near end
                let near_end = tree.end(node, !dir);
                let mut chosen = None;
                let mut scan = near_end;
                while let Some(block) = scan {
                    if !tree.is_empty(block) {
                        chosen = Some(block);
                        break;
                    }
                    scan = tree.sib(block, dir);
                }
                let target = chosen.or(near_end).expect("command without blocks");
                self.ins_at_dir_end(tree, !dir, target);
            }
            Some(node) => {
                // symbol: hop over it
                self.set(!dir, Some(node));
                self.set(dir, tree.sib(node, dir));
            }
            None => {
                let block = self.parent;
                if let Some(sibling) = tree.sib(block, dir) {
                    // into the adjacent block of the same command
                    self.ins_at_dir_end(tree, !dir, sibling);
                } else if let Some(cmd) = tree.parent(block) {
                    // out past the owning command
                    self.ins_dir_of(tree, dir, cmd);
                }
                // at the root boundary there is nowhere to go
            }
        }
    }

    /// Delete one unit in `dir`. A whole command, blocks and all, is one
    /// unit once it is empty; a non-empty command is entered instead so
    /// content is never destroyed wholesale.
    pub fn delete_towards(&mut self, tree: &mut Tree, dir: Dir) {
        if self.selection.is_some() {
            self.delete_selection(tree);
            return;
        }
        match self.get(dir) {
            Some(node) if tree.kind(node).has_blocks() && !tree.is_empty(node) => {
                self.move_towards(tree, dir);
            }
            Some(node) => {
                let (left, right) = tree.remove(node);
                match dir {
                    Dir::L => self.left = left,
                    Dir::R => self.right = right,
                }
            }
            None => {
                if tree.parent(self.parent).is_some() {
                    self.unwrap_gramp(tree);
                }
            }
        }
    }

    /// Replace the cursor's owning command with the contents of all its
    /// blocks, spliced in place. Deleting out of a fraction's numerator,
    /// for instance, lifts both halves into the surrounding block.
    pub(crate) fn unwrap_gramp(&mut self, tree: &mut Tree) {
        let block = self.parent;
        let gramp = tree.parent(block).expect("unwrap at the root");
        let greatgramp = tree.parent(gramp).expect("command without a parent block");

        let cursor_left = self.left;
        let cursor_right = self.right;
        // content that will follow the cursor if its own block is empty
        let mut following: Option<NodeId> = None;
        if cursor_right.is_none() {
            let mut scan = tree.right(block);
            while let Some(b) = scan {
                if let Some(first) = tree.end(b, Dir::L) {
                    following = Some(first);
                    break;
                }
                scan = tree.right(b);
            }
        }

        let gramp_left = tree.left(gramp);
        let gramp_right = tree.right(gramp);
        let blocks: Vec<NodeId> = tree.children(gramp).collect();
        tree.disown(gramp);

        let mut leftward = gramp_left;
        for b in blocks {
            if let (Some(first), Some(last)) = (tree.end(b, Dir::L), tree.end(b, Dir::R)) {
                let run = Fragment::new(first, last);
                run.disown(tree);
                run.adopt(tree, greatgramp, leftward, gramp_right);
                leftward = Some(last);
            }
        }
        tree.free_subtree(gramp);

        self.parent = greatgramp;
        let target_right = if cursor_right.is_some() {
            cursor_right
        } else if let Some(l) = cursor_left {
            tree.right(l)
        } else if following.is_some() {
            following
        } else {
            gramp_right
        };
        match target_right {
            Some(r) => self.ins_left_of(tree, r),
            None => self.ins_at_dir_end(tree, Dir::R, greatgramp),
        }
    }
}
