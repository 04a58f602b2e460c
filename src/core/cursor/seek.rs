//! Coordinate-driven cursor placement.
//!
//! `seek` is the single operation that consults external geometry: the
//! presentation layer reports horizontal bounds per node, and the cursor
//! walks the tree to the point whose boundaries bracket the coordinate
//! most closely, preferring the side whose node chain is non-empty.

use crate::core::cursor::Cursor;
use crate::core::direction::Dir;
use crate::core::tree::{NodeId, Tree};

/// Horizontal extent of a drawable, as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    pub fn new(left: f64, right: f64) -> Self {
        Bounds { left, right }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// The geometry oracle the cursor seeks against. A node without a
/// materialized drawable reports `None` and is skipped gracefully.
pub trait Geometry {
    fn bounds(&self, node: NodeId) -> Option<Bounds>;
}

impl Cursor {
    /// Place the cursor at the point inside `block` closest to the
    /// horizontal coordinate `x`.
    pub fn seek(&mut self, tree: &Tree, geometry: &dyn Geometry, block: NodeId, x: f64) {
        self.clear_selection();
        self.block_seek(tree, geometry, block, x);
    }

    fn block_seek(&mut self, tree: &Tree, geometry: &dyn Geometry, block: NodeId, x: f64) {
        let Some(last) = tree.end(block, Dir::R) else {
            // empty block: only one point exists
            self.ins_at_dir_end(tree, Dir::R, block);
            return;
        };
        if let Some(bounds) = geometry.bounds(last) {
            if bounds.right < x {
                self.ins_at_dir_end(tree, Dir::R, block);
                return;
            }
        }
        let first = tree.end(block, Dir::L).expect("block has a last child");
        if let Some(bounds) = geometry.bounds(first) {
            if x < bounds.left {
                self.ins_at_dir_end(tree, Dir::L, block);
                return;
            }
        }

        // walk right-to-left to the child whose span contains x
        let mut node = last;
        loop {
            match geometry.bounds(node) {
                Some(bounds) if x < bounds.left => match tree.left(node) {
                    Some(l) => node = l,
                    None => break,
                },
                Some(_) => break,
                None => match tree.left(node) {
                    Some(l) => node = l,
                    None => break,
                },
            }
        }
        self.node_seek(tree, geometry, node, x);
    }

    fn node_seek(&mut self, tree: &Tree, geometry: &dyn Geometry, node: NodeId, x: f64) {
        if tree.kind(node).has_blocks() {
            self.command_seek(tree, geometry, node, x);
        } else {
            // symbol: whichever side the coordinate is closer to
            match geometry.bounds(node) {
                Some(bounds) if x - bounds.left < bounds.width() / 2.0 => {
                    self.ins_left_of(tree, node)
                }
                _ => self.ins_right_of(tree, node),
            }
        }
    }

    fn command_seek(&mut self, tree: &Tree, geometry: &dyn Geometry, cmd: NodeId, x: f64) {
        let Some(cmd_bounds) = geometry.bounds(cmd) else {
            self.ins_right_of(tree, cmd);
            return;
        };
        if x < cmd_bounds.left {
            self.ins_left_of(tree, cmd);
            return;
        }
        if x > cmd_bounds.right {
            self.ins_right_of(tree, cmd);
            return;
        }

        let mut left_left_bound = cmd_bounds.left;
        let blocks: Vec<NodeId> = tree.children(cmd).collect();
        for block in blocks {
            let Some(block_bounds) = geometry.bounds(block) else {
                continue;
            };
            if x < block_bounds.left {
                // closer to this block's left bound, or the bound left of
                // that?
                if x - left_left_bound < block_bounds.left - x {
                    match tree.left(block) {
                        Some(prev) => self.ins_at_dir_end(tree, Dir::R, prev),
                        None => self.ins_left_of(tree, cmd),
                    }
                } else {
                    self.ins_at_dir_end(tree, Dir::L, block);
                }
                return;
            } else if x > block_bounds.right {
                if tree.right(block).is_some() {
                    // continue to the next block
                    left_left_bound = block_bounds.right;
                } else {
                    // rightmost block: closer to its right bound, or the
                    // command's?
                    if cmd_bounds.right - x < x - block_bounds.right {
                        self.ins_right_of(tree, cmd);
                    } else {
                        self.ins_at_dir_end(tree, Dir::R, block);
                    }
                    return;
                }
            } else {
                self.block_seek(tree, geometry, block, x);
                return;
            }
        }
        self.ins_right_of(tree, cmd);
    }
}
