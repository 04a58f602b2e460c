//! The per-instance field controller.
//!
//! A [`MathField`] owns one tree, one cursor, the options, a registry
//! handle, and the diagnostics collected while editing. Every public
//! operation runs to completion before the next; the only asynchronous
//! boundary is the [`DeferHost`], through which the field requests
//! fire-and-forget side effects from its host.

use std::rc::Rc;

use crate::core::commands::{CommandDef, CommandRegistry, DEFAULT_REGISTRY};
use crate::core::cursor::{prepare_insertion_at, Cursor, Geometry};
use crate::core::direction::Dir;
use crate::core::latex::patch::render_latex_math_efficiently;
use crate::core::latex::{clean_latex, parse_latex, try_parse_latex};
use crate::core::tree::{Fragment, NodeId, NodeKind, SymbolData, Tree};
use crate::options::FieldOptions;
use crate::utils::error::Diagnostic;

/// Editing keys the field understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Backspace,
    Delete,
    Home,
    End,
}

/// A deferred, fire-and-forget side effect requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredJob {
    /// Mirror the selection into the host's clipboard/textarea machinery.
    SelectionSync,
    /// Scroll the cursor into view.
    ScrollIntoView,
}

/// Cancel handle for a scheduled deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferToken(pub u64);

/// Caller-provided scheduler for deferred side effects. The core never
/// blocks on these; a superseding request cancels the pending one first.
pub trait DeferHost {
    fn defer(&mut self, job: DeferredJob) -> DeferToken;
    fn cancel(&mut self, token: DeferToken);
}

/// One editable math expression.
pub struct MathField {
    pub(crate) tree: Tree,
    pub(crate) root: NodeId,
    pub(crate) cursor: Cursor,
    pub(crate) options: FieldOptions,
    pub(crate) registry: Rc<CommandRegistry>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    defer_host: Option<Box<dyn DeferHost>>,
    pending_selection_sync: Option<DeferToken>,
    pending_scroll: Option<DeferToken>,
}

impl Default for MathField {
    fn default() -> Self {
        Self::new()
    }
}

impl MathField {
    pub fn new() -> Self {
        Self::with_options(FieldOptions::default())
    }

    pub fn with_options(options: FieldOptions) -> Self {
        Self::with_registry(options, Rc::new(DEFAULT_REGISTRY.clone()))
    }

    /// Build a field around an explicit registry (populated before any
    /// parse occurs).
    pub fn with_registry(options: FieldOptions, registry: Rc<CommandRegistry>) -> Self {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Block);
        let cursor = Cursor::new(&tree, root);
        MathField {
            tree,
            root,
            cursor,
            options,
            registry,
            diagnostics: Vec::new(),
            defer_host: None,
            pending_selection_sync: None,
            pending_scroll: None,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn registry(&self) -> &Rc<CommandRegistry> {
        &self.registry
    }

    /// Attach the host's deferred-job scheduler.
    pub fn set_defer_host(&mut self, host: Box<dyn DeferHost>) {
        self.defer_host = Some(host);
    }

    /// Diagnostics collected since the last [`MathField::take_diagnostics`].
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Nodes created since the last call, for the presentation layer to
    /// materialize.
    pub fn take_created_nodes(&mut self) -> Vec<NodeId> {
        self.tree.take_created()
    }

    // ------------------------------------------------------------------
    // Serialization surface
    // ------------------------------------------------------------------

    /// The field's LaTeX, with export normalization applied.
    pub fn latex(&self) -> String {
        clean_latex(&self.tree.latex(self.root))
    }

    pub fn text(&self) -> String {
        self.tree.text(self.root)
    }

    pub fn mathspeak(&self) -> String {
        self.tree.mathspeak(self.root)
    }

    /// LaTeX of the current selection, if any (the clipboard payload).
    pub fn selection_latex(&self) -> Option<String> {
        self.cursor
            .selection()
            .map(|sel| clean_latex(&sel.latex(&self.tree)))
    }

    // ------------------------------------------------------------------
    // Whole-field updates
    // ------------------------------------------------------------------

    /// Replace the field's content. Tries the incremental patch first and
    /// falls back to a full parse and rebuild. Returns true when the
    /// incremental path succeeded.
    pub fn set_latex(&mut self, latex: &str) -> bool {
        let patched = render_latex_math_efficiently(self, latex);
        if !patched {
            self.render_latex_math_from_scratch(latex);
        }
        self.request_deferred(DeferredJob::ScrollIntoView);
        patched
    }

    fn render_latex_math_from_scratch(&mut self, latex: &str) {
        let children: Vec<NodeId> = self.tree.children(self.root).collect();
        for child in children {
            self.tree.remove(child);
        }
        self.cursor.clear_selection();

        match try_parse_latex(&mut self.tree, &self.registry, latex) {
            Ok(block) => {
                self.splice_block_at_cursor_end(block);
            }
            Err(failure) => {
                self.diagnostics.push(
                    Diagnostic::info("parse failure", failure.to_string())
                        .with_location(latex.to_string()),
                );
            }
        }
        self.cursor.ins_at_dir_end(&self.tree, Dir::R, self.root);
        let rightmost = self.tree.end(self.root, Dir::R);
        if let Some(node) = rightmost {
            self.fix_digit_grouping(node);
        }
    }

    /// Move a scratch block's children to the end of the root and free the
    /// scratch block.
    fn splice_block_at_cursor_end(&mut self, block: NodeId) {
        if let (Some(first), Some(last)) = (
            self.tree.end(block, Dir::L),
            self.tree.end(block, Dir::R),
        ) {
            let run = Fragment::new(first, last);
            run.disown(&mut self.tree);
            let rightmost = self.tree.end(self.root, Dir::R);
            run.adopt(&mut self.tree, self.root, rightmost, None);
        }
        self.tree.free_subtree(block);
    }

    // ------------------------------------------------------------------
    // Cursor-local edits
    // ------------------------------------------------------------------

    /// Parse `latex` and splice it in at the cursor. Returns false when
    /// parsing fails or the depth limit refuses the insertion; the tree is
    /// left unchanged in both cases (apart from a consumed selection).
    pub fn write_latex(&mut self, latex: &str) -> bool {
        let Some(block) = parse_latex(&mut self.tree, &self.registry, latex) else {
            return false;
        };
        if self.tree.is_empty(block) {
            self.tree.free_subtree(block);
            return true;
        }
        if self.cursor.selection().is_some() {
            self.cursor.delete_selection(&mut self.tree);
        }
        if !prepare_insertion_at(&mut self.tree, block, &self.cursor, self.options.max_depth) {
            self.tree.free_subtree(block);
            return false;
        }
        if let (Some(first), Some(last)) = (
            self.tree.end(block, Dir::L),
            self.tree.end(block, Dir::R),
        ) {
            let run = Fragment::new(first, last);
            run.disown(&mut self.tree);
            run.adopt(
                &mut self.tree,
                self.cursor.parent,
                self.cursor.left,
                self.cursor.right,
            );
            self.cursor.left = Some(last);
            self.fix_digit_grouping(last);
        }
        self.tree.free_subtree(block);
        true
    }

    /// Type one character at the cursor, replacing any live selection.
    /// Returns false when the depth limit refuses the insertion, or when
    /// strict bracket mode rejects a mismatched closing bracket.
    pub fn write(&mut self, ch: char) -> bool {
        if self.options.restrict_mismatched_brackets && self.is_mismatched_close(ch) {
            return false;
        }
        let replaced = if self.cursor.selection().is_some() {
            Some(self.cursor.replace_selection(&mut self.tree))
        } else {
            None
        };
        if self.cursor.is_too_deep(&self.tree, self.options.max_depth) {
            if let Some(fragment) = replaced {
                fragment.remove(&mut self.tree);
            }
            return false;
        }
        let node = self.ch_to_cmd(ch);
        self.create_left_of(node, replaced);
        self.fix_digit_grouping_around_cursor();
        self.request_deferred(DeferredJob::SelectionSync);
        true
    }

    /// In strict bracket mode, a typed closing bracket must match the
    /// nearest unmatched opening bracket among the left siblings.
    fn is_mismatched_close(&self, ch: char) -> bool {
        if !matches!(ch, ')' | ']' | '}') {
            return false;
        }
        let mut depth = 0usize;
        let mut cur = self.cursor.left;
        while let Some(id) = cur {
            if let NodeKind::Vanilla(data) = self.tree.kind(id) {
                let mut chars = data.ctrl_seq.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    match c {
                        ')' | ']' | '}' => depth += 1,
                        '(' | '[' | '{' => {
                            if depth == 0 {
                                return !matches!(
                                    (c, ch),
                                    ('(', ')') | ('[', ']') | ('{', '}')
                                );
                            }
                            depth -= 1;
                        }
                        _ => {}
                    }
                }
            }
            cur = self.tree.left(id);
        }
        false
    }

    /// Map a typed character to a fresh node: letters (except `f`, which
    /// has its own registry entry) and digits directly, anything else
    /// through the registry, falling back to a plain symbol.
    fn ch_to_cmd(&mut self, ch: char) -> NodeId {
        if ch != 'f' && ch.is_ascii_alphabetic() {
            return self.tree.new_node(NodeKind::Letter(ch));
        }
        if ch.is_ascii_digit() {
            return self.tree.new_node(NodeKind::Digit(ch));
        }
        let def = self.registry.lookup(&ch.to_string()).cloned();
        match def {
            Some(CommandDef::Vanilla(data)) => self.tree.new_node(NodeKind::Vanilla(data)),
            Some(CommandDef::BinaryOp(data)) => self.tree.new_node(NodeKind::BinaryOp(data)),
            Some(CommandDef::DigitChar(c)) => self.tree.new_node(NodeKind::Digit(c)),
            Some(CommandDef::LetterChar(c)) => self.tree.new_node(NodeKind::Letter(c)),
            Some(CommandDef::Fraction) => self.tree.new_command(NodeKind::Fraction),
            Some(CommandDef::SquareRoot) => self.tree.new_command(NodeKind::SquareRoot),
            _ => {
                let s = ch.to_string();
                self.tree
                    .new_node(NodeKind::Vanilla(SymbolData::new(s.clone(), s.clone(), s)))
            }
        }
    }

    /// Insert a freshly created node at the cursor. A command wraps the
    /// replaced selection into its first block; a symbol discards it.
    fn create_left_of(&mut self, node: NodeId, replaced: Option<Fragment>) {
        self.tree
            .adopt(node, self.cursor.parent, self.cursor.left, self.cursor.right);
        self.cursor.left = Some(node);

        if self.tree.kind(node).has_blocks() {
            if let Some(fragment) = replaced {
                if !fragment.is_empty() {
                    let first_block = self.tree.end(node, Dir::L).expect("command block");
                    fragment.adopt(&mut self.tree, first_block, None, None);
                }
            }
            prepare_insertion_at(&mut self.tree, node, &self.cursor, self.options.max_depth);
            // cursor lands in the first empty block, or at the right end
            // of the last one
            let mut target = None;
            for block in self.tree.children(node) {
                if self.tree.is_empty(block) {
                    target = Some(block);
                    break;
                }
            }
            let target = target.or(self.tree.end(node, Dir::R));
            if let Some(block) = target {
                self.cursor.ins_at_dir_end(&self.tree, Dir::R, block);
            }
        } else if let Some(fragment) = replaced {
            fragment.remove(&mut self.tree);
        }
    }

    /// Handle an editing key.
    pub fn keystroke(&mut self, key: Key) {
        match key {
            Key::Left => self.cursor.move_towards(&mut self.tree, Dir::L),
            Key::Right => self.cursor.move_towards(&mut self.tree, Dir::R),
            Key::ShiftLeft => {
                self.cursor.select_towards(&mut self.tree, Dir::L);
                self.request_deferred(DeferredJob::SelectionSync);
            }
            Key::ShiftRight => {
                self.cursor.select_towards(&mut self.tree, Dir::R);
                self.request_deferred(DeferredJob::SelectionSync);
            }
            Key::Backspace => {
                self.cursor.delete_towards(&mut self.tree, Dir::L);
                self.fix_digit_grouping_around_cursor();
            }
            Key::Delete => {
                self.cursor.delete_towards(&mut self.tree, Dir::R);
                self.fix_digit_grouping_around_cursor();
            }
            Key::Home => {
                let parent = self.cursor.parent;
                self.cursor.ins_at_dir_end(&self.tree, Dir::L, parent);
            }
            Key::End => {
                let parent = self.cursor.parent;
                self.cursor.ins_at_dir_end(&self.tree, Dir::R, parent);
            }
        }
        self.request_deferred(DeferredJob::ScrollIntoView);
    }

    /// Select the whole field.
    pub fn select_all(&mut self) {
        let root = self.root;
        self.cursor.select_all(&mut self.tree, root);
        self.request_deferred(DeferredJob::SelectionSync);
    }

    /// Place the cursor at the point closest to horizontal coordinate `x`,
    /// per the host's geometry.
    pub fn seek(&mut self, geometry: &dyn Geometry, x: f64) {
        let root = self.root;
        self.cursor.seek(&self.tree, geometry, root, x);
    }

    // ------------------------------------------------------------------
    // Digit grouping
    // ------------------------------------------------------------------

    /// Recompute grouping gaps for the contiguous digit run containing
    /// `node`. Gaps split the integer part into threes once it has five or
    /// more digits.
    pub(crate) fn fix_digit_grouping(&mut self, node: NodeId) {
        if !self.tree.is_alive(node) || !self.tree.kind(node).is_digit() {
            return;
        }
        let mut first = node;
        while let Some(l) = self.tree.left(first) {
            if self.tree.kind(l).is_digit() {
                first = l;
            } else {
                break;
            }
        }
        let mut run = Vec::new();
        let mut cur = Some(first);
        while let Some(id) = cur {
            if !self.tree.kind(id).is_digit() {
                break;
            }
            run.push(id);
            cur = self.tree.right(id);
        }

        let chars: Vec<char> = run
            .iter()
            .map(|id| match self.tree.kind(*id) {
                NodeKind::Digit(c) => *c,
                _ => unreachable!("run holds digits only"),
            })
            .collect();
        let int_len = chars
            .iter()
            .position(|c| *c == '.')
            .unwrap_or(chars.len());
        let grouped = self.options.enable_digit_grouping && int_len > 4;
        for (i, id) in run.iter().enumerate() {
            let gap = grouped && i < int_len && i != 0 && (int_len - i) % 3 == 0;
            self.tree.set_group_gap(*id, gap);
        }
    }

    fn fix_digit_grouping_around_cursor(&mut self) {
        if let Some(l) = self.cursor.left {
            self.fix_digit_grouping(l);
        } else if let Some(r) = self.cursor.right {
            self.fix_digit_grouping(r);
        }
    }

    // ------------------------------------------------------------------
    // Deferred side effects
    // ------------------------------------------------------------------

    /// Schedule a deferred job, cancelling any pending request for the
    /// same job first.
    pub(crate) fn request_deferred(&mut self, job: DeferredJob) {
        let Some(host) = self.defer_host.as_mut() else {
            return;
        };
        let pending = match job {
            DeferredJob::SelectionSync => &mut self.pending_selection_sync,
            DeferredJob::ScrollIntoView => &mut self.pending_scroll,
        };
        if let Some(token) = pending.take() {
            host.cancel(token);
        }
        *pending = Some(host.defer(job));
    }
}
