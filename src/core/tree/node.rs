//! Node kinds for the math edit tree.
//!
//! A node is either a *block* (an ordered container of child nodes, like a
//! fraction's numerator) or a *command* (a symbol or operator owning a
//! fixed number of child blocks). The kind tag carries everything the rest
//! of the engine dispatches on: arity, control-sequence text, and the
//! per-kind serialization templates.

use crate::core::direction::Dir;

/// Display/serialization data for a zero-arity symbol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolData {
    /// The LaTeX control sequence, backslash included where one is needed.
    /// Multi-letter control sequences carry a trailing space (`"\\alpha "`)
    /// so that serialization never glues them onto a following letter; the
    /// export path collapses the space when it is unnecessary.
    pub ctrl_seq: String,
    /// Plain-text rendition.
    pub text: String,
    /// Spoken rendition for the accessibility narrator.
    pub mathspeak: String,
}

impl SymbolData {
    pub fn new(
        ctrl_seq: impl Into<String>,
        text: impl Into<String>,
        mathspeak: impl Into<String>,
    ) -> Self {
        SymbolData {
            ctrl_seq: ctrl_seq.into(),
            text: text.into(),
            mathspeak: mathspeak.into(),
        }
    }
}

/// The kind of a tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A container holding an ordered run of children.
    Block,
    /// A digit or the decimal point (`.` behaves like a digit for editing
    /// and for the incremental patch engine).
    Digit(char),
    /// A single-letter variable.
    Letter(char),
    /// A plain symbol with no special editing behavior.
    Vanilla(SymbolData),
    /// A binary operator symbol (`+`, `-`, `\pm`, ...).
    BinaryOp(SymbolData),
    /// One side of a `\left...\right` delimiter pair. The pair is spliced
    /// into the sibling run as two distinct nodes around the inner content.
    Delimiter { ch: char, side: Dir },
    /// `\frac{numerator}{denominator}`; owns exactly two blocks.
    Fraction,
    /// `\sqrt{radicand}`; owns exactly one block.
    SquareRoot,
    /// `\sqrt[index]{radicand}`; owns exactly two blocks, index first.
    NthRoot,
}

impl NodeKind {
    /// Number of child blocks a command of this kind must own. Fixed at
    /// construction and invariant thereafter.
    pub fn arity(&self) -> usize {
        match self {
            NodeKind::Fraction | NodeKind::NthRoot => 2,
            NodeKind::SquareRoot => 1,
            _ => 0,
        }
    }

    /// Returns true for container nodes.
    pub fn is_block(&self) -> bool {
        matches!(self, NodeKind::Block)
    }

    /// Returns true for commands that own child blocks.
    pub fn has_blocks(&self) -> bool {
        self.arity() > 0
    }

    /// Returns true for zero-arity leaf commands.
    pub fn is_symbol(&self) -> bool {
        !self.is_block() && self.arity() == 0
    }

    /// Returns true for digit-like nodes (including the decimal point).
    pub fn is_digit(&self) -> bool {
        matches!(self, NodeKind::Digit(_))
    }

    /// The control-sequence text of a leaf, used by the incremental patch
    /// engine to match tree nodes against characters of a numeric literal.
    pub fn ctrl_seq(&self) -> Option<String> {
        match self {
            NodeKind::Digit(c) | NodeKind::Letter(c) => Some(c.to_string()),
            NodeKind::Vanilla(data) | NodeKind::BinaryOp(data) => Some(data.ctrl_seq.clone()),
            NodeKind::Delimiter { ch, side } => Some(match side {
                Dir::L => format!("\\left{}", delimiter_latex(*ch)),
                Dir::R => format!("\\right{}", delimiter_latex(*ch)),
            }),
            _ => None,
        }
    }
}

/// LaTeX spelling of a delimiter character (braces need escaping).
pub fn delimiter_latex(ch: char) -> String {
    match ch {
        '{' => "\\{".to_string(),
        '}' => "\\}".to_string(),
        other => other.to_string(),
    }
}

/// Spoken name of a delimiter character.
pub fn delimiter_mathspeak(ch: char, side: Dir) -> String {
    let name = match ch {
        '(' | ')' => "parenthesis",
        '[' | ']' => "bracket",
        '{' | '}' => "brace",
        '|' => "pipe",
        _ => "delimiter",
    };
    format!("{} {}", side, name)
}
