//! String renditions of the tree: LaTeX, plain text, and mathspeak.
//!
//! All three are pure functions of current tree state. LaTeX is the sole
//! persisted format; the narrator consumes text and mathspeak.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::direction::Dir;
use crate::core::tree::node::delimiter_mathspeak;
use crate::core::tree::{NodeId, NodeKind, Tree};

lazy_static! {
    /// Decimal fragments get their digits split apart so screen readers
    /// speak "point four five six" instead of "point four hundred
    /// fifty-six".
    static ref DECIMAL_RUN: Regex = Regex::new(r"\.([0-9]+)").expect("decimal regex");
    static ref SPACE_RUN: Regex = Regex::new(r"  +").expect("space regex");
}

impl Tree {
    /// Serialized LaTeX of the subtree rooted at `id`. For a block this is
    /// the concatenation of its children; commands splice their blocks into
    /// their own template.
    pub fn latex(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Block => {
                let mut out = String::new();
                for child in self.children(id) {
                    out.push_str(&self.latex(child));
                }
                out
            }
            NodeKind::Fraction => {
                let num = self.end(id, Dir::L).expect("fraction numerator");
                let den = self.end(id, Dir::R).expect("fraction denominator");
                format!(
                    "\\frac{{{}}}{{{}}}",
                    self.block_arg_latex(num),
                    self.block_arg_latex(den)
                )
            }
            NodeKind::SquareRoot => {
                let rad = self.end(id, Dir::L).expect("radicand");
                format!("\\sqrt{{{}}}", self.block_arg_latex(rad))
            }
            NodeKind::NthRoot => {
                let index = self.end(id, Dir::L).expect("root index");
                let rad = self.end(id, Dir::R).expect("radicand");
                format!(
                    "\\sqrt[{}]{{{}}}",
                    self.latex(index),
                    self.block_arg_latex(rad)
                )
            }
            kind => kind.ctrl_seq().unwrap_or_default(),
        }
    }

    /// A command argument always serializes as at least one character, so
    /// an empty block becomes a single space inside its braces.
    fn block_arg_latex(&self, block: NodeId) -> String {
        let latex = self.latex(block);
        if latex.is_empty() {
            " ".to_string()
        } else {
            latex
        }
    }

    /// Plain-text rendition of the subtree rooted at `id`.
    pub fn text(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Block => {
                // a block with a single child reads as that child alone
                let ends = self.node(id).ends();
                if let (Some(l), Some(r)) = (ends.get(Dir::L), ends.get(Dir::R)) {
                    if l == r {
                        return self.text(l);
                    }
                }
                let mut out = String::new();
                for child in self.children(id) {
                    out.push_str(&self.text(child));
                }
                out
            }
            NodeKind::Fraction => {
                let num = self.end(id, Dir::L).expect("fraction numerator");
                let den = self.end(id, Dir::R).expect("fraction denominator");
                format!("({}/{})", self.text(num), self.text(den))
            }
            NodeKind::SquareRoot => {
                let rad = self.end(id, Dir::L).expect("radicand");
                format!("sqrt({})", self.text(rad))
            }
            NodeKind::NthRoot => {
                let index = self.end(id, Dir::L).expect("root index");
                let rad = self.end(id, Dir::R).expect("radicand");
                format!("root({},{})", self.text(index), self.text(rad))
            }
            NodeKind::Digit(c) | NodeKind::Letter(c) => c.to_string(),
            NodeKind::Vanilla(data) | NodeKind::BinaryOp(data) => data.text.clone(),
            NodeKind::Delimiter { ch, .. } => ch.to_string(),
        }
    }

    /// Spoken rendition of the subtree rooted at `id`, for the
    /// accessibility narrator.
    pub fn mathspeak(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Block => {
                let mut parts = Vec::new();
                for child in self.children(id) {
                    parts.push(self.mathspeak(child));
                }
                let joined = parts.join(" ");
                let collapsed = SPACE_RUN.replace_all(joined.trim(), " ");
                DECIMAL_RUN
                    .replace_all(&collapsed, |caps: &regex::Captures| {
                        let digits: Vec<String> =
                            caps[1].chars().map(|c| c.to_string()).collect();
                        format!(".{}", digits.join(" "))
                    })
                    .into_owned()
            }
            NodeKind::Fraction => {
                let num = self.end(id, Dir::L).expect("fraction numerator");
                let den = self.end(id, Dir::R).expect("fraction denominator");
                format!(
                    "StartFraction {} Over {} EndFraction",
                    self.mathspeak(num),
                    self.mathspeak(den)
                )
            }
            NodeKind::SquareRoot => {
                let rad = self.end(id, Dir::L).expect("radicand");
                format!("StartRoot {} EndRoot", self.mathspeak(rad))
            }
            NodeKind::NthRoot => {
                let index = self.end(id, Dir::L).expect("root index");
                let rad = self.end(id, Dir::R).expect("radicand");
                format!(
                    "RootIndex {} StartRoot {} EndRoot",
                    self.mathspeak(index),
                    self.mathspeak(rad)
                )
            }
            NodeKind::Digit(c) | NodeKind::Letter(c) => c.to_string(),
            NodeKind::Vanilla(data) | NodeKind::BinaryOp(data) => data.mathspeak.clone(),
            NodeKind::Delimiter { ch, side } => delimiter_mathspeak(*ch, *side),
        }
    }
}
