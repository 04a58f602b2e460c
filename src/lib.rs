//! Mathfield - an editable math expression engine.
//!
//! The crate maintains a live tree representation of a mathematical
//! expression, offers cursor/selection editing over it, converts it to and
//! from LaTeX, and patches the rendered tree in place for the hot path of
//! trailing-digit edits. Presentation, accessibility narration, and input
//! devices are external collaborators behind small traits.
//!
//! # Quick start
//!
//! ```
//! use mathfield::MathField;
//!
//! let mut field = MathField::new();
//! field.set_latex("1+\\frac{2}{3}");
//! assert_eq!(field.latex(), "1+\\frac{2}{3}");
//! assert_eq!(field.text(), "1+(2/3)");
//! ```

pub mod core;
pub mod options;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::rc::Rc;

pub use crate::core::commands::{default_registry, CommandDef, CommandRegistry, DEFAULT_REGISTRY};
pub use crate::core::cursor::{
    prepare_insertion_at, remove_nodes_deeper_than, Anticursor, Bounds, Cursor, Geometry, Point,
};
pub use crate::core::direction::Dir;
pub use crate::core::field::{DeferHost, DeferToken, DeferredJob, Key, MathField};
pub use crate::core::latex::{
    clean_latex, classify_for_efficient_update, parse_latex, try_parse_latex,
};
pub use crate::core::tree::{Fragment, Node, NodeId, NodeKind, SymbolData, Tree};
pub use crate::options::FieldOptions;
pub use crate::utils::error::{Diagnostic, ParseFailure, Severity};

/// Parse LaTeX and return its plain-text rendition, or `None` on a parse
/// failure.
pub fn latex_to_text(latex: &str) -> Option<String> {
    let mut tree = Tree::new();
    let registry = Rc::new(DEFAULT_REGISTRY.clone());
    let block = parse_latex(&mut tree, &registry, latex)?;
    Some(tree.text(block))
}

/// Parse LaTeX and return its spoken rendition, or `None` on a parse
/// failure.
pub fn latex_to_mathspeak(latex: &str) -> Option<String> {
    let mut tree = Tree::new();
    let registry = Rc::new(DEFAULT_REGISTRY.clone());
    let block = parse_latex(&mut tree, &registry, latex)?;
    Some(tree.mathspeak(block))
}

/// Round a LaTeX string through the tree: parse, reserialize, and apply
/// export normalization. `None` on a parse failure.
pub fn normalize_latex(latex: &str) -> Option<String> {
    let mut tree = Tree::new();
    let registry = Rc::new(DEFAULT_REGISTRY.clone());
    let block = parse_latex(&mut tree, &registry, latex)?;
    Some(clean_latex(&tree.latex(block)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latex_to_text() {
        assert_eq!(latex_to_text("\\frac{1}{2}").unwrap(), "(1/2)");
        assert!(latex_to_text("\\nope").is_none());
    }

    #[test]
    fn test_latex_to_mathspeak() {
        assert_eq!(
            latex_to_mathspeak("\\frac{1}{2}").unwrap(),
            "StartFraction 1 Over 2 EndFraction"
        );
    }

    #[test]
    fn test_normalize_latex() {
        assert_eq!(normalize_latex("{1}{2}").unwrap(), "12");
        assert_eq!(normalize_latex("\\pi +1").unwrap(), "\\pi+1");
    }
}
