//! The incremental patch engine.
//!
//! When a new LaTeX string differs from the rendered one only by a
//! trailing signed decimal literal (the hot path while a user types or
//! deletes digits at the end of an expression), the existing node chain is
//! patched in place instead of reparsed and rebuilt. Preconditions are
//! checked strictly and every failure falls back to the full rebuild; a
//! post-patch verification mismatch additionally records a warning, since
//! it means the engine itself went wrong.
//!
//! The trailing chain must sit directly under the root. That restriction
//! is deliberate: patching inside a subscript or fraction would require
//! relayout guarantees this engine cannot give.

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::direction::Dir;
use crate::core::field::MathField;
use crate::core::tree::{NodeId, NodeKind, SymbolData};
use crate::utils::error::Diagnostic;

lazy_static! {
    /// optional minus, then digits/decimal point, anchored at the end
    static ref TRAILING_NUMBER: Regex = Regex::new(r"-?[0-9.]+$").expect("classifier regex");
}

/// A LaTeX string split around its trailing numeric literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub prefix: String,
    pub digits: String,
}

/// Split `latex` into everything before the trailing signed decimal
/// literal and the literal itself. `None` means the string does not end in
/// one and cannot be patched.
pub fn classify_for_efficient_update(latex: &str) -> Option<Classification> {
    let m = TRAILING_NUMBER.find(latex)?;
    Some(Classification {
        prefix: latex[..m.start()].to_string(),
        digits: m.as_str().to_string(),
    })
}

/// Try to morph the field's trailing digit chain into `latex` without a
/// reparse. Returns false when any precondition fails; the tree is only
/// mutated on paths that are then verified byte-for-byte.
pub(crate) fn render_latex_math_efficiently(field: &mut MathField, latex: &str) -> bool {
    let root = field.root;
    let old_latex = field.latex();
    if field.tree.end(root, Dir::L).is_some()
        && field.tree.end(root, Dir::R).is_some()
        && old_latex == latex
    {
        return true;
    }
    let Some(new_class) = classify_for_efficient_update(latex) else {
        return false;
    };
    let Some(old_class) = classify_for_efficient_update(&old_latex) else {
        return false;
    };
    if old_class.prefix != new_class.prefix {
        return false;
    }

    // strip a leading minus off each literal; a sign flip is handled as a
    // separate structural step
    let (old_minus, old_digits) = split_minus(&old_class.digits);
    let (new_minus, new_digits) = split_minus(&new_class.digits);

    // walk the rightmost chain right-to-left, matching the old literal
    let mut char_node = field.tree.end(root, Dir::R);
    let mut old_char_nodes: Vec<NodeId> = Vec::with_capacity(old_digits.len());
    for ch in old_digits.chars().rev() {
        let Some(node) = char_node else {
            return false;
        };
        if node_char(field, node) != Some(ch) {
            return false;
        }
        // the trailing digits must sit directly under the root, so no
        // containing construct needs a relayout
        if field.tree.parent(node) != Some(root) {
            return false;
        }
        old_char_nodes.push(node);
        char_node = field.tree.left(node);
    }
    old_char_nodes.reverse();

    // remove the minus sign
    if old_minus && !new_minus {
        let Some(minus) = char_node else {
            return false;
        };
        if node_char(field, minus) != Some('-') {
            return false;
        }
        if field.tree.right(minus) != old_char_nodes.first().copied() {
            return false;
        }
        if field.tree.parent(minus) != Some(root) {
            return false;
        }
        if let Some(left_of_minus) = field.tree.left(minus) {
            if field.tree.parent(left_of_minus) != Some(root) {
                return false;
            }
        }
        field.tree.remove(minus);
    }

    // add a minus sign
    if !old_minus && new_minus {
        let Some(first) = old_char_nodes.first().copied() else {
            return false;
        };
        let minus = field
            .tree
            .new_node(NodeKind::BinaryOp(SymbolData::new("-", "-", "minus")));
        let left_of_first = field.tree.left(first);
        field.tree.adopt(minus, root, left_of_first, Some(first));
    }

    // retext the overlap in place
    for (node, new_ch) in old_char_nodes.iter().zip(new_digits.chars()) {
        if node_char(field, *node) != Some(new_ch) {
            field.tree.set_kind(*node, NodeKind::Digit(new_ch));
        }
    }

    // remove the extra digits at the end
    if old_digits.len() > new_digits.len() {
        for node in &old_char_nodes[new_digits.len()..] {
            field.tree.remove(*node);
        }
    }

    // add new digits after the existing ones
    if new_digits.len() > old_digits.len() {
        for ch in new_digits[old_digits.len()..].chars() {
            let node = field.tree.new_node(NodeKind::Digit(ch));
            let last = field.tree.end(root, Dir::R);
            field.tree.adopt(node, root, last, None);
        }
    }

    // the patched tree must serialize to exactly the requested string;
    // anything else is an engine bug and the caller rebuilds from scratch
    let current = field.latex();
    if current != latex {
        field.diagnostics.push(Diagnostic::warning(
            "patch verification",
            format!(
                "tried updating latex efficiently but did not work. Attempted: {} but wrote: {}",
                latex, current
            ),
        ));
        return false;
    }

    field.cursor.clear_selection();
    field.cursor.ins_at_dir_end(&field.tree, Dir::R, root);
    if let Some(rightmost) = field.tree.end(root, Dir::R) {
        field.fix_digit_grouping(rightmost);
    }
    true
}

fn split_minus(digits: &str) -> (bool, &str) {
    match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    }
}

/// The single-character control-sequence text of a leaf, if it has one.
fn node_char(field: &MathField, node: NodeId) -> Option<char> {
    let ctrl_seq = field.tree.kind(node).ctrl_seq()?;
    let mut chars = ctrl_seq.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        Some(first)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::Severity;

    #[test]
    fn test_classify() {
        let c = classify_for_efficient_update("1+23").unwrap();
        assert_eq!(c.prefix, "1+");
        assert_eq!(c.digits, "23");

        let c = classify_for_efficient_update("-12.5").unwrap();
        assert_eq!(c.prefix, "");
        assert_eq!(c.digits, "-12.5");

        let c = classify_for_efficient_update("\\frac{1}{2}+300").unwrap();
        assert_eq!(c.prefix, "\\frac{1}{2}+");
        assert_eq!(c.digits, "300");

        assert!(classify_for_efficient_update("x").is_none());
        assert!(classify_for_efficient_update("").is_none());
        assert!(classify_for_efficient_update("\\frac{1}{2}").is_none());
    }

    #[test]
    fn test_append_digit_patches_in_place() {
        let mut field = MathField::new();
        field.set_latex("12");
        let before: Vec<NodeId> = field.tree.children(field.root).collect();
        assert!(render_latex_math_efficiently(&mut field, "123"));
        assert_eq!(field.latex(), "123");
        let after: Vec<NodeId> = field.tree.children(field.root).collect();
        // the original digit nodes were kept, one was appended
        assert_eq!(&after[..2], &before[..]);
        assert_eq!(after.len(), 3);
    }

    #[test]
    fn test_delete_digit_patches_in_place() {
        let mut field = MathField::new();
        field.set_latex("123");
        assert!(render_latex_math_efficiently(&mut field, "1"));
        assert_eq!(field.latex(), "1");
        field.tree.assert_valid(field.root);
    }

    #[test]
    fn test_retext_digits() {
        let mut field = MathField::new();
        field.set_latex("129");
        let before: Vec<NodeId> = field.tree.children(field.root).collect();
        assert!(render_latex_math_efficiently(&mut field, "134"));
        assert_eq!(field.latex(), "134");
        let after: Vec<NodeId> = field.tree.children(field.root).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_add_minus_sign() {
        let mut field = MathField::new();
        field.set_latex("5");
        assert!(render_latex_math_efficiently(&mut field, "-5"));
        assert_eq!(field.latex(), "-5");
        field.tree.assert_valid(field.root);
    }

    #[test]
    fn test_remove_minus_sign() {
        let mut field = MathField::new();
        field.set_latex("-5");
        assert!(render_latex_math_efficiently(&mut field, "5"));
        assert_eq!(field.latex(), "5");
        field.tree.assert_valid(field.root);
    }

    #[test]
    fn test_prefix_change_falls_back() {
        let mut field = MathField::new();
        field.set_latex("1+2");
        assert!(!render_latex_math_efficiently(&mut field, "2+2"));
        assert!(!render_latex_math_efficiently(&mut field, "\\pi 2"));
    }

    #[test]
    fn test_non_numeric_tail_falls_back() {
        let mut field = MathField::new();
        field.set_latex("12");
        assert!(!render_latex_math_efficiently(&mut field, "12x"));
        assert!(!render_latex_math_efficiently(&mut field, "\\frac{1}{2}"));
    }

    #[test]
    fn test_nested_tail_falls_back() {
        // the old latex ends in digits, but they live inside a fraction,
        // not under the root
        let mut field = MathField::new();
        field.set_latex("\\frac{1}{23}");
        let old = field.latex();
        assert!(classify_for_efficient_update(&old).is_none());
        // force a digits-looking old string through a root-level check:
        // "1+\frac{2}{3}" has no trailing literal either way
        field.set_latex("1+\\frac{2}{3}");
        assert!(!render_latex_math_efficiently(&mut field, "1+\\frac{2}{3}4"));
    }

    #[test]
    fn test_identical_latex_is_a_hit() {
        let mut field = MathField::new();
        field.set_latex("42");
        assert!(render_latex_math_efficiently(&mut field, "42"));
    }

    #[test]
    fn test_decimal_typing_sequence() {
        let mut field = MathField::new();
        field.set_latex("3");
        for step in ["3.", "3.1", "3.14", "3.141"] {
            assert!(render_latex_math_efficiently(&mut field, step), "{}", step);
            assert_eq!(field.latex(), step);
        }
        field.tree.assert_valid(field.root);
    }

    #[test]
    fn test_patch_equivalence_with_rebuild() {
        let cases = [
            ("1+12", "1+123"),
            ("1+123", "1+1"),
            ("\\frac{1}{2}+5", "\\frac{1}{2}+57"),
            ("9", "-9"),
            ("-9", "9"),
            ("0.5", "0.75"),
        ];
        for (old, new) in cases {
            let mut patched = MathField::new();
            patched.set_latex(old);
            assert!(
                render_latex_math_efficiently(&mut patched, new),
                "{} -> {}",
                old,
                new
            );

            let mut rebuilt = MathField::new();
            rebuilt.set_latex(new);
            assert_eq!(patched.latex(), rebuilt.latex(), "{} -> {}", old, new);
            patched.tree.assert_valid(patched.root);
        }
    }

    #[test]
    fn test_cursor_resets_to_right_end_after_patch() {
        let mut field = MathField::new();
        field.set_latex("12");
        field.keystroke(crate::core::field::Key::Left);
        assert!(render_latex_math_efficiently(&mut field, "123"));
        assert_eq!(field.cursor.parent, field.root);
        assert_eq!(field.cursor.right, None);
    }

    #[test]
    fn test_verification_warning_severity() {
        let diag = Diagnostic::warning("patch verification", "mismatch");
        assert_eq!(diag.severity, Severity::Warning);
    }
}
