//! Integration tests for tree editing, cursor gestures, and the
//! incremental patch path

use mathfield::{Dir, FieldOptions, Key, MathField, NodeId, NodeKind, Tree};

// ============================================================================
// Tree invariants under adopt/disown sequences
// ============================================================================

mod invariants {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Deterministic little number generator so the op sequence is fixed.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: usize) -> usize {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as usize) % bound.max(1)
        }
    }

    #[test]
    fn test_symmetry_over_many_adopt_disown_ops() {
        let mut tree = Tree::new();
        let root = tree.new_node(NodeKind::Block);
        let mut attached: Vec<NodeId> = Vec::new();
        let mut rng = Lcg(12345);

        for step in 0..500 {
            let insert = attached.is_empty() || rng.next(3) > 0;
            if insert {
                let node = tree.new_node(NodeKind::Digit(char::from(b'0' + (step % 10) as u8)));
                let slot = rng.next(attached.len() + 1);
                let left = if slot == 0 { None } else { Some(attached[slot - 1]) };
                let right = attached.get(slot).copied();
                tree.adopt(node, root, left, right);
                attached.insert(slot, node);
            } else {
                let idx = rng.next(attached.len());
                let node = attached.remove(idx);
                tree.remove(node);
            }
            tree.assert_valid(root);
            let children: Vec<NodeId> = tree.children(root).collect();
            assert_eq!(children, attached);
        }
    }

    #[test]
    fn test_arity_invariant_observable_everywhere() {
        let mut field = MathField::new();
        field.set_latex("\\frac{\\sqrt[3]{x}}{\\frac{1}{2}}");
        let mut stack = vec![field.root()];
        while let Some(node) = stack.pop() {
            let kind = field.tree().kind(node).clone();
            if kind.has_blocks() {
                assert_eq!(field.tree().child_count(node), kind.arity());
            }
            stack.extend(field.tree().children(node));
        }
    }
}

// ============================================================================
// Cursor editing gestures
// ============================================================================

mod gestures {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typing_then_arrowing_through_a_fraction() {
        let mut field = MathField::new();
        field.set_latex("\\frac{12}{34}");
        // cursor starts at the root's right end; walk all the way left
        // through the fraction
        for _ in 0..8 {
            field.keystroke(Key::Left);
        }
        assert_eq!(field.cursor().parent, field.root());
        assert_eq!(field.cursor().left, None);
        // and all the way back
        for _ in 0..8 {
            field.keystroke(Key::Right);
        }
        assert_eq!(field.cursor().parent, field.root());
        assert_eq!(field.cursor().right, None);
        assert_eq!(field.latex(), "\\frac{12}{34}");
    }

    #[test]
    fn test_backspace_into_fraction_then_unwrap() {
        let mut field = MathField::new();
        field.set_latex("\\frac{1}{2}");
        // first backspace enters the denominator instead of destroying
        // the fraction wholesale
        field.keystroke(Key::Backspace);
        assert_eq!(field.latex(), "\\frac{1}{2}");
        field.keystroke(Key::Backspace);
        assert_eq!(field.latex(), "\\frac{1}{ }");
        // deleting out of the empty denominator's left edge unwraps the
        // fraction, lifting the numerator into the root
        field.keystroke(Key::Backspace);
        assert_eq!(field.latex(), "1");
        field.tree().assert_valid(field.root());
    }

    #[test]
    fn test_home_and_end() {
        let mut field = MathField::new();
        field.set_latex("123");
        field.keystroke(Key::Home);
        assert_eq!(field.cursor().left, None);
        field.keystroke(Key::End);
        assert_eq!(field.cursor().right, None);
    }

    #[test]
    fn test_selection_replace_detaches_fragment() {
        let mut field = MathField::new();
        field.set_latex("n+\\frac{n}{2}");
        field.select_all();
        assert_eq!(field.selection_latex().unwrap(), "n+\\frac{n}{2}");
        assert!(field.write('x'));
        assert_eq!(field.latex(), "x");
        field.tree().assert_valid(field.root());
    }

    #[test]
    fn test_shift_selection_then_overtype() {
        let mut field = MathField::new();
        field.set_latex("123");
        field.keystroke(Key::ShiftLeft);
        field.keystroke(Key::ShiftLeft);
        assert_eq!(field.selection_latex().unwrap(), "23");
        assert!(field.write('9'));
        assert_eq!(field.latex(), "19");
    }
}

// ============================================================================
// Depth limiting
// ============================================================================

mod depth {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Deepest nesting level at which any content (non-block) node sits.
    /// A kept command's now-empty blocks don't count: they are structural
    /// and cannot be removed without breaking the command's arity.
    fn max_content_depth(tree: &Tree, node: NodeId, blocks_entered: usize) -> usize {
        let mut max = 0;
        for child in tree.children(node) {
            if tree.kind(child).is_block() {
                max = max.max(max_content_depth(tree, child, blocks_entered + 1));
            } else {
                max = max.max(blocks_entered);
                max = max.max(max_content_depth(tree, child, blocks_entered));
            }
        }
        max
    }

    #[test]
    fn test_truncation_bounds_depth() {
        for limit in 0..3 {
            let mut field = MathField::with_options(FieldOptions {
                max_depth: Some(limit),
                ..FieldOptions::default()
            });
            field.write_latex("\\frac{\\frac{\\frac{1}{2}}{3}}{4}");
            let depth = max_content_depth(field.tree(), field.root(), 0);
            assert!(
                depth <= limit,
                "limit {} produced depth {}: {}",
                limit,
                depth,
                field.latex()
            );
            field.tree().assert_valid(field.root());
        }
    }

    #[test]
    fn test_unlimited_depth_passes_through() {
        let mut field = MathField::new();
        field.write_latex("\\frac{\\frac{\\frac{1}{2}}{3}}{4}");
        assert_eq!(field.latex(), "\\frac{\\frac{\\frac{1}{2}}{3}}{4}");
    }
}

// ============================================================================
// Incremental patch scenarios
// ============================================================================

mod patching {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_append_digit_without_reparse() {
        let mut field = MathField::new();
        field.set_latex("12");
        let before: Vec<NodeId> = field.tree().children(field.root()).collect();
        assert!(field.set_latex("123"));
        let after: Vec<NodeId> = field.tree().children(field.root()).collect();
        assert_eq!(&after[..2], &before[..], "existing digit nodes were kept");
        assert_eq!(field.latex(), "123");
    }

    #[test]
    fn test_minus_sign_insertion() {
        let mut field = MathField::new();
        field.set_latex("5");
        assert!(field.set_latex("-5"));
        assert_eq!(field.latex(), "-5");
        let first = field.tree().end(field.root(), Dir::L).unwrap();
        assert!(matches!(field.tree().kind(first), NodeKind::BinaryOp(_)));
    }

    #[test]
    fn test_patch_and_rebuild_agree() {
        let scripts = [
            vec!["1", "12", "123", "12", "1", "-1", "1"],
            vec!["\\frac{1}{2}+1", "\\frac{1}{2}+12", "\\frac{1}{2}+1.5"],
            vec!["0", "0.", "0.5", "-0.5", "-0.25"],
        ];
        for script in scripts {
            let mut live = MathField::new();
            for step in &script {
                live.set_latex(step);
                let mut fresh = MathField::new();
                fresh.set_latex(step);
                assert_eq!(live.latex(), fresh.latex(), "step {}", step);
                live.tree().assert_valid(live.root());
            }
        }
    }

    #[test]
    fn test_structural_change_falls_back_to_rebuild() {
        let mut field = MathField::new();
        field.set_latex("12");
        assert!(!field.set_latex("\\frac{12}{3}"));
        assert_eq!(field.latex(), "\\frac{12}{3}");
    }

    #[test]
    fn test_patch_never_leaves_diagnostics_on_clean_paths() {
        let mut field = MathField::new();
        field.set_latex("1");
        field.set_latex("12");
        field.set_latex("120");
        assert!(field.diagnostics().is_empty());
    }

    #[test]
    fn test_cursor_parked_right_after_patch() {
        let mut field = MathField::new();
        field.set_latex("42");
        field.keystroke(Key::Left);
        assert!(field.set_latex("421"));
        assert_eq!(field.cursor().parent, field.root());
        assert_eq!(field.cursor().right, None);
    }

    #[test]
    fn test_grouping_refreshed_on_patch() {
        let mut field = MathField::with_options(FieldOptions {
            enable_digit_grouping: true,
            ..FieldOptions::default()
        });
        field.set_latex("9999");
        assert!(field
            .tree()
            .children(field.root())
            .all(|id| !field.tree().node(id).group_gap()));
        assert!(field.set_latex("99999"));
        let gapped = field
            .tree()
            .children(field.root())
            .filter(|id| field.tree().node(*id).group_gap())
            .count();
        assert_eq!(gapped, 1, "99 999 has one gap");
    }
}

// ============================================================================
// Adversarial input never panics
// ============================================================================

mod robustness {
    use super::*;

    #[test]
    fn test_public_surface_survives_garbage() {
        let garbage = [
            "\\\\\\",
            "{{{{{{",
            "}}}}",
            "\\frac{\\frac{\\frac{",
            "\\left(\\left(\\left(",
            "\\sqrt[",
            "][",
            "\u{1F600}\u{1F600}",
            "\\unknown\\unknown\\unknown",
        ];
        for bad in garbage {
            let mut field = MathField::new();
            field.set_latex(bad);
            field.keystroke(Key::Left);
            field.keystroke(Key::Backspace);
            field.select_all();
            let _ = field.latex();
            let _ = field.text();
            let _ = field.mathspeak();
        }
    }
}
