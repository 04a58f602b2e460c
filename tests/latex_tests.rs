//! Integration tests for LaTeX parsing and serialization

use std::rc::Rc;

use mathfield::{
    default_registry, latex_to_mathspeak, latex_to_text, normalize_latex, parse_latex,
    try_parse_latex, CommandDef, Dir, MathField, NodeKind, SymbolData, Tree,
};

// ============================================================================
// Round-trip
// ============================================================================

mod round_trip {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trips(latex: &str) {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        let block = parse_latex(&mut tree, &reg, latex)
            .unwrap_or_else(|| panic!("'{}' should parse", latex));
        assert_eq!(tree.latex(block), latex, "round trip of '{}'", latex);
        tree.assert_valid(block);
    }

    #[test]
    fn test_simple_expressions() {
        round_trips("1+1+1+1+1");
        round_trips("12.5");
        round_trips("a+b=c");
        round_trips("x<y");
    }

    #[test]
    fn test_commands() {
        round_trips("\\frac{1}{2}");
        round_trips("\\frac{a+b}{c-d}");
        round_trips("\\sqrt{2}");
        round_trips("\\sqrt[3]{8}");
        round_trips("\\frac{\\sqrt{2}}{2}");
    }

    #[test]
    fn test_named_symbols() {
        round_trips("\\alpha +\\beta ");
        round_trips("\\pi r");
        round_trips("2\\pm 3");
    }

    #[test]
    fn test_delimiters() {
        round_trips("\\left(1+2\\right)");
        round_trips("\\left[x\\right]");
        round_trips("\\left|y\\right|");
        round_trips("\\left\\{z\\right\\}");
    }

    #[test]
    fn test_reparse_of_serialization_is_stable() {
        for latex in ["\\frac{ }{ }", "\\alpha b", "\\sqrt[3]{8}+1"] {
            let first = normalize_latex(latex).unwrap();
            let second = normalize_latex(&first).unwrap();
            assert_eq!(first, second, "normalization of '{}' is idempotent", latex);
        }
    }
}

// ============================================================================
// Grammar behavior
// ============================================================================

mod grammar {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_five_terms_make_nine_siblings() {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        let block = parse_latex(&mut tree, &reg, "1+1+1+1+1").unwrap();
        assert_eq!(tree.children(block).count(), 9);
        assert_eq!(tree.latex(block), "1+1+1+1+1");
    }

    #[test]
    fn test_fraction_arity() {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        let block = parse_latex(&mut tree, &reg, "\\frac{1}{2}").unwrap();
        let frac = tree.end(block, Dir::L).unwrap();
        assert_eq!(tree.kind(frac), &NodeKind::Fraction);
        assert_eq!(tree.child_count(frac), 2);
        let num = tree.end(frac, Dir::L).unwrap();
        let den = tree.end(frac, Dir::R).unwrap();
        assert_eq!(tree.latex(num), "1");
        assert_eq!(tree.latex(den), "2");
    }

    #[test]
    fn test_unknown_command_failure_message() {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        let err = try_parse_latex(&mut tree, &reg, "\\unknown{x}").unwrap_err();
        assert_eq!(err.expected, "unknown command: \\unknown");
    }

    #[test]
    fn test_malformed_input_is_rejected_not_panicked() {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        for bad in [
            "{unterminated",
            "}",
            "\\frac{1}",
            "\\left(1",
            "\\right)",
            "\\sqrt",
            "\\",
            "$",
            "a_b",
        ] {
            assert!(
                parse_latex(&mut tree, &reg, bad).is_none(),
                "'{}' should fail",
                bad
            );
        }
    }

    #[test]
    fn test_whitespace_normalization() {
        assert_eq!(normalize_latex("  1  +  2  ").unwrap(), "1+2");
        assert_eq!(normalize_latex("\\frac {1} {2}").unwrap(), "\\frac{1}{2}");
    }

    #[test]
    fn test_groups_splice_into_sequence() {
        assert_eq!(normalize_latex("{1}{2}{3}").unwrap(), "123");
        assert_eq!(normalize_latex("{{{4}}}").unwrap(), "4");
    }

    #[test]
    fn test_custom_registry_entry() {
        let mut reg = default_registry();
        reg.insert(
            "heart",
            CommandDef::Vanilla(SymbolData::new("\\heart ", "<3", "heart")),
        );
        let reg = Rc::new(reg);
        let mut tree = Tree::new();
        let block = parse_latex(&mut tree, &reg, "\\heart ").unwrap();
        assert_eq!(tree.text(block), "<3");
        // the default registry stays untouched
        let mut tree2 = Tree::new();
        let default = Rc::new(default_registry());
        assert!(parse_latex(&mut tree2, &default, "\\heart ").is_none());
    }

    #[test]
    fn test_empty_input_is_empty_block() {
        let mut tree = Tree::new();
        let reg = Rc::new(default_registry());
        let block = parse_latex(&mut tree, &reg, "").unwrap();
        assert!(tree.is_empty(block));
    }
}

// ============================================================================
// Narrator surfaces
// ============================================================================

mod narrator {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_renditions() {
        assert_eq!(latex_to_text("\\frac{1}{2}").unwrap(), "(1/2)");
        assert_eq!(latex_to_text("\\sqrt{x+1}").unwrap(), "sqrt(x+1)");
        assert_eq!(latex_to_text("\\pi r").unwrap(), "pir");
        assert_eq!(latex_to_text("1\\cdot 2").unwrap(), "1*2");
    }

    #[test]
    fn test_mathspeak_renditions() {
        assert_eq!(
            latex_to_mathspeak("\\frac{1}{2}").unwrap(),
            "StartFraction 1 Over 2 EndFraction"
        );
        assert_eq!(
            latex_to_mathspeak("\\sqrt{2}").unwrap(),
            "StartRoot 2 EndRoot"
        );
        assert_eq!(latex_to_mathspeak("1+2").unwrap(), "1 plus 2");
    }

    #[test]
    fn test_mathspeak_is_pure_of_state() {
        let mut field = MathField::new();
        field.set_latex("\\frac{1}{2}");
        let first = field.mathspeak();
        field.select_all();
        assert_eq!(field.mathspeak(), first);
    }
}

// ============================================================================
// Export cleanup
// ============================================================================

mod export {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trailing_space_collapsed_before_non_letters() {
        let mut field = MathField::new();
        field.set_latex("\\pi +1");
        assert_eq!(field.latex(), "\\pi+1");
    }

    #[test]
    fn test_trailing_space_kept_before_letters() {
        let mut field = MathField::new();
        field.set_latex("\\pi r");
        assert_eq!(field.latex(), "\\pi r");
    }
}
