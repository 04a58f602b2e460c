//! The LaTeX math grammar.
//!
//! Productions, resolved against a command registry:
//!
//! ```text
//! math_sequence  := math_block* joined left-to-right
//! math_block     := opt_whitespace (math_group | command)
//! math_group     := '{' math_sequence '}'
//! command        := control_sequence | letter | digit | plain symbol
//! control_sequence := one non-letter non-backslash char (compatibility)
//!                   | '\' ([a-zA-Z]+ | whitespace -> " " | any one char)
//! ```
//!
//! The grammar yields detached [`Ast`] values; [`build_block`] lowers a
//! parsed sequence into the arena. Parsing and building are split so that
//! backtracking never strands half-built nodes in the arena.

use lazy_static::lazy_static;
use regex::Regex;
use std::rc::Rc;

use crate::core::commands::{CommandDef, CommandRegistry};
use crate::core::direction::Dir;
use crate::core::latex::combinator::{
    any_char, digit, letter, opt_whitespace, regex, string, Parser,
};
use crate::core::tree::{NodeId, NodeKind, SymbolData, Tree};

lazy_static! {
    // compatibility rule: any single non-letter, non-backslash character
    // resolves through the registry like a control sequence ('f' is the
    // lone letter exception; it has a dedicated registry entry)
    static ref SINGLE_CHAR_CMD: Regex = Regex::new(r"^[^\\a-eg-zA-Z]").expect("cmd regex");
    static ref CMD_NAME: Regex = Regex::new(r"^[a-zA-Z]+").expect("name regex");
    static ref WS_RUN: Regex = Regex::new(r"^\s+").expect("whitespace regex");
    static ref PLAIN_SYMBOL: Regex = Regex::new(r"^[^${}\\_^]").expect("symbol regex");
    static ref OPEN_DELIM: Regex = Regex::new(r"^[(\[|]").expect("delimiter regex");
}

/// Parsed math content, not yet attached to any tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A zero-arity leaf.
    Symbol(NodeKind),
    /// A block-owning command; `blocks.len()` equals the kind's arity.
    Command {
        kind: NodeKind,
        blocks: Vec<Vec<Ast>>,
    },
}

impl Ast {
    /// Serialized LaTeX, matching what the built node would serialize to.
    pub fn latex(&self) -> String {
        match self {
            Ast::Symbol(kind) => kind.ctrl_seq().unwrap_or_default(),
            Ast::Command { kind, blocks } => match kind {
                NodeKind::Fraction => format!(
                    "\\frac{{{}}}{{{}}}",
                    arg_latex(&blocks[0]),
                    arg_latex(&blocks[1])
                ),
                NodeKind::SquareRoot => format!("\\sqrt{{{}}}", arg_latex(&blocks[0])),
                NodeKind::NthRoot => format!(
                    "\\sqrt[{}]{{{}}}",
                    seq_latex(&blocks[0]),
                    arg_latex(&blocks[1])
                ),
                _ => String::new(),
            },
        }
    }
}

/// Serialized LaTeX of a parsed sequence.
pub fn seq_latex(items: &[Ast]) -> String {
    items.iter().map(Ast::latex).collect()
}

fn arg_latex(items: &[Ast]) -> String {
    let latex = seq_latex(items);
    if latex.is_empty() {
        " ".to_string()
    } else {
        latex
    }
}

/// `math_sequence`: zero or more blocks, contents joined left-to-right.
pub fn math_sequence(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    math_block(reg)
        .many()
        .map(|chunks: Vec<Vec<Ast>>| chunks.concat())
        .skip(opt_whitespace())
}

/// `math_block`: leading whitespace, then a group or a single command.
pub fn math_block(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let reg = Rc::clone(reg);
    opt_whitespace().then(move |_| math_group(&reg).or(command(&reg)))
}

fn math_group(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let reg = Rc::clone(reg);
    string("{")
        .then(move |_| math_sequence(&reg))
        .skip(string("}"))
}

fn command(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    control_sequence(reg)
        .or(variable())
        .or(number())
        .or(plain_symbol())
}

fn variable() -> Parser<Vec<Ast>> {
    letter().map(|c| vec![Ast::Symbol(NodeKind::Letter(c))])
}

fn number() -> Parser<Vec<Ast>> {
    digit().map(|c| vec![Ast::Symbol(NodeKind::Digit(c))])
}

fn plain_symbol() -> Parser<Vec<Ast>> {
    regex(PLAIN_SYMBOL.clone()).map(|s| {
        vec![Ast::Symbol(NodeKind::Vanilla(SymbolData::new(
            s.clone(),
            s.clone(),
            s,
        )))]
    })
}

fn control_sequence(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let reg = Rc::clone(reg);
    let name = regex(SINGLE_CHAR_CMD.clone()).or(string("\\").then(|_| {
        regex(CMD_NAME.clone())
            .or(regex(WS_RUN.clone()).result(" ".to_string()))
            .or(any_char().map(|c| c.to_string()))
    }));
    name.then(move |name| match reg.lookup(&name) {
        Some(def) => command_parser(def.clone(), &reg),
        None => Parser::fail(format!("unknown command: \\{}", name)),
    })
}

/// The parser a resolved command runs to consume its arguments.
fn command_parser(def: CommandDef, reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    match def {
        CommandDef::Vanilla(data) => Parser::succeed(vec![Ast::Symbol(NodeKind::Vanilla(data))]),
        CommandDef::BinaryOp(data) => Parser::succeed(vec![Ast::Symbol(NodeKind::BinaryOp(data))]),
        CommandDef::DigitChar(c) => Parser::succeed(vec![Ast::Symbol(NodeKind::Digit(c))]),
        CommandDef::LetterChar(c) => Parser::succeed(vec![Ast::Symbol(NodeKind::Letter(c))]),
        CommandDef::Fraction => {
            let reg = Rc::clone(reg);
            math_block(&reg).times(2).map(|blocks| {
                vec![Ast::Command {
                    kind: NodeKind::Fraction,
                    blocks,
                }]
            })
        }
        CommandDef::SquareRoot => sqrt_parser(reg),
        CommandDef::LeftDelimiter => left_right(reg),
        CommandDef::RightDelimiter => Parser::fail("unmatched \\right"),
    }
}

/// `\sqrt[index]{radicand}` is an n-th root; without the bracket it is a
/// plain square root.
fn sqrt_parser(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let with_index = {
        let reg = Rc::clone(reg);
        opt_math_block(&reg).then(move |index| {
            math_block(&reg).map(move |radicand| {
                vec![Ast::Command {
                    kind: NodeKind::NthRoot,
                    blocks: vec![index.clone(), radicand],
                }]
            })
        })
    };
    let plain = math_block(reg).map(|radicand| {
        vec![Ast::Command {
            kind: NodeKind::SquareRoot,
            blocks: vec![radicand],
        }]
    });
    with_index.or(plain)
}

/// Bracketed optional argument. A block whose serialized LaTeX is a lone
/// `]` is rejected as content so the closing bracket terminates the
/// argument.
pub fn opt_math_block(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let reg = Rc::clone(reg);
    string("[")
        .then(move |_| {
            math_block(&reg)
                .then(|block| {
                    if seq_latex(&block) != "]" {
                        Parser::succeed(block)
                    } else {
                        Parser::fail("an optional-argument block")
                    }
                })
                .many()
                .map(|chunks: Vec<Vec<Ast>>| chunks.concat())
                .skip(opt_whitespace())
        })
        .skip(string("]"))
}

/// `\left<delim> ... \right<matching delim>` yields a fragment: open
/// delimiter, inner content, close delimiter, all siblings.
fn left_right(reg: &Rc<CommandRegistry>) -> Parser<Vec<Ast>> {
    let reg = Rc::clone(reg);
    open_delim().then(move |open| {
        let close = matching_close(open);
        math_sequence(&reg)
            .skip(string("\\right"))
            .then(move |content| {
                close_delim(close).map(move |close_ch| {
                    let mut items = Vec::with_capacity(content.len() + 2);
                    items.push(Ast::Symbol(NodeKind::Delimiter {
                        ch: open,
                        side: Dir::L,
                    }));
                    items.extend(content.clone());
                    items.push(Ast::Symbol(NodeKind::Delimiter {
                        ch: close_ch,
                        side: Dir::R,
                    }));
                    items
                })
            })
    })
}

fn open_delim() -> Parser<char> {
    string("\\{").result('{').or(regex(OPEN_DELIM.clone())
        .map(|s| s.chars().next().expect("delimiter char")))
}

fn matching_close(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        _ => '|',
    }
}

fn close_delim(close: char) -> Parser<char> {
    match close {
        '}' => string("\\}").result('}'),
        ')' => string(")").result(')'),
        ']' => string("]").result(']'),
        _ => string("|").result('|'),
    }
}

/// Lower a parsed sequence into a fresh detached block.
pub fn build_block(tree: &mut Tree, items: &[Ast]) -> NodeId {
    let block = tree.new_node(NodeKind::Block);
    build_into(tree, block, items);
    block
}

/// Lower a parsed sequence into (the right end of) an existing block.
pub fn build_into(tree: &mut Tree, block: NodeId, items: &[Ast]) {
    let mut prev = tree.end(block, Dir::R);
    for ast in items {
        let id = build_node(tree, ast);
        tree.adopt(id, block, prev, None);
        prev = Some(id);
    }
}

fn build_node(tree: &mut Tree, ast: &Ast) -> NodeId {
    match ast {
        Ast::Symbol(kind) => tree.new_node(kind.clone()),
        Ast::Command { kind, blocks } => {
            debug_assert_eq!(kind.arity(), blocks.len(), "block count drifted from arity");
            let cmd = tree.new_command(kind.clone());
            let mut child = tree.end(cmd, Dir::L);
            for items in blocks {
                let block = child.expect("command block");
                build_into(tree, block, items);
                child = tree.right(block);
            }
            cmd
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::default_registry;
    use crate::core::latex::combinator::eof;
    use crate::utils::error::ParseFailure;

    fn parse_seq(latex: &str) -> Result<Vec<Ast>, ParseFailure> {
        let reg = Rc::new(default_registry());
        math_sequence(&reg).skip(eof()).parse(latex)
    }

    #[test]
    fn test_digits_and_operators() {
        let items = parse_seq("1+1+1+1+1").unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(seq_latex(&items), "1+1+1+1+1");
    }

    #[test]
    fn test_fraction() {
        let items = parse_seq("\\frac{1}{2}").unwrap();
        assert_eq!(items.len(), 1);
        match &items[0] {
            Ast::Command { kind, blocks } => {
                assert_eq!(*kind, NodeKind::Fraction);
                assert_eq!(blocks.len(), 2);
                assert_eq!(seq_latex(&blocks[0]), "1");
                assert_eq!(seq_latex(&blocks[1]), "2");
            }
            other => panic!("expected a fraction, got {:?}", other),
        }
    }

    #[test]
    fn test_fraction_without_braces() {
        let items = parse_seq("\\frac12").unwrap();
        assert_eq!(seq_latex(&items), "\\frac{1}{2}");
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_seq("\\unknown{x}").unwrap_err();
        assert_eq!(err.expected, "unknown command: \\unknown");
    }

    #[test]
    fn test_groups_join_into_sequence() {
        let items = parse_seq("{1}{2}").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(seq_latex(&items), "12");
    }

    #[test]
    fn test_sqrt_and_nth_root() {
        let items = parse_seq("\\sqrt{2}").unwrap();
        assert!(matches!(
            &items[0],
            Ast::Command { kind: NodeKind::SquareRoot, .. }
        ));

        let items = parse_seq("\\sqrt[3]{8}").unwrap();
        assert_eq!(seq_latex(&items), "\\sqrt[3]{8}");
    }

    #[test]
    fn test_left_right_yields_fragment() {
        let items = parse_seq("\\left(1+2\\right)").unwrap();
        assert_eq!(items.len(), 5);
        assert!(matches!(
            items[0],
            Ast::Symbol(NodeKind::Delimiter { ch: '(', side: Dir::L })
        ));
        assert!(matches!(
            items[4],
            Ast::Symbol(NodeKind::Delimiter { ch: ')', side: Dir::R })
        ));
        assert_eq!(seq_latex(&items), "\\left(1+2\\right)");
    }

    #[test]
    fn test_mismatched_delimiters_fail() {
        assert!(parse_seq("\\left(1\\right]").is_err());
        assert!(parse_seq("\\right)").is_err());
    }

    #[test]
    fn test_control_sequence_whitespace_name() {
        // `\ ` resolves to the explicit-space symbol
        let items = parse_seq("\\ ").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(seq_latex(&items), "\\ ");
    }

    #[test]
    fn test_named_symbols() {
        let items = parse_seq("\\alpha b").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(seq_latex(&items), "\\alpha b");
    }

    #[test]
    fn test_whitespace_skipped_between_blocks() {
        let items = parse_seq("  1  +  2  ").unwrap();
        assert_eq!(seq_latex(&items), "1+2");
    }

    #[test]
    fn test_unregistered_single_char_fails() {
        let err = parse_seq("x^2").unwrap_err();
        assert_eq!(err.expected, "unknown command: \\^");
    }

    #[test]
    fn test_build_round_trip() {
        let mut tree = Tree::new();
        let items = parse_seq("\\frac{1}{2}+\\sqrt{x}").unwrap();
        let block = build_block(&mut tree, &items);
        assert_eq!(tree.latex(block), "\\frac{1}{2}+\\sqrt{x}");
        tree.assert_valid(block);
    }

    #[test]
    fn test_optional_block_rejects_lone_bracket() {
        let reg = Rc::new(default_registry());
        let p = opt_math_block(&reg);
        let items = p.parse("[3]").unwrap();
        assert_eq!(seq_latex(&items), "3");
        // an empty index is fine; the bracket itself never becomes content
        let items = p.parse("[]").unwrap();
        assert!(items.is_empty());
    }
}
