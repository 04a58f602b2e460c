//! LaTeX serialization boundary: the combinator library, the math grammar,
//! the incremental patch engine, and the public parse/cleanup entry points.
//!
//! Parsing is total at this boundary: [`parse_latex`] either produces a
//! detached block or `None` ("render nothing"), never a panic, whatever
//! the input. The precise failure is available through
//! [`try_parse_latex`] for hosts that want to report it.

pub mod combinator;
pub mod grammar;
pub mod patch;

pub use grammar::{build_block, build_into, math_sequence, opt_math_block, seq_latex, Ast};
pub use patch::{classify_for_efficient_update, Classification};

use lazy_static::lazy_static;
use regex::Regex;
use std::rc::Rc;

use crate::core::commands::CommandRegistry;
use crate::core::latex::combinator::eof;
use crate::core::tree::{NodeId, Tree};
use crate::utils::error::ParseFailure;

lazy_static! {
    // a control sequence's trailing space, kept only when a letter follows
    static ref CMD_TRAILING_SPACE: Regex = Regex::new(r"\\[a-zA-Z]+ ").expect("cleanup regex");
}

/// Parse a whole LaTeX math string into a fresh detached block, reporting
/// the furthest failure on error. The entire input must be consumed.
pub fn try_parse_latex(
    tree: &mut Tree,
    registry: &Rc<CommandRegistry>,
    latex: &str,
) -> Result<NodeId, ParseFailure> {
    let items = math_sequence(registry).skip(eof()).parse(latex)?;
    Ok(build_block(tree, &items))
}

/// Total variant of [`try_parse_latex`]: `None` means "render nothing".
pub fn parse_latex(
    tree: &mut Tree,
    registry: &Rc<CommandRegistry>,
    latex: &str,
) -> Option<NodeId> {
    try_parse_latex(tree, registry, latex).ok()
}

/// Export normalization: prune the serialization space after a
/// multi-letter control sequence wherever no letter follows it, so
/// `\pi +1` exports as `\pi+1` while `\pi x` keeps its separator.
pub fn clean_latex(latex: &str) -> String {
    let mut out = String::with_capacity(latex.len());
    let mut last = 0;
    for m in CMD_TRAILING_SPACE.find_iter(latex) {
        let next = latex[m.end()..].chars().next();
        if next.map_or(true, |c| !c.is_ascii_alphabetic()) {
            out.push_str(&latex[last..m.end() - 1]);
            last = m.end();
        }
    }
    out.push_str(&latex[last..]);
    out
}
