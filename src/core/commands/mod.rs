//! The command registry.
//!
//! A registry maps control-sequence names to command definitions; the
//! grammar resolves every parsed name through the registry it was
//! constructed with. There is no ambient global table: callers either use
//! [`default_registry`] as-is, or clone and extend it before handing it to
//! a field.

pub mod symbols;

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::core::tree::SymbolData;
use symbols::{SymbolEntry, BINARY_OPERATORS, VANILLA_SYMBOLS};

/// What a resolved control sequence builds.
#[derive(Debug, Clone)]
pub enum CommandDef {
    /// A plain symbol node.
    Vanilla(SymbolData),
    /// A binary-operator symbol node.
    BinaryOp(SymbolData),
    /// A digit-like character (the decimal point resolves here).
    DigitChar(char),
    /// A letter with its own command entry (`f` gets dedicated spacing in
    /// presentation, so it resolves through the registry).
    LetterChar(char),
    /// `\frac`, arity 2.
    Fraction,
    /// `\sqrt`, arity 1, or with a bracketed index an n-th root (arity 2).
    SquareRoot,
    /// `\left`: opens a delimiter pair; parses through to the matching
    /// `\right` and yields a multi-node fragment.
    LeftDelimiter,
    /// `\right` outside a `\left` is always a parse failure.
    RightDelimiter,
}

/// Name-to-definition mapping consulted by the parser.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    cmds: IndexMap<String, CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry {
            cmds: IndexMap::new(),
        }
    }

    /// Register or replace a command.
    pub fn insert(&mut self, name: impl Into<String>, def: CommandDef) {
        self.cmds.insert(name.into(), def);
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDef> {
        self.cmds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cmds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cmds.keys().map(String::as_str)
    }
}

fn symbol_data(entry: &SymbolEntry) -> SymbolData {
    SymbolData::new(entry.0, entry.1, entry.2)
}

/// Build the default registry: the static symbol tables plus the
/// structural commands.
pub fn default_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    for (name, entry) in VANILLA_SYMBOLS.entries() {
        reg.insert(*name, CommandDef::Vanilla(symbol_data(entry)));
    }
    for (name, entry) in BINARY_OPERATORS.entries() {
        reg.insert(*name, CommandDef::BinaryOp(symbol_data(entry)));
    }
    reg.insert(".", CommandDef::DigitChar('.'));
    reg.insert("f", CommandDef::LetterChar('f'));
    reg.insert("frac", CommandDef::Fraction);
    reg.insert("sqrt", CommandDef::SquareRoot);
    reg.insert("left", CommandDef::LeftDelimiter);
    reg.insert("right", CommandDef::RightDelimiter);
    reg
}

lazy_static! {
    /// Shared default registry; fields clone it (cheaply enough) so that
    /// per-field extensions never leak across instances.
    pub static ref DEFAULT_REGISTRY: CommandRegistry = default_registry();
}
