//! Static symbol tables for the default command registry.
//!
//! Each entry maps a control-sequence name (without backslash) to its
//! LaTeX spelling, plain-text rendition, and spoken name. Multi-letter
//! control sequences carry a trailing space in their LaTeX spelling so
//! serialization never glues them onto a following letter.

use phf::phf_map;

/// (ctrl_seq, text, mathspeak)
pub type SymbolEntry = (&'static str, &'static str, &'static str);

/// Plain symbols with no operator spacing.
pub static VANILLA_SYMBOLS: phf::Map<&'static str, SymbolEntry> = phf_map! {
    // lowercase Greek
    "alpha" => ("\\alpha ", "alpha", "alpha"),
    "beta" => ("\\beta ", "beta", "beta"),
    "gamma" => ("\\gamma ", "gamma", "gamma"),
    "delta" => ("\\delta ", "delta", "delta"),
    "epsilon" => ("\\epsilon ", "epsilon", "epsilon"),
    "zeta" => ("\\zeta ", "zeta", "zeta"),
    "eta" => ("\\eta ", "eta", "eta"),
    "theta" => ("\\theta ", "theta", "theta"),
    "iota" => ("\\iota ", "iota", "iota"),
    "kappa" => ("\\kappa ", "kappa", "kappa"),
    "lambda" => ("\\lambda ", "lambda", "lambda"),
    "mu" => ("\\mu ", "mu", "mu"),
    "nu" => ("\\nu ", "nu", "nu"),
    "xi" => ("\\xi ", "xi", "xi"),
    "pi" => ("\\pi ", "pi", "pi"),
    "rho" => ("\\rho ", "rho", "rho"),
    "sigma" => ("\\sigma ", "sigma", "sigma"),
    "tau" => ("\\tau ", "tau", "tau"),
    "upsilon" => ("\\upsilon ", "upsilon", "upsilon"),
    "phi" => ("\\phi ", "phi", "phi"),
    "chi" => ("\\chi ", "chi", "chi"),
    "psi" => ("\\psi ", "psi", "psi"),
    "omega" => ("\\omega ", "omega", "omega"),
    // uppercase Greek
    "Gamma" => ("\\Gamma ", "Gamma", "capital gamma"),
    "Delta" => ("\\Delta ", "Delta", "capital delta"),
    "Theta" => ("\\Theta ", "Theta", "capital theta"),
    "Lambda" => ("\\Lambda ", "Lambda", "capital lambda"),
    "Xi" => ("\\Xi ", "Xi", "capital xi"),
    "Pi" => ("\\Pi ", "Pi", "capital pi"),
    "Sigma" => ("\\Sigma ", "Sigma", "capital sigma"),
    "Upsilon" => ("\\Upsilon ", "Upsilon", "capital upsilon"),
    "Phi" => ("\\Phi ", "Phi", "capital phi"),
    "Psi" => ("\\Psi ", "Psi", "capital psi"),
    "Omega" => ("\\Omega ", "Omega", "capital omega"),
    // miscellany
    "infty" => ("\\infty ", "inf", "infinity"),
    "partial" => ("\\partial ", "partial", "partial"),
    "ldots" => ("\\ldots ", "...", "dot dot dot"),
    "cdots" => ("\\cdots ", "...", "dot dot dot"),
    "prime" => ("\\prime ", "'", "prime"),
    // single-character commands resolved through the same path
    "'" => ("'", "'", "prime"),
    "," => (",", ",", "comma"),
    ":" => (":", ":", "colon"),
    ";" => (";", ";", "semicolon"),
    "?" => ("?", "?", "question mark"),
    "!" => ("!", "!", "factorial"),
    " " => ("\\ ", " ", " "),
};

/// Operators rendered with binary spacing.
pub static BINARY_OPERATORS: phf::Map<&'static str, SymbolEntry> = phf_map! {
    "+" => ("+", "+", "plus"),
    "-" => ("-", "-", "minus"),
    "=" => ("=", "=", "equals"),
    "<" => ("<", "<", "less than"),
    ">" => (">", ">", "greater than"),
    "pm" => ("\\pm ", "+-", "plus or minus"),
    "mp" => ("\\mp ", "-+", "minus or plus"),
    "cdot" => ("\\cdot ", "*", "times"),
    "times" => ("\\times ", "*", "times"),
    "div" => ("\\div ", "/", "divided by"),
    "le" => ("\\le ", "<=", "less than or equal to"),
    "leq" => ("\\leq ", "<=", "less than or equal to"),
    "ge" => ("\\ge ", ">=", "greater than or equal to"),
    "geq" => ("\\geq ", ">=", "greater than or equal to"),
    "ne" => ("\\ne ", "!=", "not equal to"),
    "neq" => ("\\neq ", "!=", "not equal to"),
    "approx" => ("\\approx ", "~=", "approximately equal to"),
    "sim" => ("\\sim ", "~", "similar to"),
    "to" => ("\\to ", "->", "goes to"),
    "rightarrow" => ("\\rightarrow ", "->", "goes to"),
};
