//! Field configuration.

use serde::{Deserialize, Serialize};

/// Options a field consults while editing. Only knobs the core itself
/// reads are carried here; presentation concerns stay with the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Maximum nesting depth (in blocks) insertions may reach. Deeper
    /// content is truncated on insert; an insertion at a cursor already
    /// past the limit is refused outright.
    /// Default: unlimited
    pub max_depth: Option<usize>,

    /// Group integer digits of five or more into threes (a presentation
    /// hint recomputed after edits).
    /// Default: false
    pub enable_digit_grouping: bool,

    /// Refuse typed closing brackets that do not match the nearest open
    /// bracket.
    /// Default: false
    pub restrict_mismatched_brackets: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            enable_digit_grouping: false,
            restrict_mismatched_brackets: false,
        }
    }
}

impl FieldOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options tuned for live calculator input: grouped digits and a
    /// bounded nesting depth.
    pub fn calculator() -> Self {
        Self {
            max_depth: Some(10),
            enable_digit_grouping: true,
            ..Self::default()
        }
    }

    /// Strict input mode (mismatched brackets refused).
    pub fn strict() -> Self {
        Self {
            restrict_mismatched_brackets: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = FieldOptions::new();
        assert_eq!(opts.max_depth, None);
        assert!(!opts.enable_digit_grouping);
        assert!(!opts.restrict_mismatched_brackets);
    }

    #[test]
    fn test_presets() {
        assert_eq!(FieldOptions::calculator().max_depth, Some(10));
        assert!(FieldOptions::calculator().enable_digit_grouping);
        assert!(FieldOptions::strict().restrict_mismatched_brackets);
    }
}
