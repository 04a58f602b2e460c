//! Error and diagnostic types for the editing engine.
//!
//! Three failure classes exist and they are deliberately kept apart:
//! invariant violations are programming errors and panic at the violation
//! site; parse failures are ordinary values the caller recovers from; and
//! non-fatal conditions (such as an incremental-update fallback) are
//! collected as diagnostics for the host to inspect or log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable LaTeX parse failure.
///
/// Carries the byte position the parser got furthest to and what it
/// expected there. An unrecognized control sequence reports the literal
/// text `unknown command: \name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Byte offset into the input of the furthest failure point.
    pub position: usize,
    /// What the parser expected at that point.
    pub expected: String,
}

impl ParseFailure {
    pub fn new(position: usize, expected: impl Into<String>) -> Self {
        ParseFailure {
            position,
            expected: expected.into(),
        }
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse failure at offset {}: expected {}",
            self.position, self.expected
        )
    }
}

impl std::error::Error for ParseFailure {}

/// Severity level for diagnostics (determines coloring and handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Critical problems - e.g., an internal consistency check failed
    Error,
    /// Recoverable fallbacks - e.g., an incremental update was abandoned
    Warning,
    /// Informational - e.g., an input was cleared after a parse failure
    Info,
}

/// A non-fatal condition recorded during an editing operation.
///
/// Diagnostics are collected by the owning field rather than logged
/// directly, so hosts (CLI, wasm, tests) decide how to surface them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level (for coloring and host policy)
    pub severity: Severity,
    /// Condition kind as string (e.g., "patch fallback", "parse failure")
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// Context (e.g., the LaTeX input involved)
    pub location: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            kind: kind.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, kind, message)
    }

    pub fn info(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Info, kind, message)
    }

    /// Add location context.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Get ANSI color code for this diagnostic's severity.
    pub fn color_code(&self) -> &'static str {
        match self.severity {
            Severity::Error => "\x1b[31m",   // red
            Severity::Warning => "\x1b[33m", // yellow
            Severity::Info => "\x1b[36m",    // cyan
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}
