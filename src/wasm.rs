//! WASM bindings for mathfield
//!
//! This module provides JavaScript-accessible wrappers around the field
//! controller: set/get LaTeX, keystrokes, typing, and the narrator
//! strings.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::core::field::{Key, MathField};
#[cfg(feature = "wasm")]
use crate::options::FieldOptions;

/// Field options as seen from JavaScript.
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct JsFieldOptions {
    /// Maximum nesting depth for insertions (unlimited when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Group integer digits of five or more into threes
    #[serde(default)]
    pub enable_digit_grouping: bool,
    /// Refuse typed closing brackets that do not match
    #[serde(default)]
    pub restrict_mismatched_brackets: bool,
}

#[cfg(feature = "wasm")]
impl From<JsFieldOptions> for FieldOptions {
    fn from(opts: JsFieldOptions) -> Self {
        FieldOptions {
            max_depth: opts.max_depth,
            enable_digit_grouping: opts.enable_digit_grouping,
            restrict_mismatched_brackets: opts.restrict_mismatched_brackets,
        }
    }
}

/// Result of an editing call, with any diagnostics drained alongside.
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct EditResult {
    /// The field's LaTeX after the operation
    pub latex: String,
    /// Whether the operation was accepted
    pub accepted: bool,
    /// Diagnostics collected during the operation
    pub warnings: Vec<String>,
}

/// Safely serialize a value to JsValue, returning JS `null` on failure.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Install the panic hook so core bugs surface in the console.
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// An editable math field exposed to JavaScript.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct JsMathField {
    inner: MathField,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl JsMathField {
    /// Create a field. `options` may be undefined or a plain object with
    /// any of the option fields.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> JsMathField {
        let opts: JsFieldOptions = if options.is_undefined() || options.is_null() {
            JsFieldOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).unwrap_or_default()
        };
        JsMathField {
            inner: MathField::with_options(opts.into()),
        }
    }

    /// Replace the field's content (incremental when possible).
    #[wasm_bindgen(js_name = setLatex)]
    pub fn set_latex(&mut self, latex: &str) -> JsValue {
        self.inner.set_latex(latex);
        self.edit_result(true)
    }

    /// The field's LaTeX.
    pub fn latex(&self) -> String {
        self.inner.latex()
    }

    /// Plain-text rendition.
    pub fn text(&self) -> String {
        self.inner.text()
    }

    /// Spoken rendition for the accessibility narrator.
    pub fn mathspeak(&self) -> String {
        self.inner.mathspeak()
    }

    /// Type one character at the cursor.
    pub fn write(&mut self, ch: &str) -> JsValue {
        let accepted = match ch.chars().next() {
            Some(c) => self.inner.write(c),
            None => false,
        };
        self.edit_result(accepted)
    }

    /// Insert a LaTeX snippet at the cursor.
    #[wasm_bindgen(js_name = writeLatex)]
    pub fn write_latex(&mut self, latex: &str) -> JsValue {
        let accepted = self.inner.write_latex(latex);
        self.edit_result(accepted)
    }

    /// Handle an editing key: "Left", "Right", "Shift-Left",
    /// "Shift-Right", "Backspace", "Delete", "Home", or "End".
    pub fn keystroke(&mut self, key: &str) -> JsValue {
        let key = match key {
            "Left" => Some(Key::Left),
            "Right" => Some(Key::Right),
            "Shift-Left" => Some(Key::ShiftLeft),
            "Shift-Right" => Some(Key::ShiftRight),
            "Backspace" => Some(Key::Backspace),
            "Delete" => Some(Key::Delete),
            "Home" => Some(Key::Home),
            "End" => Some(Key::End),
            _ => None,
        };
        let accepted = key.is_some();
        if let Some(key) = key {
            self.inner.keystroke(key);
        }
        self.edit_result(accepted)
    }

    /// Select the whole field.
    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) {
        self.inner.select_all();
    }

    /// LaTeX of the current selection, or `null`.
    #[wasm_bindgen(js_name = selectionLatex)]
    pub fn selection_latex(&self) -> Option<String> {
        self.inner.selection_latex()
    }

    fn edit_result(&mut self, accepted: bool) -> JsValue {
        let warnings = self
            .inner
            .take_diagnostics()
            .into_iter()
            .map(|d| d.to_string())
            .collect();
        to_js_value(&EditResult {
            latex: self.inner.latex(),
            accepted,
            warnings,
        })
    }
}
