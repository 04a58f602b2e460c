//! The editing core: tree model, cursor/selection engine, LaTeX parsing,
//! and the incremental patch engine.

pub mod commands;
pub mod cursor;
pub mod direction;
pub mod field;
pub mod latex;
pub mod tree;
