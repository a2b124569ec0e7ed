//! Rule-constrained weighted generator for layered trait collections
//!
//! Each item picks one element per layer, honouring dependency and exclusion
//! rules between layers, and is identified by its DNA: one `id:filename`
//! token per layer. Items whose normalized DNA was already produced are
//! rejected and recomposed, up to a configured tolerance.

#![forbid(unsafe_code)]

/// Layer catalogs, elements and selections
pub mod catalog;
/// Composition passes, DNA, uniqueness and batch orchestration
pub mod generation;
/// Input/output operations and error handling
pub mod io;
/// Dependency and exclusion rules between layers
pub mod rules;

pub use io::error::{GenerationError, Result};
