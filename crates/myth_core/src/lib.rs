//! Core types shared by the myth variant crates: the error taxonomy and the
//! global string interner.

pub mod errors;
pub mod interner;

pub use errors::{BackendError, Result, VariantError};
pub use interner::Symbol;
