//! Myth Variants
//!
//! Compile-time shader variant selection for Myth materials. This umbrella
//! crate re-exports the workspace crates:
//!
//! - [`errors`] / [`interner`] from `myth_core`
//! - the variant engine from `myth_shader`
//!
//! ```rust,ignore
//! use myth_variants::prelude::*;
//! ```

pub use myth_core::{errors, interner};
pub use myth_shader::*;

pub use errors::{BackendError, Result, VariantError};

/// Commonly used types in one import.
pub mod prelude {
    pub use myth_core::errors::{BackendError, Result, VariantError};
    pub use myth_shader::{
        HeadlessBackend, MaterialId, NameCheck, ProgramId, PropertyField, PropertyKind,
        PropertyValue, ShaderBackend, ShaderSource, VariantCache, VariantController,
        VariantDescriptor, VariantEditSession, VariantSettings, VariantState,
    };
}
