//! Error Types
//!
//! This module defines the error types used throughout the variant engine.
//!
//! # Overview
//!
//! The main error type [`VariantError`] covers every failure mode:
//! - Malformed marker pragmas and include directives (bind time)
//! - References to names outside a shader's declared pools
//! - Use of a controller before any source is bound
//! - Failures reported by the host rendering backend
//!
//! None of these are transient: they are deterministic input errors and are
//! never retried.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, VariantError>`.
//!
//! ```rust,ignore
//! use myth_core::errors::{Result, VariantError};
//!
//! fn bind() -> Result<()> {
//!     Err(VariantError::NotBound)
//! }
//! ```

use thiserror::Error;

/// Error reported by a host rendering backend.
///
/// The variant engine never inspects the message; it is carried verbatim to
/// the caller that triggered the compile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The main error type for shader variant resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    // ========================================================================
    // Bind-time (source scanning) errors
    // ========================================================================
    /// A marker pragma declared a name that is not a valid identifier.
    #[error("invalid variant name '{name}' on line {line}")]
    InvalidVariantName {
        /// The offending token
        name: String,
        /// 1-based source line
        line: usize,
    },

    /// An `#include` directive used a path outside the engine-root scheme.
    #[error("unsupported include path '{path}' on line {line} (expected scheme '{scheme}')")]
    UnsupportedIncludeScheme {
        /// The include path with quotes stripped
        path: String,
        /// 1-based source line
        line: usize,
        /// The scheme that is accepted
        scheme: String,
    },

    // ========================================================================
    // Combination errors
    // ========================================================================
    /// The name is not declared in the shader's feature pool.
    #[error("unknown shader feature '{0}'")]
    UnknownFeature(String),

    /// The name is not declared in the shader's exclusive-variant pool.
    #[error("unknown exclusive variant '{0}'")]
    UnknownVariant(String),

    /// An inspector edit named a property the material does not expose, or
    /// carried a value of the wrong kind.
    #[error("unknown or mistyped property '{0}'")]
    InvalidProperty(String),

    // ========================================================================
    // Usage errors
    // ========================================================================
    /// The controller has no shader source bound.
    #[error("no shader source is bound")]
    NotBound,

    /// A batched edit session was applied a second time.
    #[error("variant edit session was already applied")]
    SessionAlreadyApplied,

    // ========================================================================
    // Host errors
    // ========================================================================
    /// Compilation (or binding) failed inside the host backend.
    #[error("host shader compilation failed: {0}")]
    HostCompileFailure(#[from] BackendError),
}

/// Alias for `Result<T, VariantError>`.
pub type Result<T> = std::result::Result<T, VariantError>;
