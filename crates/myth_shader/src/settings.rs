//! Variant Engine Settings
//!
//! ```rust,ignore
//! use myth_shader::VariantSettings;
//!
//! let settings = VariantSettings {
//!     dump_synthesized_sources: true,
//!     ..Default::default()
//! };
//! ```

use std::borrow::Cow;

/// Default scheme for engine-root-relative resources.
pub const DEFAULT_INCLUDE_SCHEME: &str = "res://";

/// Configuration shared by the extractor and the state controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSettings {
    /// The only path scheme `#include` directives may use.
    pub include_scheme: Cow<'static, str>,

    /// Logs every synthesized source at `trace` level before it is compiled.
    pub dump_synthesized_sources: bool,
}

impl Default for VariantSettings {
    fn default() -> Self {
        Self {
            include_scheme: Cow::Borrowed(DEFAULT_INCLUDE_SCHEME),
            dump_synthesized_sources: false,
        }
    }
}
