//! Saved Variant Combination
//!
//! The persisted form of a material's combination. An absent `variant` means
//! "use the default", so a shader whose first declared variant changes keeps
//! loading correctly.
//!
//! ```json
//! { "variant": "MODE_UNLIT", "features": ["USE_FOG", "USE_RIM"] }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use myth_core::errors::Result;
use myth_core::interner;

use crate::backend::ShaderBackend;
use crate::controller::VariantController;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
}

impl VariantState {
    /// True for the empty combination (Basis program).
    #[must_use]
    pub fn is_basis(&self) -> bool {
        self.variant.is_none() && self.features.is_empty()
    }
}

impl<B: ShaderBackend> VariantController<B> {
    /// Captures the current combination for persistence.
    pub fn save_state(&self) -> Result<VariantState> {
        self.read(|state| {
            Ok(VariantState {
                variant: state.variant.map(|sym| interner::resolve(sym).to_string()),
                features: state.features.names().map(str::to_string).collect(),
            })
        })
    }

    /// Reapplies a saved combination with one recompute, exactly like
    /// [`Self::set_features_and_variant`]. Names the bound shader no longer
    /// declares are rejected.
    pub fn restore_state(&self, saved: &VariantState) -> Result<()> {
        let features: Vec<&str> = saved.features.iter().map(String::as_str).collect();
        self.set_features_and_variant(saved.variant.as_deref(), &features)
    }
}
