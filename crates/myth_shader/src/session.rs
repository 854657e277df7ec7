//! Batched Variant Edits
//!
//! ```rust,ignore
//! let mut session = controller.edit();
//! session.enable("USE_FOG").enable("USE_RIM").disable("USE_FOG");
//! session.apply()?; // one recompute: only USE_RIM ends up enabled
//! ```
//!
//! Intents are only recorded until [`VariantEditSession::apply`]; live state
//! is untouched meanwhile. A later intent for the same feature replaces the
//! earlier one. On apply every name is validated first, so an unknown name
//! rejects the whole batch.

use myth_core::errors::{Result, VariantError};
use smallvec::SmallVec;

use crate::backend::ShaderBackend;
use crate::controller::VariantController;

pub struct VariantEditSession<'a, B: ShaderBackend> {
    controller: &'a VariantController<B>,
    intents: SmallVec<[(String, bool); 8]>,
    applied: bool,
}

impl<'a, B: ShaderBackend> VariantEditSession<'a, B> {
    pub(crate) fn new(controller: &'a VariantController<B>) -> Self {
        Self {
            controller,
            intents: SmallVec::new(),
            applied: false,
        }
    }

    pub fn enable(&mut self, name: &str) -> &mut Self {
        self.set(name, true)
    }

    pub fn disable(&mut self, name: &str) -> &mut Self {
        self.set(name, false)
    }

    /// Records an intent, replacing any earlier one for the same name.
    pub fn set(&mut self, name: &str, enabled: bool) -> &mut Self {
        self.intents.retain(|(n, _)| n.as_str() != name);
        self.intents.push((name.to_string(), enabled));
        self
    }

    /// Pending intents, oldest first.
    pub fn intents(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.intents.iter().map(|(n, e)| (n.as_str(), *e))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Applies all intents as one diff against the live combination.
    ///
    /// Returns whether the combination changed (and was recomputed). The
    /// session is closed by the first call whatever its outcome; a second
    /// call fails with `SessionAlreadyApplied`.
    pub fn apply(&mut self) -> Result<bool> {
        if self.applied {
            return Err(VariantError::SessionAlreadyApplied);
        }
        self.applied = true;
        self.controller.apply_intents(&self.intents)
    }
}
