//! Variant State Controller
//!
//! Owns the active variant combination of one material and the program
//! compiled for it.
//!
//! # State machine
//!
//! ```text
//! Unbound ──bind(src)──▶ Bound(c) ──enable/disable/select──▶ Bound(c') …
//!    ▲                      │
//!    └────bind(None)────────┘        bind(other) ⇒ Bound(reset)
//! ```
//!
//! Binding (or rebinding) always starts from the empty combination. Editing
//! the bound [`ShaderSource`] counts as a rebind: the next query or mutation
//! notices the new version and re-prepares before it runs.
//!
//! # Locking
//!
//! One `RwLock` guards descriptor, combination and active program together.
//! Mutations hold it in write mode across validate → synthesize → compile →
//! publish; queries take it in read mode. The shared [`VariantCache`] has its
//! own lock and is only ever entered from inside this one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use smallvec::SmallVec;

use myth_core::errors::{Result, VariantError};
use myth_core::interner::{self, Symbol};

use crate::backend::ShaderBackend;
use crate::cache::VariantCache;
use crate::descriptor::VariantDescriptor;
use crate::feature_set::FeatureSet;
use crate::session::VariantEditSession;
use crate::settings::VariantSettings;
use crate::source::ShaderSource;
use crate::synthesis::{NameCheck, synthesize};

/// Everything derived from the currently bound source.
pub(crate) struct BoundState<P> {
    pub(crate) source: Arc<ShaderSource>,
    pub(crate) source_version: u64,
    /// Host-preprocessed text, the base of every synthesized variant.
    pub(crate) base_code: Arc<str>,
    pub(crate) descriptor: Arc<VariantDescriptor>,
    /// Program for the empty combination, compiled eagerly at bind.
    pub(crate) basis: P,

    pub(crate) features: FeatureSet,
    /// `None` means the declared default variant.
    pub(crate) variant: Option<Symbol>,
    pub(crate) program: P,
    /// Cache key of `program`; `None` while the Basis is active.
    pub(crate) program_hash: Option<u128>,
}

impl<P> BoundState<P> {
    /// The source was edited after this state was prepared.
    pub(crate) fn is_stale(&self) -> bool {
        self.source.version() != self.source_version
    }

    fn resolve_features(&self, names: &[&str]) -> Result<SmallVec<[Symbol; 8]>> {
        names
            .iter()
            .map(|name| self.descriptor.require_feature(name))
            .collect()
    }

    /// Validates a selection, folding the declared default into `None`.
    pub(crate) fn resolve_variant(&self, name: Option<&str>) -> Result<Option<Symbol>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let sym = self.descriptor.require_variant(name)?;
        if self.descriptor.default_variant() == Some(sym) {
            Ok(None)
        } else {
            Ok(Some(sym))
        }
    }
}

/// Per-material variant state, safe to share between threads.
pub struct VariantController<B: ShaderBackend> {
    backend: Arc<B>,
    cache: Arc<VariantCache<B::Program>>,
    material: B::Material,
    settings: VariantSettings,
    state: RwLock<Option<BoundState<B::Program>>>,
    recompute_count: AtomicU64,
}

impl<B: ShaderBackend> VariantController<B> {
    pub fn new(backend: Arc<B>, cache: Arc<VariantCache<B::Program>>, material: B::Material) -> Self {
        Self::with_settings(backend, cache, material, VariantSettings::default())
    }

    pub fn with_settings(
        backend: Arc<B>,
        cache: Arc<VariantCache<B::Program>>,
        material: B::Material,
        settings: VariantSettings,
    ) -> Self {
        Self {
            backend,
            cache,
            material,
            settings,
            state: RwLock::new(None),
            recompute_count: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn material(&self) -> &B::Material {
        &self.material
    }

    #[must_use]
    pub fn settings(&self) -> &VariantSettings {
        &self.settings
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<VariantCache<B::Program>> {
        &self.cache
    }

    /// Number of combination changes that produced and published a program.
    /// Binds are not counted.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count.load(Ordering::Relaxed)
    }

    // ── Binding ──────────────────────────────────────────────────────────────

    /// Binds a shader source, or unbinds with `None`.
    ///
    /// Scans the source, compiles and publishes the Basis program and resets
    /// the combination. On failure the previous binding (if any) stays in
    /// place, untouched.
    pub fn bind(&self, source: Option<Arc<ShaderSource>>) -> Result<()> {
        let mut guard = self.state.write();
        match source {
            Some(source) => {
                *guard = Some(self.prepare(source)?);
            }
            None => {
                if guard.take().is_some() {
                    log::debug!("Variant controller {:?} unbound", self.material);
                }
            }
        }
        Ok(())
    }

    /// Rebinds now if the bound source was edited since it was prepared.
    ///
    /// Every query and mutation does this on its own before it runs; calling
    /// it directly only moves the rebind (and any bind error) earlier.
    /// Returns `true` when a rebind happened. The combination is reset, as on
    /// any rebind.
    pub fn sync_source(&self) -> Result<bool> {
        let mut guard = self.state.write();
        if guard.is_none() {
            return Err(VariantError::NotBound);
        }
        self.refresh_locked(&mut guard)
    }

    /// Re-prepares a stale binding in place. A failed rebind leaves the old
    /// binding untouched and is reported again on the next call.
    fn refresh_locked(&self, slot: &mut Option<BoundState<B::Program>>) -> Result<bool> {
        let Some(state) = slot.as_ref().filter(|s| s.is_stale()) else {
            return Ok(false);
        };

        let source = state.source.clone();
        log::debug!(
            "Shader source of {:?} changed (v{} -> v{}), rebinding",
            self.material,
            state.source_version,
            source.version()
        );
        let prepared = self.prepare(source).inspect_err(|e| {
            log::warn!("Rebinding {:?} after a source edit failed: {e}", self.material);
        })?;
        *slot = Some(prepared);
        Ok(true)
    }

    fn prepare(&self, source: Arc<ShaderSource>) -> Result<BoundState<B::Program>> {
        let (code, version) = source.snapshot();
        let descriptor = VariantDescriptor::extract_with_scheme(&code, &self.settings.include_scheme)?;

        // Compiling the raw text doubles as the host's preprocessing pass.
        let basis = self.backend.compile(&code)?;
        let base_code: Arc<str> = self.backend.program_source(&basis)?.into();
        self.backend.bind_program_to_material(&self.material, &basis)?;

        log::debug!(
            "Bound shader {} to {:?}: {} feature(s), {} exclusive variant(s)",
            source.path().unwrap_or("<inline>"),
            self.material,
            descriptor.features().len(),
            descriptor.variants().len()
        );

        Ok(BoundState {
            source,
            source_version: version,
            base_code,
            descriptor: Arc::new(descriptor),
            basis: basis.clone(),
            features: FeatureSet::new(),
            variant: None,
            program: basis,
            program_hash: None,
        })
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.read().is_some()
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub(crate) fn read<R>(&self, f: impl FnOnce(&BoundState<B::Program>) -> Result<R>) -> Result<R> {
        {
            let guard = self.state.read();
            let state = guard.as_ref().ok_or(VariantError::NotBound)?;
            if !state.is_stale() {
                return f(state);
            }
        }

        let mut guard = self.state.write();
        self.refresh_locked(&mut guard)?;
        let state = guard.as_ref().ok_or(VariantError::NotBound)?;
        f(state)
    }

    pub fn source(&self) -> Result<Arc<ShaderSource>> {
        self.read(|s| Ok(s.source.clone()))
    }

    pub fn descriptor(&self) -> Result<Arc<VariantDescriptor>> {
        self.read(|s| Ok(s.descriptor.clone()))
    }

    /// The program currently published to the material.
    pub fn active_program(&self) -> Result<B::Program> {
        self.read(|s| Ok(s.program.clone()))
    }

    pub fn basis_program(&self) -> Result<B::Program> {
        self.read(|s| Ok(s.basis.clone()))
    }

    /// Cache key of the active program, `None` while the Basis is active.
    pub fn active_source_hash(&self) -> Result<Option<u128>> {
        self.read(|s| Ok(s.program_hash))
    }

    pub fn is_feature_enabled(&self, name: &str) -> Result<bool> {
        self.read(|s| {
            let sym = s.descriptor.require_feature(name)?;
            Ok(s.features.contains(sym))
        })
    }

    /// Enabled features in canonical (name) order.
    pub fn enabled_features(&self) -> Result<Vec<&'static str>> {
        self.read(|s| Ok(s.features.names().collect()))
    }

    /// Explicitly selected variant; `None` means the default.
    pub fn selected_variant(&self) -> Result<Option<&'static str>> {
        self.read(|s| Ok(s.variant.map(interner::resolve)))
    }

    /// The variant in effect: the selection, else the declared default.
    pub fn effective_variant(&self) -> Result<Option<&'static str>> {
        self.read(|s| {
            Ok(s.variant
                .or_else(|| s.descriptor.default_variant())
                .map(interner::resolve))
        })
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    pub(crate) fn write<R>(
        &self,
        f: impl FnOnce(&Self, &mut BoundState<B::Program>) -> Result<R>,
    ) -> Result<R> {
        let mut guard = self.state.write();
        self.refresh_locked(&mut guard)?;
        let state = guard.as_mut().ok_or(VariantError::NotBound)?;
        f(self, state)
    }

    pub fn enable_feature(&self, name: &str) -> Result<()> {
        self.set_feature(name, true)
    }

    pub fn disable_feature(&self, name: &str) -> Result<()> {
        self.set_feature(name, false)
    }

    /// Enables or disables one feature; recomputes only if membership changed.
    pub fn set_feature(&self, name: &str, enabled: bool) -> Result<()> {
        self.write(|this, state| this.set_feature_locked(state, name, enabled))
    }

    pub(crate) fn set_feature_locked(
        &self,
        state: &mut BoundState<B::Program>,
        name: &str,
        enabled: bool,
    ) -> Result<()> {
        let sym = state.descriptor.require_feature(name)?;
        if state.features.contains(sym) == enabled {
            return Ok(());
        }
        let mut features = state.features.clone();
        features.set(sym, enabled);
        let variant = state.variant;
        self.recompute(state, features, variant)
    }

    pub fn enable_features(&self, names: &[&str]) -> Result<()> {
        self.set_features(names, true)
    }

    pub fn disable_features(&self, names: &[&str]) -> Result<()> {
        self.set_features(names, false)
    }

    /// Batch form of [`Self::set_feature`]: every name is validated before
    /// anything changes, and the batch recomputes at most once.
    pub fn set_features(&self, names: &[&str], enabled: bool) -> Result<()> {
        self.write(|this, state| {
            let syms = state.resolve_features(names)?;
            let mut features = state.features.clone();
            let mut changed = false;
            for sym in syms {
                changed |= features.set(sym, enabled);
            }
            if !changed {
                return Ok(());
            }
            let variant = state.variant;
            this.recompute(state, features, variant)
        })
    }

    /// Selects an exclusive variant, `None` for the default. Recomputes only
    /// if the selection changed; selecting the declared default is the same
    /// as `None`.
    pub fn set_exclusive_variant(&self, name: Option<&str>) -> Result<()> {
        self.write(|this, state| this.set_exclusive_variant_locked(state, name))
    }

    pub(crate) fn set_exclusive_variant_locked(
        &self,
        state: &mut BoundState<B::Program>,
        name: Option<&str>,
    ) -> Result<()> {
        let variant = state.resolve_variant(name)?;
        if variant == state.variant {
            return Ok(());
        }
        let features = state.features.clone();
        self.recompute(state, features, variant)
    }

    /// Replaces the whole combination at once. Always recomputes exactly
    /// once, even when nothing changed.
    pub fn set_features_and_variant(&self, variant: Option<&str>, features: &[&str]) -> Result<()> {
        self.write(|this, state| {
            let syms = state.resolve_features(features)?;
            let variant = state.resolve_variant(variant)?;
            this.recompute(state, syms.into_iter().collect(), variant)
        })
    }

    /// Opens a batched edit session; see [`VariantEditSession`].
    #[must_use]
    pub fn edit(&self) -> VariantEditSession<'_, B> {
        VariantEditSession::new(self)
    }

    /// Runs `f` on a fresh edit session and applies it.
    ///
    /// Returns whether the combination changed.
    pub fn with_edits(&self, f: impl FnOnce(&mut VariantEditSession<'_, B>)) -> Result<bool> {
        let mut session = self.edit();
        f(&mut session);
        session.apply()
    }

    /// Applies resolved edit intents as one diff. Returns whether a recompute
    /// happened.
    pub(crate) fn apply_intents(&self, intents: &[(String, bool)]) -> Result<bool> {
        self.write(|this, state| {
            let mut features = state.features.clone();
            let mut resolved = SmallVec::<[(Symbol, bool); 8]>::with_capacity(intents.len());
            for (name, enabled) in intents {
                resolved.push((state.descriptor.require_feature(name)?, *enabled));
            }
            for (sym, enabled) in resolved {
                features.set(sym, enabled);
            }
            if features == state.features {
                return Ok(false);
            }
            let variant = state.variant;
            this.recompute(state, features, variant)?;
            Ok(true)
        })
    }

    /// Produces the program for a combination, publishes it and commits the
    /// combination. Nothing is committed if any step fails, so the material
    /// keeps rendering with its last good program.
    pub(crate) fn recompute(
        &self,
        state: &mut BoundState<B::Program>,
        features: FeatureSet,
        variant: Option<Symbol>,
    ) -> Result<()> {
        let (program, hash) = if features.is_empty() && variant.is_none() {
            (state.basis.clone(), None)
        } else {
            let names = features.to_names();
            let text = synthesize(
                &state.base_code,
                &state.descriptor,
                &names,
                variant.map(interner::resolve),
                NameCheck::Strict,
            )?;
            if self.settings.dump_synthesized_sources {
                log::trace!("Synthesized source for {:?}:\n{text}", self.material);
            }
            let (program, hash) = self.cache.get_or_compile(self.backend.as_ref(), &text)?;
            (program, Some(hash))
        };

        self.backend
            .bind_program_to_material(&self.material, &program)
            .inspect_err(|e| log::warn!("Failed to publish variant to {:?}: {e}", self.material))?;

        log::debug!(
            "Material {:?} now uses [{}] variant {}",
            self.material,
            features.names().collect::<Vec<_>>().join(" "),
            variant.map_or("<default>", interner::resolve)
        );

        state.features = features;
        state.variant = variant;
        state.program = program;
        state.program_hash = hash;
        self.recompute_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
