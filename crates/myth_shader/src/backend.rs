//! Host Rendering Backend Interface
//!
//! The variant engine never compiles anything itself. It drives the host
//! through [`ShaderBackend`]:
//!
//! | Method | Role |
//! |--------|------|
//! | [`ShaderBackend::create_program`] | allocate an empty program handle |
//! | [`ShaderBackend::set_program_source`] | hand source to the host, which preprocesses and compiles it |
//! | [`ShaderBackend::program_source`] | read back the preprocessed text (one-shot macro/include pass) |
//! | [`ShaderBackend::bind_program_to_material`] | publish a program to the renderer |
//!
//! [`HeadlessBackend`] is an in-memory implementation used by tools and tests.

use std::fmt;

use myth_core::errors::BackendError;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

/// Capability interface of the host renderer.
pub trait ShaderBackend: Send + Sync {
    /// Opaque compiled program handle. Cloning must be cheap; clones refer to
    /// the same program.
    type Program: Clone + Send + Sync + fmt::Debug;

    /// Opaque handle of the material a program is published to.
    type Material: Clone + Send + Sync + fmt::Debug;

    fn create_program(&self) -> Result<Self::Program, BackendError>;

    fn set_program_source(&self, program: &Self::Program, source: &str) -> Result<(), BackendError>;

    fn program_source(&self, program: &Self::Program) -> Result<String, BackendError>;

    fn bind_program_to_material(
        &self,
        material: &Self::Material,
        program: &Self::Program,
    ) -> Result<(), BackendError>;

    /// Creates a program and compiles `source` into it.
    fn compile(&self, source: &str) -> Result<Self::Program, BackendError> {
        let program = self.create_program()?;
        self.set_program_source(&program, source)?;
        Ok(program)
    }
}

// ─── Headless Backend ─────────────────────────────────────────────────────────

new_key_type! {
    /// Program handle of the [`HeadlessBackend`].
    pub struct ProgramId;
}

/// Material handle of the [`HeadlessBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

const MAX_INCLUDE_DEPTH: usize = 16;

#[derive(Default)]
struct HeadlessState {
    programs: SlotMap<ProgramId, String>,
    includes: FxHashMap<String, String>,
    bindings: FxHashMap<MaterialId, ProgramId>,
    reject_marker: Option<String>,
    compile_count: usize,
    bind_count: usize,
}

/// In-memory backend: "compiling" stores the include-expanded source.
///
/// Its preprocessing pass replaces `#include "<path>"` lines with sources
/// registered through [`HeadlessBackend::register_include`]. It also counts
/// compiles and material bindings, and can be told to reject sources that
/// contain a marker string.
#[derive(Default)]
pub struct HeadlessBackend {
    state: RwLock<HeadlessState>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::register_include`].
    #[must_use]
    pub fn with_include(self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.register_include(path, source);
        self
    }

    pub fn register_include(&self, path: impl Into<String>, source: impl Into<String>) {
        self.state.write().includes.insert(path.into(), source.into());
    }

    /// Makes every later compile of a source containing `marker` fail.
    /// `None` turns failure injection off.
    pub fn reject_sources_containing(&self, marker: Option<&str>) {
        self.state.write().reject_marker = marker.map(str::to_string);
    }

    /// Number of successful `set_program_source` calls.
    #[must_use]
    pub fn compile_count(&self) -> usize {
        self.state.read().compile_count
    }

    /// Number of successful `bind_program_to_material` calls.
    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.state.read().bind_count
    }

    #[must_use]
    pub fn program_count(&self) -> usize {
        self.state.read().programs.len()
    }

    /// The program last published to `material`.
    #[must_use]
    pub fn bound_program(&self, material: MaterialId) -> Option<ProgramId> {
        self.state.read().bindings.get(&material).copied()
    }

    /// Compiled (preprocessed) text of `program`.
    #[must_use]
    pub fn source_of(&self, program: ProgramId) -> Option<String> {
        self.state.read().programs.get(program).cloned()
    }

    fn expand_includes(
        includes: &FxHashMap<String, String>,
        source: &str,
        depth: usize,
    ) -> Result<String, BackendError> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(BackendError::new("include nesting too deep"));
        }

        // Only include lines are rewritten; every other byte is copied as is.
        let mut out = String::with_capacity(source.len());
        for line in source.split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            let Some(rest) = body.trim_start().strip_prefix("#include ") else {
                out.push_str(line);
                continue;
            };

            let path = rest.trim().trim_matches(|c| c == '"' || c == '\'');
            let included = includes
                .get(path)
                .ok_or_else(|| BackendError::new(format!("include not found: {path}")))?;
            let expanded = Self::expand_includes(includes, included, depth + 1)?;
            out.push_str(&expanded);
            if !expanded.is_empty() && !expanded.ends_with('\n') {
                out.push_str(&line[body.len()..]);
            }
        }
        Ok(out)
    }
}

impl ShaderBackend for HeadlessBackend {
    type Program = ProgramId;
    type Material = MaterialId;

    fn create_program(&self) -> Result<ProgramId, BackendError> {
        Ok(self.state.write().programs.insert(String::new()))
    }

    fn set_program_source(&self, program: &ProgramId, source: &str) -> Result<(), BackendError> {
        let mut state = self.state.write();

        if let Some(marker) = &state.reject_marker
            && source.contains(marker.as_str())
        {
            return Err(BackendError::new(format!(
                "source rejected: contains '{marker}'"
            )));
        }

        let expanded = Self::expand_includes(&state.includes, source, 0)?;
        let slot = state
            .programs
            .get_mut(*program)
            .ok_or_else(|| BackendError::new("unknown program handle"))?;
        *slot = expanded;
        state.compile_count += 1;
        Ok(())
    }

    fn program_source(&self, program: &ProgramId) -> Result<String, BackendError> {
        self.state
            .read()
            .programs
            .get(*program)
            .cloned()
            .ok_or_else(|| BackendError::new("unknown program handle"))
    }

    fn bind_program_to_material(
        &self,
        material: &MaterialId,
        program: &ProgramId,
    ) -> Result<(), BackendError> {
        let mut state = self.state.write();
        if !state.programs.contains_key(*program) {
            return Err(BackendError::new("unknown program handle"));
        }
        state.bindings.insert(*material, *program);
        state.bind_count += 1;
        Ok(())
    }
}
