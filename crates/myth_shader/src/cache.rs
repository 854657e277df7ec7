//! Content-Addressed Variant Cache
//!
//! Deduplicates compiled programs by hashing the **final** synthesized source
//! with xxh3-128. The cache is append-only: once a source has been compiled
//! its handle is kept (and shared by every material asking for the same
//! bytes) until the cache is dropped.
//!
//! One cache is meant to be shared process-wide behind an `Arc`. It is an
//! explicit value rather than a static so each test can start from an empty
//! one.
//!
//! # Locking
//!
//! A single mutex covers lookup, host compile and insert, which guarantees at
//! most one host compile per distinct source even with concurrent callers.
//! Controllers call in while holding their own write lock; the cache never
//! calls back into a controller, so the order is always controller → cache.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

use myth_core::errors::Result;

use crate::backend::ShaderBackend;
use crate::descriptor::VariantDescriptor;
use crate::synthesis::{NameCheck, synthesize};

/// Content hash of a synthesized source.
#[inline]
#[must_use]
pub fn content_hash(source: &str) -> u128 {
    xxh3_128(source.as_bytes())
}

struct CacheInner<P> {
    /// xxh3-128 of synthesized source → compiled program.
    programs: FxHashMap<u128, P>,
    compile_count: u64,
    hit_count: u64,
}

/// Shared mapping from synthesized-source hash to compiled program handle.
pub struct VariantCache<P> {
    inner: Mutex<CacheInner<P>>,
}

impl<P: Clone> Default for VariantCache<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> VariantCache<P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                programs: FxHashMap::default(),
                compile_count: 0,
                hit_count: 0,
            }),
        }
    }

    /// Returns the program compiled from `source`, compiling it on first use.
    ///
    /// Returns `(program, source_hash)`. A host failure leaves the cache
    /// untouched, so a later call retries the compile.
    pub fn get_or_compile<B>(&self, backend: &B, source: &str) -> Result<(P, u128)>
    where
        B: ShaderBackend<Program = P> + ?Sized,
    {
        let hash = content_hash(source);
        let mut inner = self.inner.lock();

        if let Some(program) = inner.programs.get(&hash).cloned() {
            inner.hit_count += 1;
            log::debug!("Variant cache hit {hash:032x}");
            return Ok((program, hash));
        }

        let program = backend.compile(source).inspect_err(|e| {
            log::warn!("Variant compile failed for {hash:032x}: {e}");
        })?;
        inner.programs.insert(hash, program.clone());
        inner.compile_count += 1;
        log::info!(
            "Compiled shader variant {hash:032x} ({} cached)",
            inner.programs.len()
        );

        Ok((program, hash))
    }

    /// Synthesizes the source for a combination and resolves it through the
    /// cache.
    ///
    /// Unlike a controller, this entry point accepts [`NameCheck::Lenient`],
    /// for callers replaying combinations recorded against an older version
    /// of the shader.
    pub fn get_or_compile_variant<B>(
        &self,
        backend: &B,
        source: &str,
        descriptor: &VariantDescriptor,
        enabled: &[&str],
        selected: Option<&str>,
        check: NameCheck,
    ) -> Result<(P, u128)>
    where
        B: ShaderBackend<Program = P> + ?Sized,
    {
        let text = synthesize(source, descriptor, enabled, selected, check)?;
        self.get_or_compile(backend, &text)
    }

    #[must_use]
    pub fn get(&self, hash: u128) -> Option<P> {
        self.inner.lock().programs.get(&hash).cloned()
    }

    #[must_use]
    pub fn contains(&self, hash: u128) -> bool {
        self.inner.lock().programs.contains_key(&hash)
    }

    /// Returns the number of cached programs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Host compiles performed through this cache.
    #[must_use]
    pub fn compile_count(&self) -> u64 {
        self.inner.lock().compile_count
    }

    /// Lookups answered without compiling.
    #[must_use]
    pub fn hit_count(&self) -> u64 {
        self.inner.lock().hit_count
    }
}
