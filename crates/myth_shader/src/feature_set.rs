//! Enabled Feature Set
//!
//! The set of feature names switched on for one material.
//!
//! Entries are kept sorted by their **string** value (not by Symbol id, which
//! depends on intern order), so iteration is the canonical define order:
//! two materials that enabled the same features in a different order produce
//! byte-identical synthesized sources and share one cache entry.

use std::hash::{Hash, Hasher};

use myth_core::interner::{self, Symbol};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    features: SmallVec<[Symbol; 8]>,
}

impl FeatureSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: SmallVec::new(),
        }
    }

    fn position(&self, sym: Symbol) -> Result<usize, usize> {
        let name = interner::resolve(sym);
        self.features
            .binary_search_by(|&probe| interner::resolve(probe).cmp(name))
    }

    /// Inserts a feature (maintains sorted order). Returns `false` if it was
    /// already present.
    pub fn insert(&mut self, sym: Symbol) -> bool {
        match self.position(sym) {
            Ok(_) => false,
            Err(idx) => {
                self.features.insert(idx, sym);
                true
            }
        }
    }

    /// Removes a feature. Returns `false` if it was not present.
    pub fn remove(&mut self, sym: Symbol) -> bool {
        if let Ok(idx) = self.position(sym) {
            self.features.remove(idx);
            true
        } else {
            false
        }
    }

    /// Sets membership, returns whether the set changed.
    pub fn set(&mut self, sym: Symbol, enabled: bool) -> bool {
        if enabled {
            self.insert(sym)
        } else {
            self.remove(sym)
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, sym: Symbol) -> bool {
        self.position(sym).is_ok()
    }

    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        interner::lookup_in(name, &self.features).is_some()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.features.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates symbols in canonical (name) order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.features.iter().copied()
    }

    /// Iterates names in canonical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        interner::resolve_all(&self.features)
    }

    /// Names in canonical order, ready to hand to
    /// [`synthesize`](crate::synthesis::synthesize).
    #[must_use]
    pub fn to_names(&self) -> SmallVec<[&'static str; 8]> {
        self.names().collect()
    }
}

impl Hash for FeatureSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.features.hash(state);
    }
}

impl PartialEq for FeatureSet {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl Eq for FeatureSet {}

impl FromIterator<Symbol> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut set = Self::new();
        for sym in iter {
            set.insert(sym);
        }
        set
    }
}
