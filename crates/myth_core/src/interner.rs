//! Shader Name Table
//!
//! Feature and variant identifiers declared by marker pragmas are interned
//! once at extraction time. From then on pools and enabled sets hold compact
//! [`Symbol`]s; strings only come back when a define header is written or a
//! name is reported to the caller.
//!
//! Lookups by name never intern. A name nobody ever declared has no Symbol,
//! so it is rejected without touching the table.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Interned feature or variant identifier.
///
/// Ordering between symbols follows intern order, not lexicographic order.
pub type Symbol = Spur;

/// Interns a declared identifier.
#[inline]
pub fn intern(name: &str) -> Symbol {
    NAMES.get_or_intern(name)
}

/// Symbol of `name` if it is a member of `pool`.
#[inline]
pub fn lookup_in(name: &str, pool: &[Symbol]) -> Option<Symbol> {
    NAMES.get(name).filter(|sym| pool.contains(sym))
}

#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    NAMES.resolve(&sym)
}

/// Names of `pool`, in pool order.
pub fn resolve_all(pool: &[Symbol]) -> impl Iterator<Item = &'static str> + '_ {
    pool.iter().map(|&sym| resolve(sym))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_names_share_symbols() {
        let fog = intern("USE_FOG");
        assert_eq!(intern("USE_FOG"), fog);
        assert_ne!(intern("USE_RIM"), fog);
        assert_eq!(resolve(fog), "USE_FOG");
    }

    #[test]
    fn test_lookup_is_scoped_to_pool() {
        let lit = intern("MODE_LIT");
        let unlit = intern("MODE_UNLIT");
        let pool = [lit];

        assert_eq!(lookup_in("MODE_LIT", &pool), Some(lit));
        assert_eq!(lookup_in("MODE_UNLIT", &pool), None);
        assert_eq!(lookup_in("NEVER_DECLARED_ANYWHERE", &[lit, unlit]), None);
    }

    #[test]
    fn test_resolve_all_keeps_pool_order() {
        let pool = [intern("ZETA"), intern("ALPHA")];
        assert_eq!(resolve_all(&pool).collect::<Vec<_>>(), ["ZETA", "ALPHA"]);
    }
}
