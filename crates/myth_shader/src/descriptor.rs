//! Variant Descriptor Extraction
//!
//! Scans raw shader source for the marker pragmas that declare a shader's
//! variant pools:
//!
//! ```text
//! #pragma features USE_FOG USE_RIM
//! #pragma exclusive_variants MODE_LIT MODE_UNLIT
//! #include "res://shaders/common.glsl"
//! ```
//!
//! Recognition is plain text matching on each line after its leading
//! whitespace. Conditional-compilation directives are not interpreted, so a
//! pragma inside a disabled `#ifdef` block still declares its names. Shader
//! sources in the wild rely on this, keep it.

use myth_core::errors::{Result, VariantError};
use myth_core::interner::{self, Symbol};

use crate::settings::DEFAULT_INCLUDE_SCHEME;

const FEATURES_MARKER: &str = "#pragma features ";
const VARIANTS_MARKER: &str = "#pragma exclusive_variants ";
const INCLUDE_MARKER: &str = "#include ";

/// Declared variant pools of one shader source.
///
/// Both pools are flat ordered sets: every declaration line appends to the
/// same pool, in encounter order, and repeated names are dropped. The pools
/// are independent, a name may appear in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantDescriptor {
    features: Vec<Symbol>,
    variants: Vec<Symbol>,
    includes: Vec<String>,
}

impl VariantDescriptor {
    /// Scans `source` accepting only `res://` includes.
    pub fn extract(source: &str) -> Result<Self> {
        Self::extract_with_scheme(source, DEFAULT_INCLUDE_SCHEME)
    }

    /// Scans `source`, requiring every `#include` path to start with
    /// `include_scheme`.
    ///
    /// Fails on the first malformed name or foreign include path; nothing is
    /// returned for a partially scanned source.
    pub fn extract_with_scheme(source: &str, include_scheme: &str) -> Result<Self> {
        let mut descriptor = Self::default();

        for (index, raw_line) in source.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim_start();

            if let Some(rest) = line.strip_prefix(FEATURES_MARKER) {
                append_names(&mut descriptor.features, rest, line_no)?;
            } else if let Some(rest) = line.strip_prefix(VARIANTS_MARKER) {
                append_names(&mut descriptor.variants, rest, line_no)?;
            } else if let Some(rest) = line.strip_prefix(INCLUDE_MARKER) {
                let path = unquote(rest.trim());
                if !path.starts_with(include_scheme) {
                    return Err(VariantError::UnsupportedIncludeScheme {
                        path: path.to_string(),
                        line: line_no,
                        scheme: include_scheme.to_string(),
                    });
                }
                descriptor.includes.push(path.to_string());
            }
        }

        Ok(descriptor)
    }

    /// Declared features, in declaration order.
    #[inline]
    #[must_use]
    pub fn features(&self) -> &[Symbol] {
        &self.features
    }

    /// Declared exclusive variants, in declaration order.
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[Symbol] {
        &self.variants
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        interner::resolve_all(&self.features)
    }

    pub fn variant_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        interner::resolve_all(&self.variants)
    }

    /// Validated include paths, quotes stripped.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// The first declared exclusive variant.
    #[inline]
    #[must_use]
    pub fn default_variant(&self) -> Option<Symbol> {
        self.variants.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn has_feature(&self, sym: Symbol) -> bool {
        self.features.contains(&sym)
    }

    #[inline]
    #[must_use]
    pub fn has_variant(&self, sym: Symbol) -> bool {
        self.variants.contains(&sym)
    }

    /// Symbol of a declared feature, `None` if `name` is not in the pool.
    #[must_use]
    pub fn feature_symbol(&self, name: &str) -> Option<Symbol> {
        interner::lookup_in(name, &self.features)
    }

    /// Symbol of a declared variant, `None` if `name` is not in the pool.
    #[must_use]
    pub fn variant_symbol(&self, name: &str) -> Option<Symbol> {
        interner::lookup_in(name, &self.variants)
    }

    /// Same as [`Self::feature_symbol`] but reports `UnknownFeature`.
    pub fn require_feature(&self, name: &str) -> Result<Symbol> {
        self.feature_symbol(name)
            .ok_or_else(|| VariantError::UnknownFeature(name.to_string()))
    }

    /// Same as [`Self::variant_symbol`] but reports `UnknownVariant`.
    pub fn require_variant(&self, name: &str) -> Result<Symbol> {
        self.variant_symbol(name)
            .ok_or_else(|| VariantError::UnknownVariant(name.to_string()))
    }

    /// True when the source declares neither features nor variants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty() && self.variants.is_empty()
    }
}

/// Checks `name` against `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn append_names(pool: &mut Vec<Symbol>, rest: &str, line: usize) -> Result<()> {
    for token in rest.split_whitespace() {
        if !is_valid_identifier(token) {
            return Err(VariantError::InvalidVariantName {
                name: token.to_string(),
                line,
            });
        }
        let sym = interner::intern(token);
        if !pool.contains(&sym) {
            pool.push(sym);
        }
    }
    Ok(())
}

/// Strips one layer of matching single or double quotes.
fn unquote(path: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = path
            .strip_prefix(quote)
            .and_then(|p| p.strip_suffix(quote))
        {
            return inner;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(it: impl Iterator<Item = &'static str>) -> Vec<&'static str> {
        it.collect()
    }

    #[test]
    fn test_pools_merge_across_lines() {
        let src = "\
#pragma features A B
  #pragma features B C
#pragma exclusive_variants X
\t#pragma exclusive_variants Y X
void main() {}
";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert_eq!(names(desc.feature_names()), ["A", "B", "C"]);
        assert_eq!(names(desc.variant_names()), ["X", "Y"]);
        assert_eq!(desc.default_variant().map(interner::resolve), Some("X"));
    }

    #[test]
    fn test_same_name_in_both_pools() {
        let src = "#pragma features SHARED\n#pragma exclusive_variants SHARED\n";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert!(desc.feature_symbol("SHARED").is_some());
        assert!(desc.variant_symbol("SHARED").is_some());
    }

    #[test]
    fn test_markers_are_exact_prefixes() {
        // No trailing space after the keyword, wrong case, or trailing text on
        // the keyword: all plain lines.
        let src = "#pragma features\n#PRAGMA features A\n#pragma featuresX B\n// #pragma features C\n";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert!(desc.is_empty());
    }

    #[test]
    fn test_pragmas_inside_disabled_blocks_still_count() {
        let src = "#ifdef NEVER\n#pragma features HIDDEN\n#endif\n";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert_eq!(names(desc.feature_names()), ["HIDDEN"]);
    }

    #[test]
    fn test_extra_whitespace_between_tokens() {
        let src = "#pragma features    A\t\tB   \n";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert_eq!(names(desc.feature_names()), ["A", "B"]);
    }

    #[test]
    fn test_invalid_identifier_reports_line() {
        let src = "void f();\n#pragma features OK 1BAD\n";
        let err = VariantDescriptor::extract(src).unwrap_err();
        assert_eq!(
            err,
            VariantError::InvalidVariantName {
                name: "1BAD".to_string(),
                line: 2
            }
        );
    }

    #[test]
    fn test_identifier_grammar() {
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("USE_MAP_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2D"));
        assert!(!is_valid_identifier("has-dash"));
        assert!(!is_valid_identifier("ÜBER"));
    }

    #[test]
    fn test_include_quotes_are_stripped() {
        let src = "#include \"res://a.glsl\"\n#include 'res://b.glsl'\n#include res://c.glsl\n";
        let desc = VariantDescriptor::extract(src).unwrap();
        assert_eq!(desc.includes(), ["res://a.glsl", "res://b.glsl", "res://c.glsl"]);
    }

    #[test]
    fn test_foreign_include_scheme_is_rejected() {
        let src = "#pragma features A\n#include \"user://evil.glsl\"\n";
        let err = VariantDescriptor::extract(src).unwrap_err();
        assert!(matches!(
            err,
            VariantError::UnsupportedIncludeScheme { ref path, line: 2, .. } if path == "user://evil.glsl"
        ));
    }

    #[test]
    fn test_mismatched_quotes_are_kept() {
        let src = "#include \"res://a.glsl'\n";
        let err = VariantDescriptor::extract(src).unwrap_err();
        assert!(matches!(err, VariantError::UnsupportedIncludeScheme { .. }));
    }

    #[test]
    fn test_custom_scheme() {
        let src = "#include \"engine://lighting.glsl\"\n";
        let desc = VariantDescriptor::extract_with_scheme(src, "engine://").unwrap();
        assert_eq!(desc.includes(), ["engine://lighting.glsl"]);
        assert!(VariantDescriptor::extract(src).is_err());
    }
}
