//! Variant Source Synthesis
//!
//! Builds the specialized source for one combination by prefixing the base
//! source with a define header:
//!
//! ```text
//! #define USE_FOG
//! #define MODE_UNLIT
//!
//! <base source, verbatim>
//! ```
//!
//! The output is a pure function of its inputs. The cache keys on these bytes,
//! so callers must pass `enabled` in a stable order; [`FeatureSet`] iterates
//! in canonical name order for exactly this purpose.
//!
//! [`FeatureSet`]: crate::feature_set::FeatureSet

use std::borrow::Cow;

use myth_core::errors::{Result, VariantError};
use smallvec::SmallVec;

use crate::descriptor::VariantDescriptor;

/// How names outside the declared pools are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCheck {
    /// Reject with `UnknownFeature` / `UnknownVariant`, produce nothing.
    #[default]
    Strict,
    /// Skip the offending name and keep going.
    Lenient,
}

/// Synthesizes the source for `enabled` features and the `selected` variant.
///
/// Returns the base source borrowed, untouched, when there is nothing to
/// define: no features and either no variant or the declared default.
pub fn synthesize<'a>(
    source: &'a str,
    descriptor: &VariantDescriptor,
    enabled: &[&str],
    selected: Option<&str>,
    check: NameCheck,
) -> Result<Cow<'a, str>> {
    let mut defines: SmallVec<[&str; 8]> = SmallVec::with_capacity(enabled.len());
    for &name in enabled {
        if descriptor.feature_symbol(name).is_none() {
            match check {
                NameCheck::Strict => return Err(VariantError::UnknownFeature(name.to_string())),
                NameCheck::Lenient => continue,
            }
        }
        if !defines.contains(&name) {
            defines.push(name);
        }
    }

    let selected = match selected {
        Some(name) if descriptor.variant_symbol(name).is_none() => match check {
            NameCheck::Strict => return Err(VariantError::UnknownVariant(name.to_string())),
            NameCheck::Lenient => None,
        },
        other => other,
    };

    let is_default = match (selected, descriptor.default_variant()) {
        (None, _) => true,
        (Some(name), Some(default)) => descriptor.variant_symbol(name) == Some(default),
        (Some(_), None) => false,
    };
    if defines.is_empty() && is_default {
        return Ok(Cow::Borrowed(source));
    }

    let header_len: usize = defines
        .iter()
        .chain(selected.iter())
        .map(|name| name.len() + "#define \n".len())
        .sum();
    let mut out = String::with_capacity(header_len + 1 + source.len());
    for name in defines.iter().chain(selected.iter()) {
        out.push_str("#define ");
        out.push_str(name);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(source);

    Ok(Cow::Owned(out))
}
