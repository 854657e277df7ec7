//! Inspector Reflection
//!
//! Exposes a controller's combination as a flat list of editable fields for
//! a property inspector, and maps edits of those fields back onto the
//! controller:
//!
//! | Field | Kind | Maps to |
//! |-------|------|---------|
//! | `features/<name>` | bool, one per declared feature | enable / disable |
//! | `variant` | enum over the declared variants (only if any) | select |
//! | `shader` | hidden source reference | bind |

use std::sync::Arc;

use myth_core::errors::{Result, VariantError};
use myth_core::interner;

use crate::backend::ShaderBackend;
use crate::controller::VariantController;
use crate::source::ShaderSource;

pub const FEATURE_FIELD_PREFIX: &str = "features/";
pub const VARIANT_FIELD: &str = "variant";
pub const SOURCE_FIELD: &str = "shader";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    /// Enum with the listed options, in declaration order.
    Enum(Vec<&'static str>),
    Source,
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    Bool(bool),
    /// Index into the options of a [`PropertyKind::Enum`].
    Index(usize),
    Source(Arc<ShaderSource>),
}

#[derive(Debug, Clone)]
pub struct PropertyField {
    pub name: String,
    pub kind: PropertyKind,
    pub value: PropertyValue,
    /// Stored for persistence but not shown in the inspector.
    pub hidden: bool,
}

impl<B: ShaderBackend> VariantController<B> {
    /// Lists the editable fields of the bound shader.
    pub fn describe(&self) -> Result<Vec<PropertyField>> {
        self.read(|state| {
            let descriptor = &state.descriptor;

            let mut fields = Vec::with_capacity(descriptor.features().len() + 2);
            for &sym in descriptor.features() {
                fields.push(PropertyField {
                    name: format!("{FEATURE_FIELD_PREFIX}{}", interner::resolve(sym)),
                    kind: PropertyKind::Bool,
                    value: PropertyValue::Bool(state.features.contains(sym)),
                    hidden: false,
                });
            }

            if !descriptor.variants().is_empty() {
                let selected = state
                    .variant
                    .and_then(|v| descriptor.variants().iter().position(|&s| s == v))
                    .unwrap_or(0);
                fields.push(PropertyField {
                    name: VARIANT_FIELD.to_string(),
                    kind: PropertyKind::Enum(descriptor.variant_names().collect()),
                    value: PropertyValue::Index(selected),
                    hidden: false,
                });
            }

            fields.push(PropertyField {
                name: SOURCE_FIELD.to_string(),
                kind: PropertyKind::Source,
                value: PropertyValue::Source(state.source.clone()),
                hidden: true,
            });

            Ok(fields)
        })
    }

    /// Applies an inspector edit of one field returned by [`Self::describe`].
    pub fn set_property(&self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, value) {
            (SOURCE_FIELD, PropertyValue::Source(source)) => self.bind(Some(source)),
            (VARIANT_FIELD, PropertyValue::Index(index)) => self.write(|this, state| {
                let variant = state
                    .descriptor
                    .variants()
                    .get(index)
                    .copied()
                    .ok_or_else(|| VariantError::InvalidProperty(name.to_string()))?;
                this.set_exclusive_variant_locked(state, Some(interner::resolve(variant)))
            }),
            (name, PropertyValue::Bool(enabled)) => match name.strip_prefix(FEATURE_FIELD_PREFIX) {
                Some(feature) => self.set_feature(feature, enabled),
                None => Err(VariantError::InvalidProperty(name.to_string())),
            },
            (name, _) => Err(VariantError::InvalidProperty(name.to_string())),
        }
    }
}
