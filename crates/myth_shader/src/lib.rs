//! Compile-time shader variant selection.
//!
//! Shaders declare boolean *features* and mutually exclusive *variants* with
//! marker pragmas. Each combination a material asks for is compiled once
//! into its own program by prefixing the source with `#define` lines; the
//! resulting programs are shared between materials through a
//! content-addressed [`VariantCache`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_shader::{HeadlessBackend, MaterialId, ShaderSource, VariantCache, VariantController};
//!
//! let backend = Arc::new(HeadlessBackend::new());
//! let cache = Arc::new(VariantCache::new());
//! let material = VariantController::new(backend, cache, MaterialId(0));
//!
//! material.bind(Some(Arc::new(ShaderSource::new(
//!     "#pragma features USE_FOG\nvoid main() {}\n",
//! ))))?;
//! material.enable_feature("USE_FOG")?;
//! ```

pub mod backend;
pub mod cache;
pub mod controller;
pub mod descriptor;
pub mod feature_set;
pub mod persistence;
pub mod reflection;
pub mod session;
pub mod settings;
pub mod source;
pub mod synthesis;

pub use backend::{HeadlessBackend, MaterialId, ProgramId, ShaderBackend};
pub use cache::{VariantCache, content_hash};
pub use controller::VariantController;
pub use descriptor::{VariantDescriptor, is_valid_identifier};
pub use feature_set::FeatureSet;
pub use persistence::VariantState;
pub use reflection::{PropertyField, PropertyKind, PropertyValue};
pub use session::VariantEditSession;
pub use settings::VariantSettings;
pub use source::ShaderSource;
pub use synthesis::{NameCheck, synthesize};
