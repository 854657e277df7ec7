//! Shader Source Resource
//!
//! The user-authored text a controller binds to. Edits go through
//! [`ShaderSource::set_code`], which bumps a version counter; bound
//! controllers compare it against the version they prepared and rebind
//! before their next operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// User-authored shader text, as loaded from disk or typed in an editor.
///
/// The variant engine only ever reads it.
#[derive(Debug)]
pub struct ShaderSource {
    path: Option<String>,
    code: RwLock<Arc<str>>,
    version: AtomicU64,
}

impl ShaderSource {
    pub fn new(code: impl Into<Arc<str>>) -> Self {
        Self {
            path: None,
            code: RwLock::new(code.into()),
            version: AtomicU64::new(0),
        }
    }

    /// Source loaded from a resource path, kept for persistence.
    pub fn with_path(path: impl Into<String>, code: impl Into<Arc<str>>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(code)
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Snapshot of the current text.
    #[must_use]
    pub fn code(&self) -> Arc<str> {
        self.code.read().clone()
    }

    /// Replaces the text and marks the source as changed.
    pub fn set_code(&self, code: impl Into<Arc<str>>) {
        let mut guard = self.code.write();
        *guard = code.into();
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Text together with the version it belongs to.
    #[must_use]
    pub fn snapshot(&self) -> (Arc<str>, u64) {
        let code = self.code.read();
        (code.clone(), self.version.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
