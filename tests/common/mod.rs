//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use myth_variants::prelude::*;

/// Declares features `A B` and exclusive variants `X Y`.
pub const SCENARIO_SRC: &str = "\
#pragma features A B
#pragma exclusive_variants X Y
void main() {
#ifdef A
    color = vec4(1.0);
#endif
}
";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub backend: Arc<HeadlessBackend>,
    pub cache: Arc<VariantCache<ProgramId>>,
}

impl Fixture {
    pub fn new() -> Self {
        init_logger();
        Self {
            backend: Arc::new(HeadlessBackend::new()),
            cache: Arc::new(VariantCache::new()),
        }
    }

    pub fn controller(&self, material: u64) -> VariantController<HeadlessBackend> {
        VariantController::new(self.backend.clone(), self.cache.clone(), MaterialId(material))
    }

    /// A controller already bound to `src`.
    pub fn bound(&self, material: u64, src: &str) -> VariantController<HeadlessBackend> {
        let controller = self.controller(material);
        controller
            .bind(Some(Arc::new(ShaderSource::new(src))))
            .expect("fixture source should bind");
        controller
    }

    /// Compiled text of the controller's active program.
    pub fn active_source(&self, controller: &VariantController<HeadlessBackend>) -> String {
        let program = controller.active_program().expect("bound");
        self.backend.source_of(program).expect("program exists")
    }
}
