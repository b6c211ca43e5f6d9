//! Module driver: emits independent functions in parallel

use crate::emitter::emit;
use crate::error::{CodegenError, Result};
use crate::op::FunctionSource;
use crate::registry::LoweringRegistry;
use feltir_spec::{CodegenConfig, Function, Module};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Result of emitting a module: the functions that succeeded plus the
/// errors of those that did not, both in source order
#[derive(Debug)]
pub struct ModuleOutput {
    pub module: Module,
    pub errors: Vec<CodegenError>,
}

impl ModuleOutput {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the functions that failed
    pub fn failed(&self) -> Vec<&str> {
        self.errors.iter().filter_map(|e| e.function()).collect()
    }
}

/// Emit every function on the rayon pool.
///
/// Each worker builds its function with its own lifecycle manager; the
/// registry is only read. A failing function does not stop the others.
pub fn emit_module(
    sources: &[FunctionSource],
    registry: &LoweringRegistry,
    config: CodegenConfig,
) -> Result<ModuleOutput> {
    config.validate()?;

    let results: Vec<std::result::Result<Function, CodegenError>> = sources
        .par_iter()
        .map(|source| emit(source, registry, config))
        .collect();

    let mut module = Module::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(func) => module.push(func),
            Err(err) => {
                warn!(error = %err, "function failed");
                errors.push(err);
            }
        }
    }

    debug!(
        emitted = module.len(),
        failed = errors.len(),
        helpers = module.helpers().len(),
        "module emitted"
    );
    Ok(ModuleOutput { module, errors })
}
