//! # Felt IR Codegen
//!
//! Lowers typed stack-machine operation streams into Felt IR functions.
//!
//! ## Pipeline
//!
//! - [`OpStream`] / [`FunctionSource`]: the input operations for one function
//! - [`ValueLifecycle`]: per-function handle arena (dup, store_temp, rename)
//! - [`CfgBuilder`]: labels to blocks, branch arguments to block parameters
//! - [`FunctionEmitter`]: `Empty -> Declaring -> Building -> Sealed`
//! - [`emit_module`]: parallel emission with per-function failures
//!
//! ## Example
//!
//! ```rust
//! use feltir_codegen::{compile, conditional_transform};
//! use feltir_spec::Felt;
//!
//! let func = compile(&conditional_transform("double", Felt::from_u64(2))).unwrap();
//! assert_eq!(func.name(), "double");
//! ```

pub mod cfg;
pub mod emitter;
pub mod error;
pub mod libfuncs;
pub mod lifecycle;
pub mod module;
pub mod op;
pub mod pattern;
pub mod registry;

pub use cfg::{CfgBuilder, CfgSummary};
pub use emitter::{emit, EmitterState, FunctionEmitter};
pub use error::{CodegenError, MalformedKind, Result};
pub use lifecycle::{Handle, HandleState, Storage, ValueLifecycle};
pub use module::{emit_module, ModuleOutput};
pub use op::{FunctionSource, Label, OpStream, StackOp, VarId};
pub use pattern::{conditional_transform, if_zero};
pub use registry::{default_registry, LibfuncDef, LoweringRegistry, RegistryBuilder};

use feltir_spec::{CodegenConfig, Function};

/// Emit one function with the built-in libfuncs and the default configuration
pub fn compile(source: &FunctionSource) -> Result<Function> {
    emit(source, default_registry(), CodegenConfig::DEFAULT)
}
