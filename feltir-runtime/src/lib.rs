//! # Felt IR Runtime
//!
//! Reference interpreter for sealed Felt IR functions. Used to check that
//! emitted code computes what its operation stream describes.
//!
//! ## Features
//!
//! - **Typed frames**: every value slot holds a `felt252`, `u32`, or `bool`
//! - **Block parameters**: branch arguments are bound positionally on entry
//! - **Intrinsics**: lifecycle helpers are identities, felt helpers use the
//!   field unit, u32 helpers wrap and report overflow
//! - **Step limit**: runaway loops stop with an error instead of hanging
//!
//! ## Example
//!
//! ```rust
//! use feltir_runtime::{run, RtValue};
//! use feltir_spec::{Felt, FunctionBuilder, Signature, ValueType};
//!
//! let sig = Signature::new("id", vec![ValueType::Felt252], vec![ValueType::Felt252]);
//! let mut builder = FunctionBuilder::new(sig);
//! let x = builder.entry_params()[0];
//! builder.ins_return(&[x]).unwrap();
//! let func = builder.finish().unwrap();
//!
//! let out = run(&func, &[RtValue::Felt(Felt::from_u64(5))]).unwrap();
//! assert_eq!(out, vec![RtValue::Felt(Felt::from_u64(5))]);
//! ```

pub mod error;
pub mod execute;
pub mod interpreter;
pub mod state;

pub use error::{Result, RuntimeError};
pub use execute::{compare, execute_intrinsic};
pub use interpreter::{ExecutionResult, Interpreter, InterpreterConfig};
pub use state::{Frame, RtValue};

/// Simple execution helper
///
/// Runs a function with the default configuration and returns its results.
pub fn run(func: &feltir_spec::Function, args: &[RtValue]) -> Result<Vec<RtValue>> {
    let interp = Interpreter::new(func, InterpreterConfig::default());
    Ok(interp.run(args)?.returns)
}
