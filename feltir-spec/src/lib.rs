//! # Felt IR Specification
//!
//! SSA-form intermediate representation over the 252-bit prime field used by
//! the felt codegen core.
//!
//! ## Key Features
//! - Felt arithmetic modulo P = 2^251 + 17·2^192 + 1 with a signed remainder
//! - Typed values (`felt252`, `u32`, `bool`) with width-dependent lowering
//! - Basic blocks with positional block parameters
//! - A fixed catalog of intrinsic helper contracts
//! - Builder, verifier, and sealed functions with a binary form

pub mod builder;
pub mod config;
pub mod error;
pub mod field;
pub mod function;
pub mod instruction;
pub mod intrinsic;
pub mod module;
pub mod types;
pub mod value;
pub mod verify;

pub use builder::{BuilderError, FunctionBuilder};
pub use config::{CodegenConfig, ConfigError};
pub use error::{IrError, Result};
pub use field::{Felt, FeltParseError, InvalidFelt, PRIME, PRIME_BITS};
pub use function::{BasicBlock, Function, Signature};
pub use instruction::{CmpPredicate, Instruction, Terminator};
pub use intrinsic::Intrinsic;
pub use module::Module;
pub use types::ValueType;
pub use value::{Block, Immediate, Value};
pub use verify::{verify, VerificationReport, VerifyError, VerifyWarning};
