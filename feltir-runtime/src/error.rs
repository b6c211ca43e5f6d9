//! Runtime error types for the Felt IR interpreter

use feltir_spec::{Block, Intrinsic, IrError, Value, ValueType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    #[error("Argument count mismatch: expected {expected}, found {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("Argument {index} has type {found}, expected {expected}")]
    ArgumentType {
        index: usize,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Value {0} read before it was written")]
    UndefinedValue(Value),

    #[error("Value {value} holds a {found}, expected {expected}")]
    TypeMismatch {
        value: Value,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Branch to missing block {0}")]
    UndefinedBlock(Block),

    #[error("Arguments {found:?} do not match the contract of {intrinsic}")]
    ContractViolation {
        intrinsic: Intrinsic,
        found: Vec<ValueType>,
    },

    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("Step limit exceeded: {limit}")]
    StepLimitExceeded { limit: u64 },
}

impl RuntimeError {
    /// Errors caused by the inputs rather than by a malformed function
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RuntimeError::ArgumentCount { .. }
                | RuntimeError::ArgumentType { .. }
                | RuntimeError::DivisionByZero(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
