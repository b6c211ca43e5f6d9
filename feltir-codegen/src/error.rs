//! Codegen errors

use crate::lifecycle::Handle;
use crate::op::{Label, VarId};
use feltir_spec::{ConfigError, IrError, ValueType};
use thiserror::Error;

/// What is wrong with a malformed operation stream
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    #[error("variable {0} is not defined in this block")]
    UndefinedVar(VarId),

    #[error("variable {0} is defined twice")]
    RedefinedVar(VarId),

    #[error("variable {var} was already consumed by operation {consumed_at}")]
    ConsumedValue { var: VarId, consumed_at: usize },

    #[error("variable {var} has type {found}, expected {expected}")]
    TypeMismatch {
        var: VarId,
        expected: ValueType,
        found: ValueType,
    },

    #[error("variable {var} must be stored before it crosses a block boundary")]
    NotMaterialized { var: VarId },

    #[error("label {0} is never placed")]
    UndefinedLabel(Label),

    #[error("label {0} is placed twice")]
    DuplicateLabel(Label),

    #[error("expected {expected} argument(s), found {found}")]
    ArgumentArity { expected: usize, found: usize },

    #[error("expected {expected} result(s), found {found}")]
    ResultArity { expected: usize, found: usize },

    #[error("block ends without a terminator")]
    UnterminatedBlock,

    #[error("operation follows a terminator without a label")]
    UnreachableOperation,

    #[error("handle {0} does not exist")]
    UnknownHandle(Handle),
}

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("malformed operation stream in `{function}` at operation {op_index}: {kind}")]
    Malformed {
        function: String,
        op_index: usize,
        kind: MalformedKind,
    },

    #[error("unsupported operation `{operation}` in `{function}` at operation {op_index}")]
    Unsupported {
        function: String,
        op_index: usize,
        operation: String,
    },

    #[error("emitter for `{function}` is {found}, expected {expected}")]
    InvalidState {
        function: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("function `{function}`: {source}")]
    Ir {
        function: String,
        #[source]
        source: IrError,
    },
}

impl CodegenError {
    /// Name of the function the error belongs to
    pub fn function(&self) -> Option<&str> {
        match self {
            CodegenError::Malformed { function, .. }
            | CodegenError::Unsupported { function, .. }
            | CodegenError::InvalidState { function, .. }
            | CodegenError::Ir { function, .. } => Some(function),
            CodegenError::Config(_) => None,
        }
    }

    /// Index of the offending operation, if known
    pub fn op_index(&self) -> Option<usize> {
        match self {
            CodegenError::Malformed { op_index, .. } | CodegenError::Unsupported { op_index, .. } => {
                Some(*op_index)
            }
            _ => None,
        }
    }

    pub fn malformed_kind(&self) -> Option<&MalformedKind> {
        match self {
            CodegenError::Malformed { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CodegenError::Unsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegenError::Malformed {
            function: "f".to_string(),
            op_index: 4,
            kind: MalformedKind::ConsumedValue {
                var: VarId(2),
                consumed_at: 1,
            },
        };
        assert_eq!(
            err.to_string(),
            "malformed operation stream in `f` at operation 4: variable [2] was already consumed by operation 1"
        );
        assert_eq!(err.function(), Some("f"));
        assert_eq!(err.op_index(), Some(4));

        let err = CodegenError::Unsupported {
            function: "g".to_string(),
            op_index: 0,
            operation: "felt252_div".to_string(),
        };
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "unsupported operation `felt252_div` in `g` at operation 0"
        );
    }
}
