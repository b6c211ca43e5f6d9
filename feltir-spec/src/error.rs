//! # Error Types for Felt IR

use crate::builder::BuilderError;
use crate::config::ConfigError;
use crate::field::FeltParseError;
use crate::verify::VerifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Construction errors
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("function `{function}` failed verification with {} error(s)", .errors.len())]
    Verification {
        function: String,
        errors: Vec<VerifyError>,
    },

    // Encoding errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Invalid felt literal: {0}")]
    InvalidFelt(#[from] FeltParseError),
}

impl IrError {
    /// Verifier errors carried by this error, if any
    pub fn verify_errors(&self) -> &[VerifyError] {
        match self {
            IrError::Verification { errors, .. } => errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Block;

    #[test]
    fn test_error_display() {
        let err = IrError::from(ConfigError::UnalignedWidth);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: target_width must be a multiple of 64"
        );

        let err = IrError::Verification {
            function: "f".to_string(),
            errors: vec![
                VerifyError::MissingEntry,
                VerifyError::UnreachableBlock {
                    block: Block::new(2),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "function `f` failed verification with 2 error(s)"
        );
        assert_eq!(err.verify_errors().len(), 2);
    }
}
