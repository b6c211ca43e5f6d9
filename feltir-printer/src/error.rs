//! Printer errors

use feltir_spec::{ConfigError, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Value {0} has no type in this function")]
    UntypedValue(Value),

    #[error("Formatting error")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, PrinterError>;
