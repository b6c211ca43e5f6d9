//! # Felt IR Printer
//!
//! Render sealed Felt IR functions and modules as text, with helper
//! declarations and definitions lowered at the configured target width.
//!
//! ## Example
//!
//! ```rust
//! use feltir_printer::print_function;
//! use feltir_spec::{CodegenConfig, FunctionBuilder, Signature, ValueType};
//!
//! let sig = Signature::new("id", vec![ValueType::U32], vec![ValueType::U32]);
//! let mut builder = FunctionBuilder::new(sig);
//! let x = builder.entry_params()[0];
//! builder.ins_return(&[x]).unwrap();
//! let func = builder.finish().unwrap();
//!
//! let text = print_function(&func, &CodegenConfig::DEFAULT).unwrap();
//! assert!(text.contains("define i32 @id(i32 %0) {"));
//! ```

pub mod error;
pub mod formatter;
pub mod helpers;
pub mod printer;

pub use error::{PrinterError, Result};
pub use formatter::{format_instruction, format_terminator};
pub use helpers::{helper_declaration, helper_definition};
pub use printer::{print_declarations, print_function, print_module};
