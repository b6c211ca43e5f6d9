//! Main printer logic

use crate::error::Result;
use crate::formatter::{format_instruction, format_operand, format_result_types, format_terminator};
use crate::helpers::{helper_declaration, helper_definition};
use feltir_spec::{CodegenConfig, Function, Module};
use std::fmt::Write;

/// Render one function as text
pub fn print_function(func: &Function, config: &CodegenConfig) -> Result<String> {
    config.validate()?;
    let width = config.target_width;
    let mut output = String::new();

    let params = func
        .entry()
        .map(|entry| {
            entry
                .params()
                .iter()
                .map(|v| format_operand(func, *v, width))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    writeln!(output, "; {}", func.signature())?;
    writeln!(
        output,
        "define {} @{}({}) {{",
        format_result_types(&func.signature().returns, width),
        func.name(),
        params.join(", ")
    )?;

    for block in func.blocks() {
        if block.params().is_empty() {
            writeln!(output, "{}:", block.id())?;
        } else {
            let params = block
                .params()
                .iter()
                .map(|v| format_operand(func, *v, width))
                .collect::<Result<Vec<_>>>()?;
            writeln!(output, "{}({}):", block.id(), params.join(", "))?;
        }
        for inst in block.instructions() {
            writeln!(output, "  {}", format_instruction(func, inst, width)?)?;
        }
        writeln!(output, "  {}", format_terminator(func, block.terminator(), width)?)?;
    }

    output.push_str("}\n");
    Ok(output)
}

/// Render a module: header, helper definitions, then every function
pub fn print_module(module: &Module, config: &CodegenConfig) -> Result<String> {
    config.validate()?;
    let helpers = module.helpers();
    let mut output = String::new();

    output.push_str("; Felt IR module\n");
    writeln!(output, "; Target: {}", config)?;
    writeln!(
        output,
        "; Functions: {}, helpers: {}",
        module.len(),
        helpers.len()
    )?;

    for helper in &helpers {
        output.push('\n');
        output.push_str(&helper_definition(helper, config));
    }
    for func in module.functions() {
        output.push('\n');
        output.push_str(&print_function(func, config)?);
    }
    Ok(output)
}

/// Declarations of every helper the module references, one per line
pub fn print_declarations(module: &Module, config: &CodegenConfig) -> Result<String> {
    config.validate()?;
    let mut output = String::new();
    for helper in module.helpers() {
        writeln!(output, "{}", helper_declaration(&helper, config))?;
    }
    Ok(output)
}
