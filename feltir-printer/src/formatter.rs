//! Instruction and terminator formatting for Felt IR text

use crate::error::{PrinterError, Result};
use feltir_spec::{Block, Function, Instruction, Terminator, Value, ValueType};

/// Lowered type of `value`, e.g. `i256`
fn lowered(func: &Function, value: Value, width: u32) -> Result<String> {
    func.value_type(value)
        .map(|ty| ty.lowered_name(width))
        .ok_or(PrinterError::UntypedValue(value))
}

/// `i256 %3`
pub fn format_operand(func: &Function, value: Value, width: u32) -> Result<String> {
    Ok(format!("{} {}", lowered(func, value, width)?, value))
}

/// Comma-separated typed operands
pub fn format_operands(func: &Function, values: &[Value], width: u32) -> Result<String> {
    let parts = values
        .iter()
        .map(|v| format_operand(func, *v, width))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}

/// Result type of a helper or function: `void`, `i256`, or `{i32, i1}`
pub fn format_result_types(types: &[ValueType], width: u32) -> String {
    match types {
        [] => "void".to_string(),
        [ty] => ty.lowered_name(width),
        _ => {
            let names: Vec<String> = types.iter().map(|ty| ty.lowered_name(width)).collect();
            format!("{{{}}}", names.join(", "))
        }
    }
}

fn format_edge(func: &Function, dest: Block, args: &[Value], width: u32) -> Result<String> {
    if args.is_empty() {
        Ok(dest.to_string())
    } else {
        Ok(format!("{}({})", dest, format_operands(func, args, width)?))
    }
}

/// Format one instruction
pub fn format_instruction(func: &Function, inst: &Instruction, width: u32) -> Result<String> {
    let text = match inst {
        Instruction::Const { result, imm } => {
            format!("{} = const {} {}", result, imm.ty().lowered_name(width), imm)
        }
        Instruction::Cmp {
            result,
            pred,
            lhs,
            rhs,
        } => format!(
            "{} = cmp {} {}, {}",
            result,
            pred,
            format_operand(func, *lhs, width)?,
            rhs
        ),
        Instruction::Call {
            callee,
            args,
            results,
        } => {
            let call = format!(
                "call @{}({})",
                callee.symbol(),
                format_operands(func, args, width)?
            );
            if results.is_empty() {
                call
            } else {
                let defs: Vec<String> = results.iter().map(|v| v.to_string()).collect();
                format!("{} = {}", defs.join(", "), call)
            }
        }
    };
    Ok(text)
}

/// Format a block terminator
pub fn format_terminator(func: &Function, term: &Terminator, width: u32) -> Result<String> {
    let text = match term {
        Terminator::Br { dest, args } => format!("br {}", format_edge(func, *dest, args, width)?),
        Terminator::CondBr {
            cond,
            then_dest,
            then_args,
            else_dest,
            else_args,
        } => format!(
            "cond_br {}, {}, {}",
            format_operand(func, *cond, width)?,
            format_edge(func, *then_dest, then_args, width)?,
            format_edge(func, *else_dest, else_args, width)?
        ),
        Terminator::Return { values } if values.is_empty() => "ret void".to_string(),
        Terminator::Return { values } => format!("ret {}", format_operands(func, values, width)?),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feltir_spec::{CmpPredicate, Felt, FunctionBuilder, Intrinsic, Signature};

    fn sample() -> Function {
        let sig = Signature::new("sample", vec![ValueType::Felt252], vec![ValueType::Felt252]);
        let mut b = FunctionBuilder::new(sig);
        let x = b.entry_params()[0];
        let exit = b.create_block(&[ValueType::Felt252]);
        let copies = b.ins_call(Intrinsic::Dup(ValueType::Felt252), &[x]).unwrap();
        let k = b.ins_const(Felt::from_i64(-6)).unwrap();
        let eq = b.ins_cmp(CmpPredicate::Eq, copies[0], k).unwrap();
        b.ins_cond_br(eq, exit, &[copies[1]], exit, &[copies[1]]).unwrap();
        b.switch_to_block(exit).unwrap();
        let r = b.block_params(exit).unwrap()[0];
        b.ins_return(&[r]).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_format_instructions() {
        let func = sample();
        let insts = func.blocks()[0].instructions();
        assert_eq!(
            format_instruction(&func, &insts[0], 256).unwrap(),
            "%2, %3 = call @dup<felt252>(i256 %0)"
        );
        assert_eq!(
            format_instruction(&func, &insts[1], 256).unwrap(),
            "%4 = const i256 -6"
        );
        assert_eq!(
            format_instruction(&func, &insts[2], 256).unwrap(),
            "%5 = cmp eq i256 %2, %4"
        );
    }

    #[test]
    fn test_format_terminators() {
        let func = sample();
        assert_eq!(
            format_terminator(&func, func.blocks()[0].terminator(), 256).unwrap(),
            "cond_br i1 %5, bb1(i256 %3), bb1(i256 %3)"
        );
        assert_eq!(
            format_terminator(&func, func.blocks()[1].terminator(), 320).unwrap(),
            "ret i320 %1"
        );
    }

    #[test]
    fn test_format_result_types() {
        assert_eq!(format_result_types(&[], 256), "void");
        assert_eq!(format_result_types(&[ValueType::Felt252], 256), "i256");
        assert_eq!(
            format_result_types(&[ValueType::U32, ValueType::Bool], 256),
            "{i32, i1}"
        );
    }
}
