//! # `u32` libfuncs
//!
//! Overflowing arithmetic returns the wrapped value plus an overflow flag;
//! callers branch on the flag. Comparisons and the zero test are lowered
//! inline. `u32_try_from_felt252` yields a fits flag followed by the
//! truncated value.

use crate::registry::LibfuncDef;
use feltir_spec::{CmpPredicate, FunctionBuilder, Intrinsic, Result, Value, ValueType};

pub fn definitions() -> Vec<LibfuncDef> {
    use ValueType::*;
    vec![
        LibfuncDef::new("u32_overflowing_add", vec![U32, U32], vec![U32, Bool], build_overflowing_add),
        LibfuncDef::new("u32_overflowing_sub", vec![U32, U32], vec![U32, Bool], build_overflowing_sub),
        LibfuncDef::new("u32_eq", vec![U32, U32], vec![Bool], build_eq),
        LibfuncDef::new("u32_lt", vec![U32, U32], vec![Bool], build_lt),
        LibfuncDef::new("u32_le", vec![U32, U32], vec![Bool], build_le),
        LibfuncDef::new("u32_is_zero", vec![U32], vec![Bool], build_is_zero),
        LibfuncDef::new("u32_safe_divmod", vec![U32, U32], vec![U32, U32], build_divmod),
        LibfuncDef::new("u32_to_felt252", vec![U32], vec![Felt252], build_to_felt252),
        LibfuncDef::new("u32_try_from_felt252", vec![Felt252], vec![Bool, U32], build_from_felt252),
    ]
}

fn build_overflowing_add(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::U32OverflowingAdd, args)
}

fn build_overflowing_sub(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::U32OverflowingSub, args)
}

fn build_compare(
    builder: &mut FunctionBuilder,
    pred: CmpPredicate,
    args: &[Value],
) -> Result<Vec<Value>> {
    Ok(vec![builder.ins_cmp(pred, args[0], args[1])?])
}

fn build_eq(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    build_compare(builder, CmpPredicate::Eq, args)
}

fn build_lt(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    build_compare(builder, CmpPredicate::Ult, args)
}

fn build_le(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    build_compare(builder, CmpPredicate::Ule, args)
}

fn build_is_zero(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    let zero = builder.ins_const(0u32)?;
    Ok(vec![builder.ins_cmp(CmpPredicate::Eq, args[0], zero)?])
}

fn build_divmod(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::U32Divmod, args)
}

fn build_to_felt252(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::U32ToFelt252, args)
}

fn build_from_felt252(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::U32TryFromFelt252, args)
}
