//! # `felt252` libfuncs
//!
//! Arithmetic lowers to a call of the matching field helper. `felt252_is_zero`
//! is lowered inline as an exact comparison against the constant zero.

use crate::registry::LibfuncDef;
use feltir_spec::{CmpPredicate, Felt, FunctionBuilder, Intrinsic, Result, Value, ValueType};

pub fn definitions() -> Vec<LibfuncDef> {
    use ValueType::*;
    vec![
        LibfuncDef::new("felt252_mul", vec![Felt252, Felt252], vec![Felt252], build_mul),
        LibfuncDef::new("felt252_add", vec![Felt252, Felt252], vec![Felt252], build_add),
        LibfuncDef::new("felt252_sub", vec![Felt252, Felt252], vec![Felt252], build_sub),
        LibfuncDef::new("felt252_is_zero", vec![Felt252], vec![Bool], build_is_zero),
    ]
}

fn build_mul(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::Felt252Mul, args)
}

fn build_add(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::Felt252Add, args)
}

fn build_sub(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    builder.ins_call(Intrinsic::Felt252Sub, args)
}

fn build_is_zero(builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
    let zero = builder.ins_const(Felt::ZERO)?;
    let cond = builder.ins_cmp(CmpPredicate::Eq, args[0], zero)?;
    Ok(vec![cond])
}

#[cfg(test)]
mod tests {
    use super::*;
    use feltir_spec::{Instruction, Signature};

    #[test]
    fn test_is_zero_is_inline() {
        let mut b = FunctionBuilder::new(Signature::new(
            "z",
            vec![ValueType::Felt252],
            vec![ValueType::Bool],
        ));
        let x = b.entry_params()[0];
        let results = build_is_zero(&mut b, &[x]).unwrap();
        b.ins_return(&results).unwrap();
        let func = b.finish().unwrap();

        let insts = func.blocks()[0].instructions();
        assert_eq!(insts.len(), 2);
        assert!(matches!(insts[1], Instruction::Cmp { pred: CmpPredicate::Eq, .. }));
        assert!(func.intrinsic_calls().is_empty());
    }

    #[test]
    fn test_definitions_match_helper_contracts() {
        for def in definitions() {
            if let Some(helper) = Intrinsic::from_symbol(def.name) {
                assert_eq!(def.params, helper.params());
                assert_eq!(def.results, helper.results());
            }
        }
    }
}
