//! End-to-end checks of the conditional-transform pattern: emit, then execute
//! on the reference interpreter.

use feltir_codegen::{compile, conditional_transform};
use feltir_runtime::{run, Interpreter, InterpreterConfig, RtValue};
use feltir_spec::{Block, Felt, Function, Intrinsic, ValueType};
use proptest::prelude::*;

const HALF_P_MINUS_1: &str =
    "1809251394333065606848661391547535052811553607665798349986546028067936010240";
const HALF_P_PLUS_1: &str =
    "1809251394333065606848661391547535052811553607665798349986546028067936010241";
const P_MINUS_1: &str =
    "3618502788666131213697322783095070105623107215331596699973092056135872020480";

fn felt(literal: &str) -> Felt {
    Felt::from_dec_str(literal).unwrap()
}

fn double() -> Function {
    compile(&conditional_transform("double", Felt::from_u64(2))).unwrap()
}

fn call(func: &Function, v: Felt) -> Felt {
    let out = run(func, &[RtValue::Felt(v)]).unwrap();
    assert_eq!(out.len(), 1);
    out[0].as_felt().unwrap()
}

#[test]
fn test_double_small_values() {
    let func = double();
    assert_eq!(call(&func, Felt::from_u64(5)), Felt::from_u64(10));
    assert_eq!(call(&func, Felt::ZERO), Felt::ZERO);
}

#[test]
fn test_double_near_half_prime() {
    let func = double();
    // 2 * (p-1)/2 = p - 1 stays below p
    assert_eq!(call(&func, felt(HALF_P_MINUS_1)), felt(P_MINUS_1));
    // 2 * (p+1)/2 = p + 1 reduces to 1
    assert_eq!(call(&func, felt(HALF_P_PLUS_1)), Felt::ONE);
}

#[test]
fn test_double_negative_keeps_sign() {
    let func = double();
    let result = call(&func, Felt::from_i64(-3));
    assert_eq!(result, Felt::from_i64(-6));
    assert!(result.is_negative());
}

#[test]
fn test_multiplier_one_is_identity() {
    let func = compile(&conditional_transform("same", Felt::ONE)).unwrap();
    for v in [Felt::from_u64(1), Felt::from_i64(-42), felt(P_MINUS_1)] {
        assert_eq!(call(&func, v), v);
    }
}

#[test]
fn test_zero_path_skips_multiply_block() {
    let func = double();
    let interp = Interpreter::new(&func, InterpreterConfig::default());

    let zero = interp.run(&[RtValue::Felt(Felt::ZERO)]).unwrap();
    assert_eq!(
        zero.blocks_visited,
        vec![Block::ENTRY, Block::new(1), Block::new(2), Block::new(3), Block::new(5)]
    );

    let nonzero = interp.run(&[RtValue::Felt(Felt::from_u64(5))]).unwrap();
    assert_eq!(
        nonzero.blocks_visited,
        vec![Block::ENTRY, Block::new(1), Block::new(2), Block::new(4), Block::new(5)]
    );
    assert!(nonzero.steps > zero.steps);
}

#[test]
fn test_helpers_used() {
    let calls = double().intrinsic_calls();
    let felt = ValueType::Felt252;
    for expected in [
        Intrinsic::Dup(felt),
        Intrinsic::StoreTemp(felt),
        Intrinsic::Rename(felt),
        Intrinsic::Felt252Mul,
    ] {
        assert!(calls.contains(&expected), "missing {}", expected);
    }
}

proptest! {
    #[test]
    fn prop_matches_field_multiply(v: i64, k in 1u64..1_000_000) {
        let func = compile(&conditional_transform("scale", Felt::from_u64(k))).unwrap();
        let input = Felt::from_i64(v);
        let expected = if input.is_zero() {
            Felt::ZERO
        } else {
            input.multiply(Felt::from_u64(k))
        };
        prop_assert_eq!(call(&func, input), expected);
    }
}
