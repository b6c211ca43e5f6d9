//! Instruction semantics for the Felt IR interpreter

use crate::error::{Result, RuntimeError};
use crate::state::RtValue;
use feltir_spec::field::multiply;
use feltir_spec::{CmpPredicate, Intrinsic};
use std::cmp::Ordering;

/// Execute one intrinsic helper.
///
/// Lifecycle helpers are identities; `dup` returns two copies. Felt helpers
/// use the field unit, so results keep its signed remainder.
pub fn execute_intrinsic(intrinsic: Intrinsic, args: &[RtValue]) -> Result<Vec<RtValue>> {
    use RtValue::*;

    let results = match (intrinsic, args) {
        // ========== Lifecycle ==========
        (Intrinsic::Dup(_), [v]) => vec![*v, *v],
        (Intrinsic::StoreTemp(_) | Intrinsic::Rename(_), [v]) => vec![*v],

        // ========== Felt252 ==========
        (Intrinsic::Felt252Mul, [Felt(a), Felt(b)]) => vec![Felt(multiply(*a, *b))],
        (Intrinsic::Felt252Add, [Felt(a), Felt(b)]) => vec![Felt(*a + *b)],
        (Intrinsic::Felt252Sub, [Felt(a), Felt(b)]) => vec![Felt(*a - *b)],

        // ========== U32 ==========
        (Intrinsic::U32OverflowingAdd, [U32(a), U32(b)]) => {
            let (result, overflow) = a.overflowing_add(*b);
            vec![U32(result), Bool(overflow)]
        }
        (Intrinsic::U32OverflowingSub, [U32(a), U32(b)]) => {
            let (result, overflow) = a.overflowing_sub(*b);
            vec![U32(result), Bool(overflow)]
        }
        (Intrinsic::U32Divmod, [U32(_), U32(0)]) => {
            return Err(RuntimeError::DivisionByZero("u32_divmod"));
        }
        (Intrinsic::U32Divmod, [U32(a), U32(b)]) => vec![U32(a / b), U32(a % b)],
        (Intrinsic::U32ToFelt252, [U32(a)]) => vec![Felt(feltir_spec::Felt::from(*a))],
        (Intrinsic::U32TryFromFelt252, [Felt(a)]) => {
            let canonical = a.to_canonical();
            vec![Bool(canonical.bits() <= 32), U32(canonical.low_u32())]
        }

        _ => {
            return Err(RuntimeError::ContractViolation {
                intrinsic,
                found: args.iter().map(|a| a.ty()).collect(),
            })
        }
    };
    Ok(results)
}

/// Evaluate a comparison; `None` if the operands have different types.
///
/// Equality is exact representation equality. Orderings compare felts by
/// their canonical residue.
pub fn compare(pred: CmpPredicate, lhs: RtValue, rhs: RtValue) -> Option<bool> {
    if lhs.ty() != rhs.ty() {
        return None;
    }
    Some(match pred {
        CmpPredicate::Eq => lhs == rhs,
        CmpPredicate::Ne => lhs != rhs,
        CmpPredicate::Ult => ordering(lhs, rhs)? == Ordering::Less,
        CmpPredicate::Ule => ordering(lhs, rhs)? != Ordering::Greater,
    })
}

fn ordering(lhs: RtValue, rhs: RtValue) -> Option<Ordering> {
    match (lhs, rhs) {
        (RtValue::Felt(a), RtValue::Felt(b)) => Some(a.to_canonical().cmp(&b.to_canonical())),
        (RtValue::U32(a), RtValue::U32(b)) => Some(a.cmp(&b)),
        (RtValue::Bool(a), RtValue::Bool(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feltir_spec::{Felt, ValueType, PRIME};

    fn felt(v: i64) -> RtValue {
        RtValue::Felt(Felt::from_i64(v))
    }

    #[test]
    fn test_lifecycle_identities() {
        let v = felt(9);
        assert_eq!(
            execute_intrinsic(Intrinsic::Dup(ValueType::Felt252), &[v]).unwrap(),
            vec![v, v]
        );
        assert_eq!(
            execute_intrinsic(Intrinsic::Rename(ValueType::Felt252), &[v]).unwrap(),
            vec![v]
        );
    }

    #[test]
    fn test_felt_mul_keeps_sign() {
        let r = execute_intrinsic(Intrinsic::Felt252Mul, &[felt(-3), felt(2)]).unwrap();
        assert_eq!(r, vec![felt(-6)]);
    }

    #[test]
    fn test_u32_semantics() {
        let r = execute_intrinsic(
            Intrinsic::U32OverflowingAdd,
            &[RtValue::U32(u32::MAX), RtValue::U32(2)],
        )
        .unwrap();
        assert_eq!(r, vec![RtValue::U32(1), RtValue::Bool(true)]);

        let r = execute_intrinsic(Intrinsic::U32OverflowingSub, &[RtValue::U32(0), RtValue::U32(1)])
            .unwrap();
        assert_eq!(r, vec![RtValue::U32(u32::MAX), RtValue::Bool(true)]);

        let r = execute_intrinsic(Intrinsic::U32Divmod, &[RtValue::U32(17), RtValue::U32(5)])
            .unwrap();
        assert_eq!(r, vec![RtValue::U32(3), RtValue::U32(2)]);

        assert!(matches!(
            execute_intrinsic(Intrinsic::U32Divmod, &[RtValue::U32(1), RtValue::U32(0)]),
            Err(RuntimeError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_try_from_felt() {
        let r = execute_intrinsic(Intrinsic::U32TryFromFelt252, &[felt(0xFFFF_FFFF)]).unwrap();
        assert_eq!(r, vec![RtValue::Bool(true), RtValue::U32(u32::MAX)]);

        let r = execute_intrinsic(Intrinsic::U32TryFromFelt252, &[felt(1 << 32)]).unwrap();
        assert_eq!(r, vec![RtValue::Bool(false), RtValue::U32(0)]);

        // -1 is the residue p - 1, far above u32
        let r = execute_intrinsic(Intrinsic::U32TryFromFelt252, &[felt(-1)]).unwrap();
        assert_eq!(r[0], RtValue::Bool(false));
        assert_eq!(r[1], RtValue::U32((PRIME.low_u32()).wrapping_sub(1)));
    }

    #[test]
    fn test_contract_violation() {
        assert!(matches!(
            execute_intrinsic(Intrinsic::Felt252Mul, &[felt(1)]),
            Err(RuntimeError::ContractViolation { .. })
        ));
        assert!(matches!(
            execute_intrinsic(Intrinsic::U32ToFelt252, &[felt(1)]),
            Err(RuntimeError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(CmpPredicate::Eq, felt(0), felt(0)), Some(true));
        // exact equality: -3 and p - 3 are different representations
        let p_minus_3 = RtValue::Felt(Felt::new(PRIME - Felt::from_u64(3).magnitude()));
        assert_eq!(compare(CmpPredicate::Eq, felt(-3), p_minus_3), Some(false));
        assert_eq!(compare(CmpPredicate::Ule, felt(-3), p_minus_3), Some(true));
        assert_eq!(compare(CmpPredicate::Ne, felt(-3), p_minus_3), Some(true));
        assert_eq!(compare(CmpPredicate::Ult, felt(-3), p_minus_3), Some(false));
        assert_eq!(
            compare(CmpPredicate::Ult, RtValue::U32(1), RtValue::U32(2)),
            Some(true)
        );
        assert_eq!(compare(CmpPredicate::Ne, RtValue::U32(1), felt(1)), None);
    }
}
