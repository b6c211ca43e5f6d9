//! # Intrinsic helper contracts
//!
//! Every call instruction targets one of these small helper functions. The
//! catalog is fixed at compile time; each entry exposes a symbol name and the
//! parameter and result types its call sites must match.
//!
//! ## Families
//! - Lifecycle: `dup<T>`, `store_temp<T>`, `rename<T>`
//! - Felt252: `felt252_mul`, `felt252_add`, `felt252_sub`
//! - U32: `u32_overflowing_add`, `u32_overflowing_sub`, `u32_divmod`,
//!   `u32_to_felt252`, `u32_try_from_felt252`

use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intrinsic {
    // ========== Lifecycle ==========
    /// dup<T>: (a) -> (a, a)
    Dup(ValueType),
    /// store_temp<T>: (a) -> (a), materialization point
    StoreTemp(ValueType),
    /// rename<T>: (a) -> (a), identity relabeling
    Rename(ValueType),

    // ========== Felt252 ==========
    /// felt252_mul: (a, b) -> (a * b mod p)
    Felt252Mul,
    /// felt252_add: (a, b) -> (a + b mod p)
    Felt252Add,
    /// felt252_sub: (a, b) -> (a - b mod p)
    Felt252Sub,

    // ========== U32 ==========
    /// u32_overflowing_add: (a, b) -> (a + b wrapped, overflow)
    U32OverflowingAdd,
    /// u32_overflowing_sub: (a, b) -> (a - b wrapped, overflow)
    U32OverflowingSub,
    /// u32_divmod: (a, b) -> (a / b, a % b)
    U32Divmod,
    /// u32_to_felt252: (a) -> (a as felt)
    U32ToFelt252,
    /// u32_try_from_felt252: (a) -> (fits, a truncated)
    U32TryFromFelt252,
}

impl Intrinsic {
    /// Every non-generic intrinsic
    pub const FIXED: [Intrinsic; 8] = [
        Intrinsic::Felt252Mul,
        Intrinsic::Felt252Add,
        Intrinsic::Felt252Sub,
        Intrinsic::U32OverflowingAdd,
        Intrinsic::U32OverflowingSub,
        Intrinsic::U32Divmod,
        Intrinsic::U32ToFelt252,
        Intrinsic::U32TryFromFelt252,
    ];

    /// Symbol name of the helper function
    pub fn symbol(&self) -> String {
        match self {
            Intrinsic::Dup(ty) => format!("dup<{}>", ty),
            Intrinsic::StoreTemp(ty) => format!("store_temp<{}>", ty),
            Intrinsic::Rename(ty) => format!("rename<{}>", ty),
            Intrinsic::Felt252Mul => "felt252_mul".to_string(),
            Intrinsic::Felt252Add => "felt252_add".to_string(),
            Intrinsic::Felt252Sub => "felt252_sub".to_string(),
            Intrinsic::U32OverflowingAdd => "u32_overflowing_add".to_string(),
            Intrinsic::U32OverflowingSub => "u32_overflowing_sub".to_string(),
            Intrinsic::U32Divmod => "u32_divmod".to_string(),
            Intrinsic::U32ToFelt252 => "u32_to_felt252".to_string(),
            Intrinsic::U32TryFromFelt252 => "u32_try_from_felt252".to_string(),
        }
    }

    /// Parse a helper symbol back into an intrinsic
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        if let Some(generic) = symbol.strip_suffix('>') {
            let (base, ty) = generic.split_once('<')?;
            let ty = ValueType::from_name(ty)?;
            return match base {
                "dup" => Some(Intrinsic::Dup(ty)),
                "store_temp" => Some(Intrinsic::StoreTemp(ty)),
                "rename" => Some(Intrinsic::Rename(ty)),
                _ => None,
            };
        }
        Self::FIXED.into_iter().find(|i| i.symbol() == symbol)
    }

    /// Parameter types, in positional order
    pub fn params(&self) -> Vec<ValueType> {
        use ValueType::*;
        match self {
            Intrinsic::Dup(ty) | Intrinsic::StoreTemp(ty) | Intrinsic::Rename(ty) => vec![*ty],
            Intrinsic::Felt252Mul | Intrinsic::Felt252Add | Intrinsic::Felt252Sub => {
                vec![Felt252, Felt252]
            }
            Intrinsic::U32OverflowingAdd | Intrinsic::U32OverflowingSub | Intrinsic::U32Divmod => {
                vec![U32, U32]
            }
            Intrinsic::U32ToFelt252 => vec![U32],
            Intrinsic::U32TryFromFelt252 => vec![Felt252],
        }
    }

    /// Result types, in positional order
    pub fn results(&self) -> Vec<ValueType> {
        use ValueType::*;
        match self {
            Intrinsic::Dup(ty) => vec![*ty, *ty],
            Intrinsic::StoreTemp(ty) | Intrinsic::Rename(ty) => vec![*ty],
            Intrinsic::Felt252Mul | Intrinsic::Felt252Add | Intrinsic::Felt252Sub => vec![Felt252],
            Intrinsic::U32OverflowingAdd | Intrinsic::U32OverflowingSub => vec![U32, Bool],
            Intrinsic::U32Divmod => vec![U32, U32],
            Intrinsic::U32ToFelt252 => vec![Felt252],
            Intrinsic::U32TryFromFelt252 => vec![Bool, U32],
        }
    }

    /// Lifecycle helpers move values around without changing their bits
    #[inline]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Intrinsic::Dup(_) | Intrinsic::StoreTemp(_) | Intrinsic::Rename(_)
        )
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_round_trip() {
        for intrinsic in Intrinsic::FIXED {
            assert_eq!(Intrinsic::from_symbol(&intrinsic.symbol()), Some(intrinsic));
        }
        for ty in ValueType::ALL {
            for intrinsic in [Intrinsic::Dup(ty), Intrinsic::StoreTemp(ty), Intrinsic::Rename(ty)] {
                assert_eq!(Intrinsic::from_symbol(&intrinsic.symbol()), Some(intrinsic));
            }
        }
    }

    #[test]
    fn test_unknown_symbols() {
        assert_eq!(Intrinsic::from_symbol("felt252_div"), None);
        assert_eq!(Intrinsic::from_symbol("dup<u64>"), None);
        assert_eq!(Intrinsic::from_symbol("drop<felt252>"), None);
        assert_eq!(Intrinsic::from_symbol("dup"), None);
    }

    #[test]
    fn test_contracts() {
        let dup = Intrinsic::Dup(ValueType::Felt252);
        assert_eq!(dup.symbol(), "dup<felt252>");
        assert_eq!(dup.params().len(), 1);
        assert_eq!(dup.results(), vec![ValueType::Felt252, ValueType::Felt252]);

        assert_eq!(Intrinsic::Felt252Mul.params().len(), 2);
        assert_eq!(Intrinsic::Felt252Mul.results(), vec![ValueType::Felt252]);
        assert_eq!(
            Intrinsic::U32OverflowingAdd.results(),
            vec![ValueType::U32, ValueType::Bool]
        );
        assert!(dup.is_lifecycle());
        assert!(!Intrinsic::Felt252Mul.is_lifecycle());
    }
}
