//! Felt252 field arithmetic
//!
//! p = 2^251 + 17·2^192 + 1
//!
//! Properties:
//! - 252-bit prime, stored in a 256-bit container
//! - Products are computed at double width (512 bits) before reduction
//! - Reduction is a sign-following remainder: the result takes the sign of
//!   the dividend, so negative representatives in [-(p-1), -1] are legal and
//!   are kept as-is. Use [`Felt::to_canonical`] for the residue in [0, p).

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Felt252 prime: p = 2^251 + 17·2^192 + 1 (little-endian 64-bit limbs)
pub const PRIME: U256 = U256([1, 0, 0, 0x0800_0000_0000_0011]);

/// Number of significant bits in the prime
pub const PRIME_BITS: u32 = 252;

/// Width of the multiplication intermediate
pub const WIDE_BITS: u32 = 512;

// The full product of two reduced magnitudes must fit the wide intermediate.
const _: () = assert!(2 * PRIME_BITS <= WIDE_BITS);

/// Felt252 field element
///
/// Stored as sign + magnitude with `magnitude < p`. Negative zero is never
/// constructed, so the derived equality is exact representation equality.
/// Decoding goes through the same checks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFelt")]
pub struct Felt {
    negative: bool,
    magnitude: U256,
}

/// Error returned when a decimal felt literal cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid felt literal: {0:?}")]
pub struct FeltParseError(pub String);

/// Error returned when a decoded felt breaks the representation invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFelt {
    #[error("felt magnitude {0} is not reduced modulo p")]
    Unreduced(U256),
    #[error("felt is negative zero")]
    NegativeZero,
}

/// Wire form of [`Felt`] before validation
#[derive(Deserialize)]
struct RawFelt {
    negative: bool,
    magnitude: U256,
}

impl TryFrom<RawFelt> for Felt {
    type Error = InvalidFelt;

    fn try_from(raw: RawFelt) -> Result<Self, Self::Error> {
        if raw.magnitude >= PRIME {
            return Err(InvalidFelt::Unreduced(raw.magnitude));
        }
        if raw.negative && raw.magnitude.is_zero() {
            return Err(InvalidFelt::NegativeZero);
        }
        Ok(Felt {
            negative: raw.negative,
            magnitude: raw.magnitude,
        })
    }
}

impl Felt {
    pub const ZERO: Self = Felt {
        negative: false,
        magnitude: U256([0, 0, 0, 0]),
    };
    pub const ONE: Self = Felt {
        negative: false,
        magnitude: U256([1, 0, 0, 0]),
    };

    /// Create a non-negative field element (reduces modulo p)
    #[inline]
    pub fn new(value: U256) -> Self {
        Self::from_signed(false, value)
    }

    /// Create a field element from a sign and a magnitude
    ///
    /// The magnitude is reduced modulo p and the sign is kept, matching the
    /// signed remainder used everywhere else in this module.
    pub fn from_signed(negative: bool, magnitude: U256) -> Self {
        let magnitude = if magnitude >= PRIME {
            magnitude % PRIME
        } else {
            magnitude
        };
        Felt {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self::new(U256::from(value))
    }

    #[inline]
    pub fn from_i64(value: i64) -> Self {
        Self::from_signed(value < 0, U256::from(value.unsigned_abs()))
    }

    /// Parse a decimal literal, with an optional leading `-`
    pub fn from_dec_str(literal: &str) -> Result<Self, FeltParseError> {
        let (negative, digits) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        if digits.is_empty() {
            return Err(FeltParseError(literal.to_string()));
        }
        let magnitude =
            U256::from_dec_str(digits).map_err(|_| FeltParseError(literal.to_string()))?;
        Ok(Self::from_signed(negative, magnitude))
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.negative
    }

    #[inline]
    pub fn magnitude(self) -> U256 {
        self.magnitude
    }

    /// Exact comparison against the representation of zero
    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Residue in [0, p)
    pub fn to_canonical(self) -> U256 {
        if self.negative {
            PRIME - self.magnitude
        } else {
            self.magnitude
        }
    }

    /// Whether both values denote the same residue class
    #[inline]
    pub fn congruent(self, other: Self) -> bool {
        self.to_canonical() == other.to_canonical()
    }

    /// Low 64 bits of the magnitude, if the value is non-negative and fits
    pub fn to_u64(self) -> Option<u64> {
        if self.negative || self.magnitude > U256::from(u64::MAX) {
            None
        } else {
            Some(self.magnitude.low_u64())
        }
    }

    /// (a * b) mod p with a sign-following remainder
    ///
    /// Magnitudes are below 2^252, so the 512-bit product cannot overflow.
    pub fn multiply(self, rhs: Self) -> Self {
        let wide: U512 = self.magnitude.full_mul(rhs.magnitude);
        let reduced = wide % U512::from(PRIME);
        debug_assert!(reduced.0[4..].iter().all(|limb| *limb == 0));
        let magnitude = U256([reduced.0[0], reduced.0[1], reduced.0[2], reduced.0[3]]);
        Self::from_signed(self.negative != rhs.negative, magnitude)
    }
}

/// Field multiplication, see [`Felt::multiply`]
#[inline]
pub fn multiply(a: Felt, b: Felt) -> Felt {
    a.multiply(b)
}

/// Exact equality-to-zero test
#[inline]
pub fn is_zero(a: Felt) -> bool {
    a.is_zero()
}

// Arithmetic implementations

impl Add for Felt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        // Both magnitudes are below 2^252, the sum fits in 256 bits.
        let (negative, magnitude) = if self.negative == rhs.negative {
            (self.negative, self.magnitude + rhs.magnitude)
        } else if self.magnitude >= rhs.magnitude {
            (self.negative, self.magnitude - rhs.magnitude)
        } else {
            (rhs.negative, rhs.magnitude - self.magnitude)
        };
        Self::from_signed(negative, magnitude)
    }
}

impl Sub for Felt {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for Felt {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl Neg for Felt {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::from_signed(!self.negative, self.magnitude)
    }
}

// Conversions

impl From<u64> for Felt {
    #[inline]
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u32> for Felt {
    #[inline]
    fn from(value: u32) -> Self {
        Self::from_u64(value as u64)
    }
}

impl From<i64> for Felt {
    #[inline]
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl std::str::FromStr for Felt {
    type Err = FeltParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

// Display

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use num_bigint::{BigInt, BigUint, Sign};
    use proptest::prelude::*;

    fn to_bigint(felt: Felt) -> BigInt {
        let bytes: Vec<u8> = felt
            .magnitude()
            .0
            .iter()
            .flat_map(|limb| limb.to_le_bytes())
            .collect();
        let magnitude = BigUint::from_bytes_le(&bytes);
        let sign = if felt.is_negative() { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, magnitude)
    }

    fn prime() -> BigInt {
        BigInt::parse_bytes(PRIME.to_string().as_bytes(), 10).unwrap()
    }

    fn canonical(value: BigInt) -> BigInt {
        let p = prime();
        ((value % &p) + &p) % &p
    }

    fn arb_felt() -> impl Strategy<Value = Felt> {
        (any::<bool>(), any::<[u64; 4]>()).prop_map(|(neg, limbs)| Felt::from_signed(neg, U256(limbs)))
    }

    proptest! {
        #[test]
        fn test_mul_commutative(a in arb_felt(), b in arb_felt()) {
            prop_assert!(multiply(a, b).congruent(multiply(b, a)));
        }

        #[test]
        fn test_mul_matches_bigint(a in arb_felt(), b in arb_felt()) {
            let expected = canonical(to_bigint(a) * to_bigint(b));
            let actual = to_bigint(Felt::new(multiply(a, b).to_canonical()));
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn test_mul_is_signed_remainder(a in arb_felt(), b in arb_felt()) {
            // the representative equals the truncated (sign-of-dividend) remainder
            let expected = (to_bigint(a) * to_bigint(b)) % prime();
            prop_assert_eq!(to_bigint(multiply(a, b)), expected);
        }

        #[test]
        fn test_add_matches_bigint(a in arb_felt(), b in arb_felt()) {
            let expected = canonical(to_bigint(a) + to_bigint(b));
            prop_assert_eq!(to_bigint(Felt::new((a + b).to_canonical())), expected);
        }

        #[test]
        fn test_is_zero_only_for_zero(a in arb_felt()) {
            prop_assert_eq!(is_zero(a), a.magnitude().is_zero());
        }
    }
}
