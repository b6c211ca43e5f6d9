//! SSA values, block references, and immediates

use crate::field::Felt;
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SSA value, an index into the function's value table
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Value(u32);

impl Value {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Value(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Basic block reference, an index into the function's block list
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Block(u32);

impl Block {
    /// The entry block is always the first block
    pub const ENTRY: Self = Block(0);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Block(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_entry(self) -> bool {
        self == Self::ENTRY
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Constant operand
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Immediate {
    Felt(Felt),
    U32(u32),
    Bool(bool),
}

impl Immediate {
    pub fn ty(&self) -> ValueType {
        match self {
            Immediate::Felt(_) => ValueType::Felt252,
            Immediate::U32(_) => ValueType::U32,
            Immediate::Bool(_) => ValueType::Bool,
        }
    }

    /// Zero of the given type
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Felt252 => Immediate::Felt(Felt::ZERO),
            ValueType::U32 => Immediate::U32(0),
            ValueType::Bool => Immediate::Bool(false),
        }
    }
}

impl From<Felt> for Immediate {
    fn from(value: Felt) -> Self {
        Immediate::Felt(value)
    }
}

impl From<u32> for Immediate {
    fn from(value: u32) -> Self {
        Immediate::U32(value)
    }
}

impl From<bool> for Immediate {
    fn from(value: bool) -> Self {
        Immediate::Bool(value)
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Felt(v) => write!(f, "{}", v),
            Immediate::U32(v) => write!(f, "{}", v),
            Immediate::Bool(v) => write!(f, "{}", *v as u8),
        }
    }
}
