//! Value types carried by Felt IR values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of an SSA value or block parameter
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ValueType {
    /// Field element, stored in a `target_width`-bit container
    Felt252,
    /// 32-bit unsigned integer
    U32,
    /// 1-bit condition
    Bool,
}

impl ValueType {
    pub const ALL: [ValueType; 3] = [ValueType::Felt252, ValueType::U32, ValueType::Bool];

    /// Source-level type name, as used in intrinsic symbols
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Felt252 => "felt252",
            ValueType::U32 => "u32",
            ValueType::Bool => "bool",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// Storage width in bits for a given target width
    #[inline]
    pub fn storage_bits(self, target_width: u32) -> u32 {
        match self {
            ValueType::Felt252 => target_width,
            ValueType::U32 => 32,
            ValueType::Bool => 1,
        }
    }

    /// Lowered integer type name, e.g. `i256` for a felt at width 256
    pub fn lowered_name(self, target_width: u32) -> String {
        format!("i{}", self.storage_bits(target_width))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
