//! Interpreter state: runtime values and the per-call frame

use crate::error::{Result, RuntimeError};
use feltir_spec::{Block, Felt, Immediate, Value, ValueType};
use std::fmt;

/// A typed runtime value
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RtValue {
    Felt(Felt),
    U32(u32),
    Bool(bool),
}

impl RtValue {
    pub fn ty(&self) -> ValueType {
        match self {
            RtValue::Felt(_) => ValueType::Felt252,
            RtValue::U32(_) => ValueType::U32,
            RtValue::Bool(_) => ValueType::Bool,
        }
    }

    pub fn as_felt(&self) -> Option<Felt> {
        match self {
            RtValue::Felt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            RtValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RtValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Immediate> for RtValue {
    fn from(imm: Immediate) -> Self {
        match imm {
            Immediate::Felt(v) => RtValue::Felt(v),
            Immediate::U32(v) => RtValue::U32(v),
            Immediate::Bool(v) => RtValue::Bool(v),
        }
    }
}

impl From<Felt> for RtValue {
    fn from(value: Felt) -> Self {
        RtValue::Felt(value)
    }
}

impl From<u32> for RtValue {
    fn from(value: u32) -> Self {
        RtValue::U32(value)
    }
}

impl From<bool> for RtValue {
    fn from(value: bool) -> Self {
        RtValue::Bool(value)
    }
}

impl fmt::Display for RtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtValue::Felt(v) => write!(f, "{}", v),
            RtValue::U32(v) => write!(f, "{}u32", v),
            RtValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Register file for one call, indexed by IR value
#[derive(Debug, Clone)]
pub struct Frame {
    values: Vec<Option<RtValue>>,
    /// Block currently executing
    pub block: Block,
    /// Instructions and terminators executed so far
    pub steps: u64,
}

impl Frame {
    pub fn new(num_values: usize) -> Self {
        Self {
            values: vec![None; num_values],
            block: Block::ENTRY,
            steps: 0,
        }
    }

    pub fn read(&self, value: Value) -> Result<RtValue> {
        self.values
            .get(value.index())
            .copied()
            .flatten()
            .ok_or(RuntimeError::UndefinedValue(value))
    }

    pub fn read_many(&self, values: &[Value]) -> Result<Vec<RtValue>> {
        values.iter().map(|v| self.read(*v)).collect()
    }

    pub fn write(&mut self, value: Value, data: RtValue) -> Result<()> {
        let slot = self
            .values
            .get_mut(value.index())
            .ok_or(RuntimeError::UndefinedValue(value))?;
        *slot = Some(data);
        Ok(())
    }
}
