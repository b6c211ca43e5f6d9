//! # Sealed Functions
//!
//! A [`Function`] is the immutable product of a [`FunctionBuilder`]: an
//! ordered block list (entry first), a typed value table, and a signature.
//! Once sealed it can only be read, walked, encoded, or fingerprinted.
//!
//! [`FunctionBuilder`]: crate::builder::FunctionBuilder

use crate::error::{IrError, Result};
use crate::instruction::{Instruction, Terminator};
use crate::intrinsic::Intrinsic;
use crate::types::ValueType;
use crate::value::{Block, Value};
use crate::verify::verify;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Function signature: name, ordered parameter types, ordered return types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub params: Vec<ValueType>,
    pub returns: Vec<ValueType>,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, returns: Vec<ValueType>) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ") -> (")?;
        for (i, ty) in self.returns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

/// A terminated basic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    id: Block,
    params: Vec<Value>,
    instructions: Vec<Instruction>,
    terminator: Terminator,
}

impl BasicBlock {
    pub(crate) fn new(
        id: Block,
        params: Vec<Value>,
        instructions: Vec<Instruction>,
        terminator: Terminator,
    ) -> Self {
        Self {
            id,
            params,
            instructions,
            terminator,
        }
    }

    pub fn id(&self) -> Block {
        self.id
    }

    /// Block parameters, bound positionally by incoming branch arguments
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn terminator(&self) -> &Terminator {
        &self.terminator
    }
}

/// Sealed function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    signature: Signature,
    blocks: Vec<BasicBlock>,
    value_types: Vec<ValueType>,
}

impl Function {
    /// Assemble a function without verifying it
    pub(crate) fn from_parts(
        signature: Signature,
        blocks: Vec<BasicBlock>,
        value_types: Vec<ValueType>,
    ) -> Self {
        Self {
            signature,
            blocks,
            value_types,
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Blocks in declaration order, entry first
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn entry(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, id: Block) -> Option<&BasicBlock> {
        self.blocks.get(id.index()).filter(|b| b.id == id)
    }

    pub fn value_type(&self, value: Value) -> Option<ValueType> {
        self.value_types.get(value.index()).copied()
    }

    pub fn num_values(&self) -> usize {
        self.value_types.len()
    }

    pub fn num_instructions(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Depth-first walk from the entry block.
    ///
    /// Every reachable block is visited exactly once. Successors are taken in
    /// terminator order, so the `then` side of a conditional branch is
    /// visited before its `else` side.
    pub fn walk(&self) -> Vec<Block> {
        let mut order = Vec::with_capacity(self.blocks.len());
        let Some(entry) = self.entry() else {
            return order;
        };

        let mut seen = HashSet::new();
        let mut stack = vec![entry.id];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(block) = self.block(id) else {
                continue;
            };
            order.push(id);
            // Reverse so the first successor is popped first
            for (dest, _) in block.terminator.successors().into_iter().rev() {
                if !seen.contains(&dest) {
                    stack.push(dest);
                }
            }
        }
        order
    }

    /// Blocks that [`walk`](Self::walk) never reaches, in block order
    pub fn unreachable_blocks(&self) -> Vec<Block> {
        let reachable: HashSet<Block> = self.walk().into_iter().collect();
        self.blocks
            .iter()
            .map(|b| b.id)
            .filter(|id| !reachable.contains(id))
            .collect()
    }

    /// Every intrinsic helper this function calls
    pub fn intrinsic_calls(&self) -> BTreeSet<Intrinsic> {
        self.blocks
            .iter()
            .flat_map(|b| b.instructions.iter())
            .filter_map(|inst| match inst {
                Instruction::Call { callee, .. } => Some(*callee),
                _ => None,
            })
            .collect()
    }

    /// Serialize to the binary form
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from the binary form, re-verifying the structure
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let func: Function = bincode::deserialize(bytes)?;
        let report = verify(&func);
        if !report.is_valid() {
            return Err(IrError::Verification {
                function: func.signature.name.clone(),
                errors: report.errors,
            });
        }
        Ok(func)
    }

    /// SHA-256 of the binary form
    pub fn fingerprint(&self) -> Result<[u8; 32]> {
        let bytes = self.to_bytes()?;
        let digest = Sha256::digest(&bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Ok(out)
    }
}
