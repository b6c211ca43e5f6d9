//! Felt IR instructions and terminators
//!
//! A block holds straight-line [`Instruction`]s and ends in exactly one
//! [`Terminator`]. Branch arguments bind positionally to the target block's
//! parameters.

use crate::intrinsic::Intrinsic;
use crate::value::{Block, Immediate, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer comparison predicate
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpPredicate {
    Eq,
    Ne,
    /// Unsigned less-than
    Ult,
    /// Unsigned less-or-equal
    Ule,
}

impl CmpPredicate {
    pub fn mnemonic(self) -> &'static str {
        match self {
            CmpPredicate::Eq => "eq",
            CmpPredicate::Ne => "ne",
            CmpPredicate::Ult => "ult",
            CmpPredicate::Ule => "ule",
        }
    }
}

impl fmt::Display for CmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Non-terminating instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// result = imm
    Const { result: Value, imm: Immediate },

    /// result = (lhs <pred> rhs), a Bool
    Cmp {
        result: Value,
        pred: CmpPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// results = callee(args)
    Call {
        callee: Intrinsic,
        args: Vec<Value>,
        results: Vec<Value>,
    },
}

impl Instruction {
    /// Values defined by this instruction
    pub fn results(&self) -> &[Value] {
        match self {
            Instruction::Const { result, .. } | Instruction::Cmp { result, .. } => {
                std::slice::from_ref(result)
            }
            Instruction::Call { results, .. } => results,
        }
    }

    /// Values read by this instruction
    pub fn operands(&self) -> Vec<Value> {
        match self {
            Instruction::Const { .. } => Vec::new(),
            Instruction::Cmp { lhs, rhs, .. } => vec![*lhs, *rhs],
            Instruction::Call { args, .. } => args.clone(),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Const { .. } => "const",
            Instruction::Cmp { .. } => "cmp",
            Instruction::Call { .. } => "call",
        }
    }
}

/// Block terminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    /// Unconditional branch
    Br { dest: Block, args: Vec<Value> },

    /// Two-way branch on a Bool
    CondBr {
        cond: Value,
        then_dest: Block,
        then_args: Vec<Value>,
        else_dest: Block,
        else_args: Vec<Value>,
    },

    /// Function return
    Return { values: Vec<Value> },
}

impl Terminator {
    /// Successor edges with their argument lists, in declaration order
    pub fn successors(&self) -> Vec<(Block, &[Value])> {
        match self {
            Terminator::Br { dest, args } => vec![(*dest, args.as_slice())],
            Terminator::CondBr {
                then_dest,
                then_args,
                else_dest,
                else_args,
                ..
            } => vec![
                (*then_dest, then_args.as_slice()),
                (*else_dest, else_args.as_slice()),
            ],
            Terminator::Return { .. } => Vec::new(),
        }
    }

    /// Values read by this terminator
    pub fn operands(&self) -> Vec<Value> {
        match self {
            Terminator::Br { args, .. } => args.clone(),
            Terminator::CondBr {
                cond,
                then_args,
                else_args,
                ..
            } => std::iter::once(*cond)
                .chain(then_args.iter().copied())
                .chain(else_args.iter().copied())
                .collect(),
            Terminator::Return { values } => values.clone(),
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Terminator::Br { .. } => "br",
            Terminator::CondBr { .. } => "cond_br",
            Terminator::Return { .. } => "return",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[test]
    fn test_instruction_results_and_operands() {
        let call = Instruction::Call {
            callee: Intrinsic::Dup(ValueType::Felt252),
            args: vec![Value::new(1)],
            results: vec![Value::new(2), Value::new(3)],
        };
        assert_eq!(call.results(), &[Value::new(2), Value::new(3)]);
        assert_eq!(call.operands(), vec![Value::new(1)]);

        let cmp = Instruction::Cmp {
            result: Value::new(5),
            pred: CmpPredicate::Eq,
            lhs: Value::new(2),
            rhs: Value::new(4),
        };
        assert_eq!(cmp.results(), &[Value::new(5)]);
        assert_eq!(cmp.mnemonic(), "cmp");
    }

    #[test]
    fn test_cond_br_successor_order() {
        let term = Terminator::CondBr {
            cond: Value::new(0),
            then_dest: Block::new(2),
            then_args: vec![],
            else_dest: Block::new(3),
            else_args: vec![Value::new(1)],
        };
        let succ = term.successors();
        assert_eq!(succ[0].0, Block::new(2));
        assert_eq!(succ[1].0, Block::new(3));
        assert_eq!(succ[1].1, &[Value::new(1)]);
        assert_eq!(term.operands(), vec![Value::new(0), Value::new(1)]);
    }
}
