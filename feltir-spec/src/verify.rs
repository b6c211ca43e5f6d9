//! Function verification for Felt IR
//!
//! Checks a function for structural consistency before it is handed to a
//! serializer or interpreter:
//! - entry parameters match the signature
//! - every value is defined once, and used only inside its defining block
//! - call sites match their intrinsic contract (arity and types)
//! - branch arguments match the target's parameters positionally
//! - returns match the signature
//! - every block other than the entry is reachable

use crate::function::Function;
use crate::instruction::{CmpPredicate, Instruction, Terminator};
use crate::intrinsic::Intrinsic;
use crate::types::ValueType;
use crate::value::{Block, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Verification error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("function has no entry block")]
    MissingEntry,

    #[error("entry block parameters {found:?} do not match signature {expected:?}")]
    EntryParamMismatch {
        expected: Vec<ValueType>,
        found: Vec<ValueType>,
    },

    #[error("value {value} has no type")]
    UnknownValue { value: Value },

    #[error("value {value} is defined more than once")]
    Redefined { value: Value },

    #[error("{block}: value {value} is used but not defined in this block")]
    UndefinedValue { block: Block, value: Value },

    #[error("{block}: call to {callee} expects {expected} argument(s), found {found}")]
    CallArity {
        block: Block,
        callee: Intrinsic,
        expected: usize,
        found: usize,
    },

    #[error("{block}: call to {callee} defines {found} result(s), contract has {expected}")]
    CallResultArity {
        block: Block,
        callee: Intrinsic,
        expected: usize,
        found: usize,
    },

    #[error("{block}: {value} has type {found}, expected {expected}")]
    TypeMismatch {
        block: Block,
        value: Value,
        expected: ValueType,
        found: ValueType,
    },

    #[error("{block}: comparison `{pred}` between {lhs} and {rhs} of different types")]
    CmpOperands {
        block: Block,
        pred: CmpPredicate,
        lhs: ValueType,
        rhs: ValueType,
    },

    #[error("{block}: branch to undefined block {dest}")]
    UndefinedBlock { block: Block, dest: Block },

    #[error("{block}: branch to {dest} passes {found} argument(s), block takes {expected}")]
    BranchArity {
        block: Block,
        dest: Block,
        expected: usize,
        found: usize,
    },

    #[error("{block}: return passes {found} value(s), signature returns {expected}")]
    ReturnArity {
        block: Block,
        expected: usize,
        found: usize,
    },

    #[error("block {block} is not reachable from the entry block")]
    UnreachableBlock { block: Block },
}

/// Verification warning types (not errors, but worth noting)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyWarning {
    /// Value is defined but never read
    UnusedValue { block: Block, value: Value },
}

/// Verification result
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub errors: Vec<VerifyError>,
    pub warnings: Vec<VerifyWarning>,
}

impl VerificationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if verification passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn error(&mut self, error: VerifyError) {
        self.errors.push(error);
    }
}

/// Verify a function
pub fn verify(func: &Function) -> VerificationReport {
    let mut report = VerificationReport::new();

    let Some(entry) = func.blocks().first() else {
        report.error(VerifyError::MissingEntry);
        return report;
    };

    let entry_types: Vec<ValueType> = entry
        .params()
        .iter()
        .filter_map(|p| func.value_type(*p))
        .collect();
    if entry_types != func.signature().params {
        report.error(VerifyError::EntryParamMismatch {
            expected: func.signature().params.clone(),
            found: entry_types,
        });
    }

    let mut defined: HashSet<Value> = HashSet::new();
    let mut used: HashSet<Value> = HashSet::new();
    let mut definitions: Vec<(Block, Value)> = Vec::new();

    for block in func.blocks() {
        let id = block.id();
        let mut local: HashSet<Value> = HashSet::new();

        for &param in block.params() {
            define(func, &mut report, &mut defined, &mut local, id, param);
            definitions.push((id, param));
        }

        for inst in block.instructions() {
            for operand in inst.operands() {
                use_value(&mut report, &local, &mut used, id, operand);
            }
            check_instruction(func, &mut report, id, inst);
            for &result in inst.results() {
                define(func, &mut report, &mut defined, &mut local, id, result);
                definitions.push((id, result));
            }
        }

        let term = block.terminator();
        for operand in term.operands() {
            use_value(&mut report, &local, &mut used, id, operand);
        }
        check_terminator(func, &mut report, id, term);
    }

    for block in func.unreachable_blocks() {
        report.error(VerifyError::UnreachableBlock { block });
    }

    for (block, value) in definitions {
        if !used.contains(&value) {
            report.warnings.push(VerifyWarning::UnusedValue { block, value });
        }
    }

    report
}

fn define(
    func: &Function,
    report: &mut VerificationReport,
    defined: &mut HashSet<Value>,
    local: &mut HashSet<Value>,
    _block: Block,
    value: Value,
) {
    if func.value_type(value).is_none() {
        report.error(VerifyError::UnknownValue { value });
    }
    if !defined.insert(value) {
        report.error(VerifyError::Redefined { value });
    }
    local.insert(value);
}

fn use_value(
    report: &mut VerificationReport,
    local: &HashSet<Value>,
    used: &mut HashSet<Value>,
    block: Block,
    value: Value,
) {
    if !local.contains(&value) {
        report.error(VerifyError::UndefinedValue { block, value });
    }
    used.insert(value);
}

fn check_type(
    func: &Function,
    report: &mut VerificationReport,
    block: Block,
    value: Value,
    expected: ValueType,
) {
    match func.value_type(value) {
        Some(found) if found != expected => report.error(VerifyError::TypeMismatch {
            block,
            value,
            expected,
            found,
        }),
        Some(_) => {}
        None => report.error(VerifyError::UnknownValue { value }),
    }
}

fn check_instruction(
    func: &Function,
    report: &mut VerificationReport,
    block: Block,
    inst: &Instruction,
) {
    match inst {
        Instruction::Const { result, imm } => {
            check_type(func, report, block, *result, imm.ty());
        }

        Instruction::Cmp {
            result,
            pred,
            lhs,
            rhs,
        } => {
            if let (Some(l), Some(r)) = (func.value_type(*lhs), func.value_type(*rhs)) {
                if l != r {
                    report.error(VerifyError::CmpOperands {
                        block,
                        pred: *pred,
                        lhs: l,
                        rhs: r,
                    });
                }
            }
            check_type(func, report, block, *result, ValueType::Bool);
        }

        Instruction::Call {
            callee,
            args,
            results,
        } => {
            let params = callee.params();
            if params.len() != args.len() {
                report.error(VerifyError::CallArity {
                    block,
                    callee: *callee,
                    expected: params.len(),
                    found: args.len(),
                });
            } else {
                for (arg, ty) in args.iter().zip(params) {
                    check_type(func, report, block, *arg, ty);
                }
            }

            let result_types = callee.results();
            if result_types.len() != results.len() {
                report.error(VerifyError::CallResultArity {
                    block,
                    callee: *callee,
                    expected: result_types.len(),
                    found: results.len(),
                });
            } else {
                for (result, ty) in results.iter().zip(result_types) {
                    check_type(func, report, block, *result, ty);
                }
            }
        }
    }
}

fn check_terminator(
    func: &Function,
    report: &mut VerificationReport,
    block: Block,
    term: &Terminator,
) {
    if let Terminator::CondBr { cond, .. } = term {
        check_type(func, report, block, *cond, ValueType::Bool);
    }

    if let Terminator::Return { values } = term {
        let expected = &func.signature().returns;
        if values.len() != expected.len() {
            report.error(VerifyError::ReturnArity {
                block,
                expected: expected.len(),
                found: values.len(),
            });
        } else {
            for (value, ty) in values.iter().zip(expected) {
                check_type(func, report, block, *value, *ty);
            }
        }
    }

    for (dest, args) in term.successors() {
        let Some(target) = func.block(dest) else {
            report.error(VerifyError::UndefinedBlock { block, dest });
            continue;
        };
        if target.params().len() != args.len() {
            report.error(VerifyError::BranchArity {
                block,
                dest,
                expected: target.params().len(),
                found: args.len(),
            });
            continue;
        }
        for (arg, param) in args.iter().zip(target.params()) {
            if let Some(ty) = func.value_type(*param) {
                check_type(func, report, block, *arg, ty);
            }
        }
    }
}
