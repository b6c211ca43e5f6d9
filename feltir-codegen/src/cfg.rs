//! # Control-Flow Graph Builder
//!
//! Lowers an ordered [`StackOp`] stream into basic blocks.
//!
//! Labels are declared up front so branches may target blocks that appear
//! later in the stream. Each label becomes one block whose parameters bind
//! positionally to the arguments of every incoming branch. Blocks are laid
//! out in the order their labels appear, after the implicit entry block.
//!
//! Source variables are scoped to the block that defines them; the variable
//! environment is reset at every label.

use crate::error::{CodegenError, MalformedKind, Result};
use crate::lifecycle::{Handle, LifecycleError, Storage, ValueLifecycle};
use crate::op::{Label, StackOp, VarId};
use crate::registry::LoweringRegistry;
use feltir_spec::{Block, BuilderError, FunctionBuilder, IrError, Value, ValueType};
use std::collections::HashMap;
use tracing::trace;

/// What the lowering produced, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgSummary {
    pub blocks: usize,
    pub handles: usize,
    pub temp_slots: u32,
    /// Handles never consumed by a later operation
    pub live_handles: usize,
}

pub struct CfgBuilder<'a> {
    function: &'a str,
    registry: &'a LoweringRegistry,
    builder: &'a mut FunctionBuilder,
    lifecycle: ValueLifecycle,
    labels: HashMap<Label, Block>,
    env: HashMap<VarId, Handle>,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(
        function: &'a str,
        registry: &'a LoweringRegistry,
        builder: &'a mut FunctionBuilder,
    ) -> Self {
        Self {
            function,
            registry,
            builder,
            lifecycle: ValueLifecycle::new(),
            labels: HashMap::new(),
            env: HashMap::new(),
        }
    }

    /// Lower a whole function body. `params` name the entry block parameters.
    pub fn lower(mut self, params: &[VarId], ops: &[StackOp]) -> Result<CfgSummary> {
        self.declare_labels(ops)?;
        self.bind_entry(params)?;

        for (op_index, op) in ops.iter().enumerate() {
            trace!(function = self.function, op_index, op = op.name(), "lowering");
            self.lower_op(op_index, op)?;
        }

        if self.builder.current_block().is_some() {
            return Err(self.malformed(ops.len(), MalformedKind::UnterminatedBlock));
        }

        Ok(CfgSummary {
            blocks: self.builder.num_blocks(),
            handles: self.lifecycle.len(),
            temp_slots: self.lifecycle.temp_slots(),
            live_handles: self.lifecycle.live_handles().len(),
        })
    }

    fn declare_labels(&mut self, ops: &[StackOp]) -> Result<()> {
        for (op_index, op) in ops.iter().enumerate() {
            if let StackOp::Label { label, params } = op {
                if self.labels.contains_key(label) {
                    return Err(self.malformed(op_index, MalformedKind::DuplicateLabel(*label)));
                }
                let types: Vec<ValueType> = params.iter().map(|(_, ty)| *ty).collect();
                let block = self.builder.create_block(&types);
                self.labels.insert(*label, block);
            }
        }
        Ok(())
    }

    fn bind_entry(&mut self, params: &[VarId]) -> Result<()> {
        let values = self.builder.entry_params().to_vec();
        if values.len() != params.len() {
            return Err(self.malformed(
                0,
                MalformedKind::ArgumentArity {
                    expected: values.len(),
                    found: params.len(),
                },
            ));
        }
        for (i, (var, value)) in params.iter().zip(values).enumerate() {
            let ty = self.type_of(value)?;
            let handle = self.lifecycle.bind(value, ty, Storage::Param(i));
            self.define(0, *var, handle)?;
        }
        Ok(())
    }

    fn lower_op(&mut self, op_index: usize, op: &StackOp) -> Result<()> {
        let is_label = matches!(op, StackOp::Label { .. });
        if !is_label && self.builder.current_block().is_none() {
            return Err(self.malformed(op_index, MalformedKind::UnreachableOperation));
        }

        match op {
            StackOp::Label { label, params } => self.open_block(op_index, *label, params),

            StackOp::Const { dest, value } => {
                let v = self.builder.ins_const(*value).map_err(|e| self.ir(e))?;
                let handle = self.lifecycle.bind(v, value.ty(), Storage::Implicit);
                self.define(op_index, *dest, handle)
            }

            StackOp::Duplicate { ty, src, dests } => {
                let handle = self.lookup(op_index, *src)?;
                let (first, second) = self
                    .lifecycle
                    .duplicate(self.builder, handle, *ty, op_index)
                    .map_err(|e| self.lifecycle_error(op_index, *src, e))?;
                self.define(op_index, dests[0], first)?;
                self.define(op_index, dests[1], second)
            }

            StackOp::StoreTemp { ty, src, dest } => {
                let handle = self.lookup(op_index, *src)?;
                let stored = self
                    .lifecycle
                    .store_temp(self.builder, handle, *ty, op_index)
                    .map_err(|e| self.lifecycle_error(op_index, *src, e))?;
                self.define(op_index, *dest, stored)
            }

            StackOp::Rename { ty, src, dest } => {
                let handle = self.lookup(op_index, *src)?;
                let renamed = self
                    .lifecycle
                    .rename(self.builder, handle, *ty, op_index)
                    .map_err(|e| self.lifecycle_error(op_index, *src, e))?;
                self.define(op_index, *dest, renamed)
            }

            StackOp::Call {
                libfunc,
                args,
                results,
            } => self.lower_call(op_index, libfunc, args, results),

            StackOp::Branch { target, args } => {
                let dest = self.target(op_index, *target)?;
                let values = self.edge_args(op_index, dest, args)?;
                self.builder.ins_br(dest, &values).map_err(|e| self.ir(e))
            }

            StackOp::CondBranch {
                cond,
                then_target,
                then_args,
                else_target,
                else_args,
            } => {
                let cond = self.consume(op_index, *cond, ValueType::Bool)?;
                let then_dest = self.target(op_index, *then_target)?;
                let else_dest = self.target(op_index, *else_target)?;
                let then_values = self.edge_args(op_index, then_dest, then_args)?;
                let else_values = self.edge_args(op_index, else_dest, else_args)?;
                self.builder
                    .ins_cond_br(cond, then_dest, &then_values, else_dest, &else_values)
                    .map_err(|e| self.ir(e))
            }

            StackOp::Return { args } => {
                let returns = self.builder.signature().returns.clone();
                if returns.len() != args.len() {
                    return Err(self.malformed(
                        op_index,
                        MalformedKind::ArgumentArity {
                            expected: returns.len(),
                            found: args.len(),
                        },
                    ));
                }
                let mut values = Vec::with_capacity(args.len());
                for (var, ty) in args.iter().zip(returns) {
                    values.push(self.consume_materialized(op_index, *var, ty)?);
                }
                self.builder.ins_return(&values).map_err(|e| self.ir(e))
            }
        }
    }

    fn open_block(
        &mut self,
        op_index: usize,
        label: Label,
        params: &[(VarId, ValueType)],
    ) -> Result<()> {
        if self.builder.current_block().is_some() {
            return Err(self.malformed(op_index, MalformedKind::UnterminatedBlock));
        }
        let block = self.target(op_index, label)?;
        self.builder.switch_to_block(block).map_err(|e| self.ir(e))?;
        self.env.clear();

        let values = self
            .builder
            .block_params(block)
            .map_err(|e| self.ir(e))?
            .to_vec();
        for (i, ((var, ty), value)) in params.iter().zip(values).enumerate() {
            let handle = self.lifecycle.bind(value, *ty, Storage::BlockParam(i));
            self.define(op_index, *var, handle)?;
        }
        trace!(function = self.function, %label, %block, "block opened");
        Ok(())
    }

    fn lower_call(
        &mut self,
        op_index: usize,
        libfunc: &str,
        args: &[VarId],
        results: &[VarId],
    ) -> Result<()> {
        let registry = self.registry;
        let def = registry
            .get(libfunc)
            .ok_or_else(|| CodegenError::Unsupported {
                function: self.function.to_string(),
                op_index,
                operation: libfunc.to_string(),
            })?;

        if def.params.len() != args.len() {
            return Err(self.malformed(
                op_index,
                MalformedKind::ArgumentArity {
                    expected: def.params.len(),
                    found: args.len(),
                },
            ));
        }
        if def.results.len() != results.len() {
            return Err(self.malformed(
                op_index,
                MalformedKind::ResultArity {
                    expected: def.results.len(),
                    found: results.len(),
                },
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for (var, ty) in args.iter().zip(&def.params) {
            values.push(self.consume(op_index, *var, *ty)?);
        }

        let outputs = def.lower(self.builder, &values).map_err(|e| self.ir(e))?;
        for ((var, ty), value) in results.iter().zip(&def.results).zip(outputs) {
            let handle = self.lifecycle.bind(value, *ty, Storage::Implicit);
            self.define(op_index, *var, handle)?;
        }
        Ok(())
    }

    /// Consume branch arguments against the target's parameters
    fn edge_args(&mut self, op_index: usize, dest: Block, args: &[VarId]) -> Result<Vec<Value>> {
        let params = self
            .builder
            .block_params(dest)
            .map_err(|e| self.ir(e))?
            .to_vec();
        if params.len() != args.len() {
            return Err(self.malformed(
                op_index,
                MalformedKind::ArgumentArity {
                    expected: params.len(),
                    found: args.len(),
                },
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for (var, param) in args.iter().zip(params) {
            let ty = self.type_of(param)?;
            values.push(self.consume_materialized(op_index, *var, ty)?);
        }
        Ok(values)
    }

    // ========== Environment ==========

    fn define(&mut self, op_index: usize, var: VarId, handle: Handle) -> Result<()> {
        if self.env.insert(var, handle).is_some() {
            return Err(self.malformed(op_index, MalformedKind::RedefinedVar(var)));
        }
        Ok(())
    }

    fn lookup(&self, op_index: usize, var: VarId) -> Result<Handle> {
        self.env
            .get(&var)
            .copied()
            .ok_or_else(|| self.malformed(op_index, MalformedKind::UndefinedVar(var)))
    }

    fn consume(&mut self, op_index: usize, var: VarId, ty: ValueType) -> Result<Value> {
        let handle = self.lookup(op_index, var)?;
        self.lifecycle
            .consume(handle, ty, op_index)
            .map(|entry| entry.value)
            .map_err(|e| self.lifecycle_error(op_index, var, e))
    }

    fn consume_materialized(&mut self, op_index: usize, var: VarId, ty: ValueType) -> Result<Value> {
        let value = self.consume(op_index, var, ty)?;
        let handle = self.lookup(op_index, var)?;
        self.lifecycle
            .require_materialized(handle)
            .map_err(|e| self.lifecycle_error(op_index, var, e))?;
        Ok(value)
    }

    fn target(&self, op_index: usize, label: Label) -> Result<Block> {
        self.labels
            .get(&label)
            .copied()
            .ok_or_else(|| self.malformed(op_index, MalformedKind::UndefinedLabel(label)))
    }

    fn type_of(&self, value: Value) -> Result<ValueType> {
        self.builder
            .value_type(value)
            .ok_or_else(|| self.ir(IrError::Builder(BuilderError::UnknownValue(value))))
    }

    // ========== Errors ==========

    fn malformed(&self, op_index: usize, kind: MalformedKind) -> CodegenError {
        CodegenError::Malformed {
            function: self.function.to_string(),
            op_index,
            kind,
        }
    }

    fn ir(&self, source: IrError) -> CodegenError {
        CodegenError::Ir {
            function: self.function.to_string(),
            source,
        }
    }

    fn lifecycle_error(&self, op_index: usize, var: VarId, error: LifecycleError) -> CodegenError {
        let kind = match error {
            LifecycleError::Consumed { consumed_at, .. } => {
                MalformedKind::ConsumedValue { var, consumed_at }
            }
            LifecycleError::TypeMismatch {
                expected, found, ..
            } => MalformedKind::TypeMismatch {
                var,
                expected,
                found,
            },
            LifecycleError::NotMaterialized(_) => MalformedKind::NotMaterialized { var },
            LifecycleError::UnknownHandle(handle) => MalformedKind::UnknownHandle(handle),
            LifecycleError::Builder(source) => return self.ir(source),
        };
        self.malformed(op_index, kind)
    }
}
