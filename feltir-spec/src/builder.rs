//! # Function Builder
//!
//! Incremental construction of a [`Function`]. The builder owns the value
//! table and the in-progress blocks; each block is terminated exactly once,
//! after which nothing more can be appended to it.
//!
//! ```text
//! let mut b = FunctionBuilder::new(signature);
//! let x = b.entry_params()[0];
//! let exit = b.create_block(&[ValueType::Felt252]);
//! b.ins_br(exit, &[x])?;
//! b.switch_to_block(exit)?;
//! ...
//! let func = b.finish()?;
//! ```

use crate::error::{IrError, Result};
use crate::function::{BasicBlock, Function, Signature};
use crate::instruction::{CmpPredicate, Instruction, Terminator};
use crate::intrinsic::Intrinsic;
use crate::types::ValueType;
use crate::value::{Block, Immediate, Value};
use crate::verify::{verify, VerificationReport};
use thiserror::Error;

/// Builder misuse
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("no current block to append to")]
    NoCurrentBlock,

    #[error("block {0} is already terminated")]
    BlockTerminated(Block),

    #[error("block {0} was never created")]
    UnknownBlock(Block),

    #[error("block {0} has no terminator")]
    MissingTerminator(Block),

    #[error("value {0} was never created")]
    UnknownValue(Value),
}

#[derive(Debug, Default)]
struct BlockData {
    params: Vec<Value>,
    instructions: Vec<Instruction>,
    terminator: Option<Terminator>,
}

/// Builder for a single function
#[derive(Debug)]
pub struct FunctionBuilder {
    signature: Signature,
    blocks: Vec<BlockData>,
    value_types: Vec<ValueType>,
    current: Option<Block>,
}

impl FunctionBuilder {
    /// Start a function; the entry block is created with the signature's
    /// parameters and becomes the current block.
    pub fn new(signature: Signature) -> Self {
        let mut builder = Self {
            signature,
            blocks: Vec::new(),
            value_types: Vec::new(),
            current: None,
        };
        let params = builder.signature.params.clone();
        let entry = builder.create_block(&params);
        builder.current = Some(entry);
        builder
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn entry_params(&self) -> &[Value] {
        &self.blocks[Block::ENTRY.index()].params
    }

    /// Append a new block with typed parameters
    pub fn create_block(&mut self, params: &[ValueType]) -> Block {
        let id = Block::new(self.blocks.len() as u32);
        let params = params.iter().map(|ty| self.make_value(*ty)).collect();
        self.blocks.push(BlockData {
            params,
            ..BlockData::default()
        });
        id
    }

    pub fn block_params(&self, block: Block) -> Result<&[Value]> {
        Ok(&self.data(block)?.params)
    }

    pub fn switch_to_block(&mut self, block: Block) -> Result<()> {
        self.data(block)?;
        self.current = Some(block);
        Ok(())
    }

    pub fn current_block(&self) -> Option<Block> {
        self.current
    }

    pub fn is_terminated(&self, block: Block) -> bool {
        self.blocks
            .get(block.index())
            .is_some_and(|b| b.terminator.is_some())
    }

    pub fn value_type(&self, value: Value) -> Option<ValueType> {
        self.value_types.get(value.index()).copied()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    // ========== Instructions ==========

    pub fn ins_const(&mut self, imm: impl Into<Immediate>) -> Result<Value> {
        let imm = imm.into();
        self.check_open()?;
        let result = self.make_value(imm.ty());
        self.push(Instruction::Const { result, imm })?;
        Ok(result)
    }

    pub fn ins_cmp(&mut self, pred: CmpPredicate, lhs: Value, rhs: Value) -> Result<Value> {
        self.check_open()?;
        let result = self.make_value(ValueType::Bool);
        self.push(Instruction::Cmp {
            result,
            pred,
            lhs,
            rhs,
        })?;
        Ok(result)
    }

    /// Call an intrinsic helper; results are typed by its contract
    pub fn ins_call(&mut self, callee: Intrinsic, args: &[Value]) -> Result<Vec<Value>> {
        self.check_open()?;
        let results: Vec<Value> = callee
            .results()
            .into_iter()
            .map(|ty| self.make_value(ty))
            .collect();
        self.push(Instruction::Call {
            callee,
            args: args.to_vec(),
            results: results.clone(),
        })?;
        Ok(results)
    }

    // ========== Terminators ==========

    pub fn ins_br(&mut self, dest: Block, args: &[Value]) -> Result<()> {
        self.data(dest)?;
        self.terminate(Terminator::Br {
            dest,
            args: args.to_vec(),
        })
    }

    pub fn ins_cond_br(
        &mut self,
        cond: Value,
        then_dest: Block,
        then_args: &[Value],
        else_dest: Block,
        else_args: &[Value],
    ) -> Result<()> {
        self.data(then_dest)?;
        self.data(else_dest)?;
        self.terminate(Terminator::CondBr {
            cond,
            then_dest,
            then_args: then_args.to_vec(),
            else_dest,
            else_args: else_args.to_vec(),
        })
    }

    pub fn ins_return(&mut self, values: &[Value]) -> Result<()> {
        self.terminate(Terminator::Return {
            values: values.to_vec(),
        })
    }

    // ========== Sealing ==========

    /// Seal without running the verifier; only checks that every block is
    /// terminated.
    pub fn seal(self) -> Result<Function> {
        let mut blocks = Vec::with_capacity(self.blocks.len());
        for (index, data) in self.blocks.into_iter().enumerate() {
            let id = Block::new(index as u32);
            let terminator = data
                .terminator
                .ok_or(BuilderError::MissingTerminator(id))?;
            blocks.push(BasicBlock::new(id, data.params, data.instructions, terminator));
        }
        Ok(Function::from_parts(self.signature, blocks, self.value_types))
    }

    /// Seal and verify, returning the verifier report alongside
    pub fn finish_with_report(self) -> Result<(Function, VerificationReport)> {
        let func = self.seal()?;
        let report = verify(&func);
        if !report.is_valid() {
            return Err(IrError::Verification {
                function: func.name().to_string(),
                errors: report.errors,
            });
        }
        Ok((func, report))
    }

    /// Seal and verify
    pub fn finish(self) -> Result<Function> {
        self.finish_with_report().map(|(func, _)| func)
    }

    // ========== Internals ==========

    fn make_value(&mut self, ty: ValueType) -> Value {
        let value = Value::new(self.value_types.len() as u32);
        self.value_types.push(ty);
        value
    }

    fn data(&self, block: Block) -> std::result::Result<&BlockData, BuilderError> {
        self.blocks
            .get(block.index())
            .ok_or(BuilderError::UnknownBlock(block))
    }

    fn check_open(&self) -> std::result::Result<Block, BuilderError> {
        let block = self.current.ok_or(BuilderError::NoCurrentBlock)?;
        if self.is_terminated(block) {
            return Err(BuilderError::BlockTerminated(block));
        }
        Ok(block)
    }

    fn push(&mut self, inst: Instruction) -> Result<()> {
        let block = self.check_open()?;
        self.blocks[block.index()].instructions.push(inst);
        Ok(())
    }

    fn terminate(&mut self, term: Terminator) -> Result<()> {
        let block = self.check_open()?;
        self.blocks[block.index()].terminator = Some(term);
        self.current = None;
        Ok(())
    }
}
