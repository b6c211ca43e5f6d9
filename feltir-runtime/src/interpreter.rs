//! Reference interpreter for sealed Felt IR functions

use crate::error::{Result, RuntimeError};
use crate::execute::{compare, execute_intrinsic};
use crate::state::{Frame, RtValue};
use feltir_spec::{Block, Function, Instruction, Terminator, Value};
use tracing::{debug, trace};

/// Interpreter configuration
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Maximum number of instructions and terminators before giving up
    pub max_steps: u64,

    /// Log every instruction at trace level
    pub trace: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            trace: false,
        }
    }
}

/// Execution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Values passed to `return`
    pub returns: Vec<RtValue>,

    /// Instructions and terminators executed
    pub steps: u64,

    /// Blocks entered, in execution order
    pub blocks_visited: Vec<Block>,
}

pub struct Interpreter<'f> {
    func: &'f Function,
    config: InterpreterConfig,
}

impl<'f> Interpreter<'f> {
    pub fn new(func: &'f Function, config: InterpreterConfig) -> Self {
        Self { func, config }
    }

    /// Run the function to its `return`
    pub fn run(&self, args: &[RtValue]) -> Result<ExecutionResult> {
        let params = &self.func.signature().params;
        if args.len() != params.len() {
            return Err(RuntimeError::ArgumentCount {
                expected: params.len(),
                found: args.len(),
            });
        }
        for (index, (arg, expected)) in args.iter().zip(params).enumerate() {
            if arg.ty() != *expected {
                return Err(RuntimeError::ArgumentType {
                    index,
                    expected: *expected,
                    found: arg.ty(),
                });
            }
        }

        let mut frame = Frame::new(self.func.num_values());
        let mut blocks_visited = Vec::new();
        self.enter(&mut frame, Block::ENTRY, args)?;

        loop {
            let block = self
                .func
                .block(frame.block)
                .ok_or(RuntimeError::UndefinedBlock(frame.block))?;
            blocks_visited.push(block.id());
            debug!(function = self.func.name(), block = %block.id(), "enter block");

            for inst in block.instructions() {
                self.step(&mut frame)?;
                if self.config.trace {
                    trace!(step = frame.steps, "{:?}", inst);
                }
                self.execute(&mut frame, inst)?;
            }

            self.step(&mut frame)?;
            match block.terminator() {
                Terminator::Br { dest, args } => {
                    let values = frame.read_many(args)?;
                    self.enter(&mut frame, *dest, &values)?;
                }
                Terminator::CondBr {
                    cond,
                    then_dest,
                    then_args,
                    else_dest,
                    else_args,
                } => {
                    let (dest, args) = if self.read_bool(&frame, *cond)? {
                        (*then_dest, then_args)
                    } else {
                        (*else_dest, else_args)
                    };
                    let values = frame.read_many(args)?;
                    self.enter(&mut frame, dest, &values)?;
                }
                Terminator::Return { values } => {
                    return Ok(ExecutionResult {
                        returns: frame.read_many(values)?,
                        steps: frame.steps,
                        blocks_visited,
                    });
                }
            }
        }
    }

    fn step(&self, frame: &mut Frame) -> Result<()> {
        if frame.steps >= self.config.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.config.max_steps,
            });
        }
        frame.steps += 1;
        Ok(())
    }

    /// Bind incoming values to the parameters of `dest` and make it current
    fn enter(&self, frame: &mut Frame, dest: Block, values: &[RtValue]) -> Result<()> {
        let block = self
            .func
            .block(dest)
            .ok_or(RuntimeError::UndefinedBlock(dest))?;
        if block.params().len() != values.len() {
            return Err(RuntimeError::ArgumentCount {
                expected: block.params().len(),
                found: values.len(),
            });
        }
        for (param, value) in block.params().iter().zip(values) {
            self.check_type(*param, *value)?;
            frame.write(*param, *value)?;
        }
        frame.block = dest;
        Ok(())
    }

    fn execute(&self, frame: &mut Frame, inst: &Instruction) -> Result<()> {
        match inst {
            Instruction::Const { result, imm } => frame.write(*result, RtValue::from(*imm)),
            Instruction::Cmp {
                result,
                pred,
                lhs,
                rhs,
            } => {
                let a = frame.read(*lhs)?;
                let b = frame.read(*rhs)?;
                let outcome = compare(*pred, a, b).ok_or(RuntimeError::TypeMismatch {
                    value: *rhs,
                    expected: a.ty(),
                    found: b.ty(),
                })?;
                frame.write(*result, RtValue::Bool(outcome))
            }
            Instruction::Call {
                callee,
                args,
                results,
            } => {
                let inputs = frame.read_many(args)?;
                let outputs = execute_intrinsic(*callee, &inputs)?;
                if outputs.len() != results.len() {
                    return Err(RuntimeError::ArgumentCount {
                        expected: results.len(),
                        found: outputs.len(),
                    });
                }
                for (value, data) in results.iter().zip(outputs) {
                    self.check_type(*value, data)?;
                    frame.write(*value, data)?;
                }
                Ok(())
            }
        }
    }

    fn read_bool(&self, frame: &Frame, value: Value) -> Result<bool> {
        let data = frame.read(value)?;
        data.as_bool().ok_or(RuntimeError::TypeMismatch {
            value,
            expected: feltir_spec::ValueType::Bool,
            found: data.ty(),
        })
    }

    fn check_type(&self, value: Value, data: RtValue) -> Result<()> {
        match self.func.value_type(value) {
            Some(expected) if expected == data.ty() => Ok(()),
            Some(expected) => Err(RuntimeError::TypeMismatch {
                value,
                expected,
                found: data.ty(),
            }),
            None => Err(RuntimeError::UndefinedValue(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feltir_spec::{
        CmpPredicate, Felt, FunctionBuilder, Immediate, Intrinsic, Signature, ValueType,
    };

    /// (x: felt252) -> felt252: x == 0 ? 7 : x * x
    fn square_or_seven() -> Function {
        let sig = Signature::new("square_or_seven", vec![ValueType::Felt252], vec![ValueType::Felt252]);
        let mut b = FunctionBuilder::new(sig);
        let x = b.entry_params()[0];
        let zero_block = b.create_block(&[]);
        let other = b.create_block(&[ValueType::Felt252]);
        let join = b.create_block(&[ValueType::Felt252]);

        let copies = b.ins_call(Intrinsic::Dup(ValueType::Felt252), &[x]).unwrap();
        let zero = b.ins_const(Felt::ZERO).unwrap();
        let is_zero = b.ins_cmp(CmpPredicate::Eq, copies[0], zero).unwrap();
        b.ins_cond_br(is_zero, zero_block, &[], other, &[copies[1]]).unwrap();

        b.switch_to_block(zero_block).unwrap();
        let seven = b.ins_const(Felt::from_u64(7)).unwrap();
        b.ins_br(join, &[seven]).unwrap();

        b.switch_to_block(other).unwrap();
        let y = b.block_params(other).unwrap()[0];
        let copies = b.ins_call(Intrinsic::Dup(ValueType::Felt252), &[y]).unwrap();
        let sq = b
            .ins_call(Intrinsic::Felt252Mul, &[copies[0], copies[1]])
            .unwrap();
        b.ins_br(join, &[sq[0]]).unwrap();

        b.switch_to_block(join).unwrap();
        let r = b.block_params(join).unwrap()[0];
        b.ins_return(&[r]).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn test_interpreter_config_default() {
        let config = InterpreterConfig::default();
        assert_eq!(config.max_steps, 10_000);
        assert!(!config.trace);
    }

    #[test]
    fn test_both_arms() {
        let func = square_or_seven();
        let interp = Interpreter::new(&func, InterpreterConfig::default());

        let result = interp.run(&[Felt::ZERO.into()]).unwrap();
        assert_eq!(result.returns, vec![RtValue::Felt(Felt::from_u64(7))]);
        assert_eq!(result.blocks_visited.len(), 3);

        let result = interp.run(&[Felt::from_i64(-5).into()]).unwrap();
        assert_eq!(result.returns, vec![RtValue::Felt(Felt::from_u64(25))]);
        assert_eq!(
            result.blocks_visited,
            vec![Block::ENTRY, Block::new(2), Block::new(3)]
        );
    }

    #[test]
    fn test_argument_checks() {
        let func = square_or_seven();
        let interp = Interpreter::new(&func, InterpreterConfig::default());
        assert!(matches!(
            interp.run(&[]),
            Err(RuntimeError::ArgumentCount { expected: 1, found: 0 })
        ));
        assert!(matches!(
            interp.run(&[RtValue::U32(1)]),
            Err(RuntimeError::ArgumentType { index: 0, .. })
        ));
    }

    #[test]
    fn test_step_limit() {
        let func = square_or_seven();
        let config = InterpreterConfig {
            max_steps: 2,
            ..Default::default()
        };
        let err = Interpreter::new(&func, config)
            .run(&[Felt::ONE.into()])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 2 }));
    }

    #[test]
    fn test_loop_hits_step_limit() {
        let sig = Signature::new("spin", vec![], vec![]);
        let mut b = FunctionBuilder::new(sig);
        let head = b.create_block(&[ValueType::U32]);
        let start = b.ins_const(Immediate::U32(0)).unwrap();
        b.ins_br(head, &[start]).unwrap();
        b.switch_to_block(head).unwrap();
        let i = b.block_params(head).unwrap()[0];
        b.ins_br(head, &[i]).unwrap();
        let func = b.finish().unwrap();

        let err = Interpreter::new(&func, InterpreterConfig::default())
            .run(&[])
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 10_000 }));
    }
}
