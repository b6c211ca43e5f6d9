//! # Function Emitter
//!
//! Drives one function through `Empty -> Declaring -> Building -> Sealed`.
//! Each transition consumes the emitter, so there are no transitions back; a
//! failed transition drops the half-built function with it.
//!
//! ## Example
//!
//! ```rust
//! use feltir_codegen::{conditional_transform, default_registry, FunctionEmitter};
//! use feltir_spec::{CodegenConfig, Felt};
//!
//! let source = conditional_transform("double_nonzero", Felt::from_u64(2));
//! let func = FunctionEmitter::new(default_registry(), CodegenConfig::DEFAULT)
//!     .declare(source.signature())
//!     .and_then(|e| e.build(&source.param_vars(), &source.ops))
//!     .and_then(|e| e.seal())
//!     .and_then(|e| e.into_function())
//!     .unwrap();
//! assert_eq!(func.blocks().len(), 6);
//! ```

use crate::cfg::CfgBuilder;
use crate::error::{CodegenError, Result};
use crate::op::{FunctionSource, StackOp, VarId};
use crate::registry::LoweringRegistry;
use feltir_spec::{
    CodegenConfig, Function, FunctionBuilder, IrError, Signature, VerifyError, VerifyWarning,
};
use tracing::{debug, warn};

/// Emitter state
#[derive(Debug)]
pub enum EmitterState {
    Empty,
    Declaring(Signature),
    Building(FunctionBuilder),
    Sealed(Function),
}

impl EmitterState {
    pub fn name(&self) -> &'static str {
        match self {
            EmitterState::Empty => "empty",
            EmitterState::Declaring(_) => "declaring",
            EmitterState::Building(_) => "building",
            EmitterState::Sealed(_) => "sealed",
        }
    }
}

/// Emits one function
#[derive(Debug)]
pub struct FunctionEmitter<'r> {
    registry: &'r LoweringRegistry,
    config: CodegenConfig,
    name: String,
    state: EmitterState,
}

impl<'r> FunctionEmitter<'r> {
    pub fn new(registry: &'r LoweringRegistry, config: CodegenConfig) -> Self {
        Self {
            registry,
            config,
            name: String::new(),
            state: EmitterState::Empty,
        }
    }

    pub fn state(&self) -> &EmitterState {
        &self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Empty -> Declaring`
    pub fn declare(mut self, signature: Signature) -> Result<Self> {
        self.name = signature.name.clone();
        if !matches!(self.state, EmitterState::Empty) {
            return Err(self.invalid_state("empty"));
        }
        self.config.validate()?;
        self.state = EmitterState::Declaring(signature);
        Ok(self)
    }

    /// `Declaring -> Building`: lower the body into blocks
    pub fn build(mut self, params: &[VarId], ops: &[StackOp]) -> Result<Self> {
        let signature = match self.state {
            EmitterState::Declaring(signature) => signature,
            other => {
                self.state = other;
                return Err(self.invalid_state("declaring"));
            }
        };

        let mut builder = FunctionBuilder::new(signature);
        let summary = CfgBuilder::new(&self.name, self.registry, &mut builder).lower(params, ops)?;
        debug!(
            function = %self.name,
            blocks = summary.blocks,
            handles = summary.handles,
            temp_slots = summary.temp_slots,
            "lowered"
        );

        self.state = EmitterState::Building(builder);
        Ok(self)
    }

    /// `Building -> Sealed`
    pub fn seal(mut self) -> Result<Self> {
        let builder = match self.state {
            EmitterState::Building(builder) => builder,
            other => {
                self.state = other;
                return Err(self.invalid_state("building"));
            }
        };

        let func = if self.config.verify {
            let (func, report) = builder.finish_with_report().map_err(|source| CodegenError::Ir {
                function: self.name.clone(),
                source,
            })?;
            if self.config.warn_unused {
                for warning in &report.warnings {
                    let VerifyWarning::UnusedValue { block, value } = warning;
                    warn!(function = %self.name, %block, %value, "value is never used");
                }
            }
            func
        } else {
            let func = builder.seal().map_err(|source| CodegenError::Ir {
                function: self.name.clone(),
                source,
            })?;
            // Reachability holds regardless of the verify setting
            let unreachable = func.unreachable_blocks();
            if !unreachable.is_empty() {
                return Err(CodegenError::Ir {
                    function: self.name.clone(),
                    source: IrError::Verification {
                        function: self.name.clone(),
                        errors: unreachable
                            .into_iter()
                            .map(|block| VerifyError::UnreachableBlock { block })
                            .collect(),
                    },
                });
            }
            func
        };

        debug!(function = %self.name, blocks = func.blocks().len(), "sealed");
        self.state = EmitterState::Sealed(func);
        Ok(self)
    }

    /// Sealed function, if sealed
    pub fn function(&self) -> Option<&Function> {
        match &self.state {
            EmitterState::Sealed(func) => Some(func),
            _ => None,
        }
    }

    pub fn into_function(self) -> Result<Function> {
        match self.state {
            EmitterState::Sealed(func) => Ok(func),
            other => Err(CodegenError::InvalidState {
                function: self.name,
                expected: "sealed",
                found: other.name(),
            }),
        }
    }

    fn invalid_state(&self, expected: &'static str) -> CodegenError {
        CodegenError::InvalidState {
            function: self.name.clone(),
            expected,
            found: self.state.name(),
        }
    }
}

/// Emit one function from its source
pub fn emit(
    source: &FunctionSource,
    registry: &LoweringRegistry,
    config: CodegenConfig,
) -> Result<Function> {
    FunctionEmitter::new(registry, config)
        .declare(source.signature())?
        .build(&source.param_vars(), &source.ops)?
        .seal()?
        .into_function()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedKind;
    use crate::op::OpStream;
    use crate::pattern::conditional_transform;
    use crate::registry::default_registry;
    use feltir_spec::{ConfigError, Felt, Intrinsic, ValueType};

    #[test]
    fn test_state_machine_in_order() {
        let source = conditional_transform("f", Felt::from_u64(2));
        let emitter = FunctionEmitter::new(default_registry(), CodegenConfig::DEFAULT);
        assert_eq!(emitter.state().name(), "empty");

        let emitter = emitter.declare(source.signature()).unwrap();
        assert_eq!(emitter.state().name(), "declaring");
        assert_eq!(emitter.name(), "f");

        let emitter = emitter.build(&source.param_vars(), &source.ops).unwrap();
        assert_eq!(emitter.state().name(), "building");
        assert!(emitter.function().is_none());

        let emitter = emitter.seal().unwrap();
        assert_eq!(emitter.state().name(), "sealed");
        assert!(emitter.function().is_some());
    }

    #[test]
    fn test_out_of_order_transitions() {
        let source = conditional_transform("f", Felt::from_u64(2));
        let err = FunctionEmitter::new(default_registry(), CodegenConfig::DEFAULT)
            .seal()
            .unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidState {
                expected: "building",
                found: "empty",
                ..
            }
        ));

        let sealed = FunctionEmitter::new(default_registry(), CodegenConfig::DEFAULT)
            .declare(source.signature())
            .and_then(|e| e.build(&source.param_vars(), &source.ops))
            .and_then(|e| e.seal())
            .unwrap();
        let err = sealed.declare(source.signature()).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidState {
                found: "sealed",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_rejected_on_declare() {
        let config = CodegenConfig {
            target_width: 200,
            ..CodegenConfig::DEFAULT
        };
        let source = conditional_transform("f", Felt::from_u64(2));
        let err = emit(&source, default_registry(), config).unwrap_err();
        assert!(matches!(err, CodegenError::Config(ConfigError::WidthTooSmall)));
    }

    #[test]
    fn test_emitted_calls_match_contracts() {
        let source = conditional_transform("f", Felt::from_u64(2));
        let func = emit(&source, default_registry(), CodegenConfig::DEFAULT).unwrap();
        let calls = func.intrinsic_calls();
        assert!(calls.contains(&Intrinsic::Dup(ValueType::Felt252)));
        assert!(calls.contains(&Intrinsic::StoreTemp(ValueType::Felt252)));
        assert!(calls.contains(&Intrinsic::Rename(ValueType::Felt252)));
        assert!(calls.contains(&Intrinsic::Felt252Mul));
        assert_eq!(calls.len(), 4);
    }

    #[test]
    fn test_malformed_stream_aborts() {
        let mut s = OpStream::new("bad", vec![ValueType::Felt252]);
        let x = s.param(ValueType::Felt252);
        s.rename(ValueType::U32, x);
        let err = emit(&s.finish(), default_registry(), CodegenConfig::DEFAULT).unwrap_err();
        assert_eq!(err.function(), Some("bad"));
        assert!(matches!(
            err.malformed_kind(),
            Some(MalformedKind::TypeMismatch {
                expected: ValueType::U32,
                found: ValueType::Felt252,
                ..
            })
        ));
    }

    #[test]
    fn test_unverified_seal() {
        let source = conditional_transform("f", Felt::from_u64(3));
        let config = CodegenConfig::DEFAULT.with_verify(false);
        let func = emit(&source, default_registry(), config).unwrap();
        assert_eq!(func.walk().len(), func.blocks().len());
    }

    fn dead_block_source() -> crate::op::FunctionSource {
        // ret x; L0(felt): const 1; store_temp; ret
        let felt = ValueType::Felt252;
        let mut s = OpStream::new("dead", vec![felt]);
        let x = s.param(felt);
        s.ret(&[x]);
        let dead = s.label();
        s.place(dead, &[felt]);
        let one = s.constant(Felt::ONE);
        let one = s.store_temp(felt, one);
        s.ret(&[one]);
        s.finish()
    }

    #[test]
    fn test_unreachable_block_rejected_without_verify() {
        let expected = vec![VerifyError::UnreachableBlock {
            block: feltir_spec::Block::new(1),
        }];

        for config in [
            CodegenConfig::DEFAULT,
            CodegenConfig::DEFAULT.with_verify(false),
        ] {
            let err = emit(&dead_block_source(), default_registry(), config).unwrap_err();
            assert_eq!(err.function(), Some("dead"));
            match err {
                CodegenError::Ir {
                    source: IrError::Verification { errors, .. },
                    ..
                } => assert_eq!(errors, expected),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
