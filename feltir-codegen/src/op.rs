//! # Input operation stream
//!
//! Codegen consumes one [`FunctionSource`] per function: a declared signature
//! and an ordered list of [`StackOp`]s over source variables and labels.
//!
//! The entry block is implicit and binds the declared parameters. Every
//! other block is opened by a [`StackOp::Label`], which also declares the
//! block's typed parameters. Variables are scoped to the block that defines
//! them.

use feltir_spec::{Immediate, Signature, ValueType};
use std::fmt;

/// Source variable
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Source block label
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One stack-machine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackOp {
    /// Open a block; `params` receive the incoming branch arguments
    Label {
        label: Label,
        params: Vec<(VarId, ValueType)>,
    },

    /// dest = value
    Const { dest: VarId, value: Immediate },

    /// (dests[0], dests[1]) = dup(src); src is consumed
    Duplicate {
        ty: ValueType,
        src: VarId,
        dests: [VarId; 2],
    },

    /// dest = store_temp(src); src is consumed
    StoreTemp {
        ty: ValueType,
        src: VarId,
        dest: VarId,
    },

    /// dest = rename(src); src is consumed
    Rename {
        ty: ValueType,
        src: VarId,
        dest: VarId,
    },

    /// results = libfunc(args); args are consumed
    Call {
        libfunc: String,
        args: Vec<VarId>,
        results: Vec<VarId>,
    },

    Branch { target: Label, args: Vec<VarId> },

    CondBranch {
        cond: VarId,
        then_target: Label,
        then_args: Vec<VarId>,
        else_target: Label,
        else_args: Vec<VarId>,
    },

    Return { args: Vec<VarId> },
}

impl StackOp {
    pub fn name(&self) -> &str {
        match self {
            StackOp::Label { .. } => "label",
            StackOp::Const { .. } => "const",
            StackOp::Duplicate { .. } => "duplicate",
            StackOp::StoreTemp { .. } => "store_temp",
            StackOp::Rename { .. } => "rename",
            StackOp::Call { libfunc, .. } => libfunc,
            StackOp::Branch { .. } => "branch",
            StackOp::CondBranch { .. } => "cond_branch",
            StackOp::Return { .. } => "return",
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            StackOp::Branch { .. } | StackOp::CondBranch { .. } | StackOp::Return { .. }
        )
    }
}

/// Everything codegen needs for one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    pub name: String,
    pub params: Vec<(VarId, ValueType)>,
    pub returns: Vec<ValueType>,
    pub ops: Vec<StackOp>,
}

impl FunctionSource {
    pub fn param_types(&self) -> Vec<ValueType> {
        self.params.iter().map(|(_, ty)| *ty).collect()
    }

    /// Variables bound to the entry block parameters
    pub fn param_vars(&self) -> Vec<VarId> {
        self.params.iter().map(|(var, _)| *var).collect()
    }

    pub fn signature(&self) -> Signature {
        Signature::new(self.name.clone(), self.param_types(), self.returns.clone())
    }
}

/// Builder for operation streams with fresh variable and label allocation
#[derive(Debug, Clone)]
pub struct OpStream {
    name: String,
    params: Vec<(VarId, ValueType)>,
    returns: Vec<ValueType>,
    ops: Vec<StackOp>,
    next_var: u32,
    next_label: u32,
}

impl OpStream {
    pub fn new(name: impl Into<String>, returns: Vec<ValueType>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            ops: Vec::new(),
            next_var: 0,
            next_label: 0,
        }
    }

    /// Declare the next function parameter
    pub fn param(&mut self, ty: ValueType) -> VarId {
        let var = self.var();
        self.params.push((var, ty));
        var
    }

    /// Fresh variable
    pub fn var(&mut self) -> VarId {
        let var = VarId(self.next_var);
        self.next_var += 1;
        var
    }

    /// Fresh label, not yet placed
    pub fn label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Open `label` here and return its parameters
    pub fn place(&mut self, label: Label, params: &[ValueType]) -> Vec<VarId> {
        let params: Vec<(VarId, ValueType)> = params.iter().map(|ty| (self.var(), *ty)).collect();
        let vars = params.iter().map(|(v, _)| *v).collect();
        self.ops.push(StackOp::Label { label, params });
        vars
    }

    pub fn constant(&mut self, value: impl Into<Immediate>) -> VarId {
        let dest = self.var();
        self.ops.push(StackOp::Const {
            dest,
            value: value.into(),
        });
        dest
    }

    pub fn dup(&mut self, ty: ValueType, src: VarId) -> (VarId, VarId) {
        let dests = [self.var(), self.var()];
        self.ops.push(StackOp::Duplicate { ty, src, dests });
        (dests[0], dests[1])
    }

    pub fn store_temp(&mut self, ty: ValueType, src: VarId) -> VarId {
        let dest = self.var();
        self.ops.push(StackOp::StoreTemp { ty, src, dest });
        dest
    }

    pub fn rename(&mut self, ty: ValueType, src: VarId) -> VarId {
        let dest = self.var();
        self.ops.push(StackOp::Rename { ty, src, dest });
        dest
    }

    pub fn call(&mut self, libfunc: &str, args: &[VarId], num_results: usize) -> Vec<VarId> {
        let results: Vec<VarId> = (0..num_results).map(|_| self.var()).collect();
        self.ops.push(StackOp::Call {
            libfunc: libfunc.to_string(),
            args: args.to_vec(),
            results: results.clone(),
        });
        results
    }

    pub fn branch(&mut self, target: Label, args: &[VarId]) {
        self.ops.push(StackOp::Branch {
            target,
            args: args.to_vec(),
        });
    }

    pub fn cond_branch(
        &mut self,
        cond: VarId,
        then_target: Label,
        then_args: &[VarId],
        else_target: Label,
        else_args: &[VarId],
    ) {
        self.ops.push(StackOp::CondBranch {
            cond,
            then_target,
            then_args: then_args.to_vec(),
            else_target,
            else_args: else_args.to_vec(),
        });
    }

    pub fn ret(&mut self, args: &[VarId]) {
        self.ops.push(StackOp::Return {
            args: args.to_vec(),
        });
    }

    /// Append a raw operation
    pub fn push(&mut self, op: StackOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn finish(self) -> FunctionSource {
        FunctionSource {
            name: self.name,
            params: self.params,
            returns: self.returns,
            ops: self.ops,
        }
    }
}
