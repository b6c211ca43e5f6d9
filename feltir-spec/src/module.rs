//! Module: an ordered set of sealed functions

use crate::function::Function;
use crate::intrinsic::Intrinsic;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, func: Function) {
        self.functions.push(func);
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Helpers referenced anywhere in the module, in catalog order
    pub fn helpers(&self) -> BTreeSet<Intrinsic> {
        self.functions
            .iter()
            .flat_map(|f| f.intrinsic_calls())
            .collect()
    }
}

impl FromIterator<Function> for Module {
    fn from_iter<I: IntoIterator<Item = Function>>(iter: I) -> Self {
        Self {
            functions: iter.into_iter().collect(),
        }
    }
}
