//! # Lowering registry
//!
//! Maps libfunc names to their lowering. A [`RegistryBuilder`] is the single
//! writer; [`RegistryBuilder::freeze`] produces an immutable
//! [`LoweringRegistry`] that any number of codegen workers may share.
//!
//! The default registry is built once, on first use, and never mutated.

use crate::libfuncs;
use feltir_spec::{FunctionBuilder, Result, Value, ValueType};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Lowering routine: emits IR for one call, returns the result values
pub type LowerFn = fn(&mut FunctionBuilder, &[Value]) -> Result<Vec<Value>>;

/// A libfunc with a known lowering
#[derive(Clone)]
pub struct LibfuncDef {
    pub name: &'static str,
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
    lower: LowerFn,
}

impl LibfuncDef {
    pub fn new(
        name: &'static str,
        params: Vec<ValueType>,
        results: Vec<ValueType>,
        lower: LowerFn,
    ) -> Self {
        Self {
            name,
            params,
            results,
            lower,
        }
    }

    /// Emit the lowering; `args` must already match `params`
    pub fn lower(&self, builder: &mut FunctionBuilder, args: &[Value]) -> Result<Vec<Value>> {
        (self.lower)(builder, args)
    }
}

impl fmt::Debug for LibfuncDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibfuncDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

/// Mutable registry, populated before any codegen starts
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    defs: HashMap<&'static str, LibfuncDef>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with every built-in libfunc registered
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        libfuncs::register_defaults(&mut builder);
        builder
    }

    /// Register a libfunc, returning any definition it replaces
    pub fn register(&mut self, def: LibfuncDef) -> Option<LibfuncDef> {
        self.defs.insert(def.name, def)
    }

    pub fn remove(&mut self, name: &str) -> Option<LibfuncDef> {
        self.defs.remove(name)
    }

    pub fn freeze(self) -> LoweringRegistry {
        LoweringRegistry { defs: self.defs }
    }
}

/// Immutable registry shared by codegen workers
#[derive(Debug)]
pub struct LoweringRegistry {
    defs: HashMap<&'static str, LibfuncDef>,
}

impl LoweringRegistry {
    pub fn get(&self, name: &str) -> Option<&LibfuncDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.defs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

static DEFAULT_REGISTRY: Lazy<LoweringRegistry> =
    Lazy::new(|| RegistryBuilder::with_defaults().freeze());

/// Process-wide registry of the built-in libfuncs
pub fn default_registry() -> &'static LoweringRegistry {
    &DEFAULT_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_registry_is_shareable() {
        assert_send_sync::<LoweringRegistry>();
    }

    #[test]
    fn test_default_registry() {
        let registry = default_registry();
        for name in [
            "felt252_mul",
            "felt252_add",
            "felt252_sub",
            "felt252_is_zero",
            "u32_overflowing_add",
            "u32_overflowing_sub",
            "u32_eq",
            "u32_lt",
            "u32_le",
            "u32_is_zero",
            "u32_safe_divmod",
            "u32_to_felt252",
            "u32_try_from_felt252",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
        assert_eq!(registry.len(), 13);
        assert!(!registry.contains("felt252_div"));

        let names = registry.names();
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_builder_replace_and_remove() {
        let mut builder = RegistryBuilder::with_defaults();
        let mul = builder.remove("felt252_mul").unwrap();
        assert!(builder.register(mul.clone()).is_none());
        assert!(builder.register(mul).is_some());

        builder.remove("u32_eq");
        let registry = builder.freeze();
        assert!(registry.contains("felt252_mul"));
        assert!(!registry.contains("u32_eq"));
    }
}
