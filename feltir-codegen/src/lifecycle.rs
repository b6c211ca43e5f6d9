//! # Value Lifecycle Manager
//!
//! Per-function arena of value handles. Each handle records the IR value it
//! stands for, its type, where it is stored, and whether it is still live.
//!
//! ## Rules
//! - Every lifecycle operation and every libfunc argument consumes its
//!   handles. A consumed handle can never be used again.
//! - `duplicate` yields two fresh handles that inherit the source's storage.
//! - `store_temp` materializes a value into a new temporary slot.
//! - `rename` relabels a value and keeps its storage.
//! - Values crossing a block boundary (branch or return arguments) must be
//!   materialized: a parameter, a block parameter, or a temporary.

use feltir_spec::{FunctionBuilder, Intrinsic, IrError, Value, ValueType};
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Handle into the lifecycle arena
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Where a value lives
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Function parameter at this position
    Param(usize),
    /// Block parameter at this position
    BlockParam(usize),
    /// Produced by an instruction, not yet stored
    Implicit,
    /// Temporary slot assigned by `store_temp`
    Temp(u32),
}

impl Storage {
    #[inline]
    pub fn is_materialized(self) -> bool {
        !matches!(self, Storage::Implicit)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandleState {
    Live,
    Consumed { op_index: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandleEntry {
    pub value: Value,
    pub ty: ValueType,
    pub storage: Storage,
    pub state: HandleState,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("handle {0} does not exist")]
    UnknownHandle(Handle),

    #[error("handle {handle} was consumed by operation {consumed_at}")]
    Consumed { handle: Handle, consumed_at: usize },

    #[error("handle {handle} has type {found}, expected {expected}")]
    TypeMismatch {
        handle: Handle,
        expected: ValueType,
        found: ValueType,
    },

    #[error("handle {0} is not materialized")]
    NotMaterialized(Handle),

    #[error(transparent)]
    Builder(#[from] IrError),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Value Lifecycle Manager for one function
#[derive(Debug, Default)]
pub struct ValueLifecycle {
    entries: Vec<HandleEntry>,
    next_slot: u32,
}

impl ValueLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live value
    pub fn bind(&mut self, value: Value, ty: ValueType, storage: Storage) -> Handle {
        let handle = Handle(self.entries.len() as u32);
        self.entries.push(HandleEntry {
            value,
            ty,
            storage,
            state: HandleState::Live,
        });
        handle
    }

    pub fn entry(&self, handle: Handle) -> Result<&HandleEntry> {
        self.entries
            .get(handle.index())
            .ok_or(LifecycleError::UnknownHandle(handle))
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        matches!(
            self.entries.get(handle.index()),
            Some(HandleEntry {
                state: HandleState::Live,
                ..
            })
        )
    }

    /// Consume a live handle, checking its type
    pub fn consume(&mut self, handle: Handle, ty: ValueType, op_index: usize) -> Result<HandleEntry> {
        let entry = self
            .entries
            .get_mut(handle.index())
            .ok_or(LifecycleError::UnknownHandle(handle))?;
        if let HandleState::Consumed { op_index: consumed_at } = entry.state {
            return Err(LifecycleError::Consumed {
                handle,
                consumed_at,
            });
        }
        if entry.ty != ty {
            return Err(LifecycleError::TypeMismatch {
                handle,
                expected: ty,
                found: entry.ty,
            });
        }
        entry.state = HandleState::Consumed { op_index };
        Ok(*entry)
    }

    /// Fail unless the handle is stored somewhere nameable
    pub fn require_materialized(&self, handle: Handle) -> Result<()> {
        if self.entry(handle)?.storage.is_materialized() {
            Ok(())
        } else {
            Err(LifecycleError::NotMaterialized(handle))
        }
    }

    // ========== Lifecycle operations ==========

    /// `dup<T>`: consume `handle`, return two independent copies
    pub fn duplicate(
        &mut self,
        builder: &mut FunctionBuilder,
        handle: Handle,
        ty: ValueType,
        op_index: usize,
    ) -> Result<(Handle, Handle)> {
        let source = self.consume(handle, ty, op_index)?;
        let results = builder.ins_call(Intrinsic::Dup(ty), &[source.value])?;
        let first = self.bind(results[0], ty, source.storage);
        let second = self.bind(results[1], ty, source.storage);
        trace!(%handle, %first, %second, "dup");
        Ok((first, second))
    }

    /// `store_temp<T>`: consume `handle`, return a materialized copy
    pub fn store_temp(
        &mut self,
        builder: &mut FunctionBuilder,
        handle: Handle,
        ty: ValueType,
        op_index: usize,
    ) -> Result<Handle> {
        let source = self.consume(handle, ty, op_index)?;
        let results = builder.ins_call(Intrinsic::StoreTemp(ty), &[source.value])?;
        let slot = self.next_slot;
        self.next_slot += 1;
        let stored = self.bind(results[0], ty, Storage::Temp(slot));
        trace!(%handle, %stored, slot, "store_temp");
        Ok(stored)
    }

    /// `rename<T>`: consume `handle`, return a relabeled handle in the same storage
    pub fn rename(
        &mut self,
        builder: &mut FunctionBuilder,
        handle: Handle,
        ty: ValueType,
        op_index: usize,
    ) -> Result<Handle> {
        let source = self.consume(handle, ty, op_index)?;
        let results = builder.ins_call(Intrinsic::Rename(ty), &[source.value])?;
        let renamed = self.bind(results[0], ty, source.storage);
        trace!(%handle, %renamed, "rename");
        Ok(renamed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of temporary slots handed out
    pub fn temp_slots(&self) -> u32 {
        self.next_slot
    }

    /// Handles that were never consumed
    pub fn live_handles(&self) -> Vec<Handle> {
        (0..self.entries.len() as u32)
            .map(Handle)
            .filter(|h| self.is_live(*h))
            .collect()
    }
}
