//! Pool Registry
//!
//! Append-only, insertion-ordered set of pools eligible for fee extraction.
//! Insertion order is the processing order of every cycle.

use crate::error::{FeeEngineError, Result};
use crate::types::PoolId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    /// Dense list in insertion order
    pools: Vec<PoolId>,
    /// Membership index for duplicate rejection
    index: HashSet<PoolId>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `pool`, returning its position
    pub fn register(&mut self, pool: PoolId) -> Result<usize> {
        if !self.index.insert(pool) {
            return Err(FeeEngineError::DuplicatePool(pool));
        }
        self.pools.push(pool);
        Ok(self.pools.len() - 1)
    }

    pub fn count(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn at(&self, index: usize) -> Result<PoolId> {
        self.pools
            .get(index)
            .copied()
            .ok_or(FeeEngineError::IndexOutOfRange {
                index,
                count: self.pools.len(),
            })
    }

    pub fn contains(&self, pool: PoolId) -> bool {
        self.index.contains(&pool)
    }

    /// Fails with [`FeeEngineError::UnknownPool`] for unregistered pools
    pub fn ensure_registered(&self, pool: PoolId) -> Result<()> {
        if self.contains(pool) {
            Ok(())
        } else {
            Err(FeeEngineError::UnknownPool(pool))
        }
    }

    /// Pools in insertion order
    pub fn iter(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.pools.iter().copied()
    }

    pub fn as_slice(&self) -> &[PoolId] {
        &self.pools
    }
}
