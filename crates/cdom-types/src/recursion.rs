//! Guards for recursion that the node-level `resolving` flag cannot see.
//!
//! `DepthCounter` bounds how deeply references resolve inside one another.
//! `CycleGuard` tracks the keys currently being evaluated, such as the
//! implicitly typed locals whose initializers are in progress, so a key
//! that depends on itself is reported instead of re-entered. Neither keeps
//! state that outlives a balanced `enter`/`leave` pair, so one guard can
//! serve any number of resolution passes.

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Why [`CycleGuard::enter`] refused a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// The key is already being visited.
    Cycle,
    DepthExceeded,
}

/// Set of keys currently being visited, with a nesting limit.
pub struct CycleGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    max_depth: u32,
}

impl<K: Hash + Eq + Copy> CycleGuard<K> {
    pub fn new(max_depth: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            max_depth,
        }
    }

    /// Start visiting `key`. On `Ok` the caller must [`leave`](Self::leave)
    /// with the same key.
    pub fn enter(&mut self, key: K) -> Result<(), Denied> {
        if self.visiting.len() as u32 >= self.max_depth {
            return Err(Denied::DepthExceeded);
        }
        if !self.visiting.insert(key) {
            return Err(Denied::Cycle);
        }
        Ok(())
    }

    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(was_present, "CycleGuard::leave() without a matching enter()");
    }

    pub fn depth(&self) -> u32 {
        self.visiting.len() as u32
    }
}

/// A depth-only counter for nested resolution.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Returns `false` (and does not increment) once the limit is reached;
    /// do not call `leave` in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() called at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
