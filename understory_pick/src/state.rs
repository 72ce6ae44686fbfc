// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable traversal scratch.

use core::mem;

use glam::DMat4;

/// Sizing of the traversal stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickConfig {
    /// Depth the stacks can hold before they first grow.
    pub initial_depth: usize,
    /// Number of levels added each time the stacks fill up.
    pub depth_increment: usize,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            initial_depth: 20,
            depth_increment: 10,
        }
    }
}

/// Per-picker traversal stacks: node path, per-level transform and validity.
///
/// Non-frustum probes store each level's *local* transform; frustum probes
/// store the *cumulative* local-to-world matrix. A level whose validity flag
/// is false contributes nothing to the world transform.
///
/// The stacks only grow. Custom nodes borrow a child buffer per depth, so
/// their produced children are reused across picks as well.
#[derive(Clone, Debug)]
pub struct TraversalState<N> {
    config: PickConfig,
    path: Vec<N>,
    transforms: Vec<DMat4>,
    valid: Vec<bool>,
    child_buffers: Vec<Vec<Option<N>>>,
}

impl<N> Default for TraversalState<N> {
    fn default() -> Self {
        Self::new(PickConfig::default())
    }
}

impl<N> TraversalState<N> {
    /// Allocate stacks sized by `config`.
    pub fn new(config: PickConfig) -> Self {
        Self {
            config,
            path: Vec::with_capacity(config.initial_depth),
            transforms: Vec::with_capacity(config.initial_depth),
            valid: Vec::with_capacity(config.initial_depth),
            child_buffers: Vec::new(),
        }
    }

    /// The configuration the stacks were created with.
    pub fn config(&self) -> PickConfig {
        self.config
    }

    /// Current depth; zero between picks.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Levels the stacks can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.path.capacity()
    }

    /// Live node path, root first.
    pub fn path(&self) -> &[N] {
        &self.path
    }

    /// Live per-level transforms.
    pub fn transforms(&self) -> &[DMat4] {
        &self.transforms
    }

    /// Live per-level validity flags.
    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    /// Push one level and return the depth to hand back to [`pop`](Self::pop).
    pub(crate) fn push(&mut self, node: N, transform: DMat4, valid: bool) -> usize {
        if self.path.len() == self.path.capacity() {
            let more = self.config.depth_increment.max(1);
            self.path.reserve_exact(more);
            self.transforms.reserve_exact(more);
            self.valid.reserve_exact(more);
        }
        self.path.push(node);
        self.transforms.push(transform);
        self.valid.push(valid);
        self.path.len()
    }

    /// Pop the level pushed when the depth became `depth`.
    pub(crate) fn pop(&mut self, depth: usize) {
        debug_assert_eq!(self.path.len(), depth, "unbalanced traversal stack");
        self.path.pop();
        self.transforms.pop();
        self.valid.pop();
    }

    /// Take the child buffer owned by `depth`, empty.
    pub(crate) fn take_child_buffer(&mut self, depth: usize) -> Vec<Option<N>> {
        if self.child_buffers.len() <= depth {
            self.child_buffers.resize_with(depth + 1, Vec::new);
        }
        let mut buffer = mem::take(&mut self.child_buffers[depth]);
        buffer.clear();
        buffer
    }

    /// Return a buffer taken with [`take_child_buffer`](Self::take_child_buffer).
    pub(crate) fn put_child_buffer(&mut self, depth: usize, mut buffer: Vec<Option<N>>) {
        buffer.clear();
        self.child_buffers[depth] = buffer;
    }

    /// Drop any levels left by an interrupted pick.
    pub(crate) fn reset(&mut self) {
        debug_assert_eq!(self.path.len(), 0, "traversal stack not unwound");
        self.path.clear();
        self.transforms.clear();
        self.valid.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_increment_and_never_shrinks() {
        let mut state = TraversalState::<u32>::new(PickConfig {
            initial_depth: 2,
            depth_increment: 3,
        });
        assert_eq!(state.capacity(), 2);
        let depths: Vec<usize> = (0..3).map(|n| state.push(n, DMat4::IDENTITY, false)).collect();
        assert_eq!(depths, [1, 2, 3]);
        assert!(state.capacity() >= 5);
        let grown = state.capacity();
        for d in (1..=3).rev() {
            state.pop(d);
        }
        assert_eq!(state.depth(), 0);
        assert_eq!(state.capacity(), grown);
    }

    #[test]
    fn levels_line_up() {
        let mut state = TraversalState::new(PickConfig::default());
        let t = DMat4::from_scale(glam::DVec3::splat(2.0));
        let a = state.push('a', t, true);
        let b = state.push('b', DMat4::IDENTITY, false);
        assert_eq!(state.path(), ['a', 'b']);
        assert_eq!(state.transforms(), [t, DMat4::IDENTITY]);
        assert_eq!(state.valid(), [true, false]);
        state.pop(b);
        state.pop(a);
    }

    #[test]
    #[should_panic(expected = "unbalanced traversal stack")]
    #[cfg(debug_assertions)]
    fn unbalanced_pop_is_caught() {
        let mut state = TraversalState::<u8>::default();
        state.push(1, DMat4::IDENTITY, false);
        state.push(2, DMat4::IDENTITY, false);
        state.pop(1);
    }

    #[test]
    fn child_buffers_are_per_depth() {
        let mut state = TraversalState::<u8>::default();
        let mut outer = state.take_child_buffer(0);
        outer.push(Some(1));
        let mut inner = state.take_child_buffer(1);
        inner.push(Some(2));
        assert_eq!(outer, [Some(1)]);
        state.put_child_buffer(1, inner);
        state.put_child_buffer(0, outer);
        assert!(state.take_child_buffer(0).is_empty());
    }
}
