// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-transform accumulation over the traversal stack.

use glam::DMat4;

use crate::state::TraversalState;

/// Local-to-world matrix at the current depth.
///
/// With `cumulative` set the stack holds running world matrices (frustum
/// probes) and the topmost valid level is the answer; otherwise the valid
/// local transforms are multiplied root first.
pub(crate) fn world<N>(state: &TraversalState<N>, cumulative: bool) -> DMat4 {
    let levels = state.transforms().iter().zip(state.valid());
    if cumulative {
        levels
            .rev()
            .find_map(|(m, valid)| valid.then_some(*m))
            .unwrap_or(DMat4::IDENTITY)
    } else {
        levels
            .filter(|(_, valid)| **valid)
            .fold(DMat4::IDENTITY, |acc, (m, _)| acc * *m)
    }
}

/// [`world`] and its inverse.
pub(crate) fn world_and_inverse<N>(state: &TraversalState<N>, cumulative: bool) -> (DMat4, DMat4) {
    let m = world(state, cumulative);
    (m, m.inverse())
}
