// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pick --heading-base-level=0

//! Understory Pick: spatial picking over retained-mode 3D scene graphs.
//!
//! Given a probe in world space (point, ray, segment, box, sphere, cone, cylinder or view
//! frustum), Understory Pick walks a hierarchical scene and reports which leaves the probe
//! touches, as root-to-leaf paths with optional world transforms.
//!
//! - The scene is reached only through the [`PickScene`] trait: bounds, pick masks and a
//!   per-node [`Structure`]. The core never owns, allocates or mutates nodes.
//! - [`Picker`] owns reusable traversal stacks, so repeated picks do not allocate.
//! - [`SortPolicy`] selects between the closest hit, any hit, or every hit in traversal order.
//! - Ray and segment probes can ask leaves for an exact geometry test; the resulting
//!   [`HitPayload`] carries the primitive, triangle and texture coordinate that were hit.
//!
//! ## Node kinds
//!
//! - Leaf: terminal geometry.
//! - Group: ordered, possibly sparse children.
//! - Transform group: a group with a local transform; the probe is pulled into its space.
//! - Pass-through: a single child with no bounds test or transform of its own, used for
//!   instancing a shared subgraph.
//! - Custom: children produced on demand from the probe and the current world transform.
//!
//! Pickable bounds are expressed in the node's parent space. Frustum probes are the one
//! exception to "pull the probe down": the frustum stays in world space and the cumulative
//! transform is pushed down instead.
//!
//! ## Warnings
//!
//! Nothing in a pick is fatal. Malformed raw probes and unsupported proxy geometry are
//! reported through a [`WarningReporter`] (by default [`LogReporter`], which uses the `log`
//! facade) and treated as "no hit".
//!
//! ## Features
//!
//! - `rayon`: `Picker::pick_batch_parallel`, which answers independent probes on a rayon
//!   pool, each worker with its own traversal stacks.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec3;
//! use understory_bounds3d::{Aabb3D, BoundingVolume};
//! use understory_pick::{
//!     PickMask, PickRequest, PickScene, PickableBounds, Picker, Probe, SortPolicy, Structure,
//! };
//!
//! // Node 0 is a group of two unit boxes, nodes 1 and 2.
//! struct Row {
//!     children: [Option<usize>; 2],
//!     boxes: [Aabb3D; 2],
//! }
//!
//! impl PickScene for Row {
//!     type Node = usize;
//!
//!     fn pickable_bounds(&self, node: usize) -> Option<PickableBounds<usize>> {
//!         let volume = match node {
//!             0 => self.boxes[0].union(&self.boxes[1]),
//!             n => self.boxes[n - 1],
//!         };
//!         Some(BoundingVolume::Box(volume).into())
//!     }
//!
//!     fn check_pick_mask(&self, _node: usize, _mask: PickMask) -> bool {
//!         true
//!     }
//!
//!     fn structure(&self, node: usize) -> Structure<'_, usize> {
//!         match node {
//!             0 => Structure::Group { children: &self.children },
//!             _ => Structure::Leaf,
//!         }
//!     }
//! }
//!
//! let row = Row {
//!     children: [Some(1), Some(2)],
//!     boxes: [
//!         Aabb3D::from_center_half_extents(DVec3::new(5.0, 0.0, 0.0), DVec3::splat(0.5)),
//!         Aabb3D::from_center_half_extents(DVec3::new(2.0, 0.0, 0.0), DVec3::splat(0.5)),
//!     ],
//! };
//!
//! let mut picker = Picker::new();
//! let mut request = PickRequest::new(
//!     Probe::Ray { origin: DVec3::ZERO, direction: DVec3::X },
//!     SortPolicy::ClosestOne,
//! );
//! assert_eq!(picker.pick(&row, 0, &mut request), 1);
//! assert_eq!(request.results.hits()[0].nodes, [0, 2]);
//!
//! request.sort = SortPolicy::AllOrdered;
//! assert_eq!(picker.pick(&row, 0, &mut request), 2);
//! ```

mod accumulate;
mod node;
mod picker;
mod probe;
mod request;
mod state;
mod strategy;
mod traverse;
mod types;
mod warning;

#[cfg(feature = "rayon")]
mod batch;

#[cfg(test)]
mod test_scene;

pub use node::{LocalTransform, PickScene, PickableBounds, Proxy, Structure};
pub use picker::Picker;
pub use probe::{Probe, RawProbe};
pub use request::{HitPath, PickRequest, PickResults};
pub use state::{PickConfig, TraversalState};
pub use types::{ExactQuery, HitPayload, NodeKind, PickMask, ProbeKind, SortPolicy};
pub use warning::{LogReporter, PickWarning, SilentReporter, WarningReporter};
