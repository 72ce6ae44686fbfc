// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene3d --heading-base-level=0

//! Understory Scene3D: a retained 3D scene graph that can be picked with [`understory_pick`].
//!
//! - Nodes live in a generational arena addressed by [`NodeId`].
//! - Groups and transform groups own ordered child slots; removing a child leaves an
//!   empty slot until the next [`Scene::commit`] compacts it away.
//! - Edits that would close a cycle through children, links or proxies are rejected
//!   with [`SceneError::Cycle`].
//! - Links reference a node without owning it, so one subgraph can be instanced under
//!   many parents.
//! - Leaves carry [`Geometry`]: an indexed [`TriangleMesh`] with optional texture coordinates,
//!   or a plain bounding volume. Exact ray and segment picks report the triangle and UV hit.
//! - Custom nodes produce their children per probe through a [`ChildProducer`].
//!
//! Pickable bounds are cached per node and refreshed by [`Scene::commit`], which walks the
//! graph bottom-up once per change batch.
//!
//! ## API overview
//!
//! - [`Scene::insert`], [`Scene::remove`], [`Scene::reparent`]: structure.
//! - [`Scene::set_transform`], [`Scene::set_link`], [`Scene::set_pick_mask`],
//!   [`Scene::set_proxy`], [`Scene::set_bounds`]: per-node state.
//! - [`Scene::commit`]: recompute bounds.
//! - `Scene` implements [`understory_pick::PickScene`], so any [`understory_pick::Picker`]
//!   can pick it.
//!
//! ### Minimal usage
//!
//! ```
//! use glam::{DMat4, DVec3};
//! use understory_pick::{PickRequest, Picker, Probe, SortPolicy};
//! use understory_scene3d::{Content, Scene, TriangleMesh};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(None, Content::Group).unwrap();
//! let moved = scene
//!     .insert(
//!         Some(root),
//!         Content::transform(DMat4::from_translation(DVec3::new(0.0, 0.0, -5.0))).unwrap(),
//!     )
//!     .unwrap();
//! let cube = scene
//!     .insert(Some(moved), Content::Leaf(TriangleMesh::cuboid(DVec3::ONE).into()))
//!     .unwrap();
//! scene.commit();
//!
//! let mut picker = Picker::new();
//! let mut request = PickRequest::new(
//!     Probe::Ray { origin: DVec3::ZERO, direction: DVec3::NEG_Z },
//!     SortPolicy::ClosestOne,
//! )
//! .with_exact_geometry(true);
//! assert_eq!(picker.pick(&scene, root, &mut request), 1);
//!
//! let hit = &request.results.hits()[0];
//! assert_eq!(hit.nodes, [root, moved, cube]);
//! assert!((hit.rank - 4.0).abs() < 1e-9);
//! assert_eq!(hit.payload.and_then(|p| p.primitive).map(|t| t / 2), Some(1)); // the +z face
//! ```

mod geometry;
mod scene;
mod types;

pub use geometry::{Geometry, GeometryError, TriangleMesh};
pub use scene::Scene;
pub use types::{ChildProducer, Content, NodeId, ProxyTarget, SceneError};
