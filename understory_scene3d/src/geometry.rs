// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf geometry: triangle meshes and plain volumes, with exact line tests.

use glam::{DVec2, DVec3};
use understory_bounds3d::{Aabb3D, BoundingVolume, TriangleHit, line_triangle};
use understory_pick::{ExactQuery, HitPayload};

/// Errors from building a [`TriangleMesh`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} refers to vertex {index}, but there are only {vertices} vertices")]
    IndexOutOfRange {
        /// Offending triangle.
        triangle: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices.
        vertices: usize,
    },
    /// Texture coordinates must match vertices one to one.
    #[error("expected {expected} texture coordinates, found {found}")]
    UvCountMismatch {
        /// Number of vertices.
        expected: usize,
        /// Number of texture coordinates supplied.
        found: usize,
    },
}

/// An indexed triangle mesh with optional per-vertex texture coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh {
    positions: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    uvs: Option<Vec<DVec2>>,
    bounds: Option<Aabb3D>,
}

impl TriangleMesh {
    /// Build a mesh, validating indices.
    pub fn new(positions: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Result<Self, GeometryError> {
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(GeometryError::IndexOutOfRange {
                    triangle,
                    index,
                    vertices: positions.len(),
                });
            }
        }
        let bounds = Aabb3D::from_points(positions.iter().copied());
        Ok(Self {
            positions,
            triangles,
            uvs: None,
            bounds,
        })
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: Vec<DVec2>) -> Result<Self, GeometryError> {
        if uvs.len() != self.positions.len() {
            return Err(GeometryError::UvCountMismatch {
                expected: self.positions.len(),
                found: uvs.len(),
            });
        }
        self.uvs = Some(uvs);
        Ok(self)
    }

    /// An axis-aligned box centered on the origin, two triangles per face.
    pub fn cuboid(half_extents: DVec3) -> Self {
        let h = half_extents.abs();
        let positions: Vec<DVec3> = (0..8_u32)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        #[rustfmt::skip]
        let triangles = vec![
            [0, 2, 1], [1, 2, 3], // -z
            [4, 5, 6], [5, 7, 6], // +z
            [0, 1, 4], [1, 5, 4], // -y
            [2, 6, 3], [3, 6, 7], // +y
            [0, 4, 2], [2, 4, 6], // -x
            [1, 3, 5], [3, 7, 5], // +x
        ];
        Self {
            bounds: Some(Aabb3D::new(-h, h)),
            positions,
            triangles,
            uvs: None,
        }
    }

    /// A rectangle in the `z = 0` plane centered on the origin, with UVs spanning `[0, 1]`.
    pub fn quad(half_width: f64, half_height: f64) -> Self {
        let (w, h) = (half_width.abs(), half_height.abs());
        Self {
            positions: vec![
                DVec3::new(-w, -h, 0.0),
                DVec3::new(w, -h, 0.0),
                DVec3::new(w, h, 0.0),
                DVec3::new(-w, h, 0.0),
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            uvs: Some(vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ]),
            bounds: Some(Aabb3D::new(DVec3::new(-w, -h, 0.0), DVec3::new(w, h, 0.0))),
        }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Tight box around the vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb3D> {
        self.bounds
    }

    fn vertices(&self, tri: [u32; 3]) -> [DVec3; 3] {
        tri.map(|i| self.positions[i as usize])
    }

    /// Exact line test. With `want_closest` every triangle is tested and the
    /// nearest kept; otherwise the first hit is returned.
    pub fn intersect(&self, query: &ExactQuery, want_closest: bool) -> Option<HitPayload> {
        let (origin, direction, t_max) = query.line();
        let mut best: Option<(usize, TriangleHit)> = None;
        for (i, &tri) in self.triangles.iter().enumerate() {
            let limit = best.map_or(t_max, |(_, h)| h.t);
            let Some(hit) = line_triangle(origin, direction, limit, self.vertices(tri)) else {
                continue;
            };
            if best.is_some_and(|(_, b)| hit.t >= b.t) {
                continue;
            }
            best = Some((i, hit));
            if !want_closest {
                break;
            }
        }
        let (i, hit) = best?;
        let tri = self.triangles[i];
        let weights = hit.barycentric();
        let uv = self.uvs.as_ref().map(|uvs| {
            let [a, b, c] = tri.map(|v| uvs[v as usize]);
            a * weights.x + b * weights.y + c * weights.z
        });
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Triangle indices are reported as u32 like vertex indices."
        )]
        let primitive = i as u32;
        Some(HitPayload {
            parameter: hit.t,
            point: origin + direction * hit.t,
            primitive: Some(primitive),
            vertices: Some(self.vertices(tri)),
            uv,
        })
    }
}

/// What a leaf is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Triangles, tested exactly.
    Mesh(TriangleMesh),
    /// A solid volume; its own surface is the exact geometry.
    Volume(BoundingVolume),
}

impl From<TriangleMesh> for Geometry {
    fn from(mesh: TriangleMesh) -> Self {
        Self::Mesh(mesh)
    }
}

impl From<BoundingVolume> for Geometry {
    fn from(volume: BoundingVolume) -> Self {
        Self::Volume(volume)
    }
}

impl Geometry {
    /// Bounds in the leaf's coordinates.
    pub fn bounds(&self) -> BoundingVolume {
        match self {
            Self::Mesh(mesh) => mesh.bounds().map_or(BoundingVolume::Empty, BoundingVolume::Box),
            Self::Volume(volume) => *volume,
        }
    }

    /// Exact line test in the leaf's coordinates.
    pub fn intersect(&self, query: &ExactQuery, want_closest: bool) -> Option<HitPayload> {
        match self {
            Self::Mesh(mesh) => mesh.intersect(query, want_closest),
            Self::Volume(volume) => {
                let t = match *query {
                    ExactQuery::Ray { origin, direction } => volume.ray_entry(origin, direction),
                    ExactQuery::Segment { start, end } => volume.segment_entry(start, end),
                }?;
                let (origin, direction, _) = query.line();
                Some(HitPayload::at(t, origin + direction * t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_indices_and_uvs() {
        let positions = vec![DVec3::ZERO, DVec3::X, DVec3::Y];
        assert_eq!(
            TriangleMesh::new(positions.clone(), vec![[0, 1, 3]]),
            Err(GeometryError::IndexOutOfRange {
                triangle: 0,
                index: 3,
                vertices: 3
            })
        );
        let mesh = TriangleMesh::new(positions, vec![[0, 1, 2]]).unwrap();
        assert_eq!(
            mesh.with_uvs(vec![DVec2::ZERO]),
            Err(GeometryError::UvCountMismatch {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn cuboid_closest_face() {
        let mesh = TriangleMesh::cuboid(DVec3::splat(1.0));
        assert_eq!(mesh.triangle_count(), 12);
        let query = ExactQuery::Ray {
            origin: DVec3::new(0.2, 0.3, 5.0),
            direction: DVec3::NEG_Z,
        };
        let near = mesh.intersect(&query, true).unwrap();
        assert!((near.parameter - 4.0).abs() < 1e-12);
        assert!((near.point.z - 1.0).abs() < 1e-12);
        // The +z face comes second in the list; closest must not stop at -z.
        let idx = near.primitive.unwrap();
        assert!(idx == 2 || idx == 3);
        let any = mesh.intersect(&query, false).unwrap();
        assert!(any.parameter == 4.0 || any.parameter == 6.0);
    }

    #[test]
    fn quad_interpolates_uv() {
        let mesh = TriangleMesh::quad(1.0, 1.0);
        let hit = mesh
            .intersect(
                &ExactQuery::Segment {
                    start: DVec3::new(0.5, -0.5, 1.0),
                    end: DVec3::new(0.5, -0.5, -1.0),
                },
                true,
            )
            .unwrap();
        let uv = hit.uv.unwrap();
        assert!((uv - DVec2::new(0.75, 0.25)).length() < 1e-12);
        assert!((hit.parameter - 0.5).abs() < 1e-12);
        assert_eq!(hit.vertices.map(|v| v.len()), Some(3));
    }

    #[test]
    fn segment_stops_short() {
        let mesh = TriangleMesh::quad(1.0, 1.0);
        let miss = mesh.intersect(
            &ExactQuery::Segment {
                start: DVec3::new(0.0, 0.0, 3.0),
                end: DVec3::new(0.0, 0.0, 1.0),
            },
            false,
        );
        assert!(miss.is_none());
    }

    #[test]
    fn volume_geometry_uses_entry() {
        let g = Geometry::from(BoundingVolume::Box(Aabb3D::new(
            DVec3::splat(-1.0),
            DVec3::splat(1.0),
        )));
        let hit = g
            .intersect(
                &ExactQuery::Ray {
                    origin: DVec3::new(-3.0, 0.0, 0.0),
                    direction: DVec3::X,
                },
                true,
            )
            .unwrap();
        assert!((hit.parameter - 2.0).abs() < 1e-12);
        assert_eq!(hit.point, DVec3::new(-1.0, 0.0, 0.0));
    }
}
