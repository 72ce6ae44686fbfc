// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-vs-triangle intersection.

use glam::DVec3;

/// Result of a line-vs-triangle test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Parameter along the line (in multiples of the direction vector).
    pub t: f64,
    /// Barycentric weight of the second vertex.
    pub u: f64,
    /// Barycentric weight of the third vertex.
    pub v: f64,
}

impl TriangleHit {
    /// Barycentric weights `(w0, w1, w2)` of the three vertices.
    pub fn barycentric(&self) -> DVec3 {
        DVec3::new(1.0 - self.u - self.v, self.u, self.v)
    }
}

/// Double-sided Möller-Trumbore test of `origin + t * direction` against a triangle,
/// accepting `t` in `[0, t_max]`.
pub fn line_triangle(
    origin: DVec3,
    direction: DVec3,
    t_max: f64,
    [v0, v1, v2]: [DVec3; 3],
) -> Option<TriangleHit> {
    // Relative to the edge and direction lengths, so tiny and huge meshes agree.
    const EPS: f64 = 1e-12;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() <= EPS * e1.length() * e2.length() * direction.length() {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - v0;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = direction.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t >= 0.0 && t <= t_max).then_some(TriangleHit { t, u, v })
}

/// Ray-vs-triangle; see [`line_triangle`].
pub fn ray_triangle(origin: DVec3, direction: DVec3, tri: [DVec3; 3]) -> Option<TriangleHit> {
    line_triangle(origin, direction, f64::INFINITY, tri)
}

/// Segment-vs-triangle; `t` is in `[0, 1]` along `start -> end`.
pub fn segment_triangle(start: DVec3, end: DVec3, tri: [DVec3; 3]) -> Option<TriangleHit> {
    line_triangle(start, end - start, 1.0, tri)
}
