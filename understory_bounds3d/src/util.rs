// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matrix helpers shared by the bounds predicates and the picking core.

use glam::DMat4;

/// Uniform scale factor of an affine matrix.
///
/// Returns the length of the longest basis vector of the upper 3x3 block.
/// For a uniformly scaled matrix this is exactly the scale; for non-uniform
/// scales it is the largest axis scale, which keeps rescaled radii conservative.
pub fn uniform_scale(m: &DMat4) -> f64 {
    let x = m.x_axis.truncate().length_squared();
    let y = m.y_axis.truncate().length_squared();
    let z = m.z_axis.truncate().length_squared();
    x.max(y).max(z).sqrt()
}

/// Whether `m` can be inverted with a finite result.
pub fn is_invertible(m: &DMat4) -> bool {
    let det = m.determinant();
    det.is_finite() && det.abs() > f64::EPSILON * f64::EPSILON
}
