// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Probe geometry and the untyped raw descriptor.

use glam::{DVec3, DVec4};
use understory_bounds3d::Frustum;

use crate::types::{ProbeKind, SortPolicy};
use crate::warning::PickWarning;

/// World-space probe geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Probe {
    /// A single point.
    Point {
        /// Point position.
        position: DVec3,
    },
    /// A half-infinite ray `origin + t * direction`, `t >= 0`.
    Ray {
        /// Ray origin.
        origin: DVec3,
        /// Ray direction; need not be normalized. A zero direction picks nothing.
        direction: DVec3,
    },
    /// A line segment `start -> end`.
    Segment {
        /// Segment start.
        start: DVec3,
        /// Segment end.
        end: DVec3,
    },
    /// An axis-aligned box spanned by two corners (in any order).
    Box {
        /// One corner.
        min: DVec3,
        /// The opposite corner.
        max: DVec3,
    },
    /// A sphere.
    Sphere {
        /// Center.
        center: DVec3,
        /// Radius.
        radius: f64,
    },
    /// An infinite cone opening from `vertex` along `direction`.
    Cone {
        /// Apex of the cone.
        vertex: DVec3,
        /// Axis direction; need not be normalized. A zero axis picks nothing.
        direction: DVec3,
        /// Half opening angle in radians.
        half_angle: f64,
    },
    /// A finite cylinder around the axis `start -> end`.
    Cylinder {
        /// Axis start.
        start: DVec3,
        /// Axis end. Equal endpoints pick nothing.
        end: DVec3,
        /// Radius.
        radius: f64,
    },
    /// A view frustum given by six inward-facing planes.
    Frustum {
        /// Planes `(a, b, c, d)`: a point is inside when `a*x + b*y + c*z + d >= 0`.
        planes: [DVec4; 6],
    },
}

impl Probe {
    /// The probe's geometric kind.
    pub const fn kind(&self) -> ProbeKind {
        match self {
            Self::Point { .. } => ProbeKind::Point,
            Self::Ray { .. } => ProbeKind::Ray,
            Self::Segment { .. } => ProbeKind::Segment,
            Self::Box { .. } => ProbeKind::Box,
            Self::Sphere { .. } => ProbeKind::Sphere,
            Self::Cone { .. } => ProbeKind::Cone,
            Self::Cylinder { .. } => ProbeKind::Cylinder,
            Self::Frustum { .. } => ProbeKind::Frustum,
        }
    }

    /// The world-space point hits are ranked against, for probes that have one.
    ///
    /// Ray and segment probes rank by parameter instead; frusta have no anchor.
    pub fn anchor(&self) -> Option<DVec3> {
        match *self {
            Self::Point { position } => Some(position),
            Self::Ray { origin, .. } => Some(origin),
            Self::Segment { start, .. } => Some(start),
            Self::Box { min, max } => Some((min + max) * 0.5),
            Self::Sphere { center, .. } => Some(center),
            Self::Cone { vertex, .. } => Some(vertex),
            Self::Cylinder { start, end, .. } => Some((start + end) * 0.5),
            Self::Frustum { .. } => None,
        }
    }

    /// Frustum probe from a view-projection matrix.
    pub fn frustum_from_view_projection(view_projection: &glam::DMat4) -> Self {
        Self::Frustum {
            planes: Frustum::from_view_projection(view_projection).planes,
        }
    }
}

/// An untyped probe descriptor with numeric codes.
///
/// Field meaning depends on [`kind`](Self::kind):
///
/// | kind | `origin` | `destination` | `scalar` |
/// |---|---|---|---|
/// | 0 point | position | | |
/// | 1 ray | start | direction | |
/// | 2 segment | start | end | |
/// | 3 box | corner | opposite corner | |
/// | 4 sphere | center | | radius |
/// | 5 cone | vertex | axis direction | half-angle |
/// | 6 cylinder | axis start | axis end | radius |
/// | 7 frustum | | | |
///
/// Frusta use `planes` as six packed `(a, b, c, d)` groups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawProbe {
    /// Probe kind code.
    pub kind: u8,
    /// Sort policy code.
    pub sort: u8,
    /// First position.
    pub origin: [f64; 3],
    /// Second position or direction.
    pub destination: [f64; 3],
    /// Radius or angle.
    pub scalar: f64,
    /// Packed frustum planes.
    pub planes: [f64; 24],
}

impl Default for RawProbe {
    fn default() -> Self {
        Self {
            kind: 0,
            sort: 0,
            origin: [0.0; 3],
            destination: [0.0; 3],
            scalar: 0.0,
            planes: [0.0; 24],
        }
    }
}

impl RawProbe {
    /// Validate the codes and build a typed probe.
    pub fn decode(&self) -> Result<(Probe, SortPolicy), PickWarning> {
        let kind = ProbeKind::try_from(self.kind)?;
        let sort = SortPolicy::try_from(self.sort)?;
        let a = DVec3::from_array(self.origin);
        let b = DVec3::from_array(self.destination);
        let probe = match kind {
            ProbeKind::Point => Probe::Point { position: a },
            ProbeKind::Ray => Probe::Ray {
                origin: a,
                direction: b,
            },
            ProbeKind::Segment => Probe::Segment { start: a, end: b },
            ProbeKind::Box => Probe::Box { min: a, max: b },
            ProbeKind::Sphere => Probe::Sphere {
                center: a,
                radius: self.scalar,
            },
            ProbeKind::Cone => Probe::Cone {
                vertex: a,
                direction: b,
                half_angle: self.scalar,
            },
            ProbeKind::Cylinder => Probe::Cylinder {
                start: a,
                end: b,
                radius: self.scalar,
            },
            ProbeKind::Frustum => Probe::Frustum {
                planes: Frustum::from_packed(&self.planes).planes,
            },
        };
        Ok((probe, sort))
    }

    /// Encode a typed probe.
    pub fn encode(probe: &Probe, sort: SortPolicy) -> Self {
        let mut raw = Self {
            kind: probe.kind().code(),
            sort: sort.code(),
            ..Self::default()
        };
        match *probe {
            Probe::Point { position } => raw.origin = position.to_array(),
            Probe::Ray { origin, direction } => {
                raw.origin = origin.to_array();
                raw.destination = direction.to_array();
            }
            Probe::Segment { start, end } => {
                raw.origin = start.to_array();
                raw.destination = end.to_array();
            }
            Probe::Box { min, max } => {
                raw.origin = min.to_array();
                raw.destination = max.to_array();
            }
            Probe::Sphere { center, radius } => {
                raw.origin = center.to_array();
                raw.scalar = radius;
            }
            Probe::Cone {
                vertex,
                direction,
                half_angle,
            } => {
                raw.origin = vertex.to_array();
                raw.destination = direction.to_array();
                raw.scalar = half_angle;
            }
            Probe::Cylinder { start, end, radius } => {
                raw.origin = start.to_array();
                raw.destination = end.to_array();
                raw.scalar = radius;
            }
            Probe::Frustum { planes } => {
                raw.planes = Frustum { planes }.to_packed();
            }
        }
        raw
    }
}
