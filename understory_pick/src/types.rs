// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public enums and small value types shared across the picking core.

use glam::{DVec2, DVec3};

use crate::warning::PickWarning;

bitflags::bitflags! {
    /// Pick-type mask.
    ///
    /// A node takes part in a pick only if its own mask intersects the request's mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PickMask: u32 {
        /// General-purpose picking (selection, hover).
        const GENERAL     = 0b0000_0001;
        /// Collision queries.
        const COLLIDABLE  = 0b0000_0010;
        /// Terrain following.
        const TERRAIN     = 0b0000_0100;
    }
}

impl Default for PickMask {
    fn default() -> Self {
        Self::all()
    }
}

/// How many results a pick produces and in what order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortPolicy {
    /// The single nearest hit.
    ClosestOne,
    /// The first hit found; no distance comparison.
    AnyOne,
    /// Every hit, in pre-order depth-first traversal order.
    AllOrdered,
    /// Every hit, in no promised order.
    AllUnordered,
}

impl SortPolicy {
    /// Whether at most one result is produced.
    pub const fn is_single(self) -> bool {
        matches!(self, Self::ClosestOne | Self::AnyOne)
    }

    /// Numeric code used by [`RawProbe`](crate::RawProbe).
    pub const fn code(self) -> u8 {
        match self {
            Self::ClosestOne => 0,
            Self::AnyOne => 1,
            Self::AllOrdered => 2,
            Self::AllUnordered => 3,
        }
    }
}

impl TryFrom<u8> for SortPolicy {
    type Error = PickWarning;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::ClosestOne,
            1 => Self::AnyOne,
            2 => Self::AllOrdered,
            3 => Self::AllUnordered,
            other => return Err(PickWarning::UnknownSortPolicy(other)),
        })
    }
}

/// Geometric kind of a probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// A single point.
    Point,
    /// A half-infinite ray.
    Ray,
    /// A finite line segment.
    Segment,
    /// An axis-aligned box.
    Box,
    /// A sphere.
    Sphere,
    /// An infinite one-sided cone.
    Cone,
    /// A finite cylinder.
    Cylinder,
    /// A six-plane view frustum.
    Frustum,
}

impl ProbeKind {
    /// Numeric code used by [`RawProbe`](crate::RawProbe).
    pub const fn code(self) -> u8 {
        match self {
            Self::Point => 0,
            Self::Ray => 1,
            Self::Segment => 2,
            Self::Box => 3,
            Self::Sphere => 4,
            Self::Cone => 5,
            Self::Cylinder => 6,
            Self::Frustum => 7,
        }
    }
}

impl TryFrom<u8> for ProbeKind {
    type Error = PickWarning;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Point,
            1 => Self::Ray,
            2 => Self::Segment,
            3 => Self::Box,
            4 => Self::Sphere,
            5 => Self::Cone,
            6 => Self::Cylinder,
            7 => Self::Frustum,
            other => return Err(PickWarning::UnknownProbeKind(other)),
        })
    }
}

/// Structural kind of a scene node, as seen by the traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Terminal geometry.
    Leaf,
    /// Branching node with stored children.
    Group,
    /// Branching node with a local transform.
    TransformGroup,
    /// Single-child node with no bounds or transform of its own.
    PassThrough,
    /// Node whose children are produced on demand.
    Custom,
}

/// A line query handed to a leaf's exact geometry test, in the leaf's coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExactQuery {
    /// `origin + t * direction`, `t >= 0`.
    Ray {
        /// Ray origin.
        origin: DVec3,
        /// Ray direction (not necessarily normalized).
        direction: DVec3,
    },
    /// `start + t * (end - start)`, `t` in `[0, 1]`.
    Segment {
        /// Segment start.
        start: DVec3,
        /// Segment end.
        end: DVec3,
    },
}

impl ExactQuery {
    /// Origin and direction of the underlying line, plus the maximum parameter.
    pub fn line(&self) -> (DVec3, DVec3, f64) {
        match *self {
            Self::Ray { origin, direction } => (origin, direction, f64::INFINITY),
            Self::Segment { start, end } => (start, end - start, 1.0),
        }
    }
}

/// Geometry-level detail of a hit, produced by a leaf's exact test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitPayload {
    /// Parameter along the query line; comparable across coordinate spaces.
    pub parameter: f64,
    /// Hit point in the leaf's coordinates.
    pub point: DVec3,
    /// Index of the primitive that was hit, if the leaf has primitives.
    pub primitive: Option<u32>,
    /// Vertices of the hit triangle, in the leaf's coordinates.
    pub vertices: Option<[DVec3; 3]>,
    /// Interpolated texture coordinate at the hit point.
    pub uv: Option<DVec2>,
}

impl HitPayload {
    /// A payload carrying only the parameter and point.
    pub fn at(parameter: f64, point: DVec3) -> Self {
        Self {
            parameter,
            point,
            primitive: None,
            vertices: None,
            uv: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for kind in [
            ProbeKind::Point,
            ProbeKind::Ray,
            ProbeKind::Segment,
            ProbeKind::Box,
            ProbeKind::Sphere,
            ProbeKind::Cone,
            ProbeKind::Cylinder,
            ProbeKind::Frustum,
        ] {
            assert_eq!(ProbeKind::try_from(kind.code()), Ok(kind));
        }
        for sort in [
            SortPolicy::ClosestOne,
            SortPolicy::AnyOne,
            SortPolicy::AllOrdered,
            SortPolicy::AllUnordered,
        ] {
            assert_eq!(SortPolicy::try_from(sort.code()), Ok(sort));
        }
    }

    #[test]
    fn unknown_codes_are_warnings() {
        assert_eq!(ProbeKind::try_from(8), Err(PickWarning::UnknownProbeKind(8)));
        assert_eq!(SortPolicy::try_from(200), Err(PickWarning::UnknownSortPolicy(200)));
    }

    #[test]
    fn masks_match_on_intersection() {
        let node = PickMask::GENERAL | PickMask::TERRAIN;
        assert!(node.intersects(PickMask::TERRAIN));
        assert!(!node.intersects(PickMask::COLLIDABLE));
        assert_eq!(PickMask::default(), PickMask::all());
    }
}
