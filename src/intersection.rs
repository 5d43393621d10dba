use geo::{
    line_intersection::{line_intersection, LineIntersection},
    Coord, GeoFloat, Line,
};
use smallvec::{smallvec, SmallVec};

use crate::precision::PrecisionModel;

/// Intersection of two line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection<T: GeoFloat> {
    /// The segments meet in a single point. `is_proper` is set if the point
    /// is interior to both segments.
    Point { point: Coord<T>, is_proper: bool },
    /// The segments overlap along a common sub-segment.
    Collinear { overlap: Line<T> },
}

impl<T: GeoFloat> SegmentIntersection<T> {
    pub fn points(&self) -> SmallVec<[Coord<T>; 2]> {
        match self {
            SegmentIntersection::Point { point, .. } => smallvec![*point],
            SegmentIntersection::Collinear { overlap } => smallvec![overlap.start, overlap.end],
        }
    }

    #[inline]
    pub fn is_proper(&self) -> bool {
        matches!(self, SegmentIntersection::Point { is_proper: true, .. })
    }

    /// Whether some intersection point is not an end-point of the segment
    /// `p0 -> p1`.
    pub fn is_interior_to(&self, p0: Coord<T>, p1: Coord<T>) -> bool {
        self.points().iter().any(|&pt| pt != p0 && pt != p1)
    }
}

/// Computes segment intersections, rounding proper intersection points
/// onto a precision grid.
///
/// End-point intersections are copies of input vertices and are never
/// rounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineIntersector<T: GeoFloat> {
    precision: PrecisionModel<T>,
}

impl<T: GeoFloat> LineIntersector<T> {
    pub fn new(precision: PrecisionModel<T>) -> Self {
        LineIntersector { precision }
    }

    pub fn floating() -> Self {
        Self::new(PrecisionModel::Floating)
    }

    pub fn precision(&self) -> &PrecisionModel<T> {
        &self.precision
    }

    pub fn compute(
        &self,
        p0: Coord<T>,
        p1: Coord<T>,
        q0: Coord<T>,
        q1: Coord<T>,
    ) -> Option<SegmentIntersection<T>> {
        let isect = line_intersection(Line::new(p0, p1), Line::new(q0, q1))?;
        Some(match isect {
            LineIntersection::SinglePoint {
                intersection,
                is_proper,
            } => SegmentIntersection::Point {
                point: if is_proper {
                    self.precision.make_precise(intersection)
                } else {
                    intersection
                },
                is_proper,
            },
            LineIntersection::Collinear { intersection } => SegmentIntersection::Collinear {
                overlap: intersection,
            },
        })
    }

    /// Whether the segments intersect at a point interior to at least one
    /// of them.
    pub fn has_interior_intersection(
        &self,
        p0: Coord<T>,
        p1: Coord<T>,
        q0: Coord<T>,
        q1: Coord<T>,
    ) -> bool {
        self.compute(p0, p1, q0, q1)
            .map_or(false, |isect| is_interior_intersection(&isect, p0, p1, q0, q1))
    }
}

#[inline]
pub(crate) fn is_interior_intersection<T: GeoFloat>(
    isect: &SegmentIntersection<T>,
    p0: Coord<T>,
    p1: Coord<T>,
    q0: Coord<T>,
    q1: Coord<T>,
) -> bool {
    isect.is_interior_to(p0, p1) || isect.is_interior_to(q0, q1)
}
