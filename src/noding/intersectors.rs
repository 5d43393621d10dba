use geo::{Coord, GeoFloat};
use std::ptr;

use super::NodedSegmentString;
use crate::{
    intersection::{is_interior_intersection, LineIntersector, SegmentIntersection},
    precision::PrecisionModel,
};

/// Processes candidate pairs of segments produced by a noder.
///
/// Segment strings are compared by identity: `e0` and `e1` are the same
/// string exactly when they are the same reference.
pub trait SegmentIntersector<T: GeoFloat> {
    fn process_intersections(
        &mut self,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    );

    /// Whether processing can stop early.
    fn is_done(&self) -> bool {
        false
    }
}

impl<T: GeoFloat, S: SegmentIntersector<T> + ?Sized> SegmentIntersector<T> for &mut S {
    fn process_intersections(
        &mut self,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    ) {
        (**self).process_intersections(e0, segment_index0, e1, segment_index1)
    }

    fn is_done(&self) -> bool {
        (**self).is_done()
    }
}

fn intersect_segments<T: GeoFloat>(
    li: &LineIntersector<T>,
    e0: &NodedSegmentString<T>,
    segment_index0: usize,
    e1: &NodedSegmentString<T>,
    segment_index1: usize,
) -> Option<(SegmentIntersection<T>, bool)> {
    let (p0, p1) = e0.segment(segment_index0);
    let (q0, q1) = e1.segment(segment_index1);
    let isect = li.compute(p0, p1, q0, q1)?;
    let interior = is_interior_intersection(&isect, p0, p1, q0, q1);
    Some((isect, interior))
}

/// Adds a node to both strings for every non-trivial intersection.
///
/// An intersection is trivial when it is the shared vertex of two
/// consecutive segments of one string, including the closing vertex of
/// a ring.
#[derive(Debug, Clone, Default)]
pub struct IntersectionAdder<T: GeoFloat> {
    li: LineIntersector<T>,
    num_tests: usize,
    num_intersections: usize,
    num_interior_intersections: usize,
    num_proper_intersections: usize,
}

impl<T: GeoFloat> IntersectionAdder<T> {
    pub fn new(li: LineIntersector<T>) -> Self {
        IntersectionAdder {
            li,
            num_tests: 0,
            num_intersections: 0,
            num_interior_intersections: 0,
            num_proper_intersections: 0,
        }
    }

    pub fn floating() -> Self {
        Self::new(LineIntersector::floating())
    }

    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    pub fn num_intersections(&self) -> usize {
        self.num_intersections
    }

    pub fn num_interior_intersections(&self) -> usize {
        self.num_interior_intersections
    }

    pub fn num_proper_intersections(&self) -> usize {
        self.num_proper_intersections
    }

    pub fn has_intersection(&self) -> bool {
        self.num_intersections > 0
    }

    pub fn has_proper_intersection(&self) -> bool {
        self.num_proper_intersections > 0
    }

    fn is_trivial_intersection(
        isect: &SegmentIntersection<T>,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    ) -> bool {
        if !ptr::eq(e0, e1) || !matches!(isect, SegmentIntersection::Point { .. }) {
            return false;
        }
        if segment_index0.abs_diff(segment_index1) == 1 {
            return true;
        }
        if e0.is_closed() {
            let last = e0.segment_count() - 1;
            let (lo, hi) = (
                segment_index0.min(segment_index1),
                segment_index0.max(segment_index1),
            );
            return lo == 0 && hi == last;
        }
        false
    }
}

impl<T: GeoFloat> SegmentIntersector<T> for IntersectionAdder<T> {
    fn process_intersections(
        &mut self,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    ) {
        if ptr::eq(e0, e1) && segment_index0 == segment_index1 {
            return;
        }
        self.num_tests += 1;
        let Some((isect, interior)) =
            intersect_segments(&self.li, e0, segment_index0, e1, segment_index1)
        else {
            return;
        };
        self.num_intersections += 1;
        if interior {
            self.num_interior_intersections += 1;
        }
        if Self::is_trivial_intersection(&isect, e0, segment_index0, e1, segment_index1) {
            return;
        }
        e0.add_intersections(&isect, segment_index0);
        e1.add_intersections(&isect, segment_index1);
        if isect.is_proper() {
            self.num_proper_intersections += 1;
        }
    }
}

/// Finds an intersection interior to at least one of its segments, and
/// stops at the first one.
#[derive(Debug, Clone, Default)]
pub struct InteriorIntersectionFinder<T: GeoFloat> {
    li: LineIntersector<T>,
    intersection: Option<Coord<T>>,
    segments: Option<[Coord<T>; 4]>,
}

impl<T: GeoFloat> InteriorIntersectionFinder<T> {
    pub fn new(li: LineIntersector<T>) -> Self {
        InteriorIntersectionFinder {
            li,
            intersection: None,
            segments: None,
        }
    }

    pub fn has_intersection(&self) -> bool {
        self.intersection.is_some()
    }

    pub fn intersection(&self) -> Option<Coord<T>> {
        self.intersection
    }

    /// End-points of the two intersecting segments.
    pub fn intersection_segments(&self) -> Option<[Coord<T>; 4]> {
        self.segments
    }
}

impl<T: GeoFloat> SegmentIntersector<T> for InteriorIntersectionFinder<T> {
    fn process_intersections(
        &mut self,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    ) {
        if self.has_intersection() || (ptr::eq(e0, e1) && segment_index0 == segment_index1) {
            return;
        }
        if let Some((isect, true)) =
            intersect_segments(&self.li, e0, segment_index0, e1, segment_index1)
        {
            let (p0, p1) = e0.segment(segment_index0);
            let (q0, q1) = e1.segment(segment_index1);
            self.intersection = isect.points().first().copied();
            self.segments = Some([p0, p1, q0, q1]);
        }
    }

    fn is_done(&self) -> bool {
        self.has_intersection()
    }
}

/// Collects every interior intersection, rounded onto the intersector's
/// grid, and adds it as a node to both strings.
///
/// This is the first phase of snap rounding: the collected points become
/// hot pixels.
#[derive(Debug, Clone, Default)]
pub struct InteriorIntersectionFinderAdder<T: GeoFloat> {
    li: LineIntersector<T>,
    interior_intersections: Vec<Coord<T>>,
}

impl<T: GeoFloat> InteriorIntersectionFinderAdder<T> {
    pub fn new(li: LineIntersector<T>) -> Self {
        InteriorIntersectionFinderAdder {
            li,
            interior_intersections: vec![],
        }
    }

    pub fn with_precision(precision: PrecisionModel<T>) -> Self {
        Self::new(LineIntersector::new(precision))
    }

    pub fn interior_intersections(&self) -> &[Coord<T>] {
        &self.interior_intersections
    }

    pub fn into_interior_intersections(self) -> Vec<Coord<T>> {
        self.interior_intersections
    }
}

impl<T: GeoFloat> SegmentIntersector<T> for InteriorIntersectionFinderAdder<T> {
    fn process_intersections(
        &mut self,
        e0: &NodedSegmentString<T>,
        segment_index0: usize,
        e1: &NodedSegmentString<T>,
        segment_index1: usize,
    ) {
        if ptr::eq(e0, e1) && segment_index0 == segment_index1 {
            return;
        }
        let Some((isect, true)) =
            intersect_segments(&self.li, e0, segment_index0, e1, segment_index1)
        else {
            return;
        };
        self.interior_intersections.extend(isect.points());
        e0.add_intersections(&isect, segment_index0);
        e1.add_intersections(&isect, segment_index1);
    }
}
