use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    Coord, GeoFloat, LineString, Polygon,
};
use log::debug;

use crate::{
    index::{Envelope, Interval, SweepLineIndex, DEFAULT_NODE_CAPACITY},
    noding::{ChainIndex, IntersectionAdder, NodedSegmentString},
};

/// Checks that no ring of a set of sibling rings lies inside another.
///
/// Rings are paired by a sweep over their x-extents. For every
/// overlapping pair, each ring is tested against the other: a vertex of
/// the candidate inner ring that is not a node shared with the outer ring
/// decides containment. The rings may touch at points but must not cross.
#[derive(Debug, Clone)]
pub struct SweeplineNestedRingTester<T: GeoFloat> {
    rings: Vec<LineString<T>>,
    nested_point: Option<Coord<T>>,
}

impl<T: GeoFloat> Default for SweeplineNestedRingTester<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat> SweeplineNestedRingTester<T> {
    pub fn new() -> Self {
        SweeplineNestedRingTester {
            rings: vec![],
            nested_point: None,
        }
    }

    pub fn add(&mut self, ring: LineString<T>) {
        self.rings.push(ring);
    }

    /// Whether none of the added rings is nested in another.
    pub fn is_non_nested(&mut self) -> bool {
        let strings: Vec<_> = self
            .rings
            .iter()
            .enumerate()
            .map(|(i, ring)| NodedSegmentString::from_line_string(ring, i))
            .collect();
        ChainIndex::new(&strings, DEFAULT_NODE_CAPACITY)
            .compute_all_intersections(&mut IntersectionAdder::floating());

        let envelopes: Vec<_> = strings
            .iter()
            .map(|s| Envelope::from_coords(s.coords().iter().copied()))
            .collect();
        let mut sweep = SweepLineIndex::new();
        for (i, env) in envelopes.iter().enumerate() {
            if !env.is_null() {
                sweep.add(Interval::new(env.min().x, env.max().x), i);
            }
        }

        let mut nested = None;
        let pairs = sweep.compute_overlaps(|&a, &b| {
            if nested.is_some() {
                return;
            }
            let (ra, rb) = ((&strings[a], &envelopes[a]), (&strings[b], &envelopes[b]));
            nested = find_nested_point(ra, rb).or_else(|| find_nested_point(rb, ra));
        });
        debug!(
            "tested {pairs} overlapping pairs of {} rings for nesting",
            strings.len()
        );

        self.nested_point = nested;
        nested.is_none()
    }

    /// A point of a ring lying inside another ring, found by the last call
    /// to [`is_non_nested`](Self::is_non_nested).
    pub fn nested_point(&self) -> Option<Coord<T>> {
        self.nested_point
    }
}

/// A vertex of `inner` that lies in `outer` and is not one of its nodes.
///
/// A ring all of whose vertices are nodes of `outer` is taken to be not
/// nested in it.
fn find_nested_point<T: GeoFloat>(
    (inner, inner_env): (&NodedSegmentString<T>, &Envelope<T>),
    (outer, outer_env): (&NodedSegmentString<T>, &Envelope<T>),
) -> Option<Coord<T>> {
    if !outer_env.contains(inner_env) {
        return None;
    }
    let pt = inner
        .coords()
        .iter()
        .copied()
        .find(|&pt| !outer.has_node_at(pt))?;
    let outer = Polygon::new(outer.to_line_string(), vec![]);
    (outer.coordinate_position(&pt) != CoordPos::Outside).then_some(pt)
}
