use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    winding_order::Winding,
    GeoFloat, LineString, Polygon,
};
use std::collections::BTreeSet;

use crate::{
    events::SweepPoint,
    graph::{DirEdgeId, PlanarGraph},
    index::{Envelope, DEFAULT_NODE_CAPACITY},
    intersection::LineIntersector,
    noding::{ChainIndex, InteriorIntersectionFinder, NodedSegmentString},
};

/// Role of a traced ring in the polygonization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingKind {
    /// A clockwise ring bounding a face on its right.
    Shell,
    /// A counter-clockwise ring: the outer boundary of a group of faces.
    Hole,
    /// A ring without area, or one that crosses or touches itself.
    Invalid,
}

/// A ring of directed edges traced through the polygonizer's graph.
#[derive(Debug, Clone)]
pub struct EdgeRing<T: GeoFloat> {
    pub(crate) dir_edges: Vec<DirEdgeId>,
    ring: LineString<T>,
    envelope: Envelope<T>,
    kind: RingKind,
    /// The shell a hole was assigned to.
    pub(crate) shell: Option<usize>,
    pub(crate) holes: Vec<usize>,
    pub(crate) included: Option<bool>,
    pub(crate) processed: bool,
}

impl<T: GeoFloat> EdgeRing<T> {
    pub(crate) fn new<E>(graph: &PlanarGraph<T, E>, dir_edges: Vec<DirEdgeId>) -> Self {
        let ring = LineString::new(graph.ring_coords(&dir_edges));
        let envelope = Envelope::from_coords(ring.0.iter().copied());
        let kind = if !is_valid_ring(&ring) {
            RingKind::Invalid
        } else if ring.is_ccw() {
            RingKind::Hole
        } else {
            RingKind::Shell
        };
        EdgeRing {
            dir_edges,
            ring,
            envelope,
            kind,
            shell: None,
            holes: vec![],
            included: None,
            processed: false,
        }
    }

    /// The closed coordinate sequence of the ring.
    pub fn ring(&self) -> &LineString<T> {
        &self.ring
    }

    pub fn envelope(&self) -> &Envelope<T> {
        &self.envelope
    }

    pub fn kind(&self) -> RingKind {
        self.kind
    }

    #[inline]
    pub fn is_hole(&self) -> bool {
        self.kind == RingKind::Hole
    }

    /// Whether `other` lies inside this ring. Rings with equal envelopes
    /// never contain each other.
    pub(crate) fn contains_ring(&self, other: &Self) -> bool {
        if self.envelope == other.envelope || !self.envelope.contains(&other.envelope) {
            return false;
        }
        let Some(pt) = other.ring.0.iter().find(|&pt| !self.ring.0.contains(pt)) else {
            return false;
        };
        let polygon = Polygon::new(self.ring.clone(), vec![]);
        polygon.coordinate_position(pt) != CoordPos::Outside
    }

    /// The polygon bounded by this shell and its assigned holes.
    pub(crate) fn to_polygon(&self, rings: &[EdgeRing<T>]) -> Polygon<T> {
        let holes = self.holes.iter().map(|&h| rings[h].ring.clone()).collect();
        Polygon::new(self.ring.clone(), holes)
    }
}

/// A ring is valid if it has an area, visits no vertex twice and no
/// segment meets another one in its interior.
fn is_valid_ring<T: GeoFloat>(ring: &LineString<T>) -> bool {
    if ring.0.len() < 4 || ring.winding_order().is_none() {
        return false;
    }
    let open = &ring.0[..ring.0.len() - 1];
    let distinct: BTreeSet<_> = open.iter().map(|&c| SweepPoint::from(c)).collect();
    if distinct.len() < open.len() {
        return false;
    }
    let strings = [NodedSegmentString::from_line_string(ring, 0)];
    let mut finder = InteriorIntersectionFinder::new(LineIntersector::floating());
    ChainIndex::new(&strings, DEFAULT_NODE_CAPACITY).compute_all_intersections(&mut finder);
    !finder.has_intersection()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
        let mut ring = LineString::from(coords.to_vec());
        ring.close();
        ring
    }

    #[test]
    fn ring_validity() {
        assert!(is_valid_ring(&ring(&[(0., 0.), (1., 0.), (1., 1.)])));
        assert!(!is_valid_ring(&ring(&[(0., 0.), (1., 0.)])));
        assert!(!is_valid_ring(&ring(&[(0., 0.), (1., 0.), (2., 0.)])));
        assert!(!is_valid_ring(&ring(&[(0., 0.), (2., 2.), (2., 0.), (0., 2.)])));
        // Two lobes pinched at (1, 1).
        assert!(!is_valid_ring(&ring(&[
            (1., 1.),
            (0., 0.),
            (0., 2.),
            (1., 1.),
            (2., 2.),
            (2., 0.),
        ])));
    }
}
