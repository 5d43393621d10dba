use geo::{Coord, GeoFloat};
use std::cmp::Ordering;

use crate::events::SweepPoint;

/// A node inserted into a segment string.
///
/// Nodes sort by the segment they lie on and then by their position
/// along that segment, which is the order they are met when walking
/// the string.
#[derive(Debug, Clone, Copy)]
pub struct SegmentNode<T: GeoFloat> {
    coord: Coord<T>,
    segment_index: usize,
    /// Projection onto the segment direction, relative to its start.
    distance: T,
    is_interior: bool,
}

impl<T: GeoFloat> SegmentNode<T> {
    pub(crate) fn new(coords: &[Coord<T>], coord: Coord<T>, segment_index: usize) -> Self {
        let start = coords[segment_index];
        let distance = match coords.get(segment_index + 1) {
            Some(end) => {
                let (dx, dy) = (end.x - start.x, end.y - start.y);
                (coord.x - start.x) * dx + (coord.y - start.y) * dy
            }
            None => T::zero(),
        };
        SegmentNode {
            coord,
            segment_index,
            distance,
            is_interior: coord != start,
        }
    }

    #[inline]
    pub fn coord(&self) -> Coord<T> {
        self.coord
    }

    #[inline]
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Whether the node is not the start vertex of its segment.
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.is_interior
    }

    pub fn is_end_point(&self, max_segment_index: usize) -> bool {
        (self.segment_index == 0 && !self.is_interior) || self.segment_index == max_segment_index
    }
}

impl<T: GeoFloat> PartialEq for SegmentNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: GeoFloat> Eq for SegmentNode<T> {}

impl<T: GeoFloat> PartialOrd for SegmentNode<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: GeoFloat> Ord for SegmentNode<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.coord == other.coord && self.segment_index == other.segment_index {
            return Ordering::Equal;
        }
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| {
                self.distance
                    .partial_cmp(&other.distance)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| SweepPoint::from(self.coord).cmp(&SweepPoint::from(other.coord)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;
    use std::collections::BTreeSet;

    #[test]
    fn nodes_sort_along_the_string() {
        let coords = vec![
            coord! { x: 10., y: 0. },
            coord! { x: 0., y: 0. },
            coord! { x: 0., y: 10. },
        ];
        let mut nodes = BTreeSet::new();
        nodes.insert(SegmentNode::new(&coords, coord! { x: 0., y: 7. }, 1));
        nodes.insert(SegmentNode::new(&coords, coord! { x: 2., y: 0. }, 0));
        nodes.insert(SegmentNode::new(&coords, coord! { x: 8., y: 0. }, 0));
        nodes.insert(SegmentNode::new(&coords, coord! { x: 0., y: 0. }, 1));
        nodes.insert(SegmentNode::new(&coords, coord! { x: 2., y: 0. }, 0));

        let order: Vec<_> = nodes.iter().map(|n| (n.coord().x, n.coord().y)).collect();
        assert_eq!(order, vec![(8., 0.), (2., 0.), (0., 0.), (0., 7.)]);
        assert!(!nodes.iter().nth(2).unwrap().is_interior());
    }
}
