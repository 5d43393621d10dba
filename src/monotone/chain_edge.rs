use geo::GeoFloat;

use super::{chain_start_indices, overlapping_segments};
use crate::noding::{NodedSegmentString, SegmentIntersector};

/// All monotone chains of one segment string, stored as a list of
/// start indices.
///
/// This is the form used by sweep-line noding, where chains are
/// inserted into the sweep by their x-extent.
#[derive(Debug, Clone)]
pub struct MonotoneChainEdge<'a, T: GeoFloat> {
    string: &'a NodedSegmentString<T>,
    start_indices: Vec<usize>,
}

impl<'a, T: GeoFloat> MonotoneChainEdge<'a, T> {
    pub fn new(string: &'a NodedSegmentString<T>) -> Self {
        MonotoneChainEdge {
            string,
            start_indices: chain_start_indices(string.coords()),
        }
    }

    #[inline]
    pub fn string(&self) -> &'a NodedSegmentString<T> {
        self.string
    }

    pub fn start_indices(&self) -> &[usize] {
        &self.start_indices
    }

    pub fn chain_count(&self) -> usize {
        self.start_indices.len().saturating_sub(1)
    }

    pub fn min_x(&self, chain: usize) -> T {
        let coords = self.string.coords();
        let x0 = coords[self.start_indices[chain]].x;
        let x1 = coords[self.start_indices[chain + 1]].x;
        x0.min(x1)
    }

    pub fn max_x(&self, chain: usize) -> T {
        let coords = self.string.coords();
        let x0 = coords[self.start_indices[chain]].x;
        let x1 = coords[self.start_indices[chain + 1]].x;
        x0.max(x1)
    }

    /// Feeds every pair of possibly intersecting segments, across all
    /// chain pairs of the two edges, to `intersector`.
    pub fn compute_intersects<SI: SegmentIntersector<T>>(&self, other: &Self, intersector: &mut SI) {
        for i in 0..self.chain_count() {
            for j in 0..other.chain_count() {
                self.compute_intersects_for_chain(i, other, j, intersector);
            }
        }
    }

    pub fn compute_intersects_for_chain<SI: SegmentIntersector<T>>(
        &self,
        chain: usize,
        other: &Self,
        other_chain: usize,
        intersector: &mut SI,
    ) {
        overlapping_segments(
            (
                self.string.coords(),
                self.start_indices[chain],
                self.start_indices[chain + 1],
            ),
            (
                other.string.coords(),
                other.start_indices[other_chain],
                other.start_indices[other_chain + 1],
            ),
            &mut |i, j| {
                if !intersector.is_done() {
                    intersector.process_intersections(self.string, i, other.string, j)
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::IntersectionAdder;
    use geo::coord;

    #[test]
    fn crossing_edges_are_noded() {
        let a = NodedSegmentString::new(
            vec![coord! { x: 0., y: 0. }, coord! { x: 4., y: 4. }, coord! { x: 8., y: 0. }],
            0,
        );
        let b = NodedSegmentString::new(
            vec![coord! { x: 0., y: 2. }, coord! { x: 8., y: 2. }],
            1,
        );
        let (ea, eb) = (MonotoneChainEdge::new(&a), MonotoneChainEdge::new(&b));
        assert_eq!(ea.chain_count(), 2);
        assert_eq!((ea.min_x(1), ea.max_x(1)), (4., 8.));

        let mut adder = IntersectionAdder::floating();
        ea.compute_intersects(&eb, &mut adder);
        assert_eq!(adder.num_intersections(), 2);
        assert_eq!(a.node_count(), 2);
        assert_eq!(b.node_count(), 2);
    }
}
