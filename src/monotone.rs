//! Monotone chain decomposition of segment strings.
//!
//! A monotone chain is a maximal run of consecutive segments whose
//! directions all fall in the same quadrant. Such a run never turns
//! back on itself, so the envelope of any contiguous sub-run is spanned
//! by its two end-points. This lets chains be searched and intersected
//! by recursive bisection.

use geo::{Coord, GeoFloat};

use crate::{index::Envelope, utils::Quadrant};

mod chain;
pub use chain::{monotone_chains, MonotoneChain};

mod chain_edge;
pub use chain_edge::MonotoneChainEdge;

/// Indices at which the monotone chains of `coords` start, followed by
/// the index of the last coordinate. Consecutive entries delimit one
/// chain.
///
/// Repeated points are absorbed into the surrounding chain.
pub fn chain_start_indices<T: GeoFloat>(coords: &[Coord<T>]) -> Vec<usize> {
    if coords.len() < 2 {
        return vec![];
    }
    let mut indices = vec![0];
    let mut start = 0;
    while start < coords.len() - 1 {
        start = find_chain_end(coords, start);
        indices.push(start);
    }
    indices
}

fn find_chain_end<T: GeoFloat>(coords: &[Coord<T>], start: usize) -> usize {
    let last_index = coords.len() - 1;
    let Some(first) = (start..last_index).find(|&i| coords[i] != coords[i + 1]) else {
        // Only repeated points remain.
        return last_index;
    };
    let chain_quadrant = Quadrant::of_segment(coords[first], coords[first + 1]);

    let mut last = start + 1;
    while last < coords.len() {
        if coords[last - 1] != coords[last]
            && Quadrant::of_segment(coords[last - 1], coords[last]) != chain_quadrant
        {
            break;
        }
        last += 1;
    }
    last - 1
}

/// Visits the segments of the monotone run `start..=end` whose
/// containing sub-runs intersect `search`.
pub(crate) fn select_segments<T: GeoFloat, F: FnMut(usize)>(
    coords: &[Coord<T>],
    start: usize,
    end: usize,
    search: &Envelope<T>,
    action: &mut F,
) {
    if end - start == 1 {
        action(start);
        return;
    }
    if !search.intersects(&Envelope::new(coords[start], coords[end])) {
        return;
    }
    let mid = (start + end) / 2;
    if start < mid {
        select_segments(coords, start, mid, search, action);
    }
    if mid < end {
        select_segments(coords, mid, end, search, action);
    }
}

/// Visits the pairs of segments from two monotone runs whose containing
/// sub-runs have overlapping envelopes.
pub(crate) fn overlapping_segments<T: GeoFloat, F: FnMut(usize, usize)>(
    (coords0, start0, end0): (&[Coord<T>], usize, usize),
    (coords1, start1, end1): (&[Coord<T>], usize, usize),
    action: &mut F,
) {
    if end0 - start0 == 1 && end1 - start1 == 1 {
        action(start0, start1);
        return;
    }
    let env0 = Envelope::new(coords0[start0], coords0[end0]);
    let env1 = Envelope::new(coords1[start1], coords1[end1]);
    if !env0.intersects(&env1) {
        return;
    }

    let mid0 = (start0 + end0) / 2;
    let mid1 = (start1 + end1) / 2;
    let halves0 = [(start0, mid0), (mid0, end0)];
    let halves1 = [(start1, mid1), (mid1, end1)];
    for &(s0, e0) in halves0.iter().filter(|(s, e)| s < e) {
        for &(s1, e1) in halves1.iter().filter(|(s, e)| s < e) {
            overlapping_segments((coords0, s0, e0), (coords1, s1, e1), action);
        }
    }
}
