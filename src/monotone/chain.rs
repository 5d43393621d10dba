use geo::GeoFloat;

use super::{chain_start_indices, overlapping_segments, select_segments};
use crate::{index::Envelope, noding::NodedSegmentString};

/// A monotone run of segments `start..end` of a segment string.
#[derive(Debug, Clone)]
pub struct MonotoneChain<'a, T: GeoFloat> {
    string: &'a NodedSegmentString<T>,
    start: usize,
    end: usize,
    envelope: Envelope<T>,
    pub(crate) id: usize,
}

/// Decomposes a segment string into its monotone chains. Chain ids are
/// left at zero for the caller to assign.
pub fn monotone_chains<T: GeoFloat>(string: &NodedSegmentString<T>) -> Vec<MonotoneChain<'_, T>> {
    let starts = chain_start_indices(string.coords());
    starts
        .windows(2)
        .map(|w| MonotoneChain::new(string, w[0], w[1]))
        .collect()
}

impl<'a, T: GeoFloat> MonotoneChain<'a, T> {
    pub fn new(string: &'a NodedSegmentString<T>, start: usize, end: usize) -> Self {
        assert!(start < end && end < string.len(), "invalid chain range");
        let coords = string.coords();
        MonotoneChain {
            string,
            start,
            end,
            envelope: Envelope::new(coords[start], coords[end]),
            id: 0,
        }
    }

    /// The segment string this chain belongs to.
    #[inline]
    pub fn string(&self) -> &'a NodedSegmentString<T> {
        self.string
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn envelope(&self) -> &Envelope<T> {
        &self.envelope
    }

    /// Calls `action` with the start index of every segment that may
    /// intersect `search`.
    pub fn select<F: FnMut(&Self, usize)>(&self, search: &Envelope<T>, mut action: F) {
        select_segments(
            self.string.coords(),
            self.start,
            self.end,
            search,
            &mut |index| action(self, index),
        );
    }

    /// Calls `action` with every pair of segments, one from each chain,
    /// that may intersect.
    pub fn compute_overlaps<F: FnMut(&Self, usize, &Self, usize)>(&self, other: &Self, mut action: F) {
        overlapping_segments(
            (self.string.coords(), self.start, self.end),
            (other.string.coords(), other.start, other.end),
            &mut |i, j| action(self, i, other, j),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn chains_cover_the_string() {
        let string = NodedSegmentString::new(
            vec![
                coord! { x: 0., y: 0. },
                coord! { x: 2., y: 2. },
                coord! { x: 4., y: 0. },
                coord! { x: 6., y: 2. },
            ],
            0,
        );
        let chains = monotone_chains(&string);
        let ranges: Vec<_> = chains.iter().map(|c| (c.start(), c.end())).collect();
        assert_eq!(ranges, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(chains[1].envelope().max(), coord! { x: 4., y: 2. });
    }

    #[test]
    fn overlaps_between_crossing_chains() {
        let a = NodedSegmentString::new(
            (0..6).map(|i| coord! { x: i as f64, y: i as f64 }).collect(),
            0,
        );
        let b = NodedSegmentString::new(
            (0..6).map(|i| coord! { x: i as f64 + 0.5, y: 5. - i as f64 }).collect(),
            1,
        );
        let (ca, cb) = (monotone_chains(&a), monotone_chains(&b));
        assert_eq!((ca.len(), cb.len()), (1, 1));
        let mut pairs = vec![];
        ca[0].compute_overlaps(&cb[0], |c0, i, c1, j| {
            assert_eq!(c0.string().context(), 0);
            assert_eq!(c1.string().context(), 1);
            pairs.push((i, j));
        });
        // y = x meets y = 5.5 - x at x = 2.75.
        assert!(pairs.contains(&(2, 2)));
    }
}
