use geo::GeoFloat;
use log::trace;

use super::Interval;
use crate::events::{Event, EventType};

/// Reports all pairs of overlapping intervals with a sweep over their
/// end-points.
#[derive(Debug, Clone)]
pub struct SweepLineIndex<T: GeoFloat, I> {
    intervals: Vec<(Interval<T>, I)>,
    events: Vec<Event<T>>,
    /// For each interval, the position of its delete event in `events`.
    delete_positions: Vec<usize>,
    sorted: bool,
}

impl<T: GeoFloat, I> Default for SweepLineIndex<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat, I> SweepLineIndex<T, I> {
    pub fn new() -> Self {
        SweepLineIndex {
            intervals: vec![],
            events: vec![],
            delete_positions: vec![],
            sorted: true,
        }
    }

    pub fn add(&mut self, interval: Interval<T>, item: I) {
        let key = self.intervals.len();
        self.events.push(Event {
            x: interval.min(),
            ty: EventType::Insert,
            interval: key,
        });
        self.events.push(Event {
            x: interval.max(),
            ty: EventType::Delete,
            interval: key,
        });
        self.intervals.push((interval, item));
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    fn build(&mut self) {
        if self.sorted {
            return;
        }
        self.events.sort();
        self.delete_positions = vec![0; self.intervals.len()];
        for (pos, event) in self.events.iter().enumerate() {
            if event.ty == EventType::Delete {
                self.delete_positions[event.interval] = pos;
            }
        }
        self.sorted = true;
    }

    /// Calls `action` once for every unordered pair of distinct intervals
    /// that overlap (inclusively). Returns the number of pairs reported.
    pub fn compute_overlaps<F: FnMut(&I, &I)>(&mut self, mut action: F) -> usize {
        self.build();
        let mut overlaps = 0;
        for (pos, event) in self.events.iter().enumerate() {
            if event.ty != EventType::Insert {
                continue;
            }
            let end = self.delete_positions[event.interval];
            let item = &self.intervals[event.interval].1;
            for other in &self.events[pos + 1..end] {
                if other.ty == EventType::Insert {
                    action(item, &self.intervals[other.interval].1);
                    overlaps += 1;
                }
            }
        }
        trace!("sweep-line reported {overlaps} overlaps");
        overlaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_pairs(intervals: &[(f64, f64)]) -> Vec<(usize, usize)> {
        let mut index = SweepLineIndex::new();
        for (i, &(a, b)) in intervals.iter().enumerate() {
            index.add(Interval::new(a, b), i);
        }
        let mut pairs = vec![];
        let count = index.compute_overlaps(|&a, &b| pairs.push((a.min(b), a.max(b))));
        assert_eq!(count, pairs.len());
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn reports_each_pair_once() {
        let pairs = overlapping_pairs(&[(0., 2.), (1., 3.), (2., 2.), (4., 5.), (2.5, 4.)]);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2), (1, 4), (3, 4)]);
    }

    #[test]
    fn matches_brute_force() {
        use rand::{thread_rng, Rng};
        let mut rng = thread_rng();
        let intervals: Vec<(f64, f64)> = (0..200)
            .map(|_| {
                let a: f64 = rng.gen_range(0. ..100.);
                (a, a + rng.gen_range(0. ..5.))
            })
            .collect();
        let mut expected = vec![];
        for i in 0..intervals.len() {
            for j in i + 1..intervals.len() {
                let (a, b) = (Interval::new(intervals[i].0, intervals[i].1), Interval::new(intervals[j].0, intervals[j].1));
                if a.overlaps(&b) {
                    expected.push((i, j));
                }
            }
        }
        assert_eq!(overlapping_pairs(&intervals), expected);
    }
}
