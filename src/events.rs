use geo::{Coord, GeoFloat};
use std::cmp::Ordering;

/// An event of a one-dimensional sweep over interval end-points.
#[derive(Debug, Clone)]
pub(crate) struct Event<T: GeoFloat> {
    pub(crate) x: T,
    pub(crate) ty: EventType,
    pub(crate) interval: usize,
}

/// Equality check for sorting. Note that it ignores `interval`.
impl<T: GeoFloat> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.ty == other.ty
    }
}

/// Assert total equality; event positions are required to be finite.
impl<T: GeoFloat> Eq for Event<T> {}

impl<T: GeoFloat> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering by position and then by type. Note that it ignores
/// `interval`, so a stable sort keeps insertion order among ties.
impl<T: GeoFloat> Ord for Event<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .partial_cmp(&other.x)
            .expect("sweep events require finite positions")
            .then_with(|| self.ty.cmp(&other.ty))
    }
}

/// Event type to associate with event.
///
/// The ordering of the variants is important for the algorithm. Inserts
/// at a position must be processed before deletes at the same position,
/// so that intervals which merely touch are reported as overlapping.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EventType {
    Insert,
    Delete,
}

/// Wraps a [`Coord`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`. Implements `PartialOrd`,
/// `Ord` and `Eq` even though `Coord` doesn't implement these.
/// This is necessary to key ordered collections by position, such as
/// the node map of a planar graph.
///
/// Note that the trait impls exist even when `T` is not `Eq` or
/// `Ord`. We must ensure that any sweep point only contains values
/// that can be consistently ordered.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SweepPoint<T: GeoFloat>(Coord<T>);

impl<T: GeoFloat> SweepPoint<T> {
    #[inline]
    pub fn coord(&self) -> Coord<T> {
        self.0
    }
}

/// Implememnt lexicographic ordering by `x` and then by `y`
/// coordinate.
impl<T: GeoFloat> PartialOrd for SweepPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail.
impl<T: GeoFloat> Ord for SweepPoint<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .expect("sweep points are finite and totally ordered")
    }
}

/// We derive `Eq` manually to not require `T: Eq`.
impl<T: GeoFloat> Eq for SweepPoint<T> {}

/// Create from `Coord` while checking the components are finite.
impl<T: GeoFloat> From<Coord<T>> for SweepPoint<T> {
    fn from(pt: Coord<T>) -> Self {
        assert!(
            pt.x.is_finite(),
            "sweep point requires a finite x-coordinate"
        );
        assert!(
            pt.y.is_finite(),
            "sweep point requires a finite y-coordinate"
        );
        SweepPoint(pt)
    }
}
