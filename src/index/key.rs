use geo::GeoFloat;

use super::Interval;
use crate::utils::constant;

/// The canonical bintree cell of an interval.
///
/// A key is the smallest interval of power-of-two width, aligned to a
/// multiple of that width, which contains the source interval. Its
/// `level` is the base-2 logarithm of the width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T: GeoFloat> {
    point: T,
    level: i32,
    interval: Interval<T>,
}

impl<T: GeoFloat> Key<T> {
    pub fn new(source: &Interval<T>) -> Self {
        let mut level = Self::compute_level(source);
        let mut interval = Self::aligned_interval(level, source);
        while !interval.contains(source) {
            level += 1;
            interval = Self::aligned_interval(level, source);
        }
        Key {
            point: interval.min(),
            level,
            interval,
        }
    }

    /// Start of the key interval; a multiple of its width.
    #[inline]
    pub fn point(&self) -> T {
        self.point
    }

    #[inline]
    pub fn level(&self) -> i32 {
        self.level
    }

    #[inline]
    pub fn interval(&self) -> &Interval<T> {
        &self.interval
    }

    /// Smallest level whose width is at least the width of `source`.
    pub(crate) fn compute_level(source: &Interval<T>) -> i32 {
        let width = source.width();
        if width <= T::zero() {
            return 0;
        }
        width.log2().ceil().to_i32().unwrap_or(0)
    }

    fn aligned_interval(level: i32, source: &Interval<T>) -> Interval<T> {
        let size = constant::<T>(2.).powi(level);
        let start = (source.min() / size).floor() * size;
        Interval::new(start, start + size)
    }
}
