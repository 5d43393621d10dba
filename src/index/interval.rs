use geo::GeoFloat;

use super::Bounds;
use crate::utils::constant;

/// A closed interval `[min, max]` on the real line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval<T: GeoFloat> {
    min: T,
    max: T,
}

/// Relative widths below `2^-50` are treated as zero, since their
/// end-points are indistinguishable at double precision.
const MIN_BINARY_EXPONENT: i32 = -50;

impl<T: GeoFloat> Interval<T> {
    /// The interval spanned by `a` and `b`, in any order.
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            Interval { min: a, max: b }
        } else {
            Interval { min: b, max: a }
        }
    }

    #[inline]
    pub fn point(x: T) -> Self {
        Interval { min: x, max: x }
    }

    #[inline]
    pub fn min(&self) -> T {
        self.min
    }

    #[inline]
    pub fn max(&self) -> T {
        self.max
    }

    #[inline]
    pub fn width(&self) -> T {
        self.max - self.min
    }

    #[inline]
    pub fn centre(&self) -> T {
        (self.min + self.max) * constant(0.5)
    }

    pub fn expand_to_include(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Inclusive overlap test.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.overlaps_range(other.min, other.max)
    }

    #[inline]
    pub fn overlaps_range(&self, min: T, max: T) -> bool {
        !(self.min > max || self.max < min)
    }

    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    #[inline]
    pub fn contains_value(&self, x: T) -> bool {
        x >= self.min && x <= self.max
    }

    /// Whether the interval is too narrow, relative to its magnitude, to
    /// be subdivided.
    pub fn is_zero_width(&self) -> bool {
        let width = self.width();
        if width == T::zero() {
            return true;
        }
        let max_abs = self.min.max(-self.min).max(self.max.max(-self.max));
        let threshold = constant::<T>(2.).powi(MIN_BINARY_EXPONENT);
        width / max_abs < threshold
    }
}

impl<T: GeoFloat> Bounds for Interval<T> {
    type Scalar = T;

    fn is_empty(&self) -> bool {
        self.min.is_nan() || self.max.is_nan()
    }

    fn intersects(&self, other: &Self) -> bool {
        self.overlaps(other)
    }

    fn union(&self, other: &Self) -> Self {
        let mut interval = *self;
        interval.expand_to_include(other);
        interval
    }

    fn centre_x(&self) -> T {
        self.centre()
    }

    fn centre_y(&self) -> T {
        self.centre()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_overlaps() {
        let a = Interval::new(3., 1.);
        assert_eq!((a.min(), a.max()), (1., 3.));
        assert!(a.overlaps(&Interval::new(3., 4.)));
        assert!(!a.overlaps(&Interval::new(3.5, 4.)));
        assert!(a.contains(&Interval::point(2.)));
        assert_eq!(a.centre(), 2.);
    }

    #[test]
    fn zero_width() {
        assert!(Interval::point(5.).is_zero_width());
        assert!(Interval::new(1e10, 1e10 + 1e-6).is_zero_width());
        assert!(!Interval::new(1., 2.).is_zero_width());
    }
}
