use geo::{Coord, GeoFloat, Rect};

use super::Bounds;
use crate::utils::constant;

/// An axis-aligned rectangle, possibly empty.
///
/// The empty ("null") envelope is represented by inverted infinite
/// bounds, so that expanding it by a point yields that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope<T: GeoFloat> {
    min: Coord<T>,
    max: Coord<T>,
}

impl<T: GeoFloat> Default for Envelope<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: GeoFloat> Envelope<T> {
    pub fn null() -> Self {
        Envelope {
            min: Coord {
                x: T::infinity(),
                y: T::infinity(),
            },
            max: Coord {
                x: T::neg_infinity(),
                y: T::neg_infinity(),
            },
        }
    }

    /// The envelope spanned by two corners, in any order.
    pub fn new(a: Coord<T>, b: Coord<T>) -> Self {
        Envelope {
            min: Coord {
                x: a.x.min(b.x),
                y: a.y.min(b.y),
            },
            max: Coord {
                x: a.x.max(b.x),
                y: a.y.max(b.y),
            },
        }
    }

    pub fn from_coords(coords: impl IntoIterator<Item = Coord<T>>) -> Self {
        let mut env = Self::null();
        coords.into_iter().for_each(|c| env.expand_to_include(c));
        env
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.max.x < self.min.x
    }

    #[inline]
    pub fn min(&self) -> Coord<T> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Coord<T> {
        self.max
    }

    pub fn width(&self) -> T {
        if self.is_null() {
            T::zero()
        } else {
            self.max.x - self.min.x
        }
    }

    pub fn height(&self) -> T {
        if self.is_null() {
            T::zero()
        } else {
            self.max.y - self.min.y
        }
    }

    pub fn centre(&self) -> Option<Coord<T>> {
        if self.is_null() {
            return None;
        }
        let half = constant::<T>(0.5);
        Some(Coord {
            x: (self.min.x + self.max.x) * half,
            y: (self.min.y + self.max.y) * half,
        })
    }

    pub fn expand_to_include(&mut self, pt: Coord<T>) {
        self.min.x = self.min.x.min(pt.x);
        self.min.y = self.min.y.min(pt.y);
        self.max.x = self.max.x.max(pt.x);
        self.max.y = self.max.y.max(pt.y);
    }

    pub fn expand_to_include_envelope(&mut self, other: &Self) {
        if other.is_null() {
            return;
        }
        self.expand_to_include(other.min);
        self.expand_to_include(other.max);
    }

    /// Grows the envelope by `distance` on every side.
    pub fn expand_by(&mut self, distance: T) {
        if self.is_null() {
            return;
        }
        self.min.x = self.min.x - distance;
        self.min.y = self.min.y - distance;
        self.max.x = self.max.x + distance;
        self.max.y = self.max.y + distance;
    }

    /// Inclusive intersection test; the null envelope intersects nothing.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        !(other.min.x > self.max.x
            || other.max.x < self.min.x
            || other.min.y > self.max.y
            || other.max.y < self.min.y)
    }

    pub fn intersects_coord(&self, pt: Coord<T>) -> bool {
        !(pt.x > self.max.x || pt.x < self.min.x || pt.y > self.max.y || pt.y < self.min.y)
    }

    pub fn contains(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    pub fn to_rect(&self) -> Option<Rect<T>> {
        (!self.is_null()).then(|| Rect::new(self.min, self.max))
    }
}

impl<T: GeoFloat> From<Rect<T>> for Envelope<T> {
    fn from(rect: Rect<T>) -> Self {
        Envelope::new(rect.min(), rect.max())
    }
}

impl<T: GeoFloat> Bounds for Envelope<T> {
    type Scalar = T;

    fn is_empty(&self) -> bool {
        self.is_null()
    }

    fn intersects(&self, other: &Self) -> bool {
        Envelope::intersects(self, other)
    }

    fn union(&self, other: &Self) -> Self {
        let mut env = *self;
        env.expand_to_include_envelope(other);
        env
    }

    fn centre_x(&self) -> T {
        (self.min.x + self.max.x) * constant(0.5)
    }

    fn centre_y(&self) -> T {
        (self.min.y + self.max.y) * constant(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_envelope() {
        let null = Envelope::<f64>::null();
        assert!(null.is_null());
        assert!(!null.intersects(&null));
        assert_eq!(null.width(), 0.);
        assert_eq!(null.centre(), None);

        let mut env = null;
        env.expand_to_include(Coord { x: 1., y: 2. });
        assert!(!env.is_null());
        assert_eq!(env.min(), env.max());
    }

    #[test]
    fn inclusive_intersection() {
        let a = Envelope::new(Coord { x: 0., y: 0. }, Coord { x: 1., y: 1. });
        let b = Envelope::new(Coord { x: 1., y: 1. }, Coord { x: 2., y: 3. });
        let c = Envelope::new(Coord { x: 1.5, y: 0. }, Coord { x: 2., y: 0.5 });
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(b.contains(&Envelope::new(Coord { x: 1.5, y: 2. }, Coord { x: 2., y: 2. })));
        assert_eq!(Bounds::union(&a, &c).max(), Coord { x: 2., y: 1. });
    }
}
