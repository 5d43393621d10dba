use geo::{
    kernels::{Kernel, Orientation},
    Coord, GeoFloat, GeoNum,
};
use itertools::Itertools;
use std::cmp::Ordering;

/// Converts a small `f64` literal into `T`.
#[inline]
pub(crate) fn constant<T: GeoFloat>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Rounds half-way values towards positive infinity.
///
/// Unlike `round`, this keeps `-0.5` and `0.5` in the grid cells to their
/// right, which is the ownership rule hot pixels rely on.
#[inline]
pub(crate) fn round_half_up<T: GeoFloat>(value: T) -> T {
    (value + constant(0.5)).floor()
}

/// Drops consecutive duplicate coordinates.
pub(crate) fn remove_repeated_points<T: GeoNum>(
    coords: impl IntoIterator<Item = Coord<T>>,
) -> Vec<Coord<T>> {
    coords.into_iter().dedup().collect()
}

/// Robust orientation of `r` relative to the directed line `p -> q`.
#[inline]
pub(crate) fn orient<T: GeoNum>(p: Coord<T>, q: Coord<T>, r: Coord<T>) -> Orientation {
    <T as GeoNum>::Ker::orient2d(p, q, r)
}

/// Quadrant of a direction vector, numbered counter-clockwise from the
/// positive x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Quadrant {
    NorthEast,
    NorthWest,
    SouthWest,
    SouthEast,
}

impl Quadrant {
    /// Quadrant of the direction `p0 -> p1`, or `None` if both points are
    /// equal.
    pub fn of_segment<T: GeoFloat>(p0: Coord<T>, p1: Coord<T>) -> Option<Self> {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        if dx == T::zero() && dy == T::zero() {
            return None;
        }
        Some(match (dx >= T::zero(), dy >= T::zero()) {
            (true, true) => Quadrant::NorthEast,
            (false, true) => Quadrant::NorthWest,
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        })
    }
}

/// Compares the directions of two rays sharing an origin by their angle
/// counter-clockwise from the positive x-axis.
pub(crate) fn compare_direction<T: GeoFloat>(
    (quad_a, origin_a, towards_a): (Quadrant, Coord<T>, Coord<T>),
    (quad_b, origin_b, towards_b): (Quadrant, Coord<T>, Coord<T>),
) -> Ordering {
    debug_assert!(origin_a == origin_b, "directions must share an origin");
    quad_a.cmp(&quad_b).then_with(|| {
        match orient(origin_b, towards_b, towards_a) {
            Orientation::CounterClockwise => Ordering::Greater,
            Orientation::Clockwise => Ordering::Less,
            Orientation::Collinear => Ordering::Equal,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_up_rounding() {
        assert_eq!(round_half_up(0.5_f64), 1.);
        assert_eq!(round_half_up(-0.5_f64), 0.);
        assert_eq!(round_half_up(-1.5_f64), -1.);
        assert_eq!(round_half_up(2.49_f64), 2.);
    }

    #[test]
    fn quadrants() {
        let o = Coord { x: 0., y: 0. };
        assert_eq!(Quadrant::of_segment(o, Coord { x: 1., y: 0. }), Some(Quadrant::NorthEast));
        assert_eq!(Quadrant::of_segment(o, Coord { x: 0., y: 1. }), Some(Quadrant::NorthEast));
        assert_eq!(Quadrant::of_segment(o, Coord { x: -1., y: 0. }), Some(Quadrant::NorthWest));
        assert_eq!(Quadrant::of_segment(o, Coord { x: -1., y: -1. }), Some(Quadrant::SouthWest));
        assert_eq!(Quadrant::of_segment(o, Coord { x: 0., y: -1. }), Some(Quadrant::SouthEast));
        assert_eq!(Quadrant::of_segment(o, o), None);
    }

    #[test]
    fn direction_ordering() {
        let o = Coord { x: 0., y: 0. };
        let ray = |x: f64, y: f64| {
            let c = Coord { x, y };
            (Quadrant::of_segment(o, c).unwrap(), o, c)
        };
        let mut rays = vec![ray(0., -1.), ray(-1., 0.), ray(1., 1.), ray(1., 0.2), ray(-1., -3.)];
        rays.sort_by(|a, b| compare_direction(*a, *b));
        let xs: Vec<_> = rays.iter().map(|r| (r.2.x, r.2.y)).collect();
        assert_eq!(xs, vec![(1., 0.2), (1., 1.), (-1., 0.), (-1., -3.), (0., -1.)]);
    }
}
