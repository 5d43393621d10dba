use geo::{Coord, GeoFloat};

use crate::{
    index::Envelope,
    intersection::{LineIntersector, SegmentIntersection},
    noding::NodedSegmentString,
    utils::{constant, round_half_up},
};

/// Half the side of a pixel, in scaled units.
const TOLERANCE: f64 = 0.5;

/// Half the side of the safe envelope, in scaled units. Anything that
/// intersects the pixel lies within it.
const SAFE_ENV_EXPANSION_FACTOR: f64 = 0.75;

/// The tolerance square around a point of the rounding grid.
///
/// In scaled coordinates a pixel is the unit square centred on an integer
/// point. Its left and bottom edges belong to it, its top and right edges
/// belong to its neighbours, so a point on a shared boundary is owned by
/// exactly one pixel.
///
/// ```text
///   corner[1] +------------+ corner[0]
///             |            |
///             |     pt     |
///             |            |
///   corner[2] +------------+ corner[3]
/// ```
#[derive(Debug, Clone)]
pub struct HotPixel<T: GeoFloat> {
    original: Coord<T>,
    centre: Coord<T>,
    scale: T,
    min: Coord<T>,
    max: Coord<T>,
    corners: [Coord<T>; 4],
    li: LineIntersector<T>,
}

impl<T: GeoFloat> HotPixel<T> {
    /// The pixel containing `pt` on the grid with `scale` cells per unit.
    ///
    /// # Panics
    ///
    /// If `scale` is not positive.
    pub fn new(pt: Coord<T>, scale: T) -> Self {
        assert!(scale > T::zero(), "hot pixel scale must be positive");
        let centre = Coord {
            x: round_half_up(pt.x * scale),
            y: round_half_up(pt.y * scale),
        };
        let tolerance = constant::<T>(TOLERANCE);
        let min = Coord {
            x: centre.x - tolerance,
            y: centre.y - tolerance,
        };
        let max = Coord {
            x: centre.x + tolerance,
            y: centre.y + tolerance,
        };
        HotPixel {
            original: pt,
            centre,
            scale,
            min,
            max,
            corners: [
                Coord { x: max.x, y: max.y },
                Coord { x: min.x, y: max.y },
                Coord { x: min.x, y: min.y },
                Coord { x: max.x, y: min.y },
            ],
            li: LineIntersector::floating(),
        }
    }

    /// The point the pixel was created for.
    #[inline]
    pub fn coordinate(&self) -> Coord<T> {
        self.original
    }

    /// Centre of the pixel in scaled coordinates.
    #[inline]
    pub fn scaled_centre(&self) -> Coord<T> {
        self.centre
    }

    /// An envelope, in input coordinates, that contains every segment
    /// part that can intersect the pixel.
    pub fn safe_envelope(&self) -> Envelope<T> {
        let tolerance = constant::<T>(SAFE_ENV_EXPANSION_FACTOR) / self.scale;
        Envelope::new(
            Coord {
                x: self.original.x - tolerance,
                y: self.original.y - tolerance,
            },
            Coord {
                x: self.original.x + tolerance,
                y: self.original.y + tolerance,
            },
        )
    }

    /// Whether the segment `p0 -> p1` (in input coordinates) intersects
    /// the pixel.
    ///
    /// On a non-unit grid the end-points are scaled and rounded to the
    /// nearest grid point, so segments between grid points get the same
    /// answer as on the unit grid.
    pub fn intersects(&self, p0: Coord<T>, p1: Coord<T>) -> bool {
        if self.scale == T::one() {
            return self.intersects_scaled(p0, p1);
        }
        let scale = |c: Coord<T>| Coord {
            x: round_half_up(c.x * self.scale),
            y: round_half_up(c.y * self.scale),
        };
        self.intersects_scaled(scale(p0), scale(p1))
    }

    fn intersects_scaled(&self, p0: Coord<T>, p1: Coord<T>) -> bool {
        let outside = self.max.x < p0.x.min(p1.x)
            || self.min.x > p0.x.max(p1.x)
            || self.max.y < p0.y.min(p1.y)
            || self.min.y > p0.y.max(p1.y);
        if outside {
            debug_assert!(
                !self.intersects_tolerance_square(p0, p1),
                "envelope rejection disagrees with tolerance square test"
            );
            return false;
        }
        self.intersects_tolerance_square(p0, p1)
    }

    /// Exact test against the half-open tolerance square.
    ///
    /// A proper crossing of any edge means the segment passes through the
    /// interior. Otherwise the segment can only touch the square; it is
    /// owned by this pixel if it touches both the left and the bottom
    /// edge (that is, the bottom-left corner or a whole owned edge), or if
    /// it ends at the centre.
    fn intersects_tolerance_square(&self, p0: Coord<T>, p1: Coord<T>) -> bool {
        let edge = |a: usize, b: usize| self.li.compute(p0, p1, self.corners[a], self.corners[b]);
        let is_proper = |isect: &Option<SegmentIntersection<T>>| {
            isect.as_ref().map_or(false, SegmentIntersection::is_proper)
        };

        let top = edge(0, 1);
        if is_proper(&top) {
            return true;
        }
        let left = edge(1, 2);
        if is_proper(&left) {
            return true;
        }
        let bottom = edge(2, 3);
        if is_proper(&bottom) {
            return true;
        }
        let right = edge(3, 0);
        if is_proper(&right) {
            return true;
        }
        if left.is_some() && bottom.is_some() {
            return true;
        }
        p0 == self.centre || p1 == self.centre
    }

    /// Adds a node at this pixel's point to segment `segment_index` of
    /// `string` if the segment intersects the pixel.
    pub fn add_snapped_node(&self, string: &NodedSegmentString<T>, segment_index: usize) -> bool {
        let (p0, p1) = string.segment(segment_index);
        if self.intersects(p0, p1) {
            string.add_intersection(self.original, segment_index);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    /// The pixels of a 2x2 block sharing the corner (0.5, 0.5).
    fn block() -> [(&'static str, HotPixel<f64>); 4] {
        [
            ("sw", HotPixel::new(coord! { x: 0., y: 0. }, 1.)),
            ("se", HotPixel::new(coord! { x: 1., y: 0. }, 1.)),
            ("nw", HotPixel::new(coord! { x: 0., y: 1. }, 1.)),
            ("ne", HotPixel::new(coord! { x: 1., y: 1. }, 1.)),
        ]
    }

    fn owners(p0: Coord<f64>, p1: Coord<f64>) -> Vec<&'static str> {
        block()
            .into_iter()
            .filter(|(_, pixel)| pixel.intersects(p0, p1))
            .map(|(name, _)| name)
            .collect()
    }

    #[test]
    fn segments_ending_at_the_shared_corner() {
        let corner = coord! { x: 0.5, y: 0.5 };
        // Each segment comes in through the interior of one pixel. Only
        // the north-east pixel owns the corner itself.
        assert_eq!(owners(coord! { x: 3., y: 2. }, corner), vec!["ne"]);
        assert_eq!(owners(coord! { x: 2., y: -3. }, corner), vec!["se", "ne"]);
        assert_eq!(owners(coord! { x: -3., y: 2. }, corner), vec!["nw", "ne"]);
        assert_eq!(owners(coord! { x: -3., y: -2. }, corner), vec!["sw", "ne"]);
    }

    #[test]
    fn boundary_rays_belong_to_left_and_bottom_edges() {
        let corner = coord! { x: 0.5, y: 0.5 };
        assert_eq!(owners(corner, coord! { x: 3., y: 0.5 }), vec!["ne"]);
        assert_eq!(owners(corner, coord! { x: 0.5, y: 3. }), vec!["ne"]);
        assert_eq!(owners(corner, coord! { x: -3., y: 0.5 }), vec!["nw", "ne"]);
        assert_eq!(owners(corner, coord! { x: 0.5, y: -3. }), vec!["se", "ne"]);
    }

    #[test]
    fn shared_corner_has_one_owner() {
        let corner = coord! { x: 0.5, y: 0.5 };
        assert_eq!(owners(corner, corner), vec!["ne"]);
        assert_eq!(HotPixel::new(corner, 1.).scaled_centre(), coord! { x: 1., y: 1. });
    }

    #[test]
    fn top_and_right_edges_belong_to_neighbours() {
        // Ends on the top edge of the south-west pixel, coming from above.
        assert_eq!(owners(coord! { x: 0., y: 3. }, coord! { x: 0., y: 0.5 }), vec!["nw"]);
        // Ends on its right edge, coming from the east.
        assert_eq!(owners(coord! { x: 3., y: 0. }, coord! { x: 0.5, y: 0. }), vec!["se"]);
    }

    #[test]
    fn diagonals_between_centres() {
        let (sw, se, nw, ne) = (
            coord! { x: 0., y: 0. },
            coord! { x: 1., y: 0. },
            coord! { x: 0., y: 1. },
            coord! { x: 1., y: 1. },
        );
        assert_eq!(owners(sw, ne), vec!["sw", "ne"]);
        assert_eq!(owners(nw, se), vec!["se", "nw", "ne"]);
    }

    #[test]
    fn scaled_pixel() {
        let pixel = HotPixel::new(coord! { x: 1.04, y: 2.96 }, 10.);
        assert_eq!(pixel.scaled_centre(), coord! { x: 10., y: 30. });
        assert!(pixel.intersects(coord! { x: 0.9, y: 2.9 }, coord! { x: 1.1, y: 3.1 }));
        assert!(!pixel.intersects(coord! { x: 0.9, y: 3.1 }, coord! { x: 1.1, y: 3.2 }));
        let safe = pixel.safe_envelope();
        assert!(safe.intersects_coord(coord! { x: 1.1, y: 3.0 }));
        assert!(!safe.intersects_coord(coord! { x: 1.2, y: 3.0 }));
    }

    #[test]
    fn fine_grid_agrees_with_unit_grid() {
        let unit = HotPixel::new(coord! { x: 8., y: 0. }, 1.);
        assert!(!unit.intersects(coord! { x: 7., y: 0. }, coord! { x: 8., y: 1. }));
        // 0.07 * 100 is not exactly 7.
        let fine = HotPixel::new(coord! { x: 0.08, y: 0. }, 100.);
        assert_eq!(fine.scaled_centre(), coord! { x: 8., y: 0. });
        assert!(!fine.intersects(coord! { x: 0.07, y: 0. }, coord! { x: 0.08, y: 0.01 }));
        assert!(fine.intersects(coord! { x: 0.07, y: 0. }, coord! { x: 0.09, y: 0. }));
    }

    #[test]
    fn snapped_node_uses_the_pixel_point() {
        let string = NodedSegmentString::new(vec![coord! { x: 0., y: 0.2 }, coord! { x: 4., y: 0.2 }], 0);
        let pixel = HotPixel::new(coord! { x: 2., y: 0. }, 1.);
        assert!(pixel.add_snapped_node(&string, 0));
        assert_eq!(string.nodes()[0].coord(), coord! { x: 2., y: 0. });
        assert!(!HotPixel::new(coord! { x: 2., y: 1. }, 1.).add_snapped_node(&string, 0));
    }

    #[test]
    #[should_panic]
    fn non_positive_scale_panics() {
        let _ = HotPixel::new(coord! { x: 0., y: 0. }, 0.);
    }
}
