//! Snap rounding.
//!
//! Snap rounding nodes a set of segment strings so that every vertex of
//! the result lies on a fixed grid. All input vertices and all interior
//! intersection points are rounded to the centres of their grid cells
//! ("hot pixels"), and every segment that passes through a hot pixel is
//! made to pass through its centre. The result is fully noded for
//! integer grids: substrings only meet at shared end-points.

use geo::{Coord, GeoFloat};
use log::{debug, trace};
use std::collections::BTreeSet;

use crate::{
    error::Result,
    events::SweepPoint,
    noding::{CancelToken, ChainIndex, InteriorIntersectionFinderAdder, NodedSegmentString},
    precision::PrecisionModel,
    utils::remove_repeated_points,
};

mod hot_pixel;
pub use hot_pixel::HotPixel;

mod point_snapper;
pub use point_snapper::McIndexPointSnapper;

mod simple;
pub use simple::SimpleSnapRounder;

mod mc_index;
pub use mc_index::McIndexSnapRounder;

/// Rounds every vertex onto the grid and drops strings that collapse to
/// a single point.
pub(crate) fn round_strings<T: GeoFloat>(
    strings: Vec<NodedSegmentString<T>>,
    precision: &PrecisionModel<T>,
) -> Vec<NodedSegmentString<T>> {
    let count = strings.len();
    let rounded: Vec<_> = strings
        .into_iter()
        .filter_map(|string| {
            let coords = remove_repeated_points(
                string.coords().iter().map(|&c| precision.make_precise(c)),
            );
            (coords.len() > 1).then(|| NodedSegmentString::new(coords, string.context()))
        })
        .collect();
    if rounded.len() < count {
        debug!("dropped {} collapsed strings", count - rounded.len());
    }
    rounded
}

/// Upper bound on the rounds of [`snap_round_to_fixed_point`].
const MAX_ROUNDS: usize = 64;

/// Runs `round` on `strings`, then again on the substrings it produced,
/// until a round leaves every string whole. Rounding the result once
/// more then adds no nodes.
///
/// A round only ever splits strings at grid points, so this settles after
/// a few rounds in practice.
pub(crate) fn snap_round_to_fixed_point<T, F>(
    mut strings: Vec<NodedSegmentString<T>>,
    precision: &PrecisionModel<T>,
    mut round: F,
) -> Result<Vec<NodedSegmentString<T>>>
where
    T: GeoFloat,
    F: FnMut(&[NodedSegmentString<T>]) -> Result<()>,
{
    for pass in 1..=MAX_ROUNDS {
        round(&strings)?;
        let pieces = round_strings(NodedSegmentString::noded_substrings(&strings), precision);
        let unchanged = pieces.len() == strings.len()
            && pieces
                .iter()
                .zip(&strings)
                .all(|(piece, string)| piece.coords() == string.coords());
        if unchanged {
            debug!("snap rounding settled after {pass} rounds");
            return Ok(pieces);
        }
        trace!(
            "snap round {pass} split {} strings into {} pieces",
            strings.len(),
            pieces.len()
        );
        strings = pieces;
    }
    debug!("snap rounding stopped after {MAX_ROUNDS} rounds");
    Ok(strings)
}

/// Whether segment `segment` is incident to vertex `vertex` of the same
/// string. Such segments end in the vertex's pixel and are never snapped
/// to it.
#[inline]
pub(crate) fn is_incident(segment: usize, vertex: usize) -> bool {
    segment == vertex || segment + 1 == vertex
}

/// Nodes all interior intersections of `strings`, rounded onto the grid,
/// and returns the distinct intersection points.
pub(crate) fn find_interior_intersections<T: GeoFloat>(
    index: &ChainIndex<'_, T>,
    precision: &PrecisionModel<T>,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Coord<T>>> {
    let mut finder = InteriorIntersectionFinderAdder::with_precision(*precision);
    index.compute_intersections(&mut finder, cancel)?;
    let distinct: BTreeSet<SweepPoint<T>> = finder
        .interior_intersections()
        .iter()
        .map(|&pt| SweepPoint::from(pt))
        .collect();
    debug!(
        "found {} interior intersections at {} points",
        finder.interior_intersections().len(),
        distinct.len()
    );
    Ok(distinct.into_iter().map(|pt| pt.coord()).collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::noding::Noder;
    use geo::LineString;

    /// Three lines crossing near (4, 4) and (5, 5).
    pub(crate) fn star() -> Vec<LineString<f64>> {
        vec![
            LineString::from(vec![(0., 0.), (10., 10.)]),
            LineString::from(vec![(0., 10.), (10., 0.)]),
            LineString::from(vec![(0., 4.), (10., 5.)]),
        ]
    }

    pub(crate) fn star_pieces() -> Vec<LineString<f64>> {
        vec![
            LineString::from(vec![(0., 0.), (4., 4.)]),
            LineString::from(vec![(4., 4.), (5., 5.)]),
            LineString::from(vec![(5., 5.), (10., 10.)]),
            LineString::from(vec![(0., 10.), (5., 5.)]),
            LineString::from(vec![(5., 5.), (10., 0.)]),
            LineString::from(vec![(0., 4.), (4., 4.)]),
            LineString::from(vec![(4., 4.), (5., 5.)]),
            LineString::from(vec![(5., 5.), (10., 5.)]),
        ]
    }

    /// Whether any two pieces meet other than at shared end-points.
    pub(crate) fn is_fully_noded(pieces: &[LineString<f64>]) -> bool {
        use crate::intersection::LineIntersector;
        let li = LineIntersector::floating();
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                for la in a.lines() {
                    for lb in b.lines() {
                        if li.has_interior_intersection(la.start, la.end, lb.start, lb.end) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Nodes `lines` twice and checks the second pass changes nothing.
    pub(crate) fn assert_idempotent<N: Noder<f64>>(mut make: impl FnMut() -> N, lines: &[LineString<f64>]) {
        let first = make().node_line_strings(lines).unwrap();
        let second = make().node_line_strings(&first).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rounding_drops_collapsed_strings() {
        let pm = PrecisionModel::fixed(1.).unwrap();
        let strings = vec![
            NodedSegmentString::new(vec![Coord { x: 0.1, y: 0.1 }, Coord { x: 0.3, y: -0.2 }], 0),
            NodedSegmentString::new(
                vec![Coord { x: 0.1, y: 0.1 }, Coord { x: 0.4, y: 0.2 }, Coord { x: 2.6, y: 0.2 }],
                1,
            ),
        ];
        let rounded = round_strings(strings, &pm);
        assert_eq!(rounded.len(), 1);
        assert_eq!(rounded[0].context(), 1);
        assert_eq!(rounded[0].coords(), &[Coord { x: 0., y: 0. }, Coord { x: 3., y: 0. }]);
    }
}
