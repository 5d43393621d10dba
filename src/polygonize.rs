//! Polygon assembly from noded linework.
//!
//! The input lines must be fully noded: lines may only meet at their
//! end-points. Each line becomes one edge of a planar graph. Edges with a
//! free end (dangles) and edges with the same face on both sides (cut
//! edges) are pruned, the remaining edges are traced into rings, and the
//! rings are assembled into polygons. Discarded linework is reported
//! rather than dropped.

use geo::{GeoFloat, Geometry, LineString, Polygon};
use log::debug;
use std::{cell::OnceCell, cmp::Ordering};

use crate::{events::SweepPoint, graph::PlanarGraph, index::StrTree};

mod edge_ring;
pub use edge_ring::{EdgeRing, RingKind};

mod line_graph;
use line_graph::{delete_cut_edges, delete_dangles, edge_rings, LineGraph};

/// Builds polygons from the faces formed by a set of noded lines.
///
/// Results are computed on first access and cached; adding input clears
/// the cache.
///
/// ```
/// use geo::LineString;
/// use geo_noding::Polygonizer;
///
/// let mut polygonizer = Polygonizer::new();
/// polygonizer.add_line_string(&LineString::from(vec![(0., 0.), (1., 0.), (1., 1.)]));
/// polygonizer.add_line_string(&LineString::from(vec![(1., 1.), (0., 1.), (0., 0.)]));
/// assert_eq!(polygonizer.polygons().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Polygonizer<T: GeoFloat> {
    lines: Vec<LineString<T>>,
    extract_only_polygonal: bool,
    result: OnceCell<Polygonized<T>>,
}

#[derive(Debug, Clone)]
struct Polygonized<T: GeoFloat> {
    polygons: Vec<Polygon<T>>,
    dangles: Vec<LineString<T>>,
    cut_edges: Vec<LineString<T>>,
    invalid_ring_lines: Vec<LineString<T>>,
    edge_rings: Vec<EdgeRing<T>>,
}

impl<T: GeoFloat> Default for Polygonizer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat> Polygonizer<T> {
    pub fn new() -> Self {
        Polygonizer {
            lines: vec![],
            extract_only_polygonal: false,
            result: OnceCell::new(),
        }
    }

    /// Only emit polygons that do not overlap: a shell filling a hole of
    /// an emitted polygon is itself left out, alternating inwards from
    /// the outermost shells.
    pub fn with_extract_only_polygonal(mut self, extract_only_polygonal: bool) -> Self {
        self.extract_only_polygonal = extract_only_polygonal;
        self.result.take();
        self
    }

    /// Adds the linear components of `geometry`. Points are ignored.
    pub fn add_geometry(&mut self, geometry: &Geometry<T>) {
        match geometry {
            Geometry::Point(_) | Geometry::MultiPoint(_) => {}
            Geometry::Line(line) => {
                self.add_line_string(&LineString::new(vec![line.start, line.end]));
            }
            Geometry::LineString(line) => self.add_line_string(line),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.add_line_string(line);
                }
            }
            Geometry::Polygon(polygon) => self.add_polygon(polygon),
            Geometry::MultiPolygon(polygons) => {
                for polygon in polygons {
                    self.add_polygon(polygon);
                }
            }
            Geometry::Rect(rect) => self.add_polygon(&rect.to_polygon()),
            Geometry::Triangle(triangle) => self.add_polygon(&triangle.to_polygon()),
            Geometry::GeometryCollection(collection) => {
                for geometry in collection {
                    self.add_geometry(geometry);
                }
            }
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon<T>) {
        self.add_line_string(polygon.exterior());
        for ring in polygon.interiors() {
            self.add_line_string(ring);
        }
    }

    pub fn add_line_string(&mut self, line: &LineString<T>) {
        self.result.take();
        self.lines.push(line.clone());
    }

    pub fn polygons(&self) -> &[Polygon<T>] {
        &self.result().polygons
    }

    /// Input lines with a free end.
    pub fn dangles(&self) -> &[LineString<T>] {
        &self.result().dangles
    }

    /// Input lines that bound no face.
    pub fn cut_edges(&self) -> &[LineString<T>] {
        &self.result().cut_edges
    }

    /// Rings traced from the input that are not valid polygon rings.
    pub fn invalid_ring_lines(&self) -> &[LineString<T>] {
        &self.result().invalid_ring_lines
    }

    /// Every ring traced from the input, valid or not.
    pub fn edge_rings(&self) -> &[EdgeRing<T>] {
        &self.result().edge_rings
    }

    fn result(&self) -> &Polygonized<T> {
        self.result
            .get_or_init(|| polygonize(&self.lines, self.extract_only_polygonal))
    }
}

fn polygonize<T: GeoFloat>(lines: &[LineString<T>], extract_only_polygonal: bool) -> Polygonized<T> {
    let mut graph: LineGraph<T> = PlanarGraph::new();
    for line in lines {
        graph.add_edge(line.0.clone(), line.clone());
    }
    let edge_lines = |graph: &LineGraph<T>, edges: Vec<usize>| -> Vec<LineString<T>> {
        edges.into_iter().map(|e| graph.edge(e).data.clone()).collect()
    };

    let dangles = delete_dangles(&mut graph);
    let cut_edges = delete_cut_edges(&mut graph);
    let mut rings = edge_rings(&mut graph);
    debug!(
        "polygonizing {} lines: {} dangles, {} cut edges, {} rings",
        lines.len(),
        dangles.len(),
        cut_edges.len(),
        rings.len()
    );

    let mut shells = vec![];
    let mut holes = vec![];
    let mut invalid_ring_lines = vec![];
    for (r, ring) in rings.iter().enumerate() {
        match ring.kind() {
            RingKind::Shell => shells.push(r),
            RingKind::Hole => holes.push(r),
            RingKind::Invalid => invalid_ring_lines.push(ring.ring().clone()),
        }
    }

    assign_holes_to_shells(&mut rings, &holes, &shells);
    shells.sort_by(|&a, &b| compare_envelopes(&rings[a], &rings[b]));
    if extract_only_polygonal {
        find_disjoint_shells(&graph, &mut rings, &shells);
    }
    let polygons: Vec<_> = shells
        .iter()
        .filter(|&&s| !extract_only_polygonal || rings[s].included == Some(true))
        .map(|&s| rings[s].to_polygon(&rings))
        .collect();
    debug!(
        "{} polygons from {} shells and {} holes",
        polygons.len(),
        shells.len(),
        holes.len()
    );

    Polygonized {
        polygons,
        dangles: edge_lines(&graph, dangles),
        cut_edges: edge_lines(&graph, cut_edges),
        invalid_ring_lines,
        edge_rings: rings,
    }
}

/// Assigns every hole to the smallest shell containing it. Holes outside
/// every shell stay unassigned: they bound the exterior.
fn assign_holes_to_shells<T: GeoFloat>(rings: &mut [EdgeRing<T>], holes: &[usize], shells: &[usize]) {
    let mut tree = StrTree::new();
    for &s in shells {
        tree.insert(*rings[s].envelope(), s)
            .expect("a fresh tree accepts inserts");
    }
    for &h in holes {
        let hole = &rings[h];
        let mut smallest: Option<usize> = None;
        tree.query_with(hole.envelope(), |&s| {
            let shell = &rings[s];
            if !shell.contains_ring(hole) {
                return;
            }
            if smallest.map_or(true, |best| rings[best].envelope().contains(shell.envelope())) {
                smallest = Some(s);
            }
        });
        if let Some(s) = smallest {
            rings[h].shell = Some(s);
            rings[s].holes.push(h);
        }
    }
}

fn compare_envelopes<T: GeoFloat>(a: &EdgeRing<T>, b: &EdgeRing<T>) -> Ordering {
    let key = |r: &EdgeRing<T>| {
        (
            SweepPoint::from(r.envelope().min()),
            SweepPoint::from(r.envelope().max()),
        )
    };
    key(a).cmp(&key(b))
}

/// Decides which shells to emit so that no two emitted polygons overlap.
///
/// Shells adjacent to an unassigned hole lie on the outside and are
/// included. Every other shell takes the opposite decision of the shell
/// across any of its edges, until no decision can be made.
fn find_disjoint_shells<T: GeoFloat>(graph: &LineGraph<T>, rings: &mut [EdgeRing<T>], shells: &[usize]) {
    let adjacent = |rings: &[EdgeRing<T>], r: usize| -> Vec<usize> {
        rings[r]
            .dir_edges
            .iter()
            .filter_map(|&de| graph.dir_edge(graph.dir_edge(de).sym).ring)
            .collect()
    };

    for &s in shells {
        let outer_hole = adjacent(rings, s)
            .into_iter()
            .find(|&r| rings[r].is_hole() && rings[r].shell.is_none());
        if let Some(h) = outer_hole {
            if !rings[h].processed {
                rings[s].included = Some(true);
                rings[h].processed = true;
            }
        }
    }

    loop {
        let mut pending = false;
        let mut progress = false;
        for &s in shells {
            if rings[s].included.is_some() {
                continue;
            }
            let decided = adjacent(rings, s).into_iter().find_map(|r| {
                let shell = if rings[r].is_hole() { rings[r].shell } else { Some(r) };
                shell.and_then(|shell| rings[shell].included)
            });
            match decided {
                Some(included) => {
                    rings[s].included = Some(!included);
                    progress = true;
                }
                None => pending = true,
            }
        }
        if !pending || !progress {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{init_log, valid::ConnectedInteriorTester};
    use approx::assert_relative_eq;
    use geo::{Area, MultiLineString};
    use wkt::TryFromWkt;

    fn polygonizer(wkt: &str) -> Polygonizer<f64> {
        let lines = MultiLineString::<f64>::try_from_wkt_str(wkt).unwrap();
        let mut polygonizer = Polygonizer::new();
        polygonizer.add_geometry(&Geometry::MultiLineString(lines));
        polygonizer
    }

    #[test]
    fn unit_square_from_segments() {
        init_log();
        let p = polygonizer("MULTILINESTRING((0 0,1 0),(1 0,1 1),(1 1,0 1),(0 1,0 0))");
        assert_eq!(p.polygons().len(), 1);
        let polygon = &p.polygons()[0];
        assert_eq!(polygon.exterior().0.len(), 5);
        assert!(polygon.interiors().is_empty());
        assert_relative_eq!(polygon.unsigned_area(), 1.);
        assert!(p.dangles().is_empty());
        assert!(p.cut_edges().is_empty());
        assert!(p.invalid_ring_lines().is_empty());
    }

    const SQUARE_WITH_INNER_SQUARE: &str =
        "MULTILINESTRING((0 0,1 0,1 1,0 1,0 0),(0.4 0.4,0.6 0.4,0.6 0.6,0.4 0.6,0.4 0.4))";

    #[test]
    fn inner_ring_becomes_hole() {
        init_log();
        let p = polygonizer(SQUARE_WITH_INNER_SQUARE);
        let polygons = p.polygons();
        assert_eq!(polygons.len(), 2);

        let outer = &polygons[0];
        assert_eq!(outer.interiors().len(), 1);
        let mut hole: Vec<_> = outer.interiors()[0].0.iter().map(|c| (c.x, c.y)).collect();
        hole.sort_by(|a, b| a.partial_cmp(b).unwrap());
        hole.dedup();
        assert_eq!(hole, vec![(0.4, 0.4), (0.4, 0.6), (0.6, 0.4), (0.6, 0.6)]);
        assert_relative_eq!(outer.unsigned_area(), 0.96, epsilon = 1e-12);
        assert!(ConnectedInteriorTester::new(outer).is_interiors_connected());

        assert!(polygons[1].interiors().is_empty());
        assert_relative_eq!(polygons[1].unsigned_area(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn only_polygonal_drops_filled_hole() {
        let p = polygonizer(SQUARE_WITH_INNER_SQUARE).with_extract_only_polygonal(true);
        assert_eq!(p.polygons().len(), 1);
        assert_eq!(p.polygons()[0].interiors().len(), 1);
    }

    #[test]
    fn only_polygonal_skips_cells_sharing_an_edge() {
        // Two squares sharing the edge x = 1.
        let wkt = "MULTILINESTRING((1 0,0 0,0 1,1 1),(1 1,2 1,2 0,1 0),(1 0,1 1))";
        assert_eq!(polygonizer(wkt).polygons().len(), 2);

        let p = polygonizer(wkt).with_extract_only_polygonal(true);
        assert_eq!(p.polygons().len(), 1);
        let polygon = &p.polygons()[0];
        assert_relative_eq!(polygon.unsigned_area(), 1.);
        assert!(polygon.exterior().0.iter().all(|c| c.x <= 1.));
    }

    #[test]
    fn dangles_are_reported() {
        let p = polygonizer(
            "MULTILINESTRING((0 0,1 0,1 1,0 1,0 0),(0 0,-1 -1),(-1 -1,-2 -1),(-1 -1,-1 -2))",
        );
        assert_eq!(p.polygons().len(), 1);
        assert_eq!(p.dangles().len(), 3);
        assert!(p.cut_edges().is_empty());
    }

    #[test]
    fn bridge_between_squares_is_a_cut_edge() {
        let p = polygonizer(
            "MULTILINESTRING((1 1,0 1,0 0,1 0,1 1),(2 1,3 1,3 0,2 0,2 1),(1 1,2 1))",
        );
        assert_eq!(p.polygons().len(), 2);
        assert_eq!(
            p.cut_edges(),
            &[LineString::from(vec![(1., 1.), (2., 1.)])]
        );
        assert!(p.dangles().is_empty());
    }

    #[test]
    fn self_crossing_ring_is_invalid() {
        let p = polygonizer("MULTILINESTRING((0 0,2 2,2 0,0 2,0 0))");
        assert!(p.polygons().is_empty());
        assert_eq!(p.invalid_ring_lines().len(), 2);
        assert!(p
            .edge_rings()
            .iter()
            .all(|r| r.kind() == RingKind::Invalid));
    }

    #[test]
    fn adding_input_clears_results() {
        let mut p = polygonizer("MULTILINESTRING((0 0,1 0,1 1))");
        assert!(p.polygons().is_empty());
        assert_eq!(p.dangles().len(), 1);

        p.add_geometry(&Geometry::LineString(LineString::from(vec![(1., 1.), (0., 0.)])));
        assert_eq!(p.polygons().len(), 1);
        assert!(p.dangles().is_empty());
    }

    #[test]
    fn polygon_input_is_split_into_rings() {
        let polygon = Polygon::<f64>::try_from_wkt_str(
            "POLYGON((0 0,4 0,4 4,0 4,0 0),(1 1,1 2,2 2,2 1,1 1))",
        )
        .unwrap();
        let mut p = Polygonizer::new();
        p.add_geometry(&Geometry::Polygon(polygon));
        assert_eq!(p.polygons().len(), 2);
        let areas: Vec<_> = p.polygons().iter().map(|p| p.unsigned_area()).collect();
        assert_eq!(areas, vec![15., 1.]);
    }
}
