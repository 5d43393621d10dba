use geo::{winding_order::Winding, Coord, GeoFloat, LineString, MultiPolygon, Polygon};
use log::{debug, trace};

use crate::{
    graph::{EdgeId, PlanarGraph},
    index::DEFAULT_NODE_CAPACITY,
    noding::{ChainIndex, IntersectionAdder, NodedSegmentString},
};

/// Checks that the interior of a polygon is connected.
///
/// Holes may touch each other and the shell at single points, but a chain
/// of touching holes running from one side of the shell to another splits
/// the interior in two. The rings are noded, shells oriented clockwise and
/// holes counter-clockwise so the interior lies right of every edge, and
/// the faces on the right of the edges are traced through a planar graph.
/// Starting from an edge of each shell, one face per shell is visited; a
/// bounded interior face left unvisited is a separate piece of interior.
#[derive(Debug, Clone)]
pub struct ConnectedInteriorTester<T: GeoFloat> {
    disconnected: Option<Coord<T>>,
}

impl<T: GeoFloat> ConnectedInteriorTester<T> {
    pub fn new(polygon: &Polygon<T>) -> Self {
        Self::from_polygons(std::slice::from_ref(polygon))
    }

    pub fn from_multi_polygon(polygons: &MultiPolygon<T>) -> Self {
        Self::from_polygons(&polygons.0)
    }

    fn from_polygons(polygons: &[Polygon<T>]) -> Self {
        let mut rings = vec![];
        let mut is_shell = vec![];
        let mut add_ring = |mut ring: LineString<T>, shell: bool| {
            if shell {
                ring.make_cw_winding();
            } else {
                ring.make_ccw_winding();
            }
            rings.push(NodedSegmentString::new(ring.0, is_shell.len()));
            is_shell.push(shell);
        };
        for polygon in polygons {
            add_ring(polygon.exterior().clone(), true);
            for hole in polygon.interiors() {
                add_ring(hole.clone(), false);
            }
        }

        let disconnected = find_disconnected_interior(&rings, &is_shell);
        debug!(
            "interior of {} rings is {}",
            rings.len(),
            if disconnected.is_some() { "disconnected" } else { "connected" }
        );
        ConnectedInteriorTester { disconnected }
    }

    pub fn is_interiors_connected(&self) -> bool {
        self.disconnected.is_none()
    }

    /// A node on the boundary of a piece of interior that cannot be
    /// reached from any shell.
    pub fn coordinate(&self) -> Option<Coord<T>> {
        self.disconnected
    }
}

fn find_disconnected_interior<T: GeoFloat>(
    rings: &[NodedSegmentString<T>],
    is_shell: &[bool],
) -> Option<Coord<T>> {
    let mut adder = IntersectionAdder::floating();
    ChainIndex::new(rings, DEFAULT_NODE_CAPACITY).compute_all_intersections(&mut adder);
    trace!("rings touch at {} points", adder.num_intersections());

    let mut graph = PlanarGraph::new();
    let mut shell_edges: Vec<EdgeId> = vec![];
    for ring in rings {
        let mut first_edge = None;
        for piece in ring.split() {
            let edge = graph.add_edge(piece.coords().to_vec(), ring.context());
            first_edge = first_edge.or(edge);
        }
        if is_shell[ring.context()] {
            shell_edges.extend(first_edge);
        }
    }
    graph.compute_next_cw_edges();

    // Forward edges have the interior on their right.
    for edge in shell_edges {
        let start = graph.edge(edge).dir_edges[0];
        for de in graph.dir_edge_ring(start) {
            graph.dir_edge_mut(de).visited = true;
        }
    }

    let mut ring_count = 0;
    for start in 0..graph.dir_edge_count() {
        let de = graph.dir_edge(start);
        if !de.forward || de.ring.is_some() {
            continue;
        }
        let face = graph.dir_edge_ring(start);
        for &de in &face {
            graph.dir_edge_mut(de).ring = Some(ring_count);
        }
        ring_count += 1;

        // Counter-clockwise faces are bounded by holes.
        if LineString::new(graph.ring_coords(&face)).is_ccw() {
            continue;
        }
        if let Some(&de) = face.iter().find(|&&de| !graph.dir_edge(de).visited) {
            return Some(graph.node(graph.dir_edge(de).from).coord);
        }
    }
    trace!("traced {ring_count} interior face rings");
    None
}
