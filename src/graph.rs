//! A planar graph of noded edges, used to trace the faces of a
//! linework arrangement.
//!
//! Nodes are keyed by position. Every edge contributes two directed
//! edges, one per direction, and each node keeps its outgoing directed
//! edges sorted counter-clockwise by angle. Faces are traced through the
//! `next` links computed by [`PlanarGraph::compute_next_cw_edges`].

use geo::{Coord, GeoFloat};
use log::trace;
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::{
    events::SweepPoint,
    utils::{compare_direction, remove_repeated_points, Quadrant},
};

pub(crate) type NodeId = usize;
pub(crate) type EdgeId = usize;
pub(crate) type DirEdgeId = usize;

#[derive(Debug, Clone)]
pub(crate) struct GraphNode<T: GeoFloat> {
    pub(crate) coord: Coord<T>,
    /// Outgoing directed edges in counter-clockwise order.
    pub(crate) out_edges: SmallVec<[DirEdgeId; 4]>,
}

#[derive(Debug, Clone)]
pub(crate) struct GraphEdge<T: GeoFloat, E> {
    pub(crate) coords: Vec<Coord<T>>,
    pub(crate) data: E,
    pub(crate) dir_edges: [DirEdgeId; 2],
}

#[derive(Debug, Clone)]
pub(crate) struct DirectedEdge<T: GeoFloat> {
    pub(crate) edge: EdgeId,
    pub(crate) from: NodeId,
    pub(crate) to: NodeId,
    pub(crate) sym: DirEdgeId,
    /// Whether this runs in the direction of the edge's coordinates.
    pub(crate) forward: bool,
    quadrant: Quadrant,
    origin: Coord<T>,
    towards: Coord<T>,
    pub(crate) next: Option<DirEdgeId>,
    pub(crate) label: Option<usize>,
    pub(crate) marked: bool,
    pub(crate) visited: bool,
    pub(crate) ring: Option<usize>,
}

impl<T: GeoFloat> DirectedEdge<T> {
    fn direction(&self) -> (Quadrant, Coord<T>, Coord<T>) {
        (self.quadrant, self.origin, self.towards)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlanarGraph<T: GeoFloat, E> {
    nodes: Vec<GraphNode<T>>,
    node_map: BTreeMap<SweepPoint<T>, NodeId>,
    edges: Vec<GraphEdge<T, E>>,
    dir_edges: Vec<DirectedEdge<T>>,
}

impl<T: GeoFloat, E> Default for PlanarGraph<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat, E> PlanarGraph<T, E> {
    pub(crate) fn new() -> Self {
        PlanarGraph {
            nodes: vec![],
            node_map: BTreeMap::new(),
            edges: vec![],
            dir_edges: vec![],
        }
    }

    fn node_at(&mut self, coord: Coord<T>) -> NodeId {
        let nodes = &mut self.nodes;
        *self
            .node_map
            .entry(SweepPoint::from(coord))
            .or_insert_with(|| {
                nodes.push(GraphNode {
                    coord,
                    out_edges: SmallVec::new(),
                });
                nodes.len() - 1
            })
    }

    /// Adds an edge along `coords`. Repeated points are removed first;
    /// edges that collapse to a point are not added.
    pub(crate) fn add_edge(&mut self, coords: Vec<Coord<T>>, data: E) -> Option<EdgeId> {
        let coords = remove_repeated_points(coords);
        if coords.len() < 2 {
            return None;
        }
        let n = coords.len();
        let from = self.node_at(coords[0]);
        let to = self.node_at(coords[n - 1]);

        let edge = self.edges.len();
        let fwd = self.dir_edges.len();
        let bwd = fwd + 1;
        let directed = |from, to, sym, forward, origin: Coord<T>, towards: Coord<T>| DirectedEdge {
            edge,
            from,
            to,
            sym,
            forward,
            quadrant: Quadrant::of_segment(origin, towards)
                .expect("repeated points were removed"),
            origin,
            towards,
            next: None,
            label: None,
            marked: false,
            visited: false,
            ring: None,
        };
        self.dir_edges
            .push(directed(from, to, bwd, true, coords[0], coords[1]));
        self.dir_edges
            .push(directed(to, from, fwd, false, coords[n - 1], coords[n - 2]));
        self.edges.push(GraphEdge {
            coords,
            data,
            dir_edges: [fwd, bwd],
        });

        self.insert_out_edge(from, fwd);
        self.insert_out_edge(to, bwd);
        Some(edge)
    }

    fn insert_out_edge(&mut self, node: NodeId, de: DirEdgeId) {
        let dir_edges = &self.dir_edges;
        let out = &mut self.nodes[node].out_edges;
        let pos = out.partition_point(|&other| {
            compare_direction(dir_edges[other].direction(), dir_edges[de].direction()).is_le()
        });
        out.insert(pos, de);
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &GraphNode<T> {
        &self.nodes[id]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn edge(&self, id: EdgeId) -> &GraphEdge<T, E> {
        &self.edges[id]
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub(crate) fn dir_edge(&self, id: DirEdgeId) -> &DirectedEdge<T> {
        &self.dir_edges[id]
    }

    #[inline]
    pub(crate) fn dir_edge_mut(&mut self, id: DirEdgeId) -> &mut DirectedEdge<T> {
        &mut self.dir_edges[id]
    }

    pub(crate) fn dir_edge_count(&self) -> usize {
        self.dir_edges.len()
    }

    /// Data of the edge underlying a directed edge.
    pub(crate) fn data(&self, de: DirEdgeId) -> &E {
        &self.edges[self.dir_edges[de].edge].data
    }

    /// Marks both directions of the edge under `de`.
    pub(crate) fn mark_edge(&mut self, de: DirEdgeId) {
        let sym = self.dir_edges[de].sym;
        self.dir_edges[de].marked = true;
        self.dir_edges[sym].marked = true;
    }

    /// Number of unmarked outgoing edges of `node`.
    pub(crate) fn degree(&self, node: NodeId) -> usize {
        self.nodes[node]
            .out_edges
            .iter()
            .filter(|&&de| !self.dir_edges[de].marked)
            .count()
    }

    /// Links every unmarked incoming edge to the unmarked outgoing edge
    /// that follows its reverse counter-clockwise around the node.
    ///
    /// Following `next` then takes the sharpest right turn at every node,
    /// so each cycle traces one face with that face on its right: bounded
    /// faces are traced clockwise, and the outer boundary of each
    /// connected component counter-clockwise.
    pub(crate) fn compute_next_cw_edges(&mut self) {
        for node in 0..self.nodes.len() {
            let out: SmallVec<[DirEdgeId; 4]> = self.nodes[node]
                .out_edges
                .iter()
                .copied()
                .filter(|&de| !self.dir_edges[de].marked)
                .collect();
            let Some(&first) = out.first() else {
                continue;
            };
            for (i, &de) in out.iter().enumerate() {
                let following = out.get(i + 1).copied().unwrap_or(first);
                let incoming = self.dir_edges[de].sym;
                self.dir_edges[incoming].next = Some(following);
            }
        }
        trace!(
            "linked {} directed edges around {} nodes",
            self.dir_edges.len(),
            self.nodes.len()
        );
    }

    /// The cycle of directed edges through `start` along `next` links.
    ///
    /// # Panics
    ///
    /// If a `next` link is missing or the links do not return to `start`.
    pub(crate) fn dir_edge_ring(&self, start: DirEdgeId) -> Vec<DirEdgeId> {
        let mut ring = vec![start];
        let mut de = start;
        loop {
            de = self.dir_edges[de]
                .next
                .expect("directed edge in a face ring has a next edge");
            if de == start {
                return ring;
            }
            assert!(
                ring.len() <= self.dir_edges.len(),
                "face ring does not close"
            );
            ring.push(de);
        }
    }

    /// Coordinates of `de` in its direction.
    pub(crate) fn dir_edge_coords(&self, de: DirEdgeId) -> Vec<Coord<T>> {
        let de = &self.dir_edges[de];
        let coords = &self.edges[de.edge].coords;
        if de.forward {
            coords.clone()
        } else {
            coords.iter().rev().copied().collect()
        }
    }

    /// Closed coordinate sequence traced by a ring of directed edges.
    pub(crate) fn ring_coords(&self, ring: &[DirEdgeId]) -> Vec<Coord<T>> {
        let mut coords: Vec<Coord<T>> = vec![];
        for &de in ring {
            let edge_coords = self.dir_edge_coords(de);
            let skip = usize::from(coords.last() == edge_coords.first());
            coords.extend(edge_coords.into_iter().skip(skip));
        }
        if let Some(&first) = coords.first() {
            if coords.last() != Some(&first) {
                coords.push(first);
            }
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    /// Unit square edges plus a diagonal from (0, 0) to (1, 1).
    fn square_with_diagonal() -> PlanarGraph<f64, &'static str> {
        let mut graph = PlanarGraph::new();
        let (a, b, c, d) = (
            coord! { x: 0., y: 0. },
            coord! { x: 1., y: 0. },
            coord! { x: 1., y: 1. },
            coord! { x: 0., y: 1. },
        );
        graph.add_edge(vec![a, b], "ab");
        graph.add_edge(vec![b, c], "bc");
        graph.add_edge(vec![c, d], "cd");
        graph.add_edge(vec![d, a], "da");
        graph.add_edge(vec![a, c], "ac");
        graph
    }

    #[test]
    fn out_edges_are_sorted_counter_clockwise() {
        let graph = square_with_diagonal();
        assert_eq!(graph.node_count(), 4);
        let origin = graph.node(0);
        let names: Vec<_> = origin.out_edges.iter().map(|&de| *graph.data(de)).collect();
        // East, north-east, north.
        assert_eq!(names, vec!["ab", "ac", "da"]);
    }

    #[test]
    fn faces_have_the_face_on_the_right() {
        let mut graph = square_with_diagonal();
        graph.compute_next_cw_edges();

        // Start from the forward edge a -> b; its right side is outside.
        let outer = graph.dir_edge_ring(graph.edge(0).dir_edges[0]);
        assert_eq!(outer.len(), 4);
        let coords = graph.ring_coords(&outer);
        assert_eq!(coords.len(), 5);
        assert_eq!(coords[1], coord! { x: 1., y: 0. });

        // b -> a has the lower triangle on its right.
        let lower = graph.dir_edge_ring(graph.edge(0).dir_edges[1]);
        let coords = graph.ring_coords(&lower);
        assert_eq!(
            coords,
            vec![
                coord! { x: 1., y: 0. },
                coord! { x: 0., y: 0. },
                coord! { x: 1., y: 1. },
                coord! { x: 1., y: 0. },
            ]
        );
    }

    #[test]
    fn degenerate_edges_are_skipped() {
        let mut graph = PlanarGraph::<f64, ()>::new();
        let p = coord! { x: 2., y: 2. };
        assert_eq!(graph.add_edge(vec![p, p, p], ()), None);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn marked_edges_are_not_linked() {
        let mut graph = square_with_diagonal();
        let diagonal = graph.edge(4).dir_edges[0];
        graph.mark_edge(diagonal);
        assert_eq!(graph.degree(0), 2);
        graph.compute_next_cw_edges();
        let ring = graph.dir_edge_ring(graph.edge(0).dir_edges[1]);
        assert_eq!(ring.len(), 4);
    }
}
