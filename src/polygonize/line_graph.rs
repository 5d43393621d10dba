//! Pruning and ring tracing on the polygonizer's graph.
//!
//! Removed edges are marked rather than deleted, so handles stay stable.

use geo::{GeoFloat, LineString};
use log::trace;
use smallvec::SmallVec;

use super::EdgeRing;
use crate::graph::{DirEdgeId, EdgeId, NodeId, PlanarGraph};

/// One edge per input line, carrying that line.
pub(crate) type LineGraph<T> = PlanarGraph<T, LineString<T>>;

/// Marks edges with a free end, repeatedly, until every remaining node
/// has degree at least two. Returns the removed edges.
pub(crate) fn delete_dangles<T: GeoFloat>(graph: &mut LineGraph<T>) -> Vec<EdgeId> {
    let mut stack: Vec<NodeId> = (0..graph.node_count())
        .filter(|&node| graph.degree(node) == 1)
        .collect();
    let mut dangles = vec![];
    while let Some(node) = stack.pop() {
        let out = graph.node(node).out_edges.clone();
        for de in out {
            if graph.dir_edge(de).marked {
                continue;
            }
            graph.mark_edge(de);
            let (edge, to) = (graph.dir_edge(de).edge, graph.dir_edge(de).to);
            dangles.push(edge);
            if graph.degree(to) == 1 {
                stack.push(to);
            }
        }
    }
    dangles
}

/// Marks edges whose two sides lie on the same ring: they bound no face.
/// Returns the removed edges.
pub(crate) fn delete_cut_edges<T: GeoFloat>(graph: &mut LineGraph<T>) -> Vec<EdgeId> {
    graph.compute_next_cw_edges();
    label_edge_rings(graph);
    let mut cut_edges = vec![];
    for de in 0..graph.dir_edge_count() {
        let d = graph.dir_edge(de);
        if d.marked {
            continue;
        }
        let (edge, label) = (d.edge, d.label);
        if graph.dir_edge(d.sym).label == label {
            graph.mark_edge(de);
            cut_edges.push(edge);
        }
    }
    cut_edges
}

/// Traces the minimal rings of the unmarked edges.
///
/// Rings following `next` links may pass through a node more than once;
/// such maximal rings are first split at those nodes so that every ring
/// returned is simple.
pub(crate) fn edge_rings<T: GeoFloat>(graph: &mut LineGraph<T>) -> Vec<EdgeRing<T>> {
    graph.compute_next_cw_edges();
    let maximal = label_edge_rings(graph);
    for start in maximal {
        convert_to_minimal_rings(graph, start);
    }

    let mut rings = vec![];
    for start in 0..graph.dir_edge_count() {
        let de = graph.dir_edge(start);
        if de.marked || de.ring.is_some() {
            continue;
        }
        let dir_edges = graph.dir_edge_ring(start);
        for &de in &dir_edges {
            graph.dir_edge_mut(de).ring = Some(rings.len());
        }
        rings.push(EdgeRing::new(graph, dir_edges));
    }
    rings
}

/// Labels the unmarked directed edges by the ring of `next` links they
/// lie on, and returns one edge of every ring.
fn label_edge_rings<T: GeoFloat>(graph: &mut LineGraph<T>) -> Vec<DirEdgeId> {
    for de in 0..graph.dir_edge_count() {
        graph.dir_edge_mut(de).label = None;
    }
    let mut starts = vec![];
    for start in 0..graph.dir_edge_count() {
        let de = graph.dir_edge(start);
        if de.marked || de.label.is_some() {
            continue;
        }
        for de in graph.dir_edge_ring(start) {
            graph.dir_edge_mut(de).label = Some(starts.len());
        }
        starts.push(start);
    }
    trace!("labelled {} edge rings", starts.len());
    starts
}

fn convert_to_minimal_rings<T: GeoFloat>(graph: &mut LineGraph<T>, start: DirEdgeId) {
    let view: &LineGraph<T> = graph;
    let label = view.dir_edge(start).label;
    let degree = |node: NodeId| {
        view.node(node)
            .out_edges
            .iter()
            .filter(|&&de| view.dir_edge(de).label == label)
            .count()
    };
    let crossings: Vec<NodeId> = view
        .dir_edge_ring(start)
        .into_iter()
        .map(|de| view.dir_edge(de).from)
        .filter(|&node| degree(node) > 1)
        .collect();
    for node in crossings {
        link_ring_at_node(graph, node, label);
    }
}

/// Relinks the edges of one ring at `node` so that each incoming edge
/// continues on the nearest outgoing edge of the ring clockwise from it.
fn link_ring_at_node<T: GeoFloat>(graph: &mut LineGraph<T>, node: NodeId, label: Option<usize>) {
    let out: SmallVec<[DirEdgeId; 4]> = graph.node(node).out_edges.clone();
    let mut first_out = None;
    let mut prev_in = None;
    for &de in out.iter().rev() {
        let sym = graph.dir_edge(de).sym;
        let out_de = (graph.dir_edge(de).label == label).then_some(de);
        let in_de = (graph.dir_edge(sym).label == label).then_some(sym);
        if in_de.is_some() {
            prev_in = in_de;
        }
        if let Some(out_de) = out_de {
            if let Some(prev) = prev_in.take() {
                graph.dir_edge_mut(prev).next = Some(out_de);
            }
            first_out.get_or_insert(out_de);
        }
    }
    if let Some(prev) = prev_in {
        let first = first_out.expect("a ring entering a node also leaves it");
        graph.dir_edge_mut(prev).next = Some(first);
    }
}
