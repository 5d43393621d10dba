use geo::{Coord, GeoFloat, LineString};
use itertools::Itertools;
use std::{cell::RefCell, collections::BTreeSet};

use super::SegmentNode;
use crate::intersection::SegmentIntersection;

/// A coordinate sequence that accumulates nodes and can be split at them.
///
/// Nodes are added through a shared reference: noding visits segment
/// pairs of many strings at once, and each visit may record a node on
/// both strings. The node list is kept in a [`RefCell`]; no borrow of it
/// is held across calls.
///
/// `context` is an opaque tag, typically an index into the caller's
/// inputs, which is carried over to every substring.
#[derive(Debug, Clone)]
pub struct NodedSegmentString<T: GeoFloat> {
    coords: Vec<Coord<T>>,
    context: usize,
    nodes: RefCell<BTreeSet<SegmentNode<T>>>,
}

impl<T: GeoFloat> NodedSegmentString<T> {
    pub fn new(coords: Vec<Coord<T>>, context: usize) -> Self {
        NodedSegmentString {
            coords,
            context,
            nodes: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn from_line_string(line: &LineString<T>, context: usize) -> Self {
        Self::new(line.0.clone(), context)
    }

    #[inline]
    pub fn coords(&self) -> &[Coord<T>] {
        &self.coords
    }

    #[inline]
    pub fn coord(&self, index: usize) -> Coord<T> {
        self.coords[index]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    pub fn context(&self) -> usize {
        self.context
    }

    pub fn segment_count(&self) -> usize {
        self.coords.len().saturating_sub(1)
    }

    #[inline]
    pub fn segment(&self, index: usize) -> (Coord<T>, Coord<T>) {
        (self.coords[index], self.coords[index + 1])
    }

    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords.first() == self.coords.last()
    }

    pub fn to_line_string(&self) -> LineString<T> {
        LineString::new(self.coords.clone())
    }

    /// Records a node at `pt` on segment `segment_index`.
    ///
    /// A point equal to the segment's end vertex is recorded against the
    /// next segment, so that each vertex has a single representation.
    pub fn add_intersection(&self, pt: Coord<T>, segment_index: usize) {
        let mut index = segment_index;
        if self.coords.get(index + 1) == Some(&pt) {
            index += 1;
        }
        self.nodes
            .borrow_mut()
            .insert(SegmentNode::new(&self.coords, pt, index));
    }

    /// Records every point of `isect` on segment `segment_index`.
    pub fn add_intersections(&self, isect: &SegmentIntersection<T>, segment_index: usize) {
        for pt in isect.points() {
            self.add_intersection(pt, segment_index);
        }
    }

    /// Number of recorded nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Recorded nodes in order along the string.
    pub fn nodes(&self) -> Vec<SegmentNode<T>> {
        self.nodes.borrow().iter().copied().collect()
    }

    /// Whether a node was recorded at `pt`.
    pub fn has_node_at(&self, pt: Coord<T>) -> bool {
        self.nodes.borrow().iter().any(|n| n.coord() == pt)
    }

    /// Splits the string at its nodes, its end-points and at collapsed
    /// vertices. The substrings carry this string's context and no nodes.
    pub fn split(&self) -> Vec<Self> {
        if self.coords.len() < 2 {
            return vec![];
        }
        let mut nodes = self.nodes.borrow().clone();
        let last = self.coords.len() - 1;
        nodes.insert(SegmentNode::new(&self.coords, self.coords[0], 0));
        nodes.insert(SegmentNode::new(&self.coords, self.coords[last], last));
        for index in self.collapsed_vertices(&nodes) {
            nodes.insert(SegmentNode::new(&self.coords, self.coords[index], index));
        }

        nodes
            .iter()
            .tuple_windows()
            .map(|(n0, n1)| Self::new(self.split_coords(n0, n1), self.context))
            .collect()
    }

    /// Vertices at which the string folds back onto itself (`A-B-A`),
    /// either between input vertices or between an input vertex and two
    /// equal nodes. These must become nodes so that no substring
    /// collapses to a point.
    fn collapsed_vertices(&self, nodes: &BTreeSet<SegmentNode<T>>) -> Vec<usize> {
        let from_vertices = self
            .coords
            .iter()
            .tuple_windows()
            .enumerate()
            .filter(|(_, (a, _, c))| a == c)
            .map(|(i, _)| i + 1);

        let from_nodes = nodes.iter().tuple_windows().filter_map(|(n0, n1)| {
            if n0.coord() != n1.coord() {
                return None;
            }
            let between = (n1.segment_index() - n0.segment_index())
                .checked_sub(usize::from(!n1.is_interior()));
            (between == Some(1)).then(|| n0.segment_index() + 1)
        });

        from_vertices.chain(from_nodes).collect()
    }

    fn split_coords(&self, n0: &SegmentNode<T>, n1: &SegmentNode<T>) -> Vec<Coord<T>> {
        if n0.segment_index() == n1.segment_index() {
            return vec![n0.coord(), n1.coord()];
        }
        let mut coords = Vec::with_capacity(n1.segment_index() - n0.segment_index() + 2);
        coords.push(n0.coord());
        coords.extend_from_slice(&self.coords[n0.segment_index() + 1..=n1.segment_index()]);
        if n1.is_interior() {
            coords.push(n1.coord());
        }
        coords
    }

    /// Splits every string in `strings`.
    pub fn noded_substrings(strings: &[Self]) -> Vec<Self> {
        strings.iter().flat_map(Self::split).collect()
    }
}
