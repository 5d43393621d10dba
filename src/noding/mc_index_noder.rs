use geo::GeoFloat;
use log::debug;

use super::{CancelToken, NodedSegmentString, Noder, SegmentIntersector};
use crate::{
    error::{Result, TopologyError},
    index::{Envelope, Interval, StrTree, SweepLineIndex, DEFAULT_NODE_CAPACITY},
    monotone::{monotone_chains, MonotoneChain, MonotoneChainEdge},
};

/// How candidate chain pairs are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainIndexKind {
    /// Chains are packed into an STR-tree by envelope.
    #[default]
    StrTree,
    /// Chains are swept by their x-extent.
    SweepLine,
}

/// The monotone chains of a set of segment strings, packed into an
/// STR-tree by envelope. A chain's id is its position in `chains`.
#[derive(Debug)]
pub(crate) struct ChainIndex<'a, T: GeoFloat> {
    chains: Vec<MonotoneChain<'a, T>>,
    tree: StrTree<Envelope<T>, usize>,
}

impl<'a, T: GeoFloat> ChainIndex<'a, T> {
    pub(crate) fn new(strings: &'a [NodedSegmentString<T>], node_capacity: usize) -> Self {
        let mut chains: Vec<_> = strings.iter().flat_map(monotone_chains).collect();
        let mut tree = StrTree::with_node_capacity(node_capacity);
        for (id, chain) in chains.iter_mut().enumerate() {
            chain.id = id;
            tree.insert(*chain.envelope(), id)
                .expect("a fresh tree accepts inserts");
        }
        tree.build();
        ChainIndex { chains, tree }
    }

    /// Visits the chains whose envelope intersects `search`.
    pub(crate) fn query_with<F: FnMut(&MonotoneChain<'a, T>)>(&self, search: &Envelope<T>, mut visitor: F) {
        self.tree
            .query_with(search, |&id| visitor(&self.chains[id]));
    }

    /// Feeds every candidate pair of segments to `intersector`. Each
    /// unordered pair of chains is processed once.
    pub(crate) fn compute_intersections<SI: SegmentIntersector<T>>(
        &self,
        intersector: &mut SI,
        cancel: Option<&CancelToken>,
    ) -> Result<()> {
        let mut overlaps = 0;
        for chain in &self.chains {
            CancelToken::check(cancel)?;
            self.tree.query_with(chain.envelope(), |&other| {
                if other <= chain.id() {
                    return;
                }
                overlaps += 1;
                chain.compute_overlaps(&self.chains[other], |c0, i, c1, j| {
                    if !intersector.is_done() {
                        intersector.process_intersections(c0.string(), i, c1.string(), j);
                    }
                });
            });
            if intersector.is_done() {
                break;
            }
        }
        debug!(
            "chain index: {} chains, {overlaps} overlapping pairs",
            self.chains.len()
        );
        Ok(())
    }

    /// Like [`compute_intersections`](Self::compute_intersections), for
    /// callers without a cancel token.
    pub(crate) fn compute_all_intersections<SI: SegmentIntersector<T>>(&self, intersector: &mut SI) {
        if let Err(err) = self.compute_intersections(intersector, None) {
            unreachable!("uncancellable noding failed: {err}");
        }
    }
}

/// Feeds candidate segment pairs to `intersector` by sweeping the
/// x-extents of all monotone chains.
fn sweep_intersections<T: GeoFloat, SI: SegmentIntersector<T>>(
    strings: &[NodedSegmentString<T>],
    intersector: &mut SI,
    cancel: Option<&CancelToken>,
) -> Result<()> {
    let edges: Vec<_> = strings.iter().map(MonotoneChainEdge::new).collect();
    let mut index = SweepLineIndex::new();
    for (e, edge) in edges.iter().enumerate() {
        for c in 0..edge.chain_count() {
            index.add(Interval::new(edge.min_x(c), edge.max_x(c)), (e, c));
        }
    }

    let mut cancelled = false;
    let overlaps = index.compute_overlaps(|&(e0, c0), &(e1, c1)| {
        if cancelled || intersector.is_done() {
            return;
        }
        if cancel.map_or(false, CancelToken::is_cancelled) {
            cancelled = true;
            return;
        }
        edges[e0].compute_intersects_for_chain(c0, &edges[e1], c1, intersector);
    });
    debug!("chain sweep: {} chains, {overlaps} overlapping pairs", index.len());

    if cancelled {
        Err(TopologyError::Cancelled)
    } else {
        Ok(())
    }
}

/// Nodes segment strings by intersecting their monotone chains.
///
/// What is done with each candidate pair of segments is up to the
/// [`SegmentIntersector`]; with an [`IntersectionAdder`] this is a full
/// noder.
///
/// [`IntersectionAdder`]: super::IntersectionAdder
#[derive(Debug, Clone)]
pub struct McIndexNoder<T: GeoFloat, SI> {
    intersector: SI,
    strings: Vec<NodedSegmentString<T>>,
    index_kind: ChainIndexKind,
    node_capacity: usize,
    cancel: Option<CancelToken>,
}

impl<T: GeoFloat, SI: SegmentIntersector<T>> McIndexNoder<T, SI> {
    pub fn new(intersector: SI) -> Self {
        McIndexNoder {
            intersector,
            strings: vec![],
            index_kind: ChainIndexKind::default(),
            node_capacity: DEFAULT_NODE_CAPACITY,
            cancel: None,
        }
    }

    pub fn with_index_kind(mut self, index_kind: ChainIndexKind) -> Self {
        self.index_kind = index_kind;
        self
    }

    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn intersector(&self) -> &SI {
        &self.intersector
    }

    pub fn into_intersector(self) -> SI {
        self.intersector
    }
}

impl<T: GeoFloat, SI: SegmentIntersector<T>> Noder<T> for McIndexNoder<T, SI> {
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<T>>) -> Result<()> {
        self.strings = strings;
        debug!(
            "noding {} strings with {:?} index",
            self.strings.len(),
            self.index_kind
        );
        match self.index_kind {
            ChainIndexKind::StrTree => ChainIndex::new(&self.strings, self.node_capacity)
                .compute_intersections(&mut self.intersector, self.cancel.as_ref()),
            ChainIndexKind::SweepLine => {
                sweep_intersections(&self.strings, &mut self.intersector, self.cancel.as_ref())
            }
        }
    }

    fn noded_substrings(&self) -> Vec<NodedSegmentString<T>> {
        NodedSegmentString::noded_substrings(&self.strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::IntersectionAdder;
    use geo::{coord, LineString};

    fn grid_lines() -> Vec<LineString<f64>> {
        let mut lines = vec![];
        for i in 1..=3 {
            let v = i as f64;
            lines.push(LineString::from(vec![(v, 0.), (v, 4.)]));
            lines.push(LineString::from(vec![(0., v), (4., v)]));
        }
        lines
    }

    #[test]
    fn grid_is_fully_noded() {
        for kind in [ChainIndexKind::StrTree, ChainIndexKind::SweepLine] {
            let mut noder = McIndexNoder::new(IntersectionAdder::floating()).with_index_kind(kind);
            let pieces = noder.node_line_strings(&grid_lines()).unwrap();
            assert_eq!(pieces.len(), 24, "{kind:?}");
            assert!(pieces.iter().all(|p| p.0.len() == 2));
            assert_eq!(noder.intersector().num_proper_intersections(), 9);
        }
    }

    #[test]
    fn self_intersection_is_noded() {
        // A bow-tie crossing itself at (1, 1).
        let line = NodedSegmentString::new(
            vec![
                coord! { x: 0., y: 0. },
                coord! { x: 2., y: 2. },
                coord! { x: 2., y: 0. },
                coord! { x: 0., y: 2. },
            ],
            0,
        );
        let mut noder = McIndexNoder::new(IntersectionAdder::floating());
        noder.compute_nodes(vec![line]).unwrap();
        let pieces = noder.noded_substrings();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].coords().last(), Some(&coord! { x: 1., y: 1. }));
        // The middle piece is the loop through (2, 2) and (2, 0).
        assert_eq!(pieces[1].len(), 4);
        assert_eq!(pieces[1].coords().first(), pieces[1].coords().last());
    }

    #[test]
    fn cancelled_token_stops_noding() {
        let token = CancelToken::new();
        token.cancel();
        for kind in [ChainIndexKind::StrTree, ChainIndexKind::SweepLine] {
            let mut noder = McIndexNoder::new(IntersectionAdder::floating())
                .with_index_kind(kind)
                .with_cancel_token(token.clone());
            assert_eq!(
                noder.node_line_strings(&grid_lines()),
                Err(TopologyError::Cancelled)
            );
        }
    }
}
