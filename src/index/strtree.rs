use log::debug;
use slab::Slab;
use std::{cell::OnceCell, cmp::Ordering};

use super::{Bounds, SpatialIndex};
use crate::error::{Result, TopologyError};

pub const DEFAULT_NODE_CAPACITY: usize = 10;

type NodeId = usize;

/// A query-only R-tree packed with the Sort-Tile-Recursive algorithm.
///
/// Items are collected by [`insert`](Self::insert) and the tree is packed
/// on the first query or removal. After that, the tree accepts removals
/// but no further inserts.
///
/// The tree is generic over its [`Bounds`], so the same packing serves
/// two dimensional envelopes and one dimensional intervals.
#[derive(Debug, Clone)]
pub struct StrTree<B: Bounds, I> {
    node_capacity: usize,
    items: Slab<(B, I)>,
    packed: OnceCell<Packed<B>>,
}

#[derive(Debug, Clone)]
struct Packed<B> {
    nodes: Vec<StrNode<B>>,
    root: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct StrNode<B> {
    bounds: B,
    level: usize,
    children: Vec<Child>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    Node(NodeId),
    Item(usize),
}

#[derive(Debug, Clone)]
struct Boundable<B> {
    bounds: B,
    child: Child,
}

impl<B: Bounds, I> Default for StrTree<B, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Bounds, I> StrTree<B, I> {
    pub fn new() -> Self {
        Self::with_node_capacity(DEFAULT_NODE_CAPACITY)
    }

    pub fn with_node_capacity(node_capacity: usize) -> Self {
        assert!(node_capacity > 1, "node capacity must be greater than 1");
        StrTree {
            node_capacity,
            items: Slab::new(),
            packed: OnceCell::new(),
        }
    }

    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    pub fn is_built(&self) -> bool {
        self.packed.get().is_some()
    }

    /// Adds `item` under `bounds`. Empty bounds are silently ignored.
    pub fn insert(&mut self, bounds: B, item: I) -> Result<()> {
        if self.is_built() {
            return Err(TopologyError::IndexBuilt);
        }
        if !bounds.is_empty() {
            self.items.insert((bounds, item));
        }
        Ok(())
    }

    /// Packs the tree. Called implicitly by queries.
    pub fn build(&self) {
        self.packed();
    }

    /// Number of stored items.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of levels of the packed tree.
    pub fn depth(&self) -> usize {
        let packed = self.packed();
        match packed.root {
            Some(root) => packed.depth(root),
            None => 0,
        }
    }

    pub fn query(&self, search: &B) -> Vec<&I> {
        let mut result = vec![];
        self.query_with(search, |item| result.push(item));
        result
    }

    /// Visits every item whose bounds intersect `search`.
    pub fn query_with<'a, F: FnMut(&'a I)>(&'a self, search: &B, mut visitor: F) {
        let packed = self.packed();
        let Some(root) = packed.root else {
            return;
        };
        if !packed.nodes[root].bounds.intersects(search) {
            return;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for &child in &packed.nodes[id].children {
                match child {
                    Child::Node(node) => {
                        if packed.nodes[node].bounds.intersects(search) {
                            stack.push(node);
                        }
                    }
                    Child::Item(key) => {
                        let (bounds, item) = &self.items[key];
                        if bounds.intersects(search) {
                            visitor(item);
                        }
                    }
                }
            }
        }
    }

    /// Removes one entry equal to `item` lying under `bounds`. Nodes left
    /// without children are unlinked.
    pub fn remove(&mut self, bounds: &B, item: &I) -> bool
    where
        I: PartialEq,
    {
        self.packed();
        let Some(packed) = self.packed.get_mut() else {
            return false;
        };
        let Some(root) = packed.root else {
            return false;
        };
        if !packed.nodes[root].bounds.intersects(bounds) {
            return false;
        }
        match packed.remove_item(root, bounds, item, &self.items) {
            Some(key) => {
                self.items.remove(key);
                if packed.nodes[root].children.is_empty() {
                    packed.root = None;
                }
                true
            }
            None => false,
        }
    }

    fn packed(&self) -> &Packed<B> {
        self.packed.get_or_init(|| {
            let packed = Packed::build(&self.items, self.node_capacity);
            debug!(
                "packed STR-tree: {} items in {} nodes",
                self.items.len(),
                packed.nodes.len()
            );
            packed
        })
    }
}

impl<B: Bounds> Packed<B> {
    fn build<I>(items: &Slab<(B, I)>, node_capacity: usize) -> Self {
        let mut packed = Packed {
            nodes: vec![],
            root: None,
        };
        if items.is_empty() {
            return packed;
        }
        let mut boundables: Vec<_> = items
            .iter()
            .map(|(key, (bounds, _))| Boundable {
                bounds: bounds.clone(),
                child: Child::Item(key),
            })
            .collect();

        let mut level = 0;
        loop {
            boundables = packed.create_parent_boundables(boundables, level, node_capacity);
            if boundables.len() == 1 {
                let Child::Node(root) = boundables[0].child else {
                    unreachable!("parent boundables are always nodes");
                };
                packed.root = Some(root);
                return packed;
            }
            level += 1;
        }
    }

    /// Groups one level of boundables into parents: sort by x-centre into
    /// vertical slices, then by y-centre within each slice, and pack runs
    /// of `node_capacity`.
    fn create_parent_boundables(
        &mut self,
        mut children: Vec<Boundable<B>>,
        level: usize,
        node_capacity: usize,
    ) -> Vec<Boundable<B>> {
        assert!(!children.is_empty());
        let min_leaf_count = children.len().div_ceil(node_capacity);
        let slice_count = (min_leaf_count as f64).sqrt().ceil() as usize;
        let slice_capacity = children.len().div_ceil(slice_count);

        sort_by_centre(&mut children, B::centre_x);
        let mut parents = Vec::with_capacity(min_leaf_count);
        for slice in children.chunks_mut(slice_capacity) {
            sort_by_centre(slice, B::centre_y);
            for group in slice.chunks(node_capacity) {
                let bounds = group[1..]
                    .iter()
                    .fold(group[0].bounds.clone(), |acc, b| acc.union(&b.bounds));
                self.nodes.push(StrNode {
                    bounds: bounds.clone(),
                    level,
                    children: group.iter().map(|b| b.child).collect(),
                });
                parents.push(Boundable {
                    bounds,
                    child: Child::Node(self.nodes.len() - 1),
                });
            }
        }
        parents
    }

    /// Levels from `id` down to the leaves. Packing builds the tree
    /// level by level, so every leaf sits at level zero.
    fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].level + 1
    }

    /// Removes `item` from the subtree at `id`, returning its slab key.
    fn remove_item<I: PartialEq>(
        &mut self,
        id: NodeId,
        bounds: &B,
        item: &I,
        items: &Slab<(B, I)>,
    ) -> Option<usize> {
        let children = &mut self.nodes[id].children;
        if let Some(pos) = children
            .iter()
            .position(|c| matches!(c, Child::Item(key) if items[*key].1 == *item))
        {
            let Child::Item(key) = children.remove(pos) else {
                unreachable!()
            };
            return Some(key);
        }

        let candidates: Vec<NodeId> = self.nodes[id]
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Node(n) if self.nodes[*n].bounds.intersects(bounds) => Some(*n),
                _ => None,
            })
            .collect();
        for child in candidates {
            if let Some(key) = self.remove_item(child, bounds, item, items) {
                if self.nodes[child].children.is_empty() {
                    self.nodes[id].children.retain(|c| *c != Child::Node(child));
                }
                return Some(key);
            }
        }
        None
    }
}

fn sort_by_centre<B: Bounds>(boundables: &mut [Boundable<B>], centre: fn(&B) -> B::Scalar) {
    boundables.sort_by(|a, b| {
        centre(&a.bounds)
            .partial_cmp(&centre(&b.bounds))
            .unwrap_or(Ordering::Equal)
    });
}

impl<B: Bounds, I> SpatialIndex<B, I> for StrTree<B, I> {
    fn insert(&mut self, bounds: B, item: I) -> Result<()> {
        StrTree::insert(self, bounds, item)
    }

    fn query(&self, bounds: &B) -> Vec<&I> {
        StrTree::query(self, bounds)
    }

    fn remove(&mut self, bounds: &B, item: &I) -> bool
    where
        I: PartialEq,
    {
        StrTree::remove(self, bounds, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Envelope, Interval};
    use crate::random::*;
    use geo::Coord;

    fn envelope(x0: f64, y0: f64, x1: f64, y1: f64) -> Envelope<f64> {
        Envelope::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn query_matches_brute_force() {
        let envs: Vec<_> = random_rects(1000, 100., 5.).map(Envelope::from).collect();
        let mut tree = StrTree::new();
        for (id, env) in envs.iter().enumerate() {
            tree.insert(*env, id).unwrap();
        }
        assert_eq!(tree.size(), envs.len());

        for search in random_rects(50, 100., 20.).map(Envelope::from) {
            let mut found: Vec<_> = tree.query(&search).into_iter().copied().collect();
            found.sort_unstable();
            let expected: Vec<_> = envs
                .iter()
                .enumerate()
                .filter(|(_, env)| env.intersects(&search))
                .map(|(id, _)| id)
                .collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn insert_after_build_fails() {
        let mut tree = StrTree::new();
        tree.insert(envelope(0., 0., 1., 1.), 'a').unwrap();
        assert_eq!(tree.query(&envelope(0.5, 0.5, 0.5, 0.5)), vec![&'a']);
        assert_eq!(
            tree.insert(envelope(2., 2., 3., 3.), 'b'),
            Err(TopologyError::IndexBuilt)
        );
    }

    #[test]
    fn empty_tree_and_null_bounds() {
        let mut tree = StrTree::<Envelope<f64>, u8>::new();
        tree.insert(Envelope::null(), 1).unwrap();
        assert_eq!(tree.size(), 0);
        assert!(tree.query(&envelope(-1e9, -1e9, 1e9, 1e9)).is_empty());
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn packing_shape() {
        let mut tree = StrTree::with_node_capacity(4);
        for i in 0..64 {
            let x = (i % 8) as f64;
            let y = (i / 8) as f64;
            tree.insert(envelope(x, y, x + 0.5, y + 0.5), i).unwrap();
        }
        // 64 items -> 16 leaves -> 4 nodes -> root.
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.query(&envelope(2.2, 2.2, 3.1, 3.1)).len(), 4);
    }

    #[test]
    fn uneven_packing_depth() {
        let mut tree = StrTree::with_node_capacity(2);
        for i in 0..5 {
            let x = i as f64 * 10.;
            tree.insert(envelope(x, 0., x + 1., 1.), i).unwrap();
        }
        // 5 items -> 3 leaves -> 2 nodes -> root.
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.query(&envelope(0., 0., 100., 1.)).len(), 5);
    }

    #[test]
    fn remove_then_query() {
        let mut tree = StrTree::with_node_capacity(2);
        for i in 0..5 {
            let x = i as f64 * 10.;
            tree.insert(envelope(x, 0., x + 1., 1.), i).unwrap();
        }
        assert!(tree.remove(&envelope(20., 0., 21., 1.), &2));
        assert!(!tree.remove(&envelope(20., 0., 21., 1.), &2));
        assert!(tree.query(&envelope(19., 0., 22., 1.)).is_empty());
        assert_eq!(tree.size(), 4);
        for i in [0, 1, 3, 4] {
            let x = i as f64 * 10.;
            assert!(tree.remove(&envelope(x, 0., x + 1., 1.), &i));
        }
        assert!(tree.is_empty());
        assert!(tree.query(&envelope(-100., -100., 100., 100.)).is_empty());
    }

    #[test]
    fn one_dimensional_bounds() {
        let mut tree = StrTree::new();
        for i in 0..30 {
            let a = i as f64;
            tree.insert(Interval::new(a, a + 1.5), i).unwrap();
        }
        let mut found: Vec<_> = tree.query(&Interval::new(10., 11.)).into_iter().copied().collect();
        found.sort_unstable();
        assert_eq!(found, vec![9, 10, 11]);
    }
}
