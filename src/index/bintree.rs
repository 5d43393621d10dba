use geo::GeoFloat;
use log::trace;

use super::{Interval, Key, SpatialIndex};
use crate::{error::Result, utils::constant};

type NodeId = usize;

/// A binary interval tree over power-of-two aligned cells.
///
/// The root is not a cell; it straddles the origin and has one child
/// tree for each side of zero. Items whose interval crosses zero are
/// stored at the root. Every other item lives in the smallest aligned
/// cell containing its (padded) interval.
///
/// Nodes are kept in an arena and addressed by index. Removed subtrees
/// are unlinked but their slots are not reclaimed.
#[derive(Debug, Clone)]
pub struct Bintree<T: GeoFloat, I> {
    root: Root<T, I>,
    nodes: Vec<Node<T, I>>,
    min_extent: T,
}

#[derive(Debug, Clone)]
struct Root<T: GeoFloat, I> {
    items: Vec<(Interval<T>, I)>,
    subnodes: [Option<NodeId>; 2],
}

#[derive(Debug, Clone)]
struct Node<T: GeoFloat, I> {
    interval: Interval<T>,
    centre: T,
    level: i32,
    items: Vec<(Interval<T>, I)>,
    subnodes: [Option<NodeId>; 2],
}

/// Which half of a cell split at `centre` fully contains `interval`, if
/// either does.
fn subnode_index<T: GeoFloat>(interval: &Interval<T>, centre: T) -> Option<usize> {
    if interval.max() <= centre {
        Some(0)
    } else if interval.min() >= centre {
        Some(1)
    } else {
        None
    }
}

impl<T: GeoFloat, I> Default for Bintree<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoFloat, I> Bintree<T, I> {
    pub fn new() -> Self {
        Bintree {
            root: Root {
                items: vec![],
                subnodes: [None, None],
            },
            nodes: vec![],
            min_extent: T::one(),
        }
    }

    /// Smallest non-zero width seen among inserted intervals; used to
    /// pad zero-width intervals.
    pub fn min_extent(&self) -> T {
        self.min_extent
    }

    pub fn insert(&mut self, interval: Interval<T>, item: I) {
        self.collect_stats(&interval);
        let padded = ensure_extent(&interval, self.min_extent);
        trace!("bintree insert {interval:?} as {padded:?}");

        let entry = (interval, item);
        let Some(index) = subnode_index(&padded, T::zero()) else {
            self.root.items.push(entry);
            return;
        };
        let node = match self.root.subnodes[index] {
            Some(node) if self.nodes[node].interval.contains(&padded) => node,
            existing => {
                let larger = self.create_expanded(existing, &padded);
                self.root.subnodes[index] = Some(larger);
                larger
            }
        };
        self.insert_contained(node, &padded, entry);
    }

    /// Items whose interval overlaps `search`.
    pub fn query(&self, search: &Interval<T>) -> Vec<&I> {
        let mut result = vec![];
        self.query_with(search, |item| result.push(item));
        result
    }

    pub fn query_point(&self, x: T) -> Vec<&I> {
        self.query(&Interval::point(x))
    }

    pub fn query_with<'a, F: FnMut(&'a I)>(&'a self, search: &Interval<T>, mut visitor: F) {
        let mut visit = |items: &'a [(Interval<T>, I)]| {
            items
                .iter()
                .filter(|(interval, _)| interval.overlaps(search))
                .for_each(|(_, item)| visitor(item));
        };
        visit(&self.root.items);

        let mut stack: Vec<NodeId> = self.root.subnodes.iter().flatten().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.interval.overlaps(search) {
                continue;
            }
            visit(&node.items);
            stack.extend(node.subnodes.iter().flatten().copied());
        }
    }

    /// Removes one entry equal to `item` inserted with `interval`, pruning
    /// subtrees left empty.
    pub fn remove(&mut self, interval: &Interval<T>, item: &I) -> bool
    where
        I: PartialEq,
    {
        let padded = ensure_extent(interval, self.min_extent);
        for index in 0..2 {
            let Some(child) = self.root.subnodes[index] else {
                continue;
            };
            if self.remove_from(child, &padded, item) {
                if self.is_prunable(child) {
                    self.root.subnodes[index] = None;
                }
                return true;
            }
        }
        remove_entry(&mut self.root.items, item)
    }

    /// Number of stored items.
    pub fn size(&self) -> usize {
        self.reachable()
            .map(|id| self.nodes[id].items.len())
            .sum::<usize>()
            + self.root.items.len()
    }

    /// Number of levels, counting the root.
    pub fn depth(&self) -> usize {
        self.root
            .subnodes
            .iter()
            .flatten()
            .map(|&child| self.node_depth(child))
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Number of reachable cells, counting the root.
    pub fn node_count(&self) -> usize {
        self.reachable().count() + 1
    }

    fn reachable(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.root.subnodes.iter().flatten().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id].subnodes.iter().flatten().copied());
            Some(id)
        })
    }

    fn node_depth(&self, id: NodeId) -> usize {
        self.nodes[id]
            .subnodes
            .iter()
            .flatten()
            .map(|&child| self.node_depth(child))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn collect_stats(&mut self, interval: &Interval<T>) {
        let width = interval.width();
        if width > T::zero() && width < self.min_extent {
            self.min_extent = width;
        }
    }

    fn create_node(&mut self, interval: Interval<T>, level: i32) -> NodeId {
        self.nodes.push(Node {
            interval,
            centre: interval.centre(),
            level,
            items: vec![],
            subnodes: [None, None],
        });
        self.nodes.len() - 1
    }

    fn create_keyed_node(&mut self, interval: &Interval<T>) -> NodeId {
        let key = Key::new(interval);
        self.create_node(*key.interval(), key.level())
    }

    /// A node large enough to hold both `existing` and `add`, with
    /// `existing` hung beneath it.
    fn create_expanded(&mut self, existing: Option<NodeId>, add: &Interval<T>) -> NodeId {
        let mut expanded = *add;
        if let Some(node) = existing {
            expanded.expand_to_include(&self.nodes[node].interval);
        }
        let larger = self.create_keyed_node(&expanded);
        if let Some(node) = existing {
            self.insert_node(larger, node);
        }
        larger
    }

    /// Hangs `child` beneath `parent`, creating intermediate cells.
    fn insert_node(&mut self, parent: NodeId, child: NodeId) {
        let mut parent = parent;
        let child_interval = self.nodes[child].interval;
        let child_level = self.nodes[child].level;
        assert!(
            self.nodes[parent].interval.contains(&child_interval),
            "bintree parent cell must contain the child cell"
        );
        loop {
            let index = subnode_index(&child_interval, self.nodes[parent].centre)
                .expect("aligned child cell lies within one half of its parent");
            if child_level == self.nodes[parent].level - 1 {
                self.nodes[parent].subnodes[index] = Some(child);
                return;
            }
            parent = self.get_subnode(parent, index);
        }
    }

    fn insert_contained(&mut self, tree: NodeId, padded: &Interval<T>, entry: (Interval<T>, I)) {
        assert!(
            self.nodes[tree].interval.contains(padded),
            "bintree subtree must contain the inserted interval"
        );
        let node = if padded.is_zero_width() {
            self.find(tree, padded)
        } else {
            self.get_node(tree, padded)
        };
        self.nodes[node].items.push(entry);
    }

    /// The subnode at `index`, created if missing.
    fn get_subnode(&mut self, parent: NodeId, index: usize) -> NodeId {
        if let Some(child) = self.nodes[parent].subnodes[index] {
            return child;
        }
        let Node {
            interval, centre, level, ..
        } = self.nodes[parent];
        let interval = if index == 0 {
            Interval::new(interval.min(), centre)
        } else {
            Interval::new(centre, interval.max())
        };
        let child = self.create_node(interval, level - 1);
        self.nodes[parent].subnodes[index] = Some(child);
        child
    }

    /// Smallest cell containing `search`, creating cells as needed.
    fn get_node(&mut self, tree: NodeId, search: &Interval<T>) -> NodeId {
        let mut node = tree;
        while let Some(index) = subnode_index(search, self.nodes[node].centre) {
            node = self.get_subnode(node, index);
        }
        node
    }

    /// Smallest existing cell containing `search`.
    fn find(&self, tree: NodeId, search: &Interval<T>) -> NodeId {
        let mut node = tree;
        while let Some(index) = subnode_index(search, self.nodes[node].centre) {
            match self.nodes[node].subnodes[index] {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    fn remove_from(&mut self, id: NodeId, search: &Interval<T>, item: &I) -> bool
    where
        I: PartialEq,
    {
        if !self.nodes[id].interval.overlaps(search) {
            return false;
        }
        for index in 0..2 {
            let Some(child) = self.nodes[id].subnodes[index] else {
                continue;
            };
            if self.remove_from(child, search, item) {
                if self.is_prunable(child) {
                    self.nodes[id].subnodes[index] = None;
                }
                return true;
            }
        }
        remove_entry(&mut self.nodes[id].items, item)
    }

    fn is_prunable(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        node.items.is_empty() && node.subnodes.iter().all(Option::is_none)
    }
}

fn remove_entry<T: GeoFloat, I: PartialEq>(items: &mut Vec<(Interval<T>, I)>, item: &I) -> bool {
    match items.iter().position(|(_, it)| it == item) {
        Some(pos) => {
            items.remove(pos);
            true
        }
        None => false,
    }
}

/// Pads a zero-width interval symmetrically to `min_extent`, so that it
/// can be keyed.
fn ensure_extent<T: GeoFloat>(interval: &Interval<T>, min_extent: T) -> Interval<T> {
    if interval.width() > T::zero() {
        return *interval;
    }
    let half = min_extent * constant(0.5);
    Interval::new(interval.min() - half, interval.max() + half)
}

impl<T: GeoFloat, I> SpatialIndex<Interval<T>, I> for Bintree<T, I> {
    fn insert(&mut self, bounds: Interval<T>, item: I) -> Result<()> {
        Bintree::insert(self, bounds, item);
        Ok(())
    }

    fn query(&self, bounds: &Interval<T>) -> Vec<&I> {
        Bintree::query(self, bounds)
    }

    fn remove(&mut self, bounds: &Interval<T>, item: &I) -> bool
    where
        I: PartialEq,
    {
        Bintree::remove(self, bounds, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    fn brute_force(entries: &[(Interval<f64>, usize)], search: &Interval<f64>) -> Vec<usize> {
        let mut ids: Vec<_> = entries
            .iter()
            .filter(|(iv, _)| iv.overlaps(search))
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn query_matches_brute_force() {
        let mut rng = thread_rng();
        let mut tree = Bintree::new();
        let mut entries = vec![];
        for id in 0..500 {
            let a: f64 = rng.gen_range(-1000. ..1000.);
            let w: f64 = if id % 7 == 0 { 0. } else { rng.gen_range(0. ..50.) };
            let iv = Interval::new(a, a + w);
            tree.insert(iv, id);
            entries.push((iv, id));
        }
        assert_eq!(tree.size(), 500);

        for _ in 0..100 {
            let a: f64 = rng.gen_range(-1100. ..1100.);
            let w: f64 = rng.gen_range(0. ..100.);
            let search = Interval::new(a, a + w);
            let mut found: Vec<_> = tree.query(&search).into_iter().copied().collect();
            found.sort_unstable();
            assert_eq!(found, brute_force(&entries, &search));
        }
    }

    #[test]
    fn zero_width_items_are_found() {
        let mut tree = Bintree::new();
        tree.insert(Interval::new(0.25, 0.75), "wide");
        tree.insert(Interval::point(3.), "point");
        tree.insert(Interval::point(-3.), "negative point");
        assert_eq!(tree.query_point(3.), vec![&"point"]);
        assert_eq!(tree.query_point(-3.), vec![&"negative point"]);
        assert!(tree.query(&Interval::new(3.1, 4.)).is_empty());
        assert_eq!(tree.min_extent(), 0.5);
    }

    #[test]
    fn straddling_items_live_at_root() {
        let mut tree = Bintree::new();
        tree.insert(Interval::new(-1., 1.), 0);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.query_point(0.), vec![&0]);
    }

    #[test]
    fn expansion_keeps_existing_items() {
        let mut tree = Bintree::new();
        tree.insert(Interval::new(1., 1.5), 0);
        tree.insert(Interval::new(100., 130.), 1);
        tree.insert(Interval::new(1.1, 1.2), 2);
        let mut all: Vec<_> = tree.query(&Interval::new(0., 200.)).into_iter().copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2]);
        assert!(tree.depth() > 2);
    }

    #[test]
    fn remove_prunes_empty_cells() {
        let mut tree = Bintree::new();
        tree.insert(Interval::new(10., 11.), 'a');
        tree.insert(Interval::new(10.2, 10.3), 'b');
        tree.insert(Interval::new(-5., 5.), 'c');
        assert!(tree.remove(&Interval::new(10.2, 10.3), &'b'));
        assert!(!tree.remove(&Interval::new(10.2, 10.3), &'b'));
        assert!(tree.remove(&Interval::new(10., 11.), &'a'));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.remove(&Interval::new(-5., 5.), &'c'));
        assert_eq!(tree.size(), 0);
    }
}
