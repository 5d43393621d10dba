use geo::GeoFloat;
use log::debug;

use super::{
    find_interior_intersections, round_strings, snap_round_to_fixed_point, HotPixel,
    McIndexPointSnapper,
};
use crate::{
    error::Result,
    index::DEFAULT_NODE_CAPACITY,
    noding::{CancelToken, ChainIndex, NodedSegmentString, Noder},
    precision::PrecisionModel,
};

/// Snap rounding that finds the segments near each hot pixel through an
/// STR-tree of monotone chains.
///
/// Produces the same substrings as [`SimpleSnapRounder`], in roughly
/// `O((n + k) log n)` for `n` segments and `k` hot pixels.
///
/// [`SimpleSnapRounder`]: super::SimpleSnapRounder
#[derive(Debug, Clone)]
pub struct McIndexSnapRounder<T: GeoFloat> {
    precision: PrecisionModel<T>,
    strings: Vec<NodedSegmentString<T>>,
    node_capacity: usize,
    cancel: Option<CancelToken>,
}

impl<T: GeoFloat> McIndexSnapRounder<T> {
    /// A snap rounder onto the grid with `scale` cells per unit.
    pub fn new(scale: T) -> Result<Self> {
        Ok(McIndexSnapRounder {
            precision: PrecisionModel::fixed(scale)?,
            strings: vec![],
            node_capacity: DEFAULT_NODE_CAPACITY,
            cancel: None,
        })
    }

    pub fn with_node_capacity(mut self, node_capacity: usize) -> Self {
        self.node_capacity = node_capacity;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn precision(&self) -> &PrecisionModel<T> {
        &self.precision
    }
}

impl<T: GeoFloat> McIndexSnapRounder<T> {
    /// One intersection pass followed by one vertex pass, sharing one
    /// chain index.
    fn snap_round(&self, strings: &[NodedSegmentString<T>]) -> Result<()> {
        let cancel = self.cancel.as_ref();
        let scale = self.precision.scale();

        let index = ChainIndex::new(strings, self.node_capacity);
        let intersections = find_interior_intersections(&index, &self.precision, cancel)?;
        debug!(
            "snap rounding {} strings with {} intersection pixels",
            strings.len(),
            intersections.len()
        );

        let snapper = McIndexPointSnapper::new(&index);
        for pt in intersections {
            snapper.snap(&HotPixel::new(pt, scale), None);
        }
        let mut vertex_snaps = 0;
        for string in strings {
            CancelToken::check(cancel)?;
            for (vertex, &pt) in string.coords().iter().enumerate() {
                if snapper.snap_vertex(&HotPixel::new(pt, scale), string, vertex) {
                    vertex_snaps += 1;
                }
            }
        }
        debug!("{vertex_snaps} vertices attracted other segments");
        Ok(())
    }
}

impl<T: GeoFloat> Noder<T> for McIndexSnapRounder<T> {
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<T>>) -> Result<()> {
        let strings = round_strings(strings, &self.precision);
        let noded = snap_round_to_fixed_point(strings, &self.precision, |strings| {
            self.snap_round(strings)
        })?;
        self.strings = noded;
        Ok(())
    }

    fn noded_substrings(&self) -> Vec<NodedSegmentString<T>> {
        NodedSegmentString::noded_substrings(&self.strings)
    }
}
