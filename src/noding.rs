//! Noding of segment strings.
//!
//! A set of segment strings is *noded* when segments meet only at their
//! end-points. Noders find intersections between segments, record them
//! as nodes on the strings, and split the strings at their nodes.

use geo::{GeoFloat, LineString};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{Result, TopologyError};

mod segment_node;
pub use segment_node::SegmentNode;

mod segment_string;
pub use segment_string::NodedSegmentString;

mod intersectors;
pub use intersectors::{
    IntersectionAdder, InteriorIntersectionFinder, InteriorIntersectionFinderAdder,
    SegmentIntersector,
};

mod mc_index_noder;
pub(crate) use mc_index_noder::ChainIndex;
pub use mc_index_noder::{ChainIndexKind, McIndexNoder};

/// Computes the nodes of a set of segment strings.
pub trait Noder<T: GeoFloat> {
    /// Finds the nodes of `strings`. The strings are consumed and their
    /// noded pieces are available from
    /// [`noded_substrings`](Self::noded_substrings).
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<T>>) -> Result<()>;

    /// The input strings split at their nodes.
    fn noded_substrings(&self) -> Vec<NodedSegmentString<T>>;

    /// Nodes `lines` and returns the noded pieces. The context of each
    /// piece is the index of the line it came from.
    fn node_line_strings(&mut self, lines: &[LineString<T>]) -> Result<Vec<LineString<T>>> {
        let strings = lines
            .iter()
            .enumerate()
            .map(|(i, line)| NodedSegmentString::from_line_string(line, i))
            .collect();
        self.compute_nodes(strings)?;
        Ok(self
            .noded_substrings()
            .iter()
            .map(NodedSegmentString::to_line_string)
            .collect())
    }
}

/// A shared flag that asks long-running noding to stop.
///
/// Cancellation is checked between segment strings, so a run stops
/// within one string's worth of work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(token: Option<&CancelToken>) -> Result<()> {
        match token {
            Some(token) if token.is_cancelled() => Err(TopologyError::Cancelled),
            _ => Ok(()),
        }
    }
}
