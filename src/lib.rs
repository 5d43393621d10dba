//! Spatial indexes, noding and polygon assembly for planar linework.
//!
//! 1. [Indexes](#indexes)
//! 1. [Noding](#noding)
//! 1. [Polygons](#polygons)
//!
//! # Indexes
//!
//! [`Bintree`] stores one dimensional intervals; [`StrTree`] is a
//! packed R-tree over any [`Bounds`], used here both for envelopes and
//! intervals; [`SweepLineIndex`] reports all overlapping pairs of
//! intervals in one sweep. Segment strings are cut into monotone chains
//! ([`MonotoneChain`], [`MonotoneChainEdge`]) before being indexed, so
//! that candidate segment pairs can be found by recursive bisection.
//!
//! # Noding
//!
//! A set of segment strings is noded when segments only meet at
//! end-points. [`McIndexNoder`] computes exact nodes with a pluggable
//! [`SegmentIntersector`]. The snap rounders ([`SimpleSnapRounder`],
//! [`McIndexSnapRounder`]) additionally round every vertex and
//! intersection onto a grid, snapping segments to the [`HotPixel`]s
//! they pass through.
//!
//! ```rust
//! use geo::LineString;
//! use geo_noding::{McIndexSnapRounder, Noder};
//!
//! let lines = vec![
//!     LineString::from(vec![(0., 0.), (10., 10.)]),
//!     LineString::from(vec![(0., 10.), (10., 0.)]),
//! ];
//! let mut rounder = McIndexSnapRounder::new(1.).unwrap();
//! let pieces = rounder.node_line_strings(&lines).unwrap();
//! assert_eq!(pieces.len(), 4);
//! assert!(pieces.iter().all(|p| p.0.contains(&(5., 5.).into())));
//! ```
//!
//! # Polygons
//!
//! [`Polygonizer`] assembles polygons from the faces of noded linework,
//! reporting dangles, cut edges and invalid rings. The validity testers
//! [`ConnectedInteriorTester`] and [`SweeplineNestedRingTester`] check
//! polygon rings for a split interior and for nesting.
mod events;
pub use events::SweepPoint;

pub mod error;
pub use error::TopologyError;

pub mod precision;
pub use precision::PrecisionModel;

pub mod index;
pub use index::{
    Bintree, Bounds, Envelope, Interval, Key, SpatialIndex, StrTree, SweepLineIndex,
};

pub mod intersection;
pub use intersection::{LineIntersector, SegmentIntersection};

pub mod monotone;
pub use monotone::{monotone_chains, MonotoneChain, MonotoneChainEdge};

pub mod noding;
pub use noding::{
    CancelToken, ChainIndexKind, IntersectionAdder, InteriorIntersectionFinder,
    InteriorIntersectionFinderAdder, McIndexNoder, NodedSegmentString, Noder, SegmentIntersector,
    SegmentNode,
};

pub mod snapround;
pub use snapround::{HotPixel, McIndexPointSnapper, McIndexSnapRounder, SimpleSnapRounder};

mod graph;

pub mod valid;
pub use valid::{ConnectedInteriorTester, SweeplineNestedRingTester};

pub mod polygonize;
pub use polygonize::{EdgeRing, Polygonizer, RingKind};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;

#[cfg(test)]
pub(crate) fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) mod utils;
