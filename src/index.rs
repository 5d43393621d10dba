//! Spatial indexes over one and two dimensional extents.
//!
//! All indexes return *candidates*: items whose stored extent
//! intersects the query extent. Callers apply exact predicates
//! themselves.

use geo::GeoFloat;
use std::fmt::Debug;

use crate::error::Result;

mod envelope;
pub use envelope::Envelope;

mod interval;
pub use interval::Interval;

mod key;
pub use key::Key;

mod bintree;
pub use bintree::Bintree;

mod strtree;
pub use strtree::{StrTree, DEFAULT_NODE_CAPACITY};

mod sweepline;
pub use sweepline::SweepLineIndex;

/// An axis-aligned extent that can be packed into an [`StrTree`].
pub trait Bounds: Clone + Debug {
    type Scalar: GeoFloat;

    /// Whether the extent contains no points.
    fn is_empty(&self) -> bool;

    /// Inclusive intersection test.
    fn intersects(&self, other: &Self) -> bool;

    /// Smallest extent containing both `self` and `other`.
    fn union(&self, other: &Self) -> Self;

    /// Centre along the first sort axis.
    fn centre_x(&self) -> Self::Scalar;

    /// Centre along the second sort axis.
    fn centre_y(&self) -> Self::Scalar;
}

/// A dynamic mapping from extents to items.
pub trait SpatialIndex<B, I> {
    /// Adds `item` stored under `bounds`.
    fn insert(&mut self, bounds: B, item: I) -> Result<()>;

    /// Items whose stored extent intersects `bounds`.
    fn query(&self, bounds: &B) -> Vec<&I>;

    /// Removes one entry equal to `item` stored under `bounds`. Returns
    /// whether an entry was found.
    fn remove(&mut self, bounds: &B, item: &I) -> bool
    where
        I: PartialEq;
}
