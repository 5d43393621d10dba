use geo::{Coord, GeoFloat};
use log::debug;

use super::{
    find_interior_intersections, is_incident, round_strings, snap_round_to_fixed_point, HotPixel,
};
use crate::{
    error::Result,
    index::DEFAULT_NODE_CAPACITY,
    noding::{CancelToken, ChainIndex, NodedSegmentString, Noder},
    precision::PrecisionModel,
};

/// Snap rounding that tests every hot pixel against every segment.
///
/// Quadratic in the input size; [`McIndexSnapRounder`] produces the same
/// result using a spatial index.
///
/// [`McIndexSnapRounder`]: super::McIndexSnapRounder
#[derive(Debug, Clone)]
pub struct SimpleSnapRounder<T: GeoFloat> {
    precision: PrecisionModel<T>,
    strings: Vec<NodedSegmentString<T>>,
    cancel: Option<CancelToken>,
}

impl<T: GeoFloat> SimpleSnapRounder<T> {
    /// A snap rounder onto the grid with `scale` cells per unit.
    pub fn new(scale: T) -> Result<Self> {
        Ok(SimpleSnapRounder {
            precision: PrecisionModel::fixed(scale)?,
            strings: vec![],
            cancel: None,
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn precision(&self) -> &PrecisionModel<T> {
        &self.precision
    }

    fn snap_intersections(&self, strings: &[NodedSegmentString<T>], intersections: &[Coord<T>]) -> Result<()> {
        let scale = self.precision.scale();
        let pixels: Vec<_> = intersections
            .iter()
            .map(|&pt| HotPixel::new(pt, scale))
            .collect();
        for string in strings {
            CancelToken::check(self.cancel.as_ref())?;
            for pixel in &pixels {
                for segment in 0..string.segment_count() {
                    pixel.add_snapped_node(string, segment);
                }
            }
        }
        Ok(())
    }

    /// Snaps every segment to the vertices it passes near. A vertex that
    /// attracts some other segment becomes a node of its own string too.
    fn snap_vertices(&self, strings: &[NodedSegmentString<T>]) -> Result<()> {
        let scale = self.precision.scale();
        for (s0, string0) in strings.iter().enumerate() {
            CancelToken::check(self.cancel.as_ref())?;
            for (vertex, &pt) in string0.coords().iter().enumerate() {
                let pixel = HotPixel::new(pt, scale);
                let mut snapped = false;
                for (s1, string1) in strings.iter().enumerate() {
                    for segment in 0..string1.segment_count() {
                        if s0 == s1 && is_incident(segment, vertex) {
                            continue;
                        }
                        snapped |= pixel.add_snapped_node(string1, segment);
                    }
                }
                if snapped {
                    string0.add_intersection(pt, vertex.min(string0.segment_count() - 1));
                }
            }
        }
        Ok(())
    }

    /// One intersection pass followed by one vertex pass.
    fn snap_round(&self, strings: &[NodedSegmentString<T>]) -> Result<()> {
        let intersections = {
            let index = ChainIndex::new(strings, DEFAULT_NODE_CAPACITY);
            find_interior_intersections(&index, &self.precision, self.cancel.as_ref())?
        };
        debug!(
            "snap rounding {} strings with {} intersection pixels",
            strings.len(),
            intersections.len()
        );
        self.snap_intersections(strings, &intersections)?;
        self.snap_vertices(strings)
    }
}

impl<T: GeoFloat> Noder<T> for SimpleSnapRounder<T> {
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
