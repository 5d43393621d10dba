use geo::GeoFloat;
use std::ptr;

use super::{is_incident, HotPixel};
use crate::noding::{ChainIndex, NodedSegmentString};

/// Snaps segments to hot pixels, finding candidate segments through an
/// index of monotone chains.
pub struct McIndexPointSnapper<'i, 'a, T: GeoFloat> {
    index: &'i ChainIndex<'a, T>,
}

impl<'i, 'a, T: GeoFloat> McIndexPointSnapper<'i, 'a, T> {
    pub(crate) fn new(index: &'i ChainIndex<'a, T>) -> Self {
        McIndexPointSnapper { index }
    }

    /// Adds a node at the pixel's point to every indexed segment passing
    /// through `pixel`. Returns whether any node was added.
    ///
    /// If the pixel is a vertex, `parent` names its string and vertex
    /// index; the segments incident to that vertex are skipped.
    pub fn snap(
        &self,
        pixel: &HotPixel<T>,
        parent: Option<(&NodedSegmentString<T>, usize)>,
    ) -> bool {
        let search = pixel.safe_envelope();
        let mut snapped = false;
        self.index.query_with(&search, |chain| {
            chain.select(&search, |chain, segment| {
                if let Some((string, vertex)) = parent {
                    if ptr::eq(chain.string(), string) && is_incident(segment, vertex) {
                        return;
                    }
                }
                snapped |= pixel.add_snapped_node(chain.string(), segment);
            });
        });
        snapped
    }

    /// Snaps to the pixel of a vertex, and makes the vertex a node of its
    /// own string if anything snapped to it.
    pub fn snap_vertex(&self, pixel: &HotPixel<T>, string: &NodedSegmentString<T>, vertex: usize) -> bool {
        let snapped = self.snap(pixel, Some((string, vertex)));
        if snapped {
            string.add_intersection(pixel.coordinate(), vertex.min(string.segment_count() - 1));
        }
        snapped
    }
}
