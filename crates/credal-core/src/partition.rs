//! Balanced partition of the flattened (node, modality) index space.
//!
//! Every node contributes `domain_size` consecutive elements. A partition
//! for `T` workers is `T + 1` markers; worker `k` owns the elements between
//! marker `k` (inclusive) and marker `k + 1` (exclusive). Range sizes differ
//! by at most one, with the larger ranges going to the first workers.

use serde::Serialize;
use std::ops::Range;

/// Position in the flattened index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RangeMarker {
    /// Position of the node in the tracker layout (not its id).
    pub node: usize,
    pub modality: usize,
}

/// Worker ranges over the flattened index space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadRanges {
    markers: Vec<RangeMarker>,
    offsets: Vec<usize>,
}

impl Default for ThreadRanges {
    fn default() -> Self {
        partition(&[], 1)
    }
}

impl ThreadRanges {
    pub fn workers(&self) -> usize {
        self.markers.len().saturating_sub(1)
    }

    /// The `workers() + 1` boundary markers.
    pub fn markers(&self) -> &[RangeMarker] {
        &self.markers
    }

    /// Flat element ranges, one per worker.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.offsets.windows(2).map(|w| w[0]..w[1])
    }

    /// Total number of elements covered.
    pub fn total(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }
}

/// Partition `domain_sizes` (in layout order) across `requested` workers.
///
/// The worker count is clamped to `[1, total elements]`; an empty space gets
/// one empty range.
pub fn partition(domain_sizes: &[usize], requested: usize) -> ThreadRanges {
    let total: usize = domain_sizes.iter().sum();
    let workers = requested.clamp(1, total.max(1));
    let base = total / workers;
    let remainder = total % workers;

    let mut markers = Vec::with_capacity(workers + 1);
    let mut offsets = Vec::with_capacity(workers + 1);
    markers.push(RangeMarker { node: 0, modality: 0 });
    offsets.push(0);

    let mut node = 0;
    let mut modality = 0;
    let mut flat = 0;
    for worker in 0..workers {
        let mut allot = base + usize::from(worker < remainder);
        flat += allot;

        // Consume whole nodes while the allotment covers them, carrying the
        // leftover into the next node.
        while allot > 0 {
            let left = domain_sizes[node] - modality;
            if allot < left {
                modality += allot;
                allot = 0;
            } else {
                allot -= left;
                node += 1;
                modality = 0;
            }
        }

        markers.push(RangeMarker { node, modality });
        offsets.push(flat);
    }

    ThreadRanges { markers, offsets }
}
