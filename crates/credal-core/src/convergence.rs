//! Per-iteration convergence (epsilon) computation.
//!
//! Epsilon is the largest absolute change of any lower or upper marginal
//! since the previous computation. Each worker sweeps one contiguous range
//! of the flat bounds arrays, moves the current values into the snapshots
//! and reports its local maximum; the ranges never overlap, so the only
//! synchronization is the final join.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

use crate::error::Result;
use crate::logging::event_names;
use crate::trackers::BoundsTracker;

/// Shared handle to a rayon pool.
pub type Pool = Arc<ThreadPool>;

/// Computes epsilon over a [`BoundsTracker`] on a dedicated pool.
#[derive(Debug, Clone)]
pub struct ConvergenceEvaluator {
    pool: Pool,
}

struct Segment<'a> {
    min: &'a [f64],
    max: &'a [f64],
    old_min: &'a mut [f64],
    old_max: &'a mut [f64],
}

impl Segment<'_> {
    fn sweep(self) -> f64 {
        let mut local = 0.0_f64;
        for (cur, old) in self.min.iter().zip(self.old_min.iter_mut()) {
            local = local.max((cur - *old).abs());
            *old = *cur;
        }
        for (cur, old) in self.max.iter().zip(self.old_max.iter_mut()) {
            local = local.max((cur - *old).abs());
            *old = *cur;
        }
        local
    }
}

impl ConvergenceEvaluator {
    /// Build an evaluator with its own pool of `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("credal-epsilon-{i}"))
            .build()?;
        Ok(Self::with_pool(Arc::new(pool)))
    }

    /// Share an existing pool.
    pub fn with_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compute epsilon and roll the snapshots forward.
    ///
    /// Runs every range on the calling thread when called from inside a
    /// rayon worker, so nested use never oversubscribes.
    pub fn compute(&self, bounds: &mut BoundsTracker) -> f64 {
        let view = bounds.epsilon_view();

        let mut segments = Vec::with_capacity(view.ranges.workers());
        let mut old_min: &mut [f64] = view.old_min;
        let mut old_max: &mut [f64] = view.old_max;
        for range in view.ranges.ranges() {
            let (seg_old_min, rest_min) = std::mem::take(&mut old_min).split_at_mut(range.len());
            let (seg_old_max, rest_max) = std::mem::take(&mut old_max).split_at_mut(range.len());
            old_min = rest_min;
            old_max = rest_max;
            segments.push(Segment {
                min: &view.min[range.clone()],
                max: &view.max[range],
                old_min: seg_old_min,
                old_max: seg_old_max,
            });
        }

        if segments.len() <= 1 || rayon::current_thread_index().is_some() {
            if segments.len() > 1 {
                tracing::trace!(
                    event = event_names::EPSILON_SEQUENTIAL,
                    ranges = segments.len(),
                    "nested in a rayon worker; sweeping ranges sequentially"
                );
            }
            return segments.into_iter().map(Segment::sweep).fold(0.0, f64::max);
        }

        self.pool.install(|| {
            segments
                .into_par_iter()
                .map(Segment::sweep)
                .reduce(|| 0.0, f64::max)
        })
    }
}
