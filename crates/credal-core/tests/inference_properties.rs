//! Property-based tests for tracker and partition invariants.

use credal_core::convergence::ConvergenceEvaluator;
use credal_core::partition::partition;
use credal_core::trackers::{BoundsTracker, ExpectationTracker, VertexTracker, VertexUpdate};
use credal_core::{ModalTable, NetworkSpec};
use proptest::prelude::*;

fn network(sizes: &[usize]) -> NetworkSpec {
    let mut net = NetworkSpec::new();
    for (i, size) in sizes.iter().enumerate() {
        net.add_variable(&format!("V{i}_0"), *size, &[]).unwrap();
    }
    net
}

/// Domain sizes plus a list of (node, raw vertex) samples for them.
fn samples_strategy() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, Vec<f64>)>)> {
    prop::collection::vec(1usize..=5, 1..=6).prop_flat_map(|sizes| {
        let n = sizes.len();
        let sizes_for_samples = sizes.clone();
        let samples = prop::collection::vec(
            (0..n).prop_flat_map(move |node| {
                let size = sizes_for_samples[node];
                (Just(node), prop::collection::vec(0.0f64..=1.0, size))
            }),
            0..40,
        );
        (Just(sizes), samples)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn bounds_tighten_monotonically((sizes, samples) in samples_strategy()) {
        let net = network(&sizes);
        let mut bounds = BoundsTracker::new();
        bounds.initialize(&net, 2);

        for (node, vertex) in &samples {
            let before_min = bounds.min(*node).unwrap().to_vec();
            let before_max = bounds.max(*node).unwrap().to_vec();
            bounds.update(*node, vertex);
            let after_min = bounds.min(*node).unwrap();
            let after_max = bounds.max(*node).unwrap();
            for m in 0..vertex.len() {
                prop_assert!(after_min[m] <= before_min[m]);
                prop_assert!(after_max[m] >= before_max[m]);
                prop_assert!(after_min[m] <= vertex[m] && vertex[m] <= after_max[m]);
            }
        }
    }

    #[test]
    fn partition_covers_space_exactly(
        sizes in prop::collection::vec(0usize..=7, 0..=12),
        workers in 0usize..=32,
    ) {
        let ranges = partition(&sizes, workers);
        let total: usize = sizes.iter().sum();

        prop_assert_eq!(ranges.markers().len(), ranges.workers() + 1);
        prop_assert!(ranges.workers() >= 1);
        prop_assert!(ranges.workers() <= total.max(1));

        let spans: Vec<_> = ranges.ranges().collect();
        prop_assert_eq!(spans.first().map(|r| r.start), Some(0));
        prop_assert_eq!(spans.last().map(|r| r.end), Some(total));
        for pair in spans.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }

        let lens: Vec<usize> = spans.iter().map(|r| r.len()).collect();
        let longest = lens.iter().copied().max().unwrap_or(0);
        let shortest = lens.iter().copied().min().unwrap_or(0);
        prop_assert!(longest - shortest <= 1);
        // Longer ranges come first.
        prop_assert!(lens.windows(2).all(|w| w[0] >= w[1]));

        // Markers agree with the flat offsets.
        let mut offsets = vec![0usize];
        for size in &sizes {
            offsets.push(offsets.last().copied().unwrap_or(0) + size);
        }
        for (marker, span) in ranges.markers().iter().skip(1).zip(&spans) {
            let flat = offsets.get(marker.node).copied().unwrap_or(total) + marker.modality;
            prop_assert_eq!(flat, span.end);
        }
    }

    #[test]
    fn epsilon_is_max_delta_and_rolls_forward(
        (sizes, samples) in samples_strategy(),
        workers in 1usize..=4,
    ) {
        let net = network(&sizes);
        let evaluator = ConvergenceEvaluator::new(workers).unwrap();
        let mut bounds = BoundsTracker::new();
        bounds.initialize(&net, workers);

        for (node, vertex) in &samples {
            bounds.update(*node, vertex);
        }

        let mut expected = 0.0f64;
        for slot in bounds.layout() {
            let min = bounds.min(slot.node).unwrap();
            let max = bounds.max(slot.node).unwrap();
            for m in 0..slot.size {
                expected = expected.max((min[m] - 1.0).abs()).max(max[m].abs());
            }
        }

        let eps = evaluator.compute(&mut bounds);
        prop_assert!((eps - expected).abs() < 1e-12);
        prop_assert_eq!(evaluator.compute(&mut bounds), 0.0);
    }

    #[test]
    fn vertex_sets_hold_no_near_duplicates((sizes, samples) in samples_strategy()) {
        let net = network(&sizes);
        let mut bounds = BoundsTracker::new();
        bounds.initialize(&net, 1);
        let mut vertices = VertexTracker::new();
        vertices.initialize(&net);

        for (node, vertex) in &samples {
            bounds.update(*node, vertex);
            let lower = bounds.min(*node).unwrap().to_vec();
            let upper = bounds.max(*node).unwrap().to_vec();
            let first = vertices.update(*node, vertex, &lower, &upper, false);
            prop_assert!(first != VertexUpdate::UnknownNode);

            // A vertex that survived the interior pass is a duplicate from now on.
            let kept = vertices.get(*node).unwrap().iter().any(|v| v == vertex);
            if kept {
                prop_assert_eq!(
                    vertices.update(*node, vertex, &lower, &upper, false),
                    VertexUpdate::Duplicate
                );
            }
        }

        for (_, set) in vertices.iter() {
            for (i, a) in set.iter().enumerate() {
                for b in &set[i + 1..] {
                    let close = a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6);
                    prop_assert!(!close);
                }
            }
        }
    }

    #[test]
    fn expectation_bounds_bracket_every_observation(
        weights in prop::collection::vec(-10.0f64..10.0, 2..=4),
        raw in prop::collection::vec(prop::collection::vec(0.0f64..=1.0, 4), 1..20),
    ) {
        let mut net = NetworkSpec::new();
        net.add_variable("M_0", weights.len(), &[]).unwrap();
        let mut modals = ModalTable::new();
        modals.set(&net, "M", weights.clone()).unwrap();

        let mut tracker = ExpectationTracker::new();
        tracker.initialize(&net, &modals);

        for sample in &raw {
            let vertex = &sample[..weights.len()];
            let exp = tracker.update(0, vertex).unwrap();
            prop_assert!(tracker.min(0).unwrap() <= exp);
            prop_assert!(tracker.max(0).unwrap() >= exp);
        }
    }
}
