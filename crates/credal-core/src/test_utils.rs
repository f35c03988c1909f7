//! Test utilities for credal-core.
//!
//! - Small reference networks
//! - A validated engine config with a fixed worker count
//! - Scripted [`Propagation`] strategies
//! - Float assertions

use crate::engine::{Propagation, PropagationContext, SampleSink};
use crate::error::{CredalError, Result};
use crate::network::{CredalModel, NetworkSpec, NodeId};
use credal_config::EngineConfig;

/// Assert that two floating point numbers are approximately equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {
        $crate::assert_approx_eq!($a, $b, 1e-9_f64)
    };
    ($a:expr, $b:expr, $epsilon:expr) => {{
        let a: f64 = $a;
        let b: f64 = $b;
        let eps: f64 = $epsilon;
        let diff = (a - b).abs();
        if diff > eps {
            panic!(
                "assertion failed: `(left ~= right)` (left: `{}`, right: `{}`, diff: `{}`, epsilon: `{}`)",
                a, b, diff, eps
            );
        }
    }};
}

/// `rain(2) → sprinkler(2)`, `rain, sprinkler → wet(2)`.
pub fn rain_network() -> NetworkSpec {
    let mut net = NetworkSpec::new();
    for (name, parents) in [
        ("rain", &[][..]),
        ("sprinkler", &["rain"][..]),
        ("wet", &["rain", "sprinkler"][..]),
    ] {
        if let Err(err) = net.add_variable(name, 2, parents) {
            panic!("rain network: {err}");
        }
    }
    net
}

/// `X_0 .. X_{steps}` with identical tables, plus `Y_0 → Y_1`.
pub fn dynamic_network(steps: usize) -> NetworkSpec {
    let mut net = NetworkSpec::new();
    for t in 0..=steps {
        if let Err(err) = net.add_variable(&format!("X_{t}"), 2, &[]) {
            panic!("dynamic network: {err}");
        }
    }
    for (name, parents) in [("Y_0", &[][..]), ("Y_1", &["Y_0"][..])] {
        if let Err(err) = net.add_variable(name, 3, parents) {
            panic!("dynamic network: {err}");
        }
    }
    net
}

/// Defaults with two workers.
pub fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.threads.workers = 2;
    config
}

/// Emits the same samples every iteration.
#[derive(Debug, Clone)]
pub struct FixedSamples {
    samples: Vec<(NodeId, Vec<f64>)>,
    pub iterations: u64,
}

impl FixedSamples {
    pub fn new(samples: Vec<(NodeId, Vec<f64>)>) -> Self {
        Self {
            samples,
            iterations: 0,
        }
    }
}

impl<N: CredalModel + ?Sized> Propagation<N> for FixedSamples {
    fn name(&self) -> &str {
        "fixed"
    }

    fn iterate(&mut self, _ctx: &PropagationContext<'_, N>, sink: &mut SampleSink) -> Result<()> {
        self.iterations += 1;
        for (node, vertex) in &self.samples {
            sink.push(*node, vertex.clone());
        }
        Ok(())
    }
}

/// Emits round `i % rounds.len()` at iteration `i`.
#[derive(Debug, Clone)]
pub struct CyclingSamples {
    rounds: Vec<Vec<(NodeId, Vec<f64>)>>,
    next: usize,
}

impl CyclingSamples {
    pub fn new(rounds: Vec<Vec<(NodeId, Vec<f64>)>>) -> Self {
        Self { rounds, next: 0 }
    }
}

impl<N: CredalModel + ?Sized> Propagation<N> for CyclingSamples {
    fn name(&self) -> &str {
        "cycling"
    }

    fn iterate(&mut self, _ctx: &PropagationContext<'_, N>, sink: &mut SampleSink) -> Result<()> {
        if self.rounds.is_empty() {
            return Ok(());
        }
        for (node, vertex) in &self.rounds[self.next % self.rounds.len()] {
            sink.push(*node, vertex.clone());
        }
        self.next += 1;
        Ok(())
    }
}

/// Fails at the given iteration.
#[derive(Debug, Clone)]
pub struct FailingAt(pub u64);

impl<N: CredalModel + ?Sized> Propagation<N> for FailingAt {
    fn name(&self) -> &str {
        "failing"
    }

    fn iterate(&mut self, ctx: &PropagationContext<'_, N>, sink: &mut SampleSink) -> Result<()> {
        if ctx.iteration >= self.0 {
            return Err(CredalError::propagation("failing", "scripted failure"));
        }
        for node in ctx.network.nodes() {
            let size = ctx.network.domain_size(node).unwrap_or(0);
            sink.push(node, vec![1.0 / size as f64; size]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_networks() {
        let net = rain_network();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.table_dimension(2), Some(8));

        let dynamic = dynamic_network(3);
        assert_eq!(dynamic.node_count(), 6);
        assert_eq!(dynamic.node_id("Y_1"), Some(5));
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq!(0.1 + 0.2, 0.3);
    }
}
