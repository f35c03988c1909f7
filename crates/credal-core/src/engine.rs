//! Generic approximate-inference engine.
//!
//! [`Engine`] owns every piece of per-run state (stores, trackers, the
//! epsilon pool and the stopping policy) and borrows the network for its
//! whole life. The propagation algorithm is injected through
//! [`Propagation`]:
//!
//! ```ignore
//! let mut engine = Engine::new(&network, EngineConfig::default())?;
//! engine.insert_evidence_file(Path::new("evidence.txt"))?;
//! let summary = engine.run(&mut strategy)?;
//! println!("{}", engine);
//! ```
//!
//! Callers that drive their own loop use [`Engine::initialize`],
//! [`Engine::observe`] and [`Engine::compute_epsilon`] directly.

use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use credal_config::{validate_config, EngineConfig};
use credal_math::PolytopeReducer;

use crate::convergence::ConvergenceEvaluator;
use crate::dynamic::{DynamicClusterBuilder, DynamicClusters, DynamicExpectations};
use crate::error::{CredalError, Result};
use crate::logging::{event_names, generate_run_id, Stage};
use crate::network::{CredalModel, NodeId};
use crate::scheme::{ApproximationScheme, SchemeState};
use crate::store::{
    parse_indices, parse_values, Evidence, InsertReport, ModalTable, Queries, SkipReason,
};
use crate::text::{read_entries, read_section, EntryLine, EVIDENCE_SECTION, QUERY_SECTION};
use crate::trackers::{BoundsTracker, ExpectationTracker, VertexTracker};

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    EvidenceSet,
    Iterating,
    /// Stopped on epsilon or epsilon rate.
    Converged,
    /// Stopped on a budget, a stop request or a strategy failure.
    Exhausted,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::EvidenceSet => "evidence_set",
            EngineState::Iterating => "iterating",
            EngineState::Converged => "converged",
            EngineState::Exhausted => "exhausted",
        })
    }
}

/// Read-only view handed to a [`Propagation`] strategy.
pub struct PropagationContext<'a, N: CredalModel + ?Sized> {
    pub network: &'a N,
    pub evidence: &'a Evidence,
    pub bounds: &'a BoundsTracker,
    /// Present when repetitive independence is enabled.
    pub clusters: Option<&'a DynamicClusters>,
    /// 1-based iteration about to run; 0 during `prepare`.
    pub iteration: u64,
}

/// Vertex samples produced by one iteration.
#[derive(Debug, Clone, Default)]
pub struct SampleSink {
    samples: Vec<(NodeId, Vec<f64>)>,
}

impl SampleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one posterior vertex for `node`.
    pub fn push(&mut self, node: NodeId, vertex: Vec<f64>) {
        self.samples.push((node, vertex));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (NodeId, Vec<f64>)> + '_ {
        self.samples.drain(..)
    }
}

/// A concrete propagation algorithm.
///
/// Each call to [`iterate`](Propagation::iterate) computes vertex samples of
/// the current posteriors and pushes them into the sink; the engine folds
/// them into its trackers and decides whether to go on.
pub trait Propagation<N: CredalModel + ?Sized> {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Called once per run, after the trackers are initialized.
    fn prepare(&mut self, _ctx: &PropagationContext<'_, N>) -> Result<()> {
        Ok(())
    }

    fn iterate(&mut self, ctx: &PropagationContext<'_, N>, sink: &mut SampleSink) -> Result<()>;
}

/// Outcome of [`Engine::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub strategy: String,
    pub iterations: u64,
    /// Epsilon of the last iteration.
    pub epsilon: Option<f64>,
    pub stop: SchemeState,
    pub elapsed: Duration,
    pub state: EngineState,
}

/// The inference engine.
pub struct Engine<'n, N: CredalModel + ?Sized> {
    network: &'n N,
    config: EngineConfig,
    scheme: ApproximationScheme,
    evaluator: ConvergenceEvaluator,
    pub(crate) evidence: Evidence,
    pub(crate) queries: Queries,
    pub(crate) modals: ModalTable,
    pub(crate) bounds: BoundsTracker,
    pub(crate) vertices: VertexTracker,
    pub(crate) expectations: ExpectationTracker,
    clusters: Option<DynamicClusters>,
    pub(crate) dynamic_expectations: Option<DynamicExpectations>,
    state: EngineState,
    run_id: String,
}

impl<'n, N: CredalModel + ?Sized> Engine<'n, N> {
    /// Create an engine over `network` with its own epsilon pool.
    pub fn new(network: &'n N, config: EngineConfig) -> Result<Self> {
        validate_config(&config)?;
        let evaluator = ConvergenceEvaluator::new(config.threads.resolved_workers())?;
        let scheme = ApproximationScheme::new(config.approximation.clone());

        Ok(Self {
            network,
            config,
            scheme,
            evaluator,
            evidence: Evidence::new(),
            queries: Queries::new(),
            modals: ModalTable::new(),
            bounds: BoundsTracker::new(),
            vertices: VertexTracker::new(),
            expectations: ExpectationTracker::new(),
            clusters: None,
            dynamic_expectations: None,
            state: EngineState::Uninitialized,
            run_id: generate_run_id(),
        })
    }

    /// Replace the polytope reducer used for redundancy elimination.
    pub fn with_reducer(mut self, reducer: Box<dyn PolytopeReducer>) -> Self {
        self.vertices.set_reducer(reducer);
        self
    }

    /// Share an existing evaluator (and its pool) instead of the engine's own.
    pub fn with_evaluator(mut self, evaluator: ConvergenceEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn network(&self) -> &'n N {
        self.network
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Identifier attached to this engine's log records.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn scheme(&self) -> &ApproximationScheme {
        &self.scheme
    }

    /// Adjust stopping criteria between runs.
    pub fn scheme_mut(&mut self) -> &mut ApproximationScheme {
        &mut self.scheme
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub fn modals(&self) -> &ModalTable {
        &self.modals
    }

    pub fn bounds(&self) -> &BoundsTracker {
        &self.bounds
    }

    pub fn dynamic_clusters(&self) -> Option<&DynamicClusters> {
        self.clusters.as_ref()
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub fn set_store_vertices(&mut self, store: bool) {
        self.config.vertices.store = store;
        if !store {
            self.config.vertices.eliminate_redundant = false;
            self.vertices.clear();
        }
    }

    /// Enabling elimination also enables vertex storage.
    pub fn set_eliminate_redundancy(&mut self, eliminate: bool) {
        self.config.vertices.eliminate_redundant = eliminate;
        if eliminate {
            self.config.vertices.store = true;
        }
    }

    /// Build dynamic clusters at the next initialization.
    pub fn set_repetitive_independence(&mut self, enabled: bool) {
        self.config.dynamic.repetitive_independence = enabled;
        if !enabled {
            self.clusters = None;
        }
    }

    pub fn store_vertices(&self) -> bool {
        self.config.vertices.store
    }

    pub fn eliminate_redundancy(&self) -> bool {
        self.config.vertices.eliminate_redundant
    }

    pub fn repetitive_independence(&self) -> bool {
        self.config.dynamic.repetitive_independence
    }

    // ------------------------------------------------------------------
    // Evidence
    // ------------------------------------------------------------------

    /// Replace all evidence with `entries` (variable name → values).
    pub fn insert_evidence<I, S>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        self.evidence.clear();
        let report = self.apply_evidence(entries);
        self.evidence_changed(&report);
        report
    }

    /// Replace all evidence with `entries` (node id → values).
    pub fn insert_evidence_nodes<I>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (NodeId, Vec<f64>)>,
    {
        self.evidence.clear();
        let network = self.network;
        let mut report = InsertReport::default();
        for (node, values) in entries {
            let label = network
                .variable_name(node)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{node}"));
            let outcome = self.evidence.set(network, node, values);
            report.record("evidence", &label, None, outcome);
        }
        self.evidence_changed(&report);
        report
    }

    /// Set or replace evidence on one variable, keeping the rest.
    pub fn add_evidence(&mut self, name: &str, values: Vec<f64>) -> InsertReport {
        let report = self.apply_evidence([(name, values)]);
        self.evidence_changed(&report);
        report
    }

    /// Replace all evidence with the `[EVIDENCE]` section of a file.
    pub fn insert_evidence_file(&mut self, path: &Path) -> Result<InsertReport> {
        let reader = open_input(path)?;
        self.insert_evidence_reader(reader)
    }

    /// Replace all evidence with the `[EVIDENCE]` section of `reader`.
    pub fn insert_evidence_reader<R: BufRead>(&mut self, reader: R) -> Result<InsertReport> {
        let entries = read_section(reader, EVIDENCE_SECTION)?;
        self.evidence.clear();

        let network = self.network;
        let mut report = InsertReport::default();
        for entry in entries {
            let outcome = lookup(network, &entry)
                .and_then(|node| Ok((node, parse_values(&entry.values)?)))
                .and_then(|(node, values)| self.evidence.set(network, node, values));
            report.record("evidence", &entry.name, Some(entry.line), outcome);
        }
        self.evidence_changed(&report);
        Ok(report)
    }

    fn apply_evidence<I, S>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        let network = self.network;
        let mut report = InsertReport::default();
        for (name, values) in entries {
            let name = name.as_ref();
            let outcome = network
                .node_id(name)
                .ok_or(SkipReason::UnknownVariable)
                .and_then(|node| self.evidence.set(network, node, values));
            report.record("evidence", name, None, outcome);
        }
        report
    }

    fn evidence_changed(&mut self, report: &InsertReport) {
        self.state = EngineState::EvidenceSet;
        self.dynamic_expectations = None;
        tracing::debug!(
            event = event_names::EVIDENCE_INSERTED,
            stage = %Stage::Input,
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            total = self.evidence.len(),
            "evidence updated"
        );
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Replace all queries with `entries` (variable name → modality mask).
    pub fn insert_query<I, S>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (S, Vec<bool>)>,
        S: AsRef<str>,
    {
        self.queries.clear();
        self.apply_queries(entries)
    }

    /// Set or replace the query mask of one variable.
    pub fn add_query(&mut self, name: &str, mask: Vec<bool>) -> InsertReport {
        self.apply_queries([(name, mask)])
    }

    /// Replace all queries with the `[QUERY]` section of a file.
    pub fn insert_query_file(&mut self, path: &Path) -> Result<InsertReport> {
        let reader = open_input(path)?;
        self.insert_query_reader(reader)
    }

    /// Replace all queries with the `[QUERY]` section of `reader`. A line
    /// without indices queries every modality.
    pub fn insert_query_reader<R: BufRead>(&mut self, reader: R) -> Result<InsertReport> {
        let entries = read_section(reader, QUERY_SECTION)?;
        self.queries.clear();

        let network = self.network;
        let mut report = InsertReport::default();
        for entry in entries {
            let outcome = lookup(network, &entry)
                .and_then(|node| Ok((node, parse_indices(&entry.values)?)))
                .and_then(|(node, indices)| self.queries.mark(network, node, &indices));
            report.record("query", &entry.name, Some(entry.line), outcome);
        }
        log_inserted(event_names::QUERY_INSERTED, &report, self.queries.len());
        Ok(report)
    }

    fn apply_queries<I, S>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (S, Vec<bool>)>,
        S: AsRef<str>,
    {
        let network = self.network;
        let mut report = InsertReport::default();
        for (name, mask) in entries {
            let name = name.as_ref();
            let outcome = network
                .node_id(name)
                .ok_or(SkipReason::UnknownVariable)
                .and_then(|node| self.queries.set(network, node, mask));
            report.record("query", name, None, outcome);
        }
        log_inserted(event_names::QUERY_INSERTED, &report, self.queries.len());
        report
    }

    // ------------------------------------------------------------------
    // Modal values
    // ------------------------------------------------------------------

    /// Replace the modal table with `entries` (variable or base name →
    /// weights) and reseed the expectation bounds.
    pub fn insert_modals<I, S>(&mut self, entries: I) -> InsertReport
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        self.modals.clear();
        let network = self.network;
        let mut report = InsertReport::default();
        for (name, values) in entries {
            let name = name.as_ref();
            let outcome = self.modals.set(network, name, values);
            report.record("modal", name, None, outcome);
        }
        self.modals_changed(&report);
        report
    }

    pub fn insert_modals_file(&mut self, path: &Path) -> Result<InsertReport> {
        let reader = open_input(path)?;
        self.insert_modals_reader(reader)
    }

    /// Replace the modal table with `<name> <value>...` lines.
    pub fn insert_modals_reader<R: BufRead>(&mut self, reader: R) -> Result<InsertReport> {
        let entries = read_entries(reader)?;
        self.modals.clear();

        let network = self.network;
        let mut report = InsertReport::default();
        for entry in entries {
            let outcome = parse_values(&entry.values)
                .and_then(|values| self.modals.set(network, &entry.name, values));
            report.record("modal", &entry.name, Some(entry.line), outcome);
        }
        self.modals_changed(&report);
        Ok(report)
    }

    fn modals_changed(&mut self, report: &InsertReport) {
        self.expectations.initialize(self.network, &self.modals);
        self.dynamic_expectations = None;
        log_inserted(event_names::MODALS_INSERTED, report, self.modals.len());
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    /// Reset every tracker for a new run.
    pub fn initialize(&mut self) -> Result<()> {
        let network = self.network;
        self.bounds.initialize(network, self.evaluator.workers());
        if self.config.vertices.store {
            self.vertices.initialize(network);
        } else {
            self.vertices.clear();
        }
        self.expectations.initialize(network, &self.modals);
        self.dynamic_expectations = None;
        self.clusters = if self.config.dynamic.repetitive_independence {
            Some(DynamicClusterBuilder::build(network)?)
        } else {
            None
        };
        self.state = EngineState::Iterating;

        tracing::debug!(
            event = event_names::ENGINE_INITIALIZED,
            stage = %Stage::Init,
            run_id = %self.run_id,
            nodes = self.bounds.layout().len(),
            workers = self.bounds.ranges().workers(),
            monitored = self.expectations.len(),
            store_vertices = self.config.vertices.store,
            dynamic = self.clusters.is_some(),
            "engine initialized"
        );
        Ok(())
    }

    /// Fold one posterior vertex of `node` into the trackers.
    pub fn observe(&mut self, node: NodeId, vertex: &[f64]) -> Result<()> {
        let expected = self
            .network
            .domain_size(node)
            .ok_or(CredalError::UnknownNode(node))?;
        if vertex.len() != expected {
            return Err(CredalError::DimensionMismatch {
                node,
                expected,
                found: vertex.len(),
            });
        }
        if !self.bounds.update(node, vertex) {
            return Err(CredalError::UnknownNode(node));
        }

        if self.config.vertices.store {
            if let (Some(lower), Some(upper)) = (self.bounds.min(node), self.bounds.max(node)) {
                self.vertices.update(
                    node,
                    vertex,
                    lower,
                    upper,
                    self.config.vertices.eliminate_redundant,
                );
            }
        }

        self.expectations.update(node, vertex);
        Ok(())
    }

    /// Largest bound change since the previous call.
    pub fn compute_epsilon(&mut self) -> f64 {
        self.evaluator.compute(&mut self.bounds)
    }

    /// Run `strategy` until the approximation scheme stops.
    ///
    /// Each call gets a fresh run id.
    pub fn run(&mut self, strategy: &mut dyn Propagation<N>) -> Result<RunSummary> {
        self.run_id = generate_run_id();
        self.initialize()?;

        let span = tracing::info_span!("run", run_id = %self.run_id, strategy = strategy.name());
        let _guard = span.enter();
        tracing::info!(
            event = event_names::RUN_STARTED,
            stage = %Stage::Iterate,
            nodes = self.bounds.layout().len(),
            evidence = self.evidence.len(),
            queries = self.queries.len(),
            "run started"
        );

        self.scheme.start();
        let prepared = strategy.prepare(&self.context(0));
        if let Err(err) = prepared {
            return Err(self.fail(strategy.name(), err));
        }

        let mut sink = SampleSink::new();
        loop {
            let iteration = self.scheme.iterations() + 1;
            let produced = strategy.iterate(&self.context(iteration), &mut sink);
            if let Err(err) = produced {
                return Err(self.fail(strategy.name(), err));
            }

            for (node, vertex) in sink.drain() {
                if let Err(err) = self.observe(node, &vertex) {
                    return Err(self.fail(strategy.name(), err));
                }
            }

            let epsilon = self.compute_epsilon();
            tracing::trace!(event = event_names::RUN_ITERATION, iteration, epsilon, "iteration");
            if !self.scheme.update(epsilon).is_running() {
                break;
            }
        }

        let stop = self.scheme.state();
        self.state = if stop.is_converged() {
            EngineState::Converged
        } else {
            EngineState::Exhausted
        };

        let summary = RunSummary {
            run_id: self.run_id.clone(),
            strategy: strategy.name().to_string(),
            iterations: self.scheme.iterations(),
            epsilon: self.scheme.current_epsilon(),
            stop,
            elapsed: self.scheme.elapsed(),
            state: self.state,
        };
        tracing::info!(
            event = event_names::RUN_FINISHED,
            stage = %Stage::Iterate,
            iterations = summary.iterations,
            epsilon = ?summary.epsilon,
            stop = %summary.stop,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(summary)
    }

    fn context(&self, iteration: u64) -> PropagationContext<'_, N> {
        PropagationContext {
            network: self.network,
            evidence: &self.evidence,
            bounds: &self.bounds,
            clusters: self.clusters.as_ref(),
            iteration,
        }
    }

    fn fail(&mut self, strategy: &str, err: CredalError) -> CredalError {
        self.state = EngineState::Exhausted;
        self.scheme.stop();
        tracing::warn!(
            event = event_names::RUN_FAILED,
            strategy,
            iteration = self.scheme.iterations(),
            error = %err,
            "run aborted"
        );
        err
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    fn node_by_name(&self, name: &str) -> Result<NodeId> {
        self.network
            .node_id(name)
            .ok_or_else(|| CredalError::UnknownVariable {
                name: name.to_string(),
            })
    }

    pub fn marginal_min(&self, node: NodeId) -> Result<&[f64]> {
        self.bounds.min(node).ok_or(CredalError::UnknownNode(node))
    }

    pub fn marginal_max(&self, node: NodeId) -> Result<&[f64]> {
        self.bounds.max(node).ok_or(CredalError::UnknownNode(node))
    }

    pub fn marginal_min_by_name(&self, name: &str) -> Result<&[f64]> {
        self.marginal_min(self.node_by_name(name)?)
    }

    pub fn marginal_max_by_name(&self, name: &str) -> Result<&[f64]> {
        self.marginal_max(self.node_by_name(name)?)
    }

    pub fn expectation_min(&self, node: NodeId) -> Result<f64> {
        self.expectations
            .min(node)
            .ok_or_else(|| self.not_monitored(node))
    }

    pub fn expectation_max(&self, node: NodeId) -> Result<f64> {
        self.expectations
            .max(node)
            .ok_or_else(|| self.not_monitored(node))
    }

    pub fn expectation_min_by_name(&self, name: &str) -> Result<f64> {
        self.expectation_min(self.node_by_name(name)?)
    }

    pub fn expectation_max_by_name(&self, name: &str) -> Result<f64> {
        self.expectation_max(self.node_by_name(name)?)
    }

    fn not_monitored(&self, node: NodeId) -> CredalError {
        match self.network.variable_name(node) {
            Some(name) => CredalError::UnknownMonitoredVariable {
                name: name.to_string(),
            },
            None => CredalError::UnknownNode(node),
        }
    }

    /// Stored vertices of `node`; empty when vertex storage is off.
    pub fn vertices(&self, node: NodeId) -> Result<&[Vec<f64>]> {
        if self.network.domain_size(node).is_none() {
            return Err(CredalError::UnknownNode(node));
        }
        Ok(self.vertices.get(node).unwrap_or(&[]))
    }

    pub fn vertices_by_name(&self, name: &str) -> Result<&[Vec<f64>]> {
        self.vertices(self.node_by_name(name)?)
    }

    /// Aggregate monitored expectations per base-name and time step.
    ///
    /// Every monitored variable must follow the `<base>_<step>` convention.
    pub fn dynamic_expectations(&mut self) -> Result<&DynamicExpectations> {
        let network = self.network;
        let entries: Vec<(&str, f64, f64)> = self
            .expectations
            .iter()
            .filter_map(|(node, min, max)| network.variable_name(node).map(|n| (n, min, max)))
            .collect();
        let aggregated = DynamicExpectations::aggregate(entries, network.node_count())?;

        tracing::debug!(
            event = event_names::EXPECTATIONS_AGGREGATED,
            stage = %Stage::Aggregate,
            variables = aggregated.min.len(),
            "dynamic expectations aggregated"
        );
        Ok(&*self.dynamic_expectations.insert(aggregated))
    }

    pub fn dynamic_expectation_min(&self, base: &str) -> Result<&[f64]> {
        let agg = self
            .dynamic_expectations
            .as_ref()
            .ok_or(CredalError::DynamicExpectationsNotComputed)?;
        agg.min(base)
            .ok_or_else(|| CredalError::UnknownMonitoredVariable {
                name: base.to_string(),
            })
    }

    pub fn dynamic_expectation_max(&self, base: &str) -> Result<&[f64]> {
        let agg = self
            .dynamic_expectations
            .as_ref()
            .ok_or(CredalError::DynamicExpectationsNotComputed)?;
        agg.max(base)
            .ok_or_else(|| CredalError::UnknownMonitoredVariable {
                name: base.to_string(),
            })
    }

    /// Drop evidence, queries, trackers and dynamic caches. Modal values
    /// are kept.
    pub fn erase_all_evidence(&mut self) {
        self.evidence.clear();
        self.queries.clear();
        self.bounds.clear();
        self.vertices.clear();
        self.expectations.clear();
        self.clusters = None;
        self.dynamic_expectations = None;
        self.state = EngineState::Uninitialized;
        tracing::debug!(event = event_names::ENGINE_RESET, "evidence erased");
    }
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CredalError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        })
}

fn lookup<N: CredalModel + ?Sized>(
    network: &N,
    entry: &EntryLine,
) -> std::result::Result<NodeId, SkipReason> {
    network.node_id(&entry.name).ok_or(SkipReason::UnknownVariable)
}

fn log_inserted(event: &'static str, report: &InsertReport, total: usize) {
    tracing::debug!(
        event,
        stage = %Stage::Input,
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        total,
        "inputs updated"
    );
}

impl<N: CredalModel + ?Sized> fmt::Display for Engine<'_, N> {
    /// One block per node: its name with evidence/query markers, then
    /// `modality: [min, max]` lines. Queried modalities are starred.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.network.nodes() {
            let name = self.network.variable_name(node).unwrap_or("?");
            write!(f, "{name}")?;
            if self.evidence.contains(node) {
                write!(f, " [evidence]")?;
            }
            if self.queries.contains(node) {
                write!(f, " [query]")?;
            }
            writeln!(f)?;

            let (Some(min), Some(max)) = (self.bounds.min(node), self.bounds.max(node)) else {
                writeln!(f, "  (not initialized)")?;
                continue;
            };
            let mask = self.queries.get(node);
            for (m, (lo, hi)) in min.iter().zip(max).enumerate() {
                let star = if mask.is_some_and(|q| q.get(m).copied().unwrap_or(false)) {
                    " *"
                } else {
                    ""
                };
                writeln!(f, "  {m}: [{lo}, {hi}]{star}")?;
            }
        }
        Ok(())
    }
}
