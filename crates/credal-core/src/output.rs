//! Result files.
//!
//! - marginals: `<name> <modality> <min> <max>` per node and modality
//! - vertices: the variable name, then one `[v1,v2,...]` line per vertex
//! - expectations: `<base> <step0> <step1>...` minima lines, then maxima
//!   lines; needs [`Engine::dynamic_expectations`] first
//!
//! `save_*` write to a path; `write_*` to any writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::engine::Engine;
use crate::error::{CredalError, Result};
use crate::logging::{event_names, Stage};
use crate::network::CredalModel;

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CredalError::OutputUnavailable {
            path: path.to_path_buf(),
            source,
        })
}

fn join(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl<N: CredalModel + ?Sized> Engine<'_, N> {
    pub fn write_marginals<W: Write>(&self, mut out: W) -> Result<()> {
        let network = self.network();
        for slot in self.bounds.layout() {
            let name = network.variable_name(slot.node).unwrap_or("?");
            let (Some(min), Some(max)) = (self.bounds.min(slot.node), self.bounds.max(slot.node))
            else {
                continue;
            };
            for (m, (lo, hi)) in min.iter().zip(max).enumerate() {
                writeln!(out, "{name} {m} {lo} {hi}")?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_vertices<W: Write>(&self, mut out: W) -> Result<()> {
        let network = self.network();
        for (node, set) in self.vertices.iter() {
            writeln!(out, "{}", network.variable_name(node).unwrap_or("?"))?;
            for vertex in set {
                writeln!(out, "[{}]", join(vertex, ","))?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_expectations<W: Write>(&self, mut out: W) -> Result<()> {
        let agg = self
            .dynamic_expectations
            .as_ref()
            .ok_or(CredalError::DynamicExpectationsNotComputed)?;
        for table in [&agg.min, &agg.max] {
            for (base, series) in table {
                writeln!(out, "{base} {}", join(series, " "))?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn save_marginals(&self, path: &Path) -> Result<()> {
        self.write_marginals(create_output(path)?)?;
        log_written("marginals", path);
        Ok(())
    }

    pub fn save_vertices(&self, path: &Path) -> Result<()> {
        self.write_vertices(create_output(path)?)?;
        log_written("vertices", path);
        Ok(())
    }

    /// Fails with `DynamicExpectationsNotComputed` before aggregation,
    /// without creating the file.
    pub fn save_expectations(&self, path: &Path) -> Result<()> {
        if self.dynamic_expectations.is_none() {
            return Err(CredalError::DynamicExpectationsNotComputed);
        }
        self.write_expectations(create_output(path)?)?;
        log_written("expectations", path);
        Ok(())
    }
}

fn log_written(kind: &'static str, path: &Path) {
    tracing::info!(
        event = event_names::OUTPUT_WRITTEN,
        stage = %Stage::Output,
        kind,
        path = %path.display(),
        "results written"
    );
}
