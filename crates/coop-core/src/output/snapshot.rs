//! Snapshot Writer
//!
//! Observer that persists strategy snapshots for one scenario as
//! `iter_N.json` and, optionally, `iter_N.gexf`.

use coop_events::{NodeStrategy, StrategySnapshot};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::driver::{IterationObserver, SnapshotView};
use crate::output::{write_gexf, write_json, OutputError};

/// Builds the serializable snapshot for a driver view.
pub fn build_snapshot(scenario: &str, view: &SnapshotView<'_>) -> StrategySnapshot {
    let mut snapshot = StrategySnapshot::new(scenario, view.record.clone(), view.trigger);
    snapshot.nodes = view
        .strategies
        .iter()
        .map(|(node, strategy)| NodeStrategy {
            node: view.graph.label(node),
            strategy,
        })
        .collect();
    snapshot
}

/// Writes snapshots into a scenario directory.
#[derive(Debug)]
pub struct SnapshotWriter {
    directory: PathBuf,
    scenario: String,
    json: bool,
    gexf: bool,
    written: usize,
    failures: usize,
}

impl SnapshotWriter {
    pub fn new(directory: impl Into<PathBuf>, scenario: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            scenario: scenario.into(),
            json: true,
            gexf: true,
            written: 0,
            failures: 0,
        }
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn with_gexf(mut self, enabled: bool) -> Self {
        self.gexf = enabled;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Snapshots written successfully.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Snapshots that failed to write.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Writes one snapshot, returning the first error.
    pub fn write(&self, view: &SnapshotView<'_>) -> Result<(), OutputError> {
        fs::create_dir_all(&self.directory)?;
        let snapshot = build_snapshot(&self.scenario, view);

        if self.json {
            let path = self.directory.join(format!("iter_{}.json", view.iteration));
            write_json(&path, &snapshot)?;
        }
        if self.gexf {
            let path = self.directory.join(format!("iter_{}.gexf", view.iteration));
            let mut writer = BufWriter::new(File::create(&path)?);
            let description = format!("{} iteration {}", self.scenario, view.iteration);
            write_gexf(&mut writer, view.graph, view.strategies, &description)?;
            writer.flush()?;
        }
        Ok(())
    }
}

impl IterationObserver for SnapshotWriter {
    fn on_snapshot(&mut self, view: &SnapshotView<'_>) {
        if !self.json && !self.gexf {
            return;
        }
        match self.write(view) {
            Ok(()) => self.written += 1,
            Err(e) => {
                self.failures += 1;
                tracing::warn!(
                    "Could not write snapshot for {} at iteration {}: {}",
                    self.scenario,
                    view.iteration,
                    e
                );
            }
        }
    }
}
