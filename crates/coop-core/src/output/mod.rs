//! Output
//!
//! Persistence for strategy snapshots, cooperation curves, and the sweep's
//! final-splits report. Nothing here feeds back into a running simulation.

pub mod gexf;
pub mod report;
pub mod snapshot;

pub use gexf::write_gexf;
pub use report::{CurveWriter, FinalSplits};
pub use snapshot::{build_snapshot, SnapshotWriter};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes `value` as pretty JSON to `path`.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
