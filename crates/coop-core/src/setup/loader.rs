//! Edge-List Loader
//!
//! Reads whitespace-separated edge lists into a [`Graph`]:
//! - unsigned: `u v` per line
//! - signed: `u v sign` per line, `sign` in {1, +1, -1}
//!
//! Lines starting with `#` and blank lines are skipped.

use coop_events::TrustSign;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::{Graph, GraphBuilder};

/// Errors raised while reading an edge list.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl LoadError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        LoadError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Loads an unsigned edge list.
pub fn load_unsigned<R: BufRead>(reader: R, directed: bool) -> Result<Graph, LoadError> {
    load(reader, directed, false)
}

/// Loads a signed edge list.
pub fn load_signed<R: BufRead>(reader: R, directed: bool) -> Result<Graph, LoadError> {
    load(reader, directed, true)
}

/// Opens and loads an edge-list file.
pub fn load_path(path: &Path, signed: bool, directed: bool) -> Result<Graph, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let graph = load(BufReader::new(file), directed, signed).map_err(|e| match e {
        LoadError::Io { source, .. } => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    tracing::info!(
        "Loaded {}: {} nodes, {} edges ({}, {})",
        path.display(),
        graph.node_count(),
        graph.edge_count(),
        if signed { "signed" } else { "unsigned" },
        if directed { "directed" } else { "undirected" },
    );
    Ok(graph)
}

fn load<R: BufRead>(reader: R, directed: bool, signed: bool) -> Result<Graph, LoadError> {
    let expected = if signed { 3 } else { 2 };
    let mut builder = GraphBuilder::new(directed);
    if signed {
        builder.mark_signed();
    }

    for (index, line) in reader.lines().enumerate() {
        let number = index + 1;
        let line = line.map_err(|source| LoadError::Io {
            path: PathBuf::new(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != expected {
            return Err(LoadError::parse(
                number,
                format!("expected {} fields, found {}", expected, fields.len()),
            ));
        }

        let source = parse_label(fields[0], number)?;
        let target = parse_label(fields[1], number)?;
        if signed {
            let sign = parse_sign(fields[2], number)?;
            builder.add_signed_edge(source, target, sign);
        } else {
            builder.add_edge(source, target);
        }
    }

    Ok(builder.build())
}

fn parse_label(field: &str, line: usize) -> Result<u64, LoadError> {
    field
        .parse()
        .map_err(|_| LoadError::parse(line, format!("invalid node id '{}'", field)))
}

fn parse_sign(field: &str, line: usize) -> Result<TrustSign, LoadError> {
    field
        .parse::<i64>()
        .ok()
        .and_then(TrustSign::from_label)
        .ok_or_else(|| LoadError::parse(line, format!("invalid trust sign '{}'", field)))
}
