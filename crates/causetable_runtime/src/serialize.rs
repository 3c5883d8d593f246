//! Model snapshots in `MessagePack` format.
//!
//! A snapshot stores the observations and edges of a graph. Node tables are
//! not stored; they are recomputed when the graph is rebuilt.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use causetable_engine::Dag;
use causetable_foundation::{Error, ErrorKind, Result};
use causetable_storage::Dataset;
use serde::{Deserialize, Serialize};

/// The persistent form of a [`Dag`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Observations the graph is fitted on.
    pub dataset: Dataset,
    /// `(source, sink)` pairs.
    pub edges: Vec<(String, String)>,
}

impl ModelSnapshot {
    /// Captures a graph's observations and edges.
    #[must_use]
    pub fn from_dag(dag: &Dag) -> Self {
        Self {
            dataset: dag.dataset().clone(),
            edges: dag
                .edges()
                .into_iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }

    /// Rebuilds the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored edges are not valid for the stored
    /// observations.
    pub fn to_dag(&self) -> Result<Dag> {
        Dag::new(self.dataset.clone())
            .add_edges(self.edges.iter().map(|(s, t)| (s.as_str(), t.as_str())))
    }
}

/// Serializes a snapshot to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &ModelSnapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot)
        .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<ModelSnapshot> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::new(ErrorKind::Io(format!(
        "failed to {action} file '{}': {e}",
        path.display()
    )))
}

/// Saves a snapshot, overwriting any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &ModelSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| io_error("create", path, &e))?;
    let mut writer = BufWriter::new(file);
    let bytes = to_bytes(snapshot)?;

    writer
        .write_all(&bytes)
        .map_err(|e| io_error("write to", path, &e))?;
    writer.flush().map_err(|e| io_error("flush", path, &e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}

/// Loads a snapshot from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ModelSnapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| io_error("open", path, &e))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();

    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("read", path, &e))?;
    from_bytes(&bytes)
}
