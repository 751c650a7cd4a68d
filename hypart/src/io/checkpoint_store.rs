//! JSON checkpoint documents written when a run is interrupted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checkpoint::CheckpointSink;
use crate::context::{PartitionContext, PartitionParams};
use crate::core::hypergraph::Hypergraph;
use crate::core::types::{Objective, PartId};

/// Snapshot of an interrupted run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointDocument {
    pub graph: PathBuf,
    pub k: usize,
    pub epsilon: f64,
    pub objective: Objective,
    pub seed: u64,
    pub num_nodes: usize,
    pub num_edges: usize,
    /// Nodes with a part assigned at the time of the checkpoint.
    pub assigned: usize,
    pub cut: i64,
    pub km1: i64,
    /// Part id per node, `null` where unassigned.
    pub partition: Vec<Option<PartId>>,
}

impl CheckpointDocument {
    pub fn capture(params: &PartitionParams, hypergraph: &Hypergraph) -> Self {
        Self {
            graph: params.graph_filename.clone(),
            k: params.k,
            epsilon: params.epsilon,
            objective: params.objective,
            seed: params.seed,
            num_nodes: hypergraph.num_nodes(),
            num_edges: hypergraph.num_edges(),
            assigned: hypergraph.assigned_count(),
            cut: hypergraph.cut(),
            km1: hypergraph.km1(),
            partition: hypergraph.part_ids().to_vec(),
        }
    }
}

/// Writes checkpoints to `context.output.checkpoint_filename`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCheckpointStore;

impl CheckpointSink for JsonCheckpointStore {
    fn write(&self, context: &PartitionContext, hypergraph: &Hypergraph) -> Result<PathBuf> {
        let path = context.output.checkpoint_filename.clone();
        let document = CheckpointDocument::capture(&context.partition, hypergraph);
        write_checkpoint(&path, &document)?;
        Ok(path)
    }
}

/// Load a checkpoint from disk.
pub fn load_checkpoint(path: &Path) -> Result<CheckpointDocument> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read checkpoint {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse checkpoint {}", path.display()))
}

/// Atomically write a checkpoint to disk (temp file + rename).
pub fn write_checkpoint(path: &Path, document: &CheckpointDocument) -> Result<()> {
    debug!(path = %path.display(), assigned = document.assigned, "writing checkpoint");
    let mut buf = serde_json::to_string_pretty(document).context("serialize checkpoint")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp checkpoint {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace checkpoint {}", path.display()))?;
    Ok(())
}
