//! Test-only helpers: fixture files, a small hypergraph, a recording sink.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::checkpoint::CheckpointSink;
use crate::context::{
    OutputParams, PartitionContext, PartitionParams, default_checkpoint_filename,
    default_partition_filename,
};
use crate::core::hypergraph::Hypergraph;
use crate::io::hypergraph::parse_hmetis;

/// Seven nodes, four hyperedges: {1,3} {1,2,4,5} {4,5,7} {3,6,7} (1-based).
pub const SAMPLE_HGR: &str = "% sample hypergraph\n4 7\n1 3\n1 2 4 5\n4 5 7\n3 6 7\n";

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

/// [`SAMPLE_HGR`] built for a `k`-way partition.
pub fn sample_hypergraph(k: usize) -> Hypergraph {
    parse_hmetis(SAMPLE_HGR, k, true, true).expect("sample hypergraph")
}

/// A 2-way km1 context with a fixed seed and default outputs for `graph`.
pub fn sample_context(graph: &str) -> PartitionContext {
    let partition = PartitionParams {
        graph_filename: PathBuf::from(graph),
        k: 2,
        epsilon: 0.03,
        seed: 42,
        ..PartitionParams::default()
    };
    let output = OutputParams {
        write_partition: false,
        partition_filename: default_partition_filename(&partition),
        checkpoint_filename: default_checkpoint_filename(&partition),
        quiet: true,
    };
    PartitionContext {
        partition,
        output,
        ..PartitionContext::default()
    }
}

/// Sink that records invocations instead of writing files.
#[derive(Clone, Default)]
pub struct CountingSink {
    assigned: Arc<Mutex<Vec<usize>>>,
}

impl CountingSink {
    pub fn count(&self) -> usize {
        self.assigned.lock().expect("sink lock").len()
    }

    /// Assigned node count seen by the most recent write.
    pub fn last_assigned(&self) -> Option<usize> {
        self.assigned.lock().expect("sink lock").last().copied()
    }
}

impl CheckpointSink for CountingSink {
    fn write(&self, _context: &PartitionContext, hypergraph: &Hypergraph) -> Result<PathBuf> {
        self.assigned
            .lock()
            .expect("sink lock")
            .push(hypergraph.assigned_count());
        Ok(PathBuf::from("counting-sink"))
    }
}
