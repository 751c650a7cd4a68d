//! I/O adapters for the partitioner.

pub mod auxiliary;
pub mod checkpoint_store;
pub mod hypergraph;
pub mod preset;
