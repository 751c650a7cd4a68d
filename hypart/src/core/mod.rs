//! Deterministic, pure logic shared by the partitioner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod args;
pub mod hypergraph;
pub mod initial;
pub mod refine;
pub mod types;
