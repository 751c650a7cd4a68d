//! Startup shim for a hypergraph partitioner that takes two auxiliary
//! numeric side files ahead of its regular options.
//!
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (argument compaction, the
//!   hypergraph model and its metrics, initial assignment, refinement).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (auxiliary series, hMetis files,
//!   presets, checkpoint storage).
//!
//! Orchestration modules ([`orchestrator`], [`engine`], [`checkpoint`],
//! [`signal`]) sequence core logic with I/O and own the interrupt path.

pub mod checkpoint;
pub mod context;
pub mod core;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod orchestrator;
pub mod signal;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
