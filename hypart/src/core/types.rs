//! Shared deterministic types for the partitioner core.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type NodeId = usize;
pub type EdgeId = usize;
pub type PartId = usize;

/// Quantity minimized by refinement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Total weight of hyperedges spanning more than one part.
    Cut,
    /// Connectivity minus one: sum of `w(e) * (lambda(e) - 1)`.
    #[default]
    Km1,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Cut => write!(f, "cut"),
            Objective::Km1 => write!(f, "km1"),
        }
    }
}
