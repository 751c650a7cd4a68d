//! Fatal startup errors detected before the partitioning engine runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::exit_codes;
use crate::io::auxiliary::AuxiliaryRole;

/// Errors raised by the startup sequence itself.
///
/// Failures of the delegate parser, the hypergraph reader, and the engine are
/// owned by those components and travel as plain `anyhow` errors.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Fewer than two auxiliary paths were supplied.
    #[error("expected two auxiliary files before the partitioner options, got {provided}\nusage: {program} <element-values-file> <community-file> [options...]")]
    Arguments { program: String, provided: usize },

    /// An auxiliary file could not be opened.
    #[error("unable to open {role} file {}", .path.display())]
    AuxiliaryOpen {
        role: AuxiliaryRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An auxiliary file could not be read to the end.
    #[error("unable to read {role} file {}", .path.display())]
    AuxiliaryRead {
        role: AuxiliaryRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An auxiliary token is not a floating-point number.
    #[error("malformed value {token:?} in {role} file {} (line {line})", .path.display())]
    AuxiliaryParse {
        role: AuxiliaryRole,
        path: PathBuf,
        line: usize,
        token: String,
    },
}

impl StartupError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Arguments { .. } => exit_codes::USAGE,
            StartupError::AuxiliaryOpen { .. }
            | StartupError::AuxiliaryRead { .. }
            | StartupError::AuxiliaryParse { .. } => exit_codes::FAILURE,
        }
    }
}
