//! Loading of the whitespace-separated auxiliary value files.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::StartupError;

/// Which of the two leading auxiliary files a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryRole {
    /// Per-element raw values (`argv[1]`).
    ElementValues,
    /// Community/grouping hints (`argv[2]`).
    CommunityHints,
}

impl fmt::Display for AuxiliaryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuxiliaryRole::ElementValues => write!(f, "ER"),
            AuxiliaryRole::CommunityHints => write!(f, "idx"),
        }
    }
}

/// Ordered floating-point values, index-aligned to hypergraph elements.
///
/// Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryValueSeries {
    values: Vec<f64>,
}

impl AuxiliaryValueSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Both auxiliary series, as handed to the partitioning engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryData {
    pub element_values: AuxiliaryValueSeries,
    pub community_hints: AuxiliaryValueSeries,
}

/// Open `path` and read every whitespace-separated token as an `f64`.
///
/// The file handle is released before returning, on success and on error.
#[instrument(skip_all, fields(role = %role, path = %path.display()))]
pub fn load_series(role: AuxiliaryRole, path: &Path) -> Result<AuxiliaryValueSeries, StartupError> {
    let file = File::open(path).map_err(|source| StartupError::AuxiliaryOpen {
        role,
        path: path.to_path_buf(),
        source,
    })?;
    let series = parse_series(role, path, BufReader::new(file))?;
    debug!(len = series.len(), "auxiliary series loaded");
    Ok(series)
}

/// Parse a series from any buffered reader. `path` is only used for diagnostics.
pub fn parse_series<R: BufRead>(
    role: AuxiliaryRole,
    path: &Path,
    reader: R,
) -> Result<AuxiliaryValueSeries, StartupError> {
    let mut values = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| StartupError::AuxiliaryRead {
            role,
            path: path.to_path_buf(),
            source,
        })?;
        for token in line.split_whitespace() {
            // `inf` and `nan` parse as f64 but are not numeric tokens here.
            let value = token
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| StartupError::AuxiliaryParse {
                    role,
                    path: path.to_path_buf(),
                    line: index + 1,
                    token: token.to_string(),
                })?;
            values.push(value);
        }
    }
    Ok(AuxiliaryValueSeries::new(values))
}
