//! Engine presets stored as TOML (`--preset <file>`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Engine tuning knobs (TOML).
///
/// Missing fields default to the values used when no preset is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EnginePreset {
    pub initial: InitialPreset,
    pub refinement: RefinementPreset,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InitialPreset {
    /// Keep nodes with the same community hint together when they fit.
    pub use_community_hints: bool,
}

impl Default for InitialPreset {
    fn default() -> Self {
        Self {
            use_community_hints: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RefinementPreset {
    /// Upper bound on label-propagation rounds.
    pub max_rounds: u32,

    /// Scale hyperedge weights by the element value series.
    pub use_element_values: bool,
}

impl Default for RefinementPreset {
    fn default() -> Self {
        Self {
            max_rounds: 16,
            use_element_values: true,
        }
    }
}

impl EnginePreset {
    pub fn validate(&self) -> Result<()> {
        if self.refinement.max_rounds == 0 {
            return Err(anyhow!("refinement.max_rounds must be > 0"));
        }
        Ok(())
    }
}

/// Load a preset from a TOML file. The file must exist.
pub fn load_preset(path: &Path) -> Result<EnginePreset> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read preset {}", path.display()))?;
    let preset: EnginePreset =
        toml::from_str(&contents).with_context(|| format!("parse preset {}", path.display()))?;
    preset
        .validate()
        .with_context(|| format!("validate preset {}", path.display()))?;
    Ok(preset)
}
