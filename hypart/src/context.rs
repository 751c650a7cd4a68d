//! Partition configuration and the command-line parser that fills it.
//!
//! The parser only ever sees the compacted argument list (program name
//! followed by everything after the two auxiliary paths).

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{ArgAction, ArgGroup, Parser};
use serde::Serialize;
use tracing::debug;

use crate::core::types::Objective;
use crate::io::auxiliary::AuxiliaryData;
use crate::io::preset::{EnginePreset, load_preset};

/// Parameters describing what to partition and under which constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionParams {
    pub graph_filename: PathBuf,
    pub k: usize,
    pub epsilon: f64,
    pub objective: Objective,
    pub seed: u64,
}

impl Default for PartitionParams {
    fn default() -> Self {
        Self {
            graph_filename: PathBuf::new(),
            k: 0,
            epsilon: 0.03,
            objective: Objective::default(),
            seed: 0,
        }
    }
}

/// Where results and checkpoints go.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputParams {
    pub write_partition: bool,
    pub partition_filename: PathBuf,
    pub checkpoint_filename: PathBuf,
    pub quiet: bool,
}

/// Full run configuration.
///
/// Starts out empty; the auxiliary series are attached by the orchestrator
/// and the remaining fields are filled by a [`DelegateParser`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionContext {
    pub partition: PartitionParams,
    pub preset: EnginePreset,
    pub output: OutputParams,
    pub auxiliary: AuxiliaryData,
}

/// Populates a [`PartitionContext`] from an argument list whose first entry
/// is the program name.
pub trait DelegateParser {
    fn parse(&self, context: &mut PartitionContext, args: &[OsString]) -> Result<()>;
}

/// The `hypart` option parser.
pub struct CommandLineParser;

impl DelegateParser for CommandLineParser {
    fn parse(&self, context: &mut PartitionContext, args: &[OsString]) -> Result<()> {
        process_command_line_input(context, args)
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "hypart",
    version,
    about = "Balanced k-way hypergraph partitioning",
    override_usage = "hypart <ELEMENT_VALUES> <COMMUNITIES> [OPTIONS] <--hypergraph <FILE>|HYPERGRAPH>",
    disable_help_flag = true
)]
#[command(group(ArgGroup::new("input").required(true).args(["hypergraph", "graph"])))]
struct DelegateArgs {
    /// Hypergraph file (hMetis format).
    #[arg(short = 'h', long = "hypergraph", value_name = "FILE")]
    hypergraph: Option<PathBuf>,

    /// Hypergraph file given positionally.
    #[arg(value_name = "HYPERGRAPH")]
    graph: Option<PathBuf>,

    /// Number of blocks.
    #[arg(short = 'k', long = "blocks", value_parser = parse_blocks)]
    k: usize,

    /// Allowed imbalance.
    #[arg(short = 'e', long = "epsilon", default_value_t = 0.03, value_parser = parse_epsilon)]
    epsilon: f64,

    /// Objective to minimize.
    #[arg(short = 'o', long = "objective", value_enum, default_value_t = Objective::Km1)]
    objective: Objective,

    /// Random seed (random if omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Engine preset (TOML).
    #[arg(short = 'p', long = "preset", value_name = "FILE")]
    preset: Option<PathBuf>,

    /// Override the preset's refinement round limit.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    refinement_rounds: Option<u32>,

    /// Write the partition to a file.
    #[arg(short = 'w', long = "write-partition")]
    write_partition: bool,

    /// Partition output path.
    #[arg(long, value_name = "FILE")]
    partition_file: Option<PathBuf>,

    /// Checkpoint path used when interrupted.
    #[arg(long, value_name = "FILE")]
    checkpoint: Option<PathBuf>,

    /// Suppress the result summary.
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Print help.
    #[arg(long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

fn parse_blocks(raw: &str) -> Result<usize, String> {
    let k: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a block count"))?;
    if k < 2 {
        return Err(format!("need at least 2 blocks, got {k}"));
    }
    Ok(k)
}

fn parse_epsilon(raw: &str) -> Result<f64, String> {
    let epsilon: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(format!("epsilon must be finite and >= 0, got {raw}"));
    }
    Ok(epsilon)
}

/// Parse `args` and populate everything in `context` except the auxiliary data.
///
/// Usage errors are returned as `clap::Error` so the caller can let clap
/// render them with its own exit code.
pub fn process_command_line_input(context: &mut PartitionContext, args: &[OsString]) -> Result<()> {
    let parsed = DelegateArgs::try_parse_from(args)?;

    let mut preset = match &parsed.preset {
        Some(path) => load_preset(path)?,
        None => EnginePreset::default(),
    };
    if let Some(rounds) = parsed.refinement_rounds {
        preset.refinement.max_rounds = rounds;
    }

    let graph_filename = parsed
        .hypergraph
        .or(parsed.graph)
        .ok_or_else(|| anyhow!("no hypergraph file given"))?;
    let seed = parsed.seed.unwrap_or_else(rand::random);

    context.partition = PartitionParams {
        graph_filename,
        k: parsed.k,
        epsilon: parsed.epsilon,
        objective: parsed.objective,
        seed,
    };
    context.output = OutputParams {
        write_partition: parsed.write_partition,
        partition_filename: parsed
            .partition_file
            .unwrap_or_else(|| default_partition_filename(&context.partition)),
        checkpoint_filename: parsed
            .checkpoint
            .unwrap_or_else(|| default_checkpoint_filename(&context.partition)),
        quiet: parsed.quiet,
    };
    context.preset = preset;

    debug!(
        graph = %context.partition.graph_filename.display(),
        k = context.partition.k,
        epsilon = context.partition.epsilon,
        objective = %context.partition.objective,
        seed = context.partition.seed,
        "command line parsed"
    );
    Ok(())
}

/// `<graph>.part<k>.epsilon<eps>.seed<seed>.hypart`
pub fn default_partition_filename(params: &PartitionParams) -> PathBuf {
    with_suffix(
        &params.graph_filename,
        &format!(
            ".part{}.epsilon{}.seed{}.hypart",
            params.k, params.epsilon, params.seed
        ),
    )
}

/// `<graph>.part<k>.checkpoint.json`
pub fn default_checkpoint_filename(params: &PartitionParams) -> PathBuf {
    with_suffix(
        &params.graph_filename,
        &format!(".part{}.checkpoint.json", params.k),
    )
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(OsStr::new(suffix));
    PathBuf::from(name)
}
