//! The startup sequence: auxiliary files, delegate parsing, hypergraph
//! construction, checkpoint arming, and a single engine call.
//!
//! Every step runs once, in order. Failures before the engine starts leave
//! nothing behind; an interrupt during the engine call is turned into a
//! checkpoint by the [`SignalBridge`].

use std::ffi::OsString;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::checkpoint::{CheckpointRegistry, CheckpointSink, RegistryState, SharedHypergraph};
use crate::context::{CommandLineParser, DelegateParser, PartitionContext};
use crate::core::args::split_auxiliary_arguments;
use crate::engine::{LocalSearchEngine, PartitionEngine, PartitionSummary};
use crate::io::auxiliary::{AuxiliaryData, AuxiliaryRole, load_series};
use crate::io::hypergraph::{HmetisLoader, HypergraphLoader};
use crate::signal::SignalBridge;

/// Reject malformed hypergraph files instead of guessing.
pub const VALIDATE_INPUT: bool = true;
/// Treat hypergraph validation warnings as fatal.
pub const PROMOTE_WARNINGS_TO_ERRORS: bool = false;

/// The replaceable components the startup sequence drives.
pub struct Collaborators<P, L, E> {
    pub parser: P,
    pub loader: L,
    pub engine: E,
}

impl Collaborators<CommandLineParser, HmetisLoader, LocalSearchEngine> {
    pub fn standard() -> Self {
        Self {
            parser: CommandLineParser,
            loader: HmetisLoader,
            engine: LocalSearchEngine,
        }
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: PartitionSummary,
    pub context: Arc<PartitionContext>,
    /// Registry state after the engine returned (normally `Disarmed`).
    pub registry_state: RegistryState,
}

/// Run the full startup sequence on the raw process arguments.
///
/// `args[1]` and `args[2]` name the element value and community files; the
/// parser only sees `args[0]` followed by `args[3..]`.
#[instrument(skip_all)]
pub fn run<P, L, E, S>(
    args: Vec<OsString>,
    collaborators: &Collaborators<P, L, E>,
    sink: S,
) -> Result<RunOutcome>
where
    P: DelegateParser,
    L: HypergraphLoader,
    E: PartitionEngine,
    S: CheckpointSink + 'static,
{
    let mut context = PartitionContext::default();
    let split = split_auxiliary_arguments(args)?;

    let element_values = load_series(
        AuxiliaryRole::ElementValues,
        Path::new(&split.element_values),
    )?;
    let community_hints = load_series(
        AuxiliaryRole::CommunityHints,
        Path::new(&split.community_hints),
    )?;
    debug!(
        element_values = element_values.len(),
        community_hints = community_hints.len(),
        "auxiliary series loaded"
    );
    context.auxiliary = AuxiliaryData {
        element_values,
        community_hints,
    };

    collaborators.parser.parse(&mut context, &split.delegate)?;

    let hypergraph = collaborators.loader.load(
        &context.partition.graph_filename,
        context.partition.k,
        VALIDATE_INPUT,
        PROMOTE_WARNINGS_TO_ERRORS,
    )?;
    info!(
        nodes = hypergraph.num_nodes(),
        edges = hypergraph.num_edges(),
        k = context.partition.k,
        "hypergraph constructed"
    );

    let context = Arc::new(context);
    let hypergraph: SharedHypergraph = Arc::new(Mutex::new(hypergraph));
    let registry = Arc::new(CheckpointRegistry::new(sink));
    registry.arm(&context, &hypergraph)?;
    let bridge = SignalBridge::install(Arc::clone(&registry))?;

    let result = collaborators.engine.partition(&hypergraph, &context);

    registry.disarm();
    bridge.shutdown()?;
    let summary = result?;

    Ok(RunOutcome {
        summary,
        registry_state: registry.state(),
        context,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::hypergraph::Hypergraph;
    use crate::error::StartupError;
    use crate::exit_codes;
    use crate::test_support::{CountingSink, SAMPLE_HGR, write_file};

    /// Records the arguments it receives and then defers to the real parser.
    #[derive(Default)]
    struct RecordingParser {
        seen: RefCell<Vec<OsString>>,
    }

    impl DelegateParser for RecordingParser {
        fn parse(&self, context: &mut PartitionContext, args: &[OsString]) -> Result<()> {
            self.seen.borrow_mut().extend(args.iter().cloned());
            CommandLineParser.parse(context, args)
        }
    }

    /// Captures the auxiliary data the engine sees, then partitions normally.
    #[derive(Default)]
    struct ProbeEngine {
        seen: RefCell<Option<AuxiliaryData>>,
    }

    impl PartitionEngine for ProbeEngine {
        fn partition(
            &self,
            hypergraph: &Mutex<Hypergraph>,
            context: &PartitionContext,
        ) -> Result<PartitionSummary> {
            *self.seen.borrow_mut() = Some(context.auxiliary.clone());
            LocalSearchEngine.partition(hypergraph, context)
        }
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn scenario_loads_series_and_forwards_remaining_arguments() {
        let temp = tempfile::tempdir().expect("tempdir");
        let edge = write_file(temp.path(), "edge.txt", "1.0 2.0 3.0");
        let idx = write_file(temp.path(), "idx.txt", "0 1 0");
        let graph = write_file(temp.path(), "graph.hgr", SAMPLE_HGR);
        let edge = edge.to_string_lossy().into_owned();
        let idx = idx.to_string_lossy().into_owned();
        let graph = graph.to_string_lossy().into_owned();

        let collaborators = Collaborators {
            parser: RecordingParser::default(),
            loader: HmetisLoader,
            engine: ProbeEngine::default(),
        };
        let outcome = run(
            os(&["prog", &edge, &idx, "-k", "2", "--seed", "1", &graph]),
            &collaborators,
            CountingSink::default(),
        )
        .expect("run");

        assert_eq!(
            *collaborators.parser.seen.borrow(),
            os(&["prog", "-k", "2", "--seed", "1", &graph])
        );
        let auxiliary = collaborators.engine.seen.borrow().clone().expect("engine ran");
        assert_eq!(auxiliary.element_values.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(auxiliary.community_hints.values(), &[0.0, 1.0, 0.0]);
        assert_eq!(outcome.registry_state, RegistryState::Disarmed);
        assert_eq!(outcome.context.partition.k, 2);
    }

    #[test]
    fn missing_element_file_stops_before_community_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing_edge = temp.path().join("edge.txt").to_string_lossy().into_owned();
        let missing_idx = temp.path().join("idx.txt").to_string_lossy().into_owned();

        let err = run(
            os(&["prog", &missing_edge, &missing_idx, "-k", "2", "g.hgr"]),
            &Collaborators::standard(),
            CountingSink::default(),
        )
        .expect_err("missing file");
        let startup = err.downcast_ref::<StartupError>().expect("startup error");
        match startup {
            StartupError::AuxiliaryOpen { role, .. } => {
                assert_eq!(*role, AuxiliaryRole::ElementValues);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(startup.exit_code(), exit_codes::FAILURE);
        assert!(err.to_string().contains("unable to open ER file"));
    }

    #[test]
    fn missing_community_file_names_idx() {
        let temp = tempfile::tempdir().expect("tempdir");
        let edge = write_file(temp.path(), "edge.txt", "1");
        let edge = edge.to_string_lossy().into_owned();
        let missing_idx = temp.path().join("idx.txt").to_string_lossy().into_owned();

        let err = run(
            os(&["prog", &edge, &missing_idx, "-k", "2", "g.hgr"]),
            &Collaborators::standard(),
            CountingSink::default(),
        )
        .expect_err("missing file");
        assert!(err.to_string().contains("unable to open idx file"));
    }

    #[test]
    fn too_few_arguments_fails_before_any_io() {
        let err = run(
            os(&["prog", "edge.txt"]),
            &Collaborators::standard(),
            CountingSink::default(),
        )
        .expect_err("too few");
        let startup = err.downcast_ref::<StartupError>().expect("startup error");
        assert_eq!(startup.exit_code(), exit_codes::USAGE);
    }

    #[test]
    fn delegate_usage_error_passes_through() {
        let temp = tempfile::tempdir().expect("tempdir");
        let edge = write_file(temp.path(), "edge.txt", "");
        let idx = write_file(temp.path(), "idx.txt", "");
        let edge = edge.to_string_lossy().into_owned();
        let idx = idx.to_string_lossy().into_owned();

        let err = run(
            os(&["prog", &edge, &idx, "-k", "2"]),
            &Collaborators::standard(),
            CountingSink::default(),
        )
        .expect_err("no hypergraph");
        assert!(err.downcast_ref::<clap::Error>().is_some());
    }

    #[test]
    fn engine_failure_is_reported_after_disarming() {
        struct FailingEngine;
        impl PartitionEngine for FailingEngine {
            fn partition(
                &self,
                _hypergraph: &Mutex<Hypergraph>,
                _context: &PartitionContext,
            ) -> Result<PartitionSummary> {
                anyhow::bail!("engine gave up")
            }
        }

        let temp = tempfile::tempdir().expect("tempdir");
        let edge = write_file(temp.path(), "edge.txt", "");
        let idx = write_file(temp.path(), "idx.txt", "");
        let graph = write_file(temp.path(), "g.hgr", SAMPLE_HGR);
        let edge = edge.to_string_lossy().into_owned();
        let idx = idx.to_string_lossy().into_owned();
        let graph = graph.to_string_lossy().into_owned();
        let sink = CountingSink::default();
        let collaborators = Collaborators {
            parser: CommandLineParser,
            loader: HmetisLoader,
            engine: FailingEngine,
        };

        let err = run(
            os(&["prog", &edge, &idx, "-k", "2", &graph]),
            &collaborators,
            sink.clone(),
        )
        .expect_err("engine failure");
        assert!(err.to_string().contains("engine gave up"));
        assert_eq!(sink.count(), 0);
    }
}
