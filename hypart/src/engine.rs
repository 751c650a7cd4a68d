//! The partitioning engine: initial assignment followed by refinement rounds.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument, warn};

use crate::context::PartitionContext;
use crate::core::hypergraph::Hypergraph;
use crate::core::initial::assign_initial_partition;
use crate::core::refine::{RefinementRound, refine_round};
use crate::core::types::{NodeId, Objective};
use crate::io::auxiliary::AuxiliaryValueSeries;
use crate::io::hypergraph::write_partition_file;

/// Quality figures of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSummary {
    pub objective: Objective,
    pub cut: i64,
    pub km1: i64,
    pub imbalance: f64,
    pub part_weights: Vec<i64>,
    pub rounds: u32,
    pub moves: usize,
    pub elapsed: Duration,
}

impl fmt::Display for PartitionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "objective={} cut={} km1={} imbalance={:.5} rounds={} moves={} elapsed_ms={}",
            self.objective,
            self.cut,
            self.km1,
            self.imbalance,
            self.rounds,
            self.moves,
            self.elapsed.as_millis()
        )
    }
}

/// Single blocking entry point of a partitioner.
///
/// Implementations should hold the hypergraph lock for bounded phases only,
/// so a checkpoint can run between them.
pub trait PartitionEngine {
    fn partition(
        &self,
        hypergraph: &Mutex<Hypergraph>,
        context: &PartitionContext,
    ) -> Result<PartitionSummary>;
}

/// Community-aware greedy assignment plus label-propagation refinement.
pub struct LocalSearchEngine;

impl PartitionEngine for LocalSearchEngine {
    #[instrument(skip_all, fields(k = context.partition.k, objective = %context.partition.objective))]
    fn partition(
        &self,
        hypergraph: &Mutex<Hypergraph>,
        context: &PartitionContext,
    ) -> Result<PartitionSummary> {
        let start = Instant::now();
        let params = &context.partition;
        let preset = &context.preset;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let (max_part_weight, ratings, num_nodes) = {
            let mut graph = lock(hypergraph)?;
            if graph.k() != params.k {
                bail!(
                    "hypergraph was built for {} blocks but the context asks for {}",
                    graph.k(),
                    params.k
                );
            }
            let max_part_weight = graph.max_part_weight(params.epsilon);
            let communities = if preset.initial.use_community_hints {
                community_ids(&context.auxiliary.community_hints, graph.num_nodes())
            } else {
                None
            };
            let ratings = if preset.refinement.use_element_values {
                edge_ratings(&context.auxiliary.element_values, graph.num_edges())
            } else {
                Vec::new()
            };
            let whole =
                assign_initial_partition(&mut graph, communities.as_deref(), max_part_weight);
            info!(
                max_part_weight,
                communities = communities.is_some(),
                groups_placed_whole = whole,
                km1 = graph.km1(),
                "initial partition assigned"
            );
            (max_part_weight, ratings, graph.num_nodes())
        };

        let mut order: Vec<NodeId> = (0..num_nodes).collect();
        let mut rounds = 0;
        let mut moves = 0;
        for _ in 0..preset.refinement.max_rounds {
            order.shuffle(&mut rng);
            let moved = {
                let mut graph = lock(hypergraph)?;
                refine_round(
                    &mut graph,
                    &RefinementRound {
                        objective: params.objective,
                        ratings: &ratings,
                        max_part_weight,
                        order: &order,
                    },
                )
            };
            rounds += 1;
            moves += moved;
            debug!(round = rounds, moved, "refinement round finished");
            if moved == 0 {
                break;
            }
        }

        let graph = lock(hypergraph)?;
        if context.output.write_partition {
            write_partition_file(&graph, &context.output.partition_filename)?;
            info!(path = %context.output.partition_filename.display(), "partition written");
        }
        let summary = PartitionSummary {
            objective: params.objective,
            cut: graph.cut(),
            km1: graph.km1(),
            imbalance: graph.imbalance(),
            part_weights: graph.part_weights(),
            rounds,
            moves,
            elapsed: start.elapsed(),
        };
        info!(%summary, "partitioning finished");
        Ok(summary)
    }
}

fn lock(hypergraph: &Mutex<Hypergraph>) -> Result<MutexGuard<'_, Hypergraph>> {
    hypergraph
        .lock()
        .map_err(|_| anyhow!("hypergraph lock poisoned"))
}

/// Interpret the community series as one non-negative integer id per node.
///
/// Returns `None` (with a warning for non-empty input) when the series does
/// not line up with the nodes.
pub fn community_ids(series: &AuxiliaryValueSeries, num_nodes: usize) -> Option<Vec<usize>> {
    if series.is_empty() {
        return None;
    }
    if series.len() != num_nodes {
        warn!(
            len = series.len(),
            num_nodes, "community hints do not match node count; ignoring"
        );
        return None;
    }
    let ids: Option<Vec<usize>> = series
        .values()
        .iter()
        .map(|&value| {
            (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as usize)
        })
        .collect();
    if ids.is_none() {
        warn!("community hints must be non-negative integers; ignoring");
    }
    ids
}

/// Interpret the element value series as one weight multiplier per hyperedge.
///
/// Returns an empty vector (neutral ratings) when the series does not line up.
pub fn edge_ratings(series: &AuxiliaryValueSeries, num_edges: usize) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    if series.len() != num_edges {
        warn!(
            len = series.len(),
            num_edges, "element values do not match hyperedge count; ignoring"
        );
        return Vec::new();
    }
    if series
        .values()
        .iter()
        .any(|value| !value.is_finite() || *value < 0.0)
    {
        warn!("element values must be finite and non-negative; ignoring");
        return Vec::new();
    }
    series.values().to_vec()
}
