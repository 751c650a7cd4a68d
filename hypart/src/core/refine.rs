//! Label-propagation refinement for the cut and km1 objectives.

use super::hypergraph::Hypergraph;
use super::types::{EdgeId, NodeId, Objective, PartId};

const MIN_GAIN: f64 = 1e-9;

/// Inputs shared by every refinement round.
#[derive(Debug, Clone, Copy)]
pub struct RefinementRound<'a> {
    pub objective: Objective,
    /// Per-hyperedge multiplier applied to the edge weight.
    pub ratings: &'a [f64],
    pub max_part_weight: i64,
    /// Visiting order of the nodes.
    pub order: &'a [NodeId],
}

/// Pin counts per (hyperedge, part), kept up to date while nodes move.
struct PinCounts {
    k: usize,
    counts: Vec<u32>,
}

impl PinCounts {
    fn new(hypergraph: &Hypergraph) -> Self {
        let k = hypergraph.k();
        let mut counts = vec![0u32; hypergraph.num_edges() * k];
        for edge in 0..hypergraph.num_edges() {
            for &pin in hypergraph.pins(edge) {
                if let Some(part) = hypergraph.part_id(pin) {
                    counts[edge * k + part] += 1;
                }
            }
        }
        Self { k, counts }
    }

    fn get(&self, edge: EdgeId, part: PartId) -> u32 {
        self.counts[edge * self.k + part]
    }

    fn apply_move(&mut self, hypergraph: &Hypergraph, node: NodeId, from: PartId, to: PartId) {
        for &edge in hypergraph.incident_edges(node) {
            self.counts[edge * self.k + from] -= 1;
            self.counts[edge * self.k + to] += 1;
        }
    }
}

/// Run one pass over `round.order`, greedily moving nodes to the adjacent
/// part with the best strictly positive gain. Returns the number of moves.
///
/// Unassigned nodes are skipped.
pub fn refine_round(hypergraph: &mut Hypergraph, round: &RefinementRound<'_>) -> usize {
    let mut counts = PinCounts::new(hypergraph);
    let mut loads = hypergraph.part_weights();
    let mut moves = 0;

    for &node in round.order {
        let Some(from) = hypergraph.part_id(node) else {
            continue;
        };
        let weight = hypergraph.node_weight(node);
        let mut best: Option<(PartId, f64)> = None;

        for to in candidate_parts(hypergraph, &counts, node, from) {
            if loads[to] + weight > round.max_part_weight {
                continue;
            }
            let gain = move_gain(hypergraph, &counts, round, node, from, to);
            if gain > MIN_GAIN && best.is_none_or(|(_, best_gain)| gain > best_gain) {
                best = Some((to, gain));
            }
        }

        if let Some((to, _)) = best {
            counts.apply_move(hypergraph, node, from, to);
            loads[from] -= weight;
            loads[to] += weight;
            hypergraph.set_part(node, to);
            moves += 1;
        }
    }

    moves
}

fn candidate_parts(
    hypergraph: &Hypergraph,
    counts: &PinCounts,
    node: NodeId,
    from: PartId,
) -> Vec<PartId> {
    let mut adjacent = vec![false; hypergraph.k()];
    for &edge in hypergraph.incident_edges(node) {
        for (part, flag) in adjacent.iter_mut().enumerate() {
            if part != from && counts.get(edge, part) > 0 {
                *flag = true;
            }
        }
    }
    adjacent
        .into_iter()
        .enumerate()
        .filter_map(|(part, flag)| flag.then_some(part))
        .collect()
}

fn move_gain(
    hypergraph: &Hypergraph,
    counts: &PinCounts,
    round: &RefinementRound<'_>,
    node: NodeId,
    from: PartId,
    to: PartId,
) -> f64 {
    hypergraph
        .incident_edges(node)
        .iter()
        .map(|&edge| {
            let weight = hypergraph.edge_weight(edge) as f64 * rating(round.ratings, edge);
            let size = hypergraph.edge_size(edge) as u32;
            let in_from = counts.get(edge, from);
            let in_to = counts.get(edge, to);
            match round.objective {
                Objective::Km1 => {
                    let mut delta = 0.0;
                    if in_from == 1 {
                        delta += weight;
                    }
                    if in_to == 0 {
                        delta -= weight;
                    }
                    delta
                }
                Objective::Cut => {
                    if size > 1 && in_to == size - 1 {
                        weight
                    } else if size > 1 && in_from == size {
                        -weight
                    } else {
                        0.0
                    }
                }
            }
        })
        .sum()
}

fn rating(ratings: &[f64], edge: EdgeId) -> f64 {
    ratings.get(edge).copied().unwrap_or(1.0)
}
