//! Balanced initial assignment, optionally keeping communities together.

use std::collections::BTreeMap;

use super::hypergraph::Hypergraph;
use super::types::{NodeId, PartId};

/// Assign every node of `hypergraph` to a part.
///
/// Nodes sharing a community id form a group; without communities every node
/// is its own group. Groups are placed heaviest first into the currently
/// lightest part when the whole group fits under `max_part_weight`, otherwise
/// their nodes are spread one by one over the lightest parts.
///
/// Returns the number of groups placed whole.
pub fn assign_initial_partition(
    hypergraph: &mut Hypergraph,
    communities: Option<&[usize]>,
    max_part_weight: i64,
) -> usize {
    hypergraph.reset_partition();
    let groups = build_groups(hypergraph, communities);
    let mut loads = vec![0i64; hypergraph.k()];
    let mut placed_whole = 0;

    for group in groups {
        let weight: i64 = group.iter().map(|&node| hypergraph.node_weight(node)).sum();
        let target = lightest_part(&loads);
        if loads[target] + weight <= max_part_weight {
            for &node in &group {
                hypergraph.set_part(node, target);
            }
            loads[target] += weight;
            placed_whole += 1;
            continue;
        }
        for node in group {
            let target = lightest_part(&loads);
            hypergraph.set_part(node, target);
            loads[target] += hypergraph.node_weight(node);
        }
    }

    placed_whole
}

fn build_groups(hypergraph: &Hypergraph, communities: Option<&[usize]>) -> Vec<Vec<NodeId>> {
    let mut groups: Vec<Vec<NodeId>> = match communities {
        Some(ids) => {
            let mut by_id: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
            for (node, &id) in ids.iter().enumerate().take(hypergraph.num_nodes()) {
                by_id.entry(id).or_default().push(node);
            }
            by_id.into_values().collect()
        }
        None => (0..hypergraph.num_nodes()).map(|node| vec![node]).collect(),
    };
    // Stable sort keeps the id/index order among equally heavy groups.
    groups.sort_by_key(|group| {
        std::cmp::Reverse(group.iter().map(|&node| hypergraph.node_weight(node)).sum::<i64>())
    });
    groups
}

fn lightest_part(loads: &[i64]) -> PartId {
    loads
        .iter()
        .enumerate()
        .min_by_key(|(part, load)| (**load, *part))
        .map(|(part, _)| part)
        .unwrap_or(0)
}
