//! In-memory hypergraph with an attached (possibly partial) partition.

use anyhow::{Result, bail};

use super::types::{EdgeId, NodeId, PartId};

/// A weighted hypergraph in CSR form.
///
/// Pins of hyperedge `e` live in `pins[edge_offsets[e]..edge_offsets[e + 1]]`,
/// incident hyperedges of node `v` in
/// `incident[incident_offsets[v]..incident_offsets[v + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypergraph {
    k: usize,
    node_weights: Vec<i64>,
    edge_weights: Vec<i64>,
    edge_offsets: Vec<usize>,
    pins: Vec<NodeId>,
    incident_offsets: Vec<usize>,
    incident: Vec<EdgeId>,
    part_ids: Vec<Option<PartId>>,
}

impl Hypergraph {
    /// Build a hypergraph for a `k`-way partition.
    ///
    /// `k` must lie in `2..=num_nodes`. Pins must be in range; duplicate pins
    /// are the caller's responsibility.
    pub fn new(
        k: usize,
        node_weights: Vec<i64>,
        edges: Vec<Vec<NodeId>>,
        edge_weights: Vec<i64>,
    ) -> Result<Self> {
        if k < 2 {
            bail!("number of blocks must be at least 2, got {k}");
        }
        if edges.len() != edge_weights.len() {
            bail!(
                "edge weight count {} does not match edge count {}",
                edge_weights.len(),
                edges.len()
            );
        }
        let num_nodes = node_weights.len();
        if k > num_nodes {
            bail!("cannot split {num_nodes} nodes into {k} blocks");
        }

        let mut edge_offsets = Vec::with_capacity(edges.len() + 1);
        let mut pins = Vec::new();
        let mut degrees = vec![0usize; num_nodes];
        edge_offsets.push(0);
        for (edge, edge_pins) in edges.iter().enumerate() {
            for &pin in edge_pins {
                if pin >= num_nodes {
                    bail!("hyperedge {edge} references node {pin}, but only {num_nodes} nodes exist");
                }
                degrees[pin] += 1;
                pins.push(pin);
            }
            edge_offsets.push(pins.len());
        }

        let mut incident_offsets = Vec::with_capacity(num_nodes + 1);
        incident_offsets.push(0);
        for degree in &degrees {
            let last = incident_offsets[incident_offsets.len() - 1];
            incident_offsets.push(last + degree);
        }
        let mut cursor = incident_offsets[..num_nodes].to_vec();
        let mut incident = vec![0; pins.len()];
        for (edge, edge_pins) in edges.iter().enumerate() {
            for &pin in edge_pins {
                incident[cursor[pin]] = edge;
                cursor[pin] += 1;
            }
        }

        Ok(Self {
            k,
            node_weights,
            edge_weights,
            edge_offsets,
            pins,
            incident_offsets,
            incident,
            part_ids: vec![None; num_nodes],
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn num_nodes(&self) -> usize {
        self.node_weights.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_weights.len()
    }

    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    pub fn node_weight(&self, node: NodeId) -> i64 {
        self.node_weights[node]
    }

    pub fn edge_weight(&self, edge: EdgeId) -> i64 {
        self.edge_weights[edge]
    }

    pub fn total_weight(&self) -> i64 {
        self.node_weights.iter().sum()
    }

    pub fn pins(&self, edge: EdgeId) -> &[NodeId] {
        &self.pins[self.edge_offsets[edge]..self.edge_offsets[edge + 1]]
    }

    pub fn edge_size(&self, edge: EdgeId) -> usize {
        self.edge_offsets[edge + 1] - self.edge_offsets[edge]
    }

    pub fn incident_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.incident[self.incident_offsets[node]..self.incident_offsets[node + 1]]
    }

    pub fn part_id(&self, node: NodeId) -> Option<PartId> {
        self.part_ids[node]
    }

    pub fn part_ids(&self) -> &[Option<PartId>] {
        &self.part_ids
    }

    pub fn set_part(&mut self, node: NodeId, part: PartId) {
        debug_assert!(part < self.k);
        self.part_ids[node] = Some(part);
    }

    /// Drop any existing assignment.
    pub fn reset_partition(&mut self) {
        self.part_ids.iter_mut().for_each(|part| *part = None);
    }

    pub fn assigned_count(&self) -> usize {
        self.part_ids.iter().filter(|part| part.is_some()).count()
    }

    /// Largest part weight that still satisfies the balance constraint:
    /// `floor((1 + epsilon) * ceil(W / k))`.
    pub fn max_part_weight(&self, epsilon: f64) -> i64 {
        let k = self.k as i64;
        let perfect = (self.total_weight() + k - 1) / k;
        ((1.0 + epsilon) * perfect as f64).floor() as i64
    }

    /// Total node weight assigned to each part. Unassigned nodes are skipped.
    pub fn part_weights(&self) -> Vec<i64> {
        let mut loads = vec![0; self.k];
        for (node, part) in self.part_ids.iter().enumerate() {
            if let Some(part) = part {
                loads[*part] += self.node_weights[node];
            }
        }
        loads
    }

    /// Number of distinct parts the pins of `edge` are assigned to.
    pub fn connectivity(&self, edge: EdgeId) -> usize {
        let mut seen = vec![false; self.k];
        let mut lambda = 0;
        for &pin in self.pins(edge) {
            if let Some(part) = self.part_ids[pin]
                && !seen[part]
            {
                seen[part] = true;
                lambda += 1;
            }
        }
        lambda
    }

    /// Sum of weights of hyperedges spanning more than one part.
    pub fn cut(&self) -> i64 {
        (0..self.num_edges())
            .filter(|&edge| self.connectivity(edge) > 1)
            .map(|edge| self.edge_weights[edge])
            .sum()
    }

    /// Sum over hyperedges of `w(e) * (lambda(e) - 1)`.
    pub fn km1(&self) -> i64 {
        (0..self.num_edges())
            .map(|edge| {
                let lambda = self.connectivity(edge) as i64;
                self.edge_weights[edge] * (lambda - 1).max(0)
            })
            .sum()
    }

    /// Maximum relative deviation of a part weight above the ideal `W / k`.
    pub fn imbalance(&self) -> f64 {
        let ideal = self.total_weight() as f64 / self.k as f64;
        if ideal == 0.0 {
            return 0.0;
        }
        self.part_weights()
            .into_iter()
            .map(|weight| (weight as f64 - ideal) / ideal)
            .fold(0.0f64, |acc, deviation| acc.max(deviation))
    }
}
