//! hMetis hypergraph files and partition output.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};

use crate::core::hypergraph::Hypergraph;
use crate::core::types::NodeId;

/// Builds the hypergraph the engine will partition.
pub trait HypergraphLoader {
    fn load(
        &self,
        path: &Path,
        k: usize,
        validate: bool,
        promote_warnings_to_errors: bool,
    ) -> Result<Hypergraph>;
}

/// Reads hypergraphs in the hMetis text format.
pub struct HmetisLoader;

impl HypergraphLoader for HmetisLoader {
    fn load(
        &self,
        path: &Path,
        k: usize,
        validate: bool,
        promote_warnings_to_errors: bool,
    ) -> Result<Hypergraph> {
        create_hypergraph_from_file(path, k, validate, promote_warnings_to_errors)
    }
}

/// Largest hyperedge or node count a header may declare (32-bit ids).
const MAX_ELEMENTS: u64 = u32::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Format {
    edge_weights: bool,
    node_weights: bool,
}

impl Format {
    fn from_code(code: u64) -> Result<Self> {
        let (edge_weights, node_weights) = match code {
            0 => (false, false),
            1 => (true, false),
            10 => (false, true),
            11 => (true, true),
            other => bail!("unsupported hMetis format code {other}"),
        };
        Ok(Self {
            edge_weights,
            node_weights,
        })
    }
}

/// Read and validate an hMetis file.
///
/// With `validate`, duplicate pins are removed and empty hyperedges are
/// reported; each finding is logged as a warning, or returned as an error
/// when `promote_warnings_to_errors` is set.
#[instrument(skip_all, fields(path = %path.display(), k))]
pub fn create_hypergraph_from_file(
    path: &Path,
    k: usize,
    validate: bool,
    promote_warnings_to_errors: bool,
) -> Result<Hypergraph> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read hypergraph {}", path.display()))?;
    let hypergraph = parse_hmetis(&contents, k, validate, promote_warnings_to_errors)
        .with_context(|| format!("parse hypergraph {}", path.display()))?;
    debug!(
        nodes = hypergraph.num_nodes(),
        edges = hypergraph.num_edges(),
        pins = hypergraph.num_pins(),
        "hypergraph loaded"
    );
    Ok(hypergraph)
}

/// Parse hMetis text. Line numbers in errors are 1-based.
pub fn parse_hmetis(
    contents: &str,
    k: usize,
    validate: bool,
    promote_warnings_to_errors: bool,
) -> Result<Hypergraph> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('%'));

    let (header_line, header) = lines.next().ok_or_else(|| anyhow!("missing header line"))?;
    let header = parse_numbers::<u64>(header, header_line)?;
    let (num_edges, num_nodes, format) = match header.as_slice() {
        [edges, nodes] => (*edges, *nodes, Format::from_code(0)?),
        [edges, nodes, code] => (*edges, *nodes, Format::from_code(*code)?),
        _ => bail!("line {header_line}: header must be `<edges> <nodes> [fmt]`"),
    };
    if num_edges > MAX_ELEMENTS || num_nodes > MAX_ELEMENTS {
        bail!(
            "line {header_line}: header declares {num_edges} hyperedges and {num_nodes} nodes, \
             at most {MAX_ELEMENTS} of each are supported"
        );
    }
    let (num_edges, num_nodes) = (num_edges as usize, num_nodes as usize);
    // Header counts are unchecked until the body is read; never size buffers past the input.
    let line_count = contents.lines().count();

    let mut warnings = Vec::new();
    let mut edges = Vec::with_capacity(num_edges.min(line_count));
    let mut edge_weights = Vec::with_capacity(num_edges.min(line_count));
    for edge in 0..num_edges {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| anyhow!("expected {num_edges} hyperedges, found {edge}"))?;
        let mut numbers = parse_numbers::<i64>(line, line_no)?.into_iter();
        let weight = if format.edge_weights {
            numbers
                .next()
                .ok_or_else(|| anyhow!("line {line_no}: missing hyperedge weight"))?
        } else {
            1
        };
        if weight <= 0 {
            bail!("line {line_no}: hyperedge weight must be positive, got {weight}");
        }
        let mut pins = Vec::new();
        for pin in numbers {
            if pin < 1 || pin as usize > num_nodes {
                bail!("line {line_no}: pin {pin} out of range 1..={num_nodes}");
            }
            pins.push(pin as NodeId - 1);
        }
        if validate {
            let before = pins.len();
            dedup_preserving_order(&mut pins);
            if pins.len() != before {
                warnings.push(format!(
                    "hyperedge {edge} (line {line_no}) contains duplicate pins"
                ));
            }
            if pins.is_empty() {
                warnings.push(format!("hyperedge {edge} (line {line_no}) has no pins"));
            }
        }
        edges.push(pins);
        edge_weights.push(weight);
    }

    let node_weights = if format.node_weights {
        let mut weights = Vec::with_capacity(num_nodes.min(line_count));
        for node in 0..num_nodes {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| anyhow!("expected {num_nodes} node weights, found {node}"))?;
            let weight = match parse_numbers::<i64>(line, line_no)?.as_slice() {
                [weight] => *weight,
                _ => bail!("line {line_no}: expected a single node weight"),
            };
            if weight <= 0 {
                bail!("line {line_no}: node weight must be positive, got {weight}");
            }
            weights.push(weight);
        }
        weights
    } else {
        let mut weights = Vec::new();
        weights
            .try_reserve_exact(num_nodes)
            .with_context(|| format!("cannot allocate {num_nodes} node weights"))?;
        weights.resize(num_nodes, 1);
        weights
    };

    if let Some((line_no, _)) = lines.next() {
        bail!("line {line_no}: unexpected trailing content");
    }

    for warning in &warnings {
        if promote_warnings_to_errors {
            bail!("{warning}");
        }
        warn!("{warning}");
    }

    Hypergraph::new(k, node_weights, edges, edge_weights)
}

fn parse_numbers<T: std::str::FromStr>(line: &str, line_no: usize) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| anyhow!("line {line_no}: invalid number {token:?}"))
        })
        .collect()
}

fn dedup_preserving_order(pins: &mut Vec<NodeId>) {
    let mut seen = std::collections::HashSet::with_capacity(pins.len());
    pins.retain(|pin| seen.insert(*pin));
}

/// Write one part id per line, in node order.
///
/// Fails if any node is still unassigned.
pub fn write_partition_file(hypergraph: &Hypergraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("create partition file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for (node, part) in hypergraph.part_ids().iter().enumerate() {
        let part = part.ok_or_else(|| anyhow!("node {node} has no part assigned"))?;
        writeln!(writer, "{part}")
            .with_context(|| format!("write partition file {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush partition file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SAMPLE_HGR, write_file};

    #[test]
    fn parses_unweighted_file_with_comments() {
        let hypergraph = parse_hmetis(SAMPLE_HGR, 2, true, false).expect("parse");
        assert_eq!(hypergraph.num_nodes(), 7);
        assert_eq!(hypergraph.num_edges(), 4);
        assert_eq!(hypergraph.pins(1), &[0, 1, 3, 4]);
        assert_eq!(hypergraph.total_weight(), 7);
    }

    #[test]
    fn parses_edge_and_node_weights() {
        let contents = "2 3 11\n5 1 2\n2 2 3\n4\n1\n2\n";
        let hypergraph = parse_hmetis(contents, 2, true, false).expect("parse");
        assert_eq!(hypergraph.edge_weight(0), 5);
        assert_eq!(hypergraph.edge_weight(1), 2);
        assert_eq!(hypergraph.pins(1), &[1, 2]);
        assert_eq!(hypergraph.node_weight(0), 4);
        assert_eq!(hypergraph.total_weight(), 7);
    }

    #[test]
    fn rejects_out_of_range_pin() {
        let err = parse_hmetis("1 2\n1 3\n", 2, false, false).expect_err("bad pin");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_missing_hyperedges() {
        let err = parse_hmetis("3 2\n1 2\n", 2, true, false).expect_err("short");
        assert!(err.to_string().contains("expected 3 hyperedges"));
    }

    #[test]
    fn oversized_header_counts_are_errors() {
        let err = parse_hmetis("18446744073709551615 1\n", 2, true, false).expect_err("huge");
        assert!(err.to_string().contains("at most"));

        let err = parse_hmetis("0 18446744073709551615\n", 2, true, false).expect_err("huge");
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn header_counts_beyond_body_are_errors() {
        let err = parse_hmetis("4000000000 2\n1 2\n", 2, true, false).expect_err("short");
        assert!(err.to_string().contains("expected 4000000000 hyperedges, found 1"));

        let err = parse_hmetis("1 4000000000 10\n1 2\n3\n", 2, true, false).expect_err("short");
        assert!(err.to_string().contains("expected 4000000000 node weights, found 1"));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(parse_hmetis("1 2 4294967297\n1 2\n", 2, true, false).is_err());
        assert!(parse_hmetis("1 2 7\n1 2\n", 2, true, false).is_err());
    }

    #[test]
    fn duplicate_pins_are_removed_or_promoted() {
        let contents = "1 3\n1 2 2 3\n";
        let hypergraph = parse_hmetis(contents, 2, true, false).expect("parse");
        assert_eq!(hypergraph.pins(0), &[0, 1, 2]);

        let err = parse_hmetis(contents, 2, true, true).expect_err("promoted");
        assert!(err.to_string().contains("duplicate pins"));

        let unchecked = parse_hmetis(contents, 2, false, true).expect("no validation");
        assert_eq!(unchecked.pins(0), &[0, 1, 1, 2]);
    }

    #[test]
    fn loader_reports_path_on_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("missing.hgr");
        let err = HmetisLoader.load(&path, 2, true, false).expect_err("missing");
        assert!(format!("{err:#}").contains("missing.hgr"));
    }

    #[test]
    fn writes_one_part_per_line() {
        let temp = tempfile::tempdir().expect("tempdir");
        let graph = write_file(temp.path(), "g.hgr", SAMPLE_HGR);
        let mut hypergraph = HmetisLoader.load(&graph, 2, true, false).expect("load");
        for node in 0..hypergraph.num_nodes() {
            hypergraph.set_part(node, node % 2);
        }
        let out = temp.path().join("out/g.part");
        write_partition_file(&hypergraph, &out).expect("write");
        let written = fs::read_to_string(&out).expect("read");
        assert_eq!(written, "0\n1\n0\n1\n0\n1\n0\n");
    }

    #[test]
    fn refuses_partial_partition() {
        let temp = tempfile::tempdir().expect("tempdir");
        let hypergraph = parse_hmetis(SAMPLE_HGR, 2, true, false).expect("parse");
        let err = write_partition_file(&hypergraph, &temp.path().join("p")).expect_err("partial");
        assert!(err.to_string().contains("node 0"));
    }
}
