//! Text graph readers
//!
//! Two formats are understood:
//! - adjacency matrix (`.adj`, `.csv`, `.txt`): one row per line, entries
//!   separated by whitespace or commas, nonzero = edge
//! - DIMACS (`.dimacs`, `.clq`, `.col`): `p <kind> <n> <m>` header followed by
//!   1-based `e <u> <v>` lines

use super::{CsrGraph, NodeId};
use anyhow::{anyhow, bail, ensure, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a graph, picking the format from the file extension
///
/// # Errors
///
/// Returns error if the extension is unknown, the file cannot be read, or the
/// content is malformed
pub fn read_graph<P: AsRef<Path>>(path: P) -> Result<CsrGraph> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let graph = match extension.as_str() {
        "adj" | "csv" | "txt" => read_adjacency_matrix(reader),
        "dimacs" | "clq" | "col" => read_dimacs(reader),
        other => bail!(
            "Unsupported graph format {other:?}: use .adj/.csv/.txt for adjacency matrices or .dimacs for edge lists"
        ),
    };
    graph.with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a dense adjacency matrix
///
/// # Errors
///
/// Returns error on non-numeric entries or a non-square/non-symmetric matrix
pub fn read_adjacency_matrix<R: BufRead>(reader: R) -> Result<CsrGraph> {
    let mut rows = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("line {}: bad matrix entry {token:?}", lineno + 1))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    CsrGraph::from_adjacency_matrix(&rows)
}

/// Parse a DIMACS edge list
///
/// # Errors
///
/// Returns error if the header is missing, an edge precedes it, or an
/// endpoint is outside `1..=n`
pub fn read_dimacs<R: BufRead>(reader: R) -> Result<CsrGraph> {
    let mut num_nodes: Option<usize> = None;
    let mut edges = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        match fields.next() {
            None | Some("c") => {}
            Some("p") => {
                let _kind = fields.next();
                let n = fields
                    .next()
                    .ok_or_else(|| anyhow!("line {}: header without node count", lineno + 1))?;
                num_nodes = Some(
                    n.parse()
                        .with_context(|| format!("line {}: bad node count {n:?}", lineno + 1))?,
                );
            }
            Some("e") => {
                let n = num_nodes
                    .ok_or_else(|| anyhow!("line {}: edge before `p` header", lineno + 1))?;
                let mut endpoint = || -> Result<NodeId> {
                    let token = fields
                        .next()
                        .ok_or_else(|| anyhow!("line {}: edge needs two endpoints", lineno + 1))?;
                    let id: u32 = token
                        .parse()
                        .with_context(|| format!("line {}: bad endpoint {token:?}", lineno + 1))?;
                    ensure!(
                        id >= 1 && (id as usize) <= n,
                        "line {}: endpoint {id} outside 1..={n}",
                        lineno + 1
                    );
                    Ok(NodeId(id - 1))
                };
                let u = endpoint()?;
                let v = endpoint()?;
                edges.push((u, v));
            }
            Some(other) => bail!("line {}: unknown DIMACS record {other:?}", lineno + 1),
        }
    }

    let n = num_nodes.ok_or_else(|| anyhow!("missing `p` header"))?;
    CsrGraph::from_edge_list(n, &edges)
}
