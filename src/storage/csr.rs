//! CSR (Compressed Sparse Row) representation of a static undirected graph
//!
//! Every undirected edge `{u, v}` is stored twice, once in the row of `u` and
//! once in the row of `v`, with each row kept sorted so membership tests are a
//! binary search. The upper-triangle edge list (`u < v`) is materialized once
//! at construction because the optimizer walks it on every quality evaluation.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 - 1, 0 - 2, 1 - 2
//!
//! CSR:
//!   row_offsets: [0, 2, 4, 6]
//!   col_indices: [1, 2, 0, 2, 0, 1]
//!   edges:       [(0, 1), (0, 2), (1, 2)]
//! ```

use anyhow::{anyhow, ensure, Result};

/// Node identifier (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Immutable undirected CSR graph
///
/// Built once before optimization starts and read-only afterwards. Edge
/// weights are not kept: an adjacency entry is either present or absent.
///
/// # Example
///
/// ```
/// use trueno_fagso::{CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(3, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))]).unwrap();
///
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.neighbors(NodeId(1)).unwrap(), &[0, 2]);
/// assert!(graph.has_edge(NodeId(2), NodeId(1)));
/// ```
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// node i's neighbors live in `col_indices[row_offsets[i]..row_offsets[i + 1]]`
    /// Length: `num_nodes` + 1
    row_offsets: Vec<u32>,

    /// Sorted neighbor ids, both directions of every edge
    /// Length: 2 * `num_edges`
    col_indices: Vec<u32>,

    /// Upper-triangle edge list in row-major order
    edges: Vec<(u32, u32)>,

    num_nodes: usize,
}

impl CsrGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::with_nodes(0)
    }

    /// Create a graph with `num_nodes` isolated vertices
    #[must_use]
    pub fn with_nodes(num_nodes: usize) -> Self {
        Self {
            row_offsets: vec![0; num_nodes + 1],
            col_indices: Vec::new(),
            edges: Vec::new(),
            num_nodes,
        }
    }

    /// Create graph from a vertex count and an undirected edge list
    ///
    /// Duplicate edges (in either orientation) are collapsed and self loops
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is not below `num_nodes`, or if
    /// `num_nodes` does not fit the `u32` id space
    pub fn from_edge_list(num_nodes: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        ensure!(
            u32::try_from(num_nodes).is_ok(),
            "Graphs with {num_nodes} nodes exceed the u32 id space"
        );

        let mut adj_list: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for (src, dst) in edges {
            for node in [src, dst] {
                if (node.0 as usize) >= num_nodes {
                    return Err(anyhow!(
                        "Node ID {} out of bounds for graph with {num_nodes} nodes",
                        node.0
                    ));
                }
            }
            if src == dst {
                continue;
            }
            adj_list[src.0 as usize].push(dst.0);
            adj_list[dst.0 as usize].push(src.0);
        }

        Ok(Self::from_adjacency_lists(adj_list))
    }

    /// Create graph from a dense adjacency matrix
    ///
    /// Any nonzero entry is an edge. The matrix must be square and symmetric
    /// in its nonzero pattern; the diagonal is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the matrix is ragged, not square, or not symmetric
    pub fn from_adjacency_matrix(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        ensure!(
            u32::try_from(n).is_ok(),
            "Graphs with {n} nodes exceed the u32 id space"
        );
        for (i, row) in rows.iter().enumerate() {
            ensure!(
                row.len() == n,
                "Adjacency matrix is not square: row {i} has {} columns, expected {n}",
                row.len()
            );
        }

        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let upper = rows[i][j] != 0.0;
                let lower = rows[j][i] != 0.0;
                ensure!(
                    upper == lower,
                    "Adjacency matrix is not symmetric at ({i}, {j})"
                );
                if upper {
                    #[allow(clippy::cast_possible_truncation)] // n checked above
                    edges.push((NodeId(i as u32), NodeId(j as u32)));
                }
            }
        }

        Self::from_edge_list(n, &edges)
    }

    fn from_adjacency_lists(mut adj_list: Vec<Vec<u32>>) -> Self {
        let num_nodes = adj_list.len();
        let mut row_offsets = Vec::with_capacity(num_nodes + 1);
        let mut col_indices = Vec::new();
        let mut edges = Vec::new();

        let mut offset = 0_u32;
        row_offsets.push(offset);

        for (node, neighbors) in adj_list.iter_mut().enumerate() {
            neighbors.sort_unstable();
            neighbors.dedup();

            #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported
            let node_u32 = node as u32;
            #[allow(clippy::cast_possible_truncation)]
            let len_u32 = neighbors.len() as u32;
            offset += len_u32;
            row_offsets.push(offset);

            for &target in neighbors.iter() {
                col_indices.push(target);
                if node_u32 < target {
                    edges.push((node_u32, target));
                }
            }
        }

        Self {
            row_offsets,
            col_indices,
            edges,
            num_nodes,
        }
    }

    /// Get the sorted neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn neighbors(&self, node: NodeId) -> Result<&[u32]> {
        if (node.0 as usize) >= self.num_nodes {
            return Err(anyhow!("Node ID {} out of bounds", node.0));
        }
        Ok(self.row(node.0 as usize))
    }

    /// Neighbors by raw index; callers guarantee `node < num_nodes`
    pub(crate) fn row(&self, node: usize) -> &[u32] {
        let start = self.row_offsets[node] as usize;
        let end = self.row_offsets[node + 1] as usize;
        &self.col_indices[start..end]
    }

    /// Degree of a node (0 for out-of-range ids)
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        let idx = node.0 as usize;
        if idx >= self.num_nodes {
            return 0;
        }
        (self.row_offsets[idx + 1] - self.row_offsets[idx]) as usize
    }

    /// Whether `{u, v}` is an edge
    #[must_use]
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        if (u.0 as usize) >= self.num_nodes || (v.0 as usize) >= self.num_nodes {
            return false;
        }
        self.row(u.0 as usize).binary_search(&v.0).is_ok()
    }

    /// Get number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of undirected edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Upper-triangle edge list (`u < v`), row-major order
    #[must_use]
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Get CSR components (`row_offsets`, `col_indices`)
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32]) {
        (&self.row_offsets, &self.col_indices)
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}
