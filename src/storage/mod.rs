//! Graph and partition storage layer
//!
//! Provides the undirected CSR graph, the mutable vertex partition, text
//! readers for graphs, and Parquet persistence for partitions.

pub mod csr;
#[cfg(feature = "storage")]
pub mod parquet;
pub mod partition;
pub mod text;

pub use csr::{CsrGraph, NodeId};
pub use partition::Partition;
pub use text::{read_adjacency_matrix, read_dimacs, read_graph};
