//! trueno-fagso: fast agglomerative Surprise optimization
//!
//! # Overview
//!
//! trueno-fagso finds communities in undirected graphs by greedily merging
//! the endpoints of ranked edges and keeping each merge only if the partition
//! quality improves. The default objective is discrete Surprise, the negative
//! log10 of a hypergeometric tail probability.
//!
//! # Quick Start
//!
//! ```no_run
//! use trueno_fagso::{detect_communities, read_graph, OptimizerConfig, SimilarityIndex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load an adjacency matrix
//! let graph = read_graph("network.adj")?;
//!
//! // Ten restarts ranked by Jaccard similarity
//! let config = OptimizerConfig::default()
//!     .with_similarity(SimilarityIndex::Jaccard)
//!     .with_repetitions(10)
//!     .with_seed(42);
//! let result = detect_communities(&graph, &config)?;
//! println!("{} communities, S = {:.3}", result.num_communities, result.quality);
//!
//! // Save to Parquet
//! result.partition.write_parquet("partition.parquet").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Storage**: CSR (Compressed Sparse Row) graph, undoable partition
//! - **Persistence**: `vertex cluster` text listing, Parquet (feature `storage`)
//! - **Ranking**: 13 topological similarity indices plus pure random order
//! - **Objectives**: Surprise, asymptotic Surprise, Significance, modularity,
//!   asymptotic modularity
//! - **Restarts**: independent per-restart seeds, optionally on rayon

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod storage;

// Re-export core types
pub use algorithms::{
    compute_surprise, detect_communities, greedy_walk, rank_edges, CommunityDetectionResult,
    QualityFunction, QualityReport, SimilarityIndex, SurpriseError,
};
pub use config::OptimizerConfig;
pub use storage::{read_graph, CsrGraph, NodeId, Partition};

// Error type
pub use anyhow::{Error, Result};
