//! Community detection algorithms (edge ranking, quality functions, greedy optimizer)
//!
//! The greedy optimizer consumes a ranked edge stream and a quality function;
//! both are closed enums dispatched per call.

pub mod fagso;
pub mod quality;
pub mod ranking;
pub mod similarity;
pub mod surprise;

pub use fagso::{detect_communities, greedy_walk, CommunityDetectionResult};
pub use quality::{intracluster_stats, ClusterStats, QualityFunction, QualityReport};
pub use ranking::{fold_shuffle, rank_edges};
pub use similarity::SimilarityIndex;
pub use surprise::{
    check_arguments, compute_asymptotic_surprise, compute_surprise, SurpriseError,
};
