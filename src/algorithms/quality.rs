//! Partition quality functions
//!
//! Every objective is a pure function of (graph, partition) where higher is
//! better, so the greedy optimizer can maximize any of them unchanged:
//!
//! - **Surprise**: discrete hypergeometric Surprise (see [`super::surprise`])
//! - **Significance**: asymptotic Significance, `sum_c C(n_c, 2) D(rho_c || rho)`
//! - **Asymptotic Surprise**: `m D(mi/m || pi/p)`
//! - **Modularity**: Newman-Girvan, `sum_c (m_c/m - (d_c/2m)^2)`
//! - **Asymptotic Modularity**: `sum_c m D(m_c/m || (d_c/2m)^2)`
//!
//! # References
//! - Newman & Girvan (2004): "Finding and evaluating community structure in networks"
//! - Traag, Krings & Van Dooren (2013): "Significant scales in community structure"

use super::surprise::{compute_asymptotic_surprise, compute_surprise, kl_divergence, SurpriseError};
use crate::storage::{CsrGraph, Partition};
use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Objective maximized by the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFunction {
    /// Discrete Surprise
    #[default]
    Surprise,
    /// Asymptotic Significance
    Significance,
    /// Asymptotic Surprise
    AsymptoticSurprise,
    /// Newman-Girvan modularity
    Modularity,
    /// KL-divergence form of modularity
    AsymptoticModularity,
}

impl QualityFunction {
    /// All objectives, in numeric-code order
    pub const ALL: [Self; 5] = [
        Self::Surprise,
        Self::Significance,
        Self::AsymptoticSurprise,
        Self::Modularity,
        Self::AsymptoticModularity,
    ];

    /// Look up an objective by its numeric code (`0..=4`)
    #[must_use]
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }

    /// Stable name, also accepted by [`FromStr`]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Surprise => "surprise",
            Self::Significance => "significance",
            Self::AsymptoticSurprise => "asymptotic_surprise",
            Self::Modularity => "modularity",
            Self::AsymptoticModularity => "asymptotic_modularity",
        }
    }

    /// Score `partition` of `graph`
    ///
    /// # Errors
    ///
    /// Returns [`SurpriseError`] if the Surprise-based objectives see
    /// inconsistent counts
    pub fn evaluate(self, graph: &CsrGraph, partition: &Partition) -> Result<f64, SurpriseError> {
        match self {
            Self::Surprise => surprise(graph, partition),
            Self::Significance => Ok(significance(graph, partition)),
            Self::AsymptoticSurprise => asymptotic_surprise(graph, partition),
            Self::Modularity => Ok(modularity(graph, partition)),
            Self::AsymptoticModularity => Ok(asymptotic_modularity(graph, partition)),
        }
    }
}

impl fmt::Display for QualityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QualityFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<usize>() {
            return Self::from_code(code)
                .ok_or_else(|| anyhow!("quality function code {code} out of range 0..=4"));
        }
        let key = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|q| normalize_name(q.name()) == key)
            .ok_or_else(|| anyhow!("unknown quality function {s:?}"))
    }
}

/// Lowercase and drop separators so `AsymptoticSurprise`, `asymptotic-surprise`
/// and `asymptotic_surprise` compare equal
pub(crate) fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Per-cluster counts shared by Significance and both modularities
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterStats {
    /// Edges with both endpoints in the cluster
    pub edges: f64,
    /// Vertex pairs inside the cluster, `n_c (n_c - 1) / 2`
    pub pairs: f64,
    /// Sum of the (whole-graph) degrees of the cluster's vertices
    pub degree_sum: f64,
}

/// Count intracluster edges, pairs and degree sum of one cluster in a single
/// pass over its members
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn intracluster_stats(
    graph: &CsrGraph,
    partition: &Partition,
    cluster: usize,
    members: &BTreeSet<usize>,
) -> ClusterStats {
    let size = members.len() as f64;
    let mut stats = ClusterStats {
        pairs: size * (size - 1.0) / 2.0,
        ..ClusterStats::default()
    };

    for &u in members {
        let neighbors = graph.row(u);
        stats.degree_sum += neighbors.len() as f64;
        stats.edges += neighbors
            .iter()
            .filter(|&&v| (v as usize) > u && partition.find(v as usize) == cluster)
            .count() as f64;
    }
    stats
}

/// Global and intracluster pair/edge counts `(p, pi, m, mi)`
///
/// `mi` comes from one scan of the graph's edge list against the current
/// membership. Counts that overflow `i64` come back negative so that
/// [`super::surprise::check_arguments`] rejects them.
#[must_use]
pub fn surprise_counts(graph: &CsrGraph, partition: &Partition) -> (i64, i64, i64, i64) {
    let p = pair_count(graph.num_nodes());
    let pi = partition
        .clusters()
        .map(|(_, members)| pair_count(members.len()))
        .try_fold(0_i64, i64::checked_add)
        .unwrap_or(i64::MIN);
    let m = to_count(graph.num_edges());
    let mi = to_count(
        graph
            .edges()
            .iter()
            .filter(|&&(u, v)| partition.connected(u as usize, v as usize))
            .count(),
    );
    (p, pi, m, mi)
}

fn to_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MIN)
}

fn pair_count(size: usize) -> i64 {
    let size = size as u128;
    i64::try_from(size * size.saturating_sub(1) / 2).unwrap_or(i64::MIN)
}

/// Discrete Surprise of a partition
///
/// # Errors
///
/// Returns [`SurpriseError`] on inconsistent counts
pub fn surprise(graph: &CsrGraph, partition: &Partition) -> Result<f64, SurpriseError> {
    let (p, pi, m, mi) = surprise_counts(graph, partition);
    compute_surprise(p, pi, m, mi)
}

/// Asymptotic Surprise of a partition
///
/// # Errors
///
/// Returns [`SurpriseError`] on inconsistent counts
pub fn asymptotic_surprise(graph: &CsrGraph, partition: &Partition) -> Result<f64, SurpriseError> {
    let (p, pi, m, mi) = surprise_counts(graph, partition);
    compute_asymptotic_surprise(p, pi, m, mi)
}

/// Asymptotic Significance
///
/// Sums `C(n_c, 2) D(rho_c || rho)` over clusters with more than one vertex,
/// where `rho_c` is the cluster's internal density and `rho` the graph's.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn significance(graph: &CsrGraph, partition: &Partition) -> f64 {
    let n = graph.num_nodes() as f64;
    let p = n * (n - 1.0) / 2.0;
    if p <= 0.0 {
        return 0.0;
    }
    let rho = graph.num_edges() as f64 / p;

    partition
        .clusters()
        .filter(|(_, members)| members.len() > 1)
        .map(|(id, members)| {
            let stats = intracluster_stats(graph, partition, id, members);
            stats.pairs * kl_divergence(stats.edges / stats.pairs, rho)
        })
        .sum()
}

/// Newman-Girvan modularity
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn modularity(graph: &CsrGraph, partition: &Partition) -> f64 {
    let m = graph.num_edges() as f64;
    if m == 0.0 {
        return 0.0;
    }

    partition
        .clusters()
        .map(|(id, members)| {
            let stats = intracluster_stats(graph, partition, id, members);
            stats.edges / m - (stats.degree_sum / (2.0 * m)).powi(2)
        })
        .sum()
}

/// Asymptotic modularity, `sum_c m D(m_c/m || (d_c/2m)^2)`
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn asymptotic_modularity(graph: &CsrGraph, partition: &Partition) -> f64 {
    let m = graph.num_edges() as f64;
    if m == 0.0 {
        return 0.0;
    }

    partition
        .clusters()
        .map(|(id, members)| {
            let stats = intracluster_stats(graph, partition, id, members);
            let expected = (stats.degree_sum / (2.0 * m)).powi(2);
            m * kl_divergence(stats.edges / m, expected)
        })
        .sum()
}

/// All five objectives evaluated on one partition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Discrete Surprise
    pub surprise: f64,
    /// Asymptotic Significance
    pub significance: f64,
    /// Asymptotic Surprise
    pub asymptotic_surprise: f64,
    /// Newman-Girvan modularity
    pub modularity: f64,
    /// Asymptotic modularity
    pub asymptotic_modularity: f64,
}

impl QualityReport {
    /// Evaluate every objective on `partition`
    ///
    /// # Errors
    ///
    /// Returns [`SurpriseError`] on inconsistent counts
    pub fn evaluate(graph: &CsrGraph, partition: &Partition) -> Result<Self, SurpriseError> {
        Ok(Self {
            surprise: surprise(graph, partition)?,
            significance: significance(graph, partition),
            asymptotic_surprise: asymptotic_surprise(graph, partition)?,
            modularity: modularity(graph, partition),
            asymptotic_modularity: asymptotic_modularity(graph, partition),
        })
    }

    /// The value of one objective
    #[must_use]
    pub const fn get(&self, objective: QualityFunction) -> f64 {
        match objective {
            QualityFunction::Surprise => self.surprise,
            QualityFunction::Significance => self.significance,
            QualityFunction::AsymptoticSurprise => self.asymptotic_surprise,
            QualityFunction::Modularity => self.modularity,
            QualityFunction::AsymptoticModularity => self.asymptotic_modularity,
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for objective in QualityFunction::ALL {
            writeln!(f, "{:<22} {:.6}", objective.name(), self.get(objective))?;
        }
        Ok(())
    }
}
