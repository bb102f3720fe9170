//! Topological similarity indices for edge ranking
//!
//! Each index scores an edge `(x, y)` from the two endpoints' neighbor sets and
//! degrees in the static graph. Neighbor rows are sorted, so common neighbors
//! come from a linear merge rather than a hash lookup.
//!
//! Ratios whose denominator is zero score `0.0`.
//!
//! # References
//! - Liben-Nowell & Kleinberg (2007): "The link-prediction problem for social networks"
//! - Zhou, Lü & Zhang (2009): "Predicting missing links via local information"

use super::quality::normalize_name;
use crate::storage::CsrGraph;
use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge similarity index used to rank candidate merges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityIndex {
    /// `|N(x) ∩ N(y)| / |N(x) ∪ N(y)|`
    #[default]
    Jaccard,
    /// `sum over common z of 1 / ln k_z`
    AdamicAdar,
    /// `(k_x + k_y) / 2`
    AverageDegree,
    /// `|N(x) ∩ N(y)|`
    CommonNeighbors,
    /// `c / max(k_x, k_y)`
    HubDepressed,
    /// `c / min(k_x, k_y)`
    HubPromoted,
    /// `c / (k_x k_y)`
    LeichtHolmeNewman,
    /// `k_x k_y`
    PreferentialAttachment,
    /// No scoring: the ranking is a uniform shuffle
    Random,
    /// `sum over common z of 1 / k_z`
    ResourceAllocation,
    /// `c / sqrt(k_x k_y)`
    Salton,
    /// `2c / (k_x + k_y)`
    Sorensen,
    /// Jaccard over closed neighborhoods `N[x] = N(x) ∪ {x}`
    JaccardNormalized,
    /// Cosine over closed neighborhoods
    Cosine,
}

impl SimilarityIndex {
    /// All indices, in numeric-code order
    pub const ALL: [Self; 14] = [
        Self::Jaccard,
        Self::AdamicAdar,
        Self::AverageDegree,
        Self::CommonNeighbors,
        Self::HubDepressed,
        Self::HubPromoted,
        Self::LeichtHolmeNewman,
        Self::PreferentialAttachment,
        Self::Random,
        Self::ResourceAllocation,
        Self::Salton,
        Self::Sorensen,
        Self::JaccardNormalized,
        Self::Cosine,
    ];

    /// Look up an index by its numeric code (`0..=13`)
    #[must_use]
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }

    /// Stable name, also accepted by [`FromStr`]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jaccard => "jaccard",
            Self::AdamicAdar => "adamic_adar",
            Self::AverageDegree => "average_degree",
            Self::CommonNeighbors => "common_neighbors",
            Self::HubDepressed => "hub_depressed",
            Self::HubPromoted => "hub_promoted",
            Self::LeichtHolmeNewman => "leicht_holme_newman",
            Self::PreferentialAttachment => "preferential_attachment",
            Self::Random => "random",
            Self::ResourceAllocation => "resource_allocation",
            Self::Salton => "salton",
            Self::Sorensen => "sorensen",
            Self::JaccardNormalized => "jaccard_normalized",
            Self::Cosine => "cosine",
        }
    }

    /// Score the pair `(x, y)`
    ///
    /// `Random` has no score and returns `0.0`; the ranker never calls it.
    /// Both ids must be below `graph.num_nodes()`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn score(self, graph: &CsrGraph, x: usize, y: usize) -> f64 {
        let nx = graph.row(x);
        let ny = graph.row(y);
        let kx = nx.len() as f64;
        let ky = ny.len() as f64;

        match self {
            Self::Random => 0.0,
            Self::AverageDegree => (kx + ky) / 2.0,
            Self::PreferentialAttachment => kx * ky,
            Self::AdamicAdar => common_neighbors(nx, ny)
                .map(|z| (graph.row(z as usize).len() as f64).ln())
                .map(|ln_k| ratio(1.0, ln_k))
                .sum(),
            Self::ResourceAllocation => common_neighbors(nx, ny)
                .map(|z| ratio(1.0, graph.row(z as usize).len() as f64))
                .sum(),
            Self::JaccardNormalized => {
                let (common, union) = closed_overlap(nx, ny, x, y);
                ratio(common, union)
            }
            Self::Cosine => {
                let (common, _) = closed_overlap(nx, ny, x, y);
                ratio(common, ((kx + 1.0) * (ky + 1.0)).sqrt())
            }
            Self::Jaccard
            | Self::CommonNeighbors
            | Self::HubDepressed
            | Self::HubPromoted
            | Self::LeichtHolmeNewman
            | Self::Salton
            | Self::Sorensen => {
                let c = common_neighbors(nx, ny).count() as f64;
                match self {
                    Self::Jaccard => ratio(c, kx + ky - c),
                    Self::CommonNeighbors => c,
                    Self::HubDepressed => ratio(c, kx.max(ky)),
                    Self::HubPromoted => ratio(c, kx.min(ky)),
                    Self::LeichtHolmeNewman => ratio(c, kx * ky),
                    Self::Salton => ratio(c, (kx * ky).sqrt()),
                    _ => ratio(2.0 * c, kx + ky),
                }
            }
        }
    }
}

impl fmt::Display for SimilarityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(code) = s.parse::<usize>() {
            return Self::from_code(code)
                .ok_or_else(|| anyhow!("similarity index code {code} out of range 0..=13"));
        }
        let key = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|index| normalize_name(index.name()) == key)
            .ok_or_else(|| anyhow!("unknown similarity index {s:?}"))
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Common elements of two sorted neighbor rows
fn common_neighbors<'a>(a: &'a [u32], b: &'a [u32]) -> impl Iterator<Item = u32> + 'a {
    let mut i = 0;
    let mut j = 0;
    std::iter::from_fn(move || {
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    let z = a[i];
                    i += 1;
                    j += 1;
                    return Some(z);
                }
            }
        }
        None
    })
}

/// `(|N[x] ∩ N[y]|, |N[x] ∪ N[y]|)` for closed neighborhoods
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn closed_overlap(nx: &[u32], ny: &[u32], x: usize, y: usize) -> (f64, f64) {
    let c = common_neighbors(nx, ny).count() as f64;
    // x ∈ N[y] and y ∈ N[x] exactly when the two are adjacent
    let adjacent = y != x && ny.binary_search(&(x as u32)).is_ok();
    let common = if x == y {
        nx.len() as f64 + 1.0
    } else if adjacent {
        c + 2.0
    } else {
        c
    };
    let union = (nx.len() + 1 + ny.len() + 1) as f64 - common;
    (common, union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NodeId;
    use approx::assert_relative_eq;

    /// 0-1, 0-2, 1-2, 1-3, 2-3, 3-4
    fn sample_graph() -> CsrGraph {
        let edges: Vec<_> = [(0, 1), (0, 2), (1, 2), (1, 3), (2, 3), (3, 4)]
            .into_iter()
            .map(|(u, v)| (NodeId(u), NodeId(v)))
            .collect();
        CsrGraph::from_edge_list(5, &edges).unwrap()
    }

    #[test]
    fn test_codes_round_trip() {
        for (code, index) in SimilarityIndex::ALL.into_iter().enumerate() {
            assert_eq!(SimilarityIndex::from_code(code), Some(index));
            assert_eq!(index.name().parse::<SimilarityIndex>().unwrap(), index);
        }
        assert_eq!(SimilarityIndex::from_code(14), None);
        assert_eq!(
            "8".parse::<SimilarityIndex>().unwrap(),
            SimilarityIndex::Random
        );
        assert_eq!(
            "AdamicAdar".parse::<SimilarityIndex>().unwrap(),
            SimilarityIndex::AdamicAdar
        );
        assert!("pearson".parse::<SimilarityIndex>().is_err());
    }

    #[test]
    fn test_common_neighbor_family() {
        let graph = sample_graph();
        // edge (1, 2): N(1) = {0, 2, 3}, N(2) = {0, 1, 3}, common = {0, 3}
        let score = |index: SimilarityIndex| index.score(&graph, 1, 2);

        assert_eq!(score(SimilarityIndex::CommonNeighbors), 2.0);
        assert_relative_eq!(score(SimilarityIndex::Jaccard), 2.0 / 4.0);
        assert_relative_eq!(score(SimilarityIndex::Sorensen), 4.0 / 6.0);
        assert_relative_eq!(score(SimilarityIndex::Salton), 2.0 / 3.0);
        assert_relative_eq!(score(SimilarityIndex::HubPromoted), 2.0 / 3.0);
        assert_relative_eq!(score(SimilarityIndex::HubDepressed), 2.0 / 3.0);
        assert_relative_eq!(score(SimilarityIndex::LeichtHolmeNewman), 2.0 / 9.0);
        assert_eq!(score(SimilarityIndex::PreferentialAttachment), 9.0);
        assert_eq!(score(SimilarityIndex::AverageDegree), 3.0);
    }

    #[test]
    fn test_degree_weighted_indices() {
        let graph = sample_graph();
        // common neighbors of (1, 2) are 0 (degree 2) and 3 (degree 3)
        assert_relative_eq!(
            SimilarityIndex::ResourceAllocation.score(&graph, 1, 2),
            1.0 / 2.0 + 1.0 / 3.0
        );
        assert_relative_eq!(
            SimilarityIndex::AdamicAdar.score(&graph, 1, 2),
            1.0 / 2.0_f64.ln() + 1.0 / 3.0_f64.ln()
        );
    }

    #[test]
    fn test_closed_neighborhood_indices() {
        let graph = sample_graph();
        // N[1] = {0, 1, 2, 3}, N[2] = {0, 1, 2, 3}
        assert_relative_eq!(
            SimilarityIndex::JaccardNormalized.score(&graph, 1, 2),
            1.0
        );
        assert_relative_eq!(SimilarityIndex::Cosine.score(&graph, 1, 2), 1.0);

        // N[3] = {1, 2, 3, 4}, N[4] = {3, 4}: overlap {3, 4}
        assert_relative_eq!(
            SimilarityIndex::JaccardNormalized.score(&graph, 3, 4),
            2.0 / 4.0
        );
        assert_relative_eq!(
            SimilarityIndex::Cosine.score(&graph, 3, 4),
            2.0 / (4.0_f64 * 2.0).sqrt()
        );
    }

    #[test]
    fn test_pendant_edge_scores() {
        let graph = sample_graph();
        // edge (3, 4): vertex 4 is a leaf, no common neighbors
        assert_eq!(SimilarityIndex::Jaccard.score(&graph, 3, 4), 0.0);
        assert_eq!(SimilarityIndex::AdamicAdar.score(&graph, 3, 4), 0.0);
        assert_eq!(SimilarityIndex::PreferentialAttachment.score(&graph, 3, 4), 3.0);
    }

    #[test]
    fn test_zero_denominators_score_zero() {
        let graph = CsrGraph::with_nodes(2);
        for index in SimilarityIndex::ALL {
            let score = index.score(&graph, 0, 1);
            assert!(score.is_finite(), "{index}");
        }
        assert_eq!(SimilarityIndex::Jaccard.score(&graph, 0, 1), 0.0);
        assert_eq!(SimilarityIndex::Salton.score(&graph, 0, 1), 0.0);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SimilarityIndex::LeichtHolmeNewman).unwrap();
        assert_eq!(json, "\"leicht_holme_newman\"");
        let parsed: SimilarityIndex = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(parsed, SimilarityIndex::Cosine);
    }
}
