//! Edge ranking for the greedy walk
//!
//! Produces the order in which candidate merges are tried:
//!
//! 1. `Random` shuffles the whole edge list and stops there
//! 2. otherwise edges are sorted by descending similarity score
//! 3. each maximal run of exactly equal scores is shuffled
//! 4. the sequence is rotated so edge `first_edge % len` comes first
//! 5. with `kfold > 1`, each of the `kfold` contiguous blocks of size
//!    `len / kfold` is shuffled independently (the remainder keeps its order)

use super::similarity::SimilarityIndex;
use crate::storage::CsrGraph;
use rand::seq::SliceRandom;
use rand::Rng;

/// Rank the edges of `graph` for one restart
///
/// All randomness comes from `rng`, so the same generator state always yields
/// the same ordering.
///
/// # Example
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use trueno_fagso::{rank_edges, CsrGraph, NodeId, SimilarityIndex};
///
/// let graph = CsrGraph::from_edge_list(3, &[(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))]).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let ranked = rank_edges(&graph, SimilarityIndex::Jaccard, 1, 0, &mut rng);
///
/// assert_eq!(ranked.len(), 2);
/// ```
pub fn rank_edges<R: Rng + ?Sized>(
    graph: &CsrGraph,
    similarity: SimilarityIndex,
    kfold: usize,
    first_edge: usize,
    rng: &mut R,
) -> Vec<(u32, u32)> {
    let mut edges = graph.edges().to_vec();

    if similarity == SimilarityIndex::Random {
        edges.shuffle(rng);
        return edges;
    }
    if edges.is_empty() {
        return edges;
    }

    let mut scored: Vec<(f64, (u32, u32))> = edges
        .iter()
        .map(|&(u, v)| (similarity.score(graph, u as usize, v as usize), (u, v)))
        .collect();

    // stable, so equal scores keep row-major order before the tie shuffle
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    shuffle_ties(&mut scored, rng);

    let mut ranked: Vec<(u32, u32)> = scored.into_iter().map(|(_, edge)| edge).collect();
    let len = ranked.len();
    ranked.rotate_left(first_edge % len);
    fold_shuffle(&mut ranked, kfold, rng);

    ranked
}

/// Shuffle every maximal run of bitwise-equal scores in a sorted sequence
fn shuffle_ties<T, R: Rng + ?Sized>(scored: &mut [(f64, T)], rng: &mut R) {
    let mut start = 0;
    while start < scored.len() {
        let key = scored[start].0;
        let run = scored[start..]
            .iter()
            .take_while(|(score, _)| score.total_cmp(&key).is_eq())
            .count();
        if run > 1 {
            scored[start..start + run].shuffle(rng);
        }
        start += run;
    }
}

/// Shuffle `kfold` contiguous blocks of `len / kfold` items each in place
///
/// Items past `kfold * (len / kfold)` are left where they are. `kfold <= 1` is
/// a no-op.
pub fn fold_shuffle<T, R: Rng + ?Sized>(items: &mut [T], kfold: usize, rng: &mut R) {
    if kfold <= 1 {
        return;
    }
    let fold = items.len() / kfold;
    if fold < 2 {
        return;
    }
    for block in items.chunks_exact_mut(fold).take(kfold) {
        block.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NodeId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn graph_from(n: usize, edges: &[(u32, u32)]) -> CsrGraph {
        let edges: Vec<_> = edges.iter().map(|&(u, v)| (NodeId(u), NodeId(v))).collect();
        CsrGraph::from_edge_list(n, &edges).unwrap()
    }

    fn two_triangles() -> CsrGraph {
        graph_from(6, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)])
    }

    fn sorted(mut edges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
        edges.sort_unstable();
        edges
    }

    #[test]
    fn test_ranking_is_permutation() {
        let graph = two_triangles();
        for index in SimilarityIndex::ALL {
            let mut rng = StdRng::seed_from_u64(3);
            let ranked = rank_edges(&graph, index, 2, 5, &mut rng);
            assert_eq!(sorted(ranked), graph.edges().to_vec(), "{index}");
        }
    }

    #[test]
    fn test_descending_scores() {
        let graph = two_triangles();
        let mut rng = StdRng::seed_from_u64(11);
        let ranked = rank_edges(&graph, SimilarityIndex::CommonNeighbors, 1, 0, &mut rng);

        // every triangle edge has one common neighbor, the bridge has none
        assert_eq!(ranked.last(), Some(&(2, 3)));
        let scores: Vec<f64> = ranked
            .iter()
            .map(|&(u, v)| SimilarityIndex::CommonNeighbors.score(&graph, u as usize, v as usize))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_first_edge_rotates() {
        let graph = two_triangles();
        let base = rank_edges(
            &graph,
            SimilarityIndex::CommonNeighbors,
            1,
            0,
            &mut StdRng::seed_from_u64(5),
        );
        let rotated = rank_edges(
            &graph,
            SimilarityIndex::CommonNeighbors,
            1,
            9,
            &mut StdRng::seed_from_u64(5),
        );

        // 9 % 7 == 2
        let mut expected = base.clone();
        expected.rotate_left(2);
        assert_eq!(rotated, expected);
        assert_eq!(rotated[0], base[2]);
    }

    #[test]
    fn test_same_seed_same_order() {
        let graph = graph_from(8, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)]);
        let a = rank_edges(&graph, SimilarityIndex::Jaccard, 3, 1, &mut StdRng::seed_from_u64(42));
        let b = rank_edges(&graph, SimilarityIndex::Jaccard, 3, 1, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_tie_shuffle_stays_within_run() {
        let mut scored: Vec<(f64, u32)> = vec![
            (3.0, 0),
            (3.0, 1),
            (3.0, 2),
            (1.0, 3),
            (0.5, 4),
            (0.5, 5),
        ];
        shuffle_ties(&mut scored, &mut StdRng::seed_from_u64(9));

        let mut head: Vec<u32> = scored[..3].iter().map(|&(_, id)| id).collect();
        head.sort_unstable();
        assert_eq!(head, vec![0, 1, 2]);
        assert_eq!(scored[3], (1.0, 3));
        let mut tail: Vec<u32> = scored[4..].iter().map(|&(_, id)| id).collect();
        tail.sort_unstable();
        assert_eq!(tail, vec![4, 5]);
    }

    #[test]
    fn test_fold_shuffle_keeps_blocks_and_remainder() {
        let mut items: Vec<u32> = (0..11).collect();
        fold_shuffle(&mut items, 3, &mut StdRng::seed_from_u64(1));

        // fold = 11 / 3 = 3: blocks [0,3), [3,6), [6,9); 9 and 10 untouched
        for block in 0..3 {
            let mut chunk = items[block * 3..(block + 1) * 3].to_vec();
            chunk.sort_unstable();
            let lo = u32::try_from(block * 3).unwrap();
            assert_eq!(chunk, vec![lo, lo + 1, lo + 2]);
        }
        assert_eq!(&items[9..], &[9, 10]);
    }

    #[test]
    fn test_fold_shuffle_noop_cases() {
        let mut items: Vec<u32> = (0..5).collect();
        fold_shuffle(&mut items, 1, &mut StdRng::seed_from_u64(1));
        assert_eq!(items, vec![0, 1, 2, 3, 4]);

        // more folds than items: block size 0
        fold_shuffle(&mut items, 10, &mut StdRng::seed_from_u64(1));
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = CsrGraph::with_nodes(4);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(rank_edges(&graph, SimilarityIndex::Salton, 2, 3, &mut rng).is_empty());
        assert!(rank_edges(&graph, SimilarityIndex::Random, 1, 0, &mut rng).is_empty());
    }

    #[test]
    fn test_random_ignores_rotation() {
        let graph = two_triangles();
        let a = rank_edges(&graph, SimilarityIndex::Random, 1, 0, &mut StdRng::seed_from_u64(8));
        let b = rank_edges(&graph, SimilarityIndex::Random, 1, 4, &mut StdRng::seed_from_u64(8));
        assert_eq!(a, b);
    }
}
