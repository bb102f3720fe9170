//! Property-based tests for trueno-fagso
//!
//! Verifies graph, partition, Surprise and ranking invariants hold for
//! arbitrary inputs

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trueno_fagso::algorithms::check_arguments;
use trueno_fagso::{compute_surprise, rank_edges, CsrGraph, NodeId, Partition, SimilarityIndex};

/// Every vertex appears in exactly one cluster and `find` agrees with it
fn assert_partition_invariant(partition: &Partition) -> Result<(), TestCaseError> {
    let mut seen = vec![false; partition.len()];
    for (id, members) in partition.clusters() {
        prop_assert!(!members.is_empty(), "cluster {} is empty", id);
        for &vertex in members {
            prop_assert!(vertex < partition.len());
            prop_assert!(!seen[vertex], "vertex {} in two clusters", vertex);
            seen[vertex] = true;
            prop_assert_eq!(partition.find(vertex), id);
        }
    }
    prop_assert!(seen.iter().all(|&s| s), "some vertex is unassigned");
    Ok(())
}

// Property: CSR rows are sorted, symmetric and consistent with the edge list
proptest! {
    #[test]
    fn prop_from_edge_list_valid_csr(
        (n, edges) in prop_graph(1usize..40, 0usize..120)
    ) {
        let graph = CsrGraph::from_edge_list(n, &edges).unwrap();
        let (row_offsets, col_indices) = graph.csr_components();

        // Invariant 1: row_offsets is monotonically increasing
        prop_assert!(row_offsets.windows(2).all(|w| w[0] <= w[1]));

        // Invariant 2: each undirected edge is stored in both rows
        prop_assert_eq!(*row_offsets.last().unwrap() as usize, col_indices.len());
        prop_assert_eq!(col_indices.len(), 2 * graph.num_edges());

        // Invariant 3: edge list is the upper triangle of the adjacency
        for &(u, v) in graph.edges() {
            prop_assert!(u < v);
            prop_assert!(graph.has_edge(NodeId(v), NodeId(u)));
        }
        for &(src, dst) in &edges {
            prop_assert_eq!(graph.has_edge(src, dst), src != dst);
        }
    }
}

// Property: any merge/undo sequence keeps the partition a partition
proptest! {
    #[test]
    fn prop_partition_invariant(
        n in 1usize..30,
        ops in prop::collection::vec((0usize..30, 0usize..30, any::<bool>()), 0..60)
    ) {
        let mut partition = Partition::singletons(n);
        for (p, q, undo) in ops {
            partition.add(p % n, q % n);
            if undo {
                partition.undo();
            }
            assert_partition_invariant(&partition)?;
        }

        partition.sort_by_size();
        assert_partition_invariant(&partition)?;
        let sizes: Vec<usize> = partition.clusters().map(|(_, members)| members.len()).collect();
        prop_assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }
}

// Property: undo restores the exact pre-merge state
proptest! {
    #[test]
    fn prop_undo_round_trip(
        n in 2usize..25,
        prefix in prop::collection::vec((0usize..25, 0usize..25), 0..20),
        (p, q) in (0usize..25, 0usize..25)
    ) {
        let mut partition = Partition::singletons(n);
        for (a, b) in prefix {
            partition.add(a % n, b % n);
        }
        let (p, q) = (p % n, q % n);
        prop_assume!(!partition.connected(p, q));

        let before = partition.clone();
        prop_assert!(partition.add(p, q));
        prop_assert!(partition.connected(p, q));
        prop_assert!(partition.undo());

        prop_assert_eq!(&partition, &before);
        prop_assert_eq!(partition.membership(), before.membership());
    }
}

// Property: merging two vertices of the same cluster is a no-op
proptest! {
    #[test]
    fn prop_merge_noop_when_connected(
        n in 2usize..25,
        prefix in prop::collection::vec((0usize..25, 0usize..25), 1..20)
    ) {
        let mut partition = Partition::singletons(n);
        for (a, b) in &prefix {
            partition.add(a % n, b % n);
        }
        let (p, q) = (prefix[0].0 % n, prefix[0].1 % n);
        prop_assert!(partition.connected(p, q));

        let before = partition.clone();
        prop_assert!(!partition.add(p, q));
        prop_assert_eq!(&partition, &before);
    }
}

// Property: Surprise is exactly zero without intracluster edges or pairs
proptest! {
    #[test]
    fn prop_surprise_zero_boundary((p, pi, m) in prop_counts()) {
        prop_assume!(m <= p - pi);
        prop_assert_eq!(compute_surprise(p, pi, m, 0).unwrap(), 0.0);
        prop_assert_eq!(compute_surprise(p, 0, m, 0).unwrap(), 0.0);
    }
}

// Property: Surprise never decreases as mi grows over its support
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_surprise_monotone_in_mi((p, pi, m) in prop_counts()) {
        let low = (m - (p - pi)).max(0);
        let high = pi.min(m);

        let mut previous = f64::NEG_INFINITY;
        for mi in low..=high {
            prop_assert!(check_arguments(p, pi, m, mi).is_ok());
            let s = compute_surprise(p, pi, m, mi).unwrap();
            prop_assert!(s.is_finite());
            prop_assert!(s >= previous - 1e-9, "S({}) = {} < {}", mi, s, previous);
            previous = s;
        }
    }
}

// Property: inconsistent counts are always rejected
proptest! {
    #[test]
    fn prop_surprise_rejects_pi_above_p((p, pi, m) in prop_counts(), extra in 1i64..50) {
        prop_assert!(compute_surprise(p, p + extra, m, pi.min(m)).is_err());
    }
}

// Property: ranking is a permutation of the edge list
proptest! {
    #[test]
    fn prop_ranking_is_permutation(
        (n, edges) in prop_graph(2usize..30, 0usize..80),
        code in 0usize..14,
        kfold in 1usize..6,
        first_edge in 0usize..100,
        seed in any::<u64>()
    ) {
        let graph = CsrGraph::from_edge_list(n, &edges).unwrap();
        let index = SimilarityIndex::from_code(code).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut ranked = rank_edges(&graph, index, kfold, first_edge, &mut rng);
        ranked.sort_unstable();

        prop_assert_eq!(ranked, graph.edges().to_vec());
    }
}

/// Vertex count and an edge list over `0..n`
fn prop_graph(
    num_nodes: impl Strategy<Value = usize>,
    num_edges: impl Strategy<Value = usize>,
) -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId)>)> {
    (num_nodes, num_edges).prop_flat_map(|(n, m)| {
        let max_node = u32::try_from(n).unwrap();
        let edges = prop::collection::vec(
            (0..max_node, 0..max_node).prop_map(|(src, dst)| (NodeId(src), NodeId(dst))),
            0..=m,
        );
        (Just(n), edges)
    })
}

/// Consistent `(p, pi, m)` with `pi <= p` and `m <= p`
fn prop_counts() -> impl Strategy<Value = (i64, i64, i64)> {
    (2i64..120).prop_flat_map(|p| (Just(p), 0..=p, 0..=p))
}
