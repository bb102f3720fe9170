//! Two triangles joined by a bridge, split by Surprise optimization
//!
//! Run with: cargo run --example two_triangles

use trueno_fagso::{detect_communities, CsrGraph, NodeId, OptimizerConfig, SimilarityIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦀 trueno-fagso two-triangle example\n");

    // 1. Build the graph: {0,1,2} and {3,4,5} joined by 2-3
    let edges: Vec<_> = [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)]
        .into_iter()
        .map(|(u, v)| (NodeId(u), NodeId(v)))
        .collect();
    let graph = CsrGraph::from_edge_list(6, &edges)?;
    println!(
        "📊 Graph: {} nodes, {} edges\n",
        graph.num_nodes(),
        graph.num_edges()
    );

    // 2. Optimize discrete Surprise, ranking edges by common neighbors
    let config = OptimizerConfig::default()
        .with_similarity(SimilarityIndex::CommonNeighbors)
        .with_seed(42);
    let result = detect_communities(&graph, &config)?;

    // 3. Report
    println!("🔍 {} communities (seed {})", result.num_communities, result.seed);
    for (id, community) in result.communities.iter().enumerate() {
        let members: Vec<u32> = community.iter().map(|node| node.0).collect();
        println!("  community {id}: {members:?}");
    }
    println!("\n📈 Final quality:\n{}", result.report);

    println!("💾 Partition listing:\n{}", result.partition);
    Ok(())
}
