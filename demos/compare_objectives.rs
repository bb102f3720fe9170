//! Compare objectives and similarity indices on a ring of cliques
//!
//! Run with: cargo run --example compare_objectives

use trueno_fagso::{
    detect_communities, CsrGraph, NodeId, OptimizerConfig, QualityFunction, SimilarityIndex,
};

/// `k` cliques of `size` vertices, consecutive cliques joined by one edge
fn ring_of_cliques(k: u32, size: u32) -> Result<CsrGraph, Box<dyn std::error::Error>> {
    let mut edges = Vec::new();
    for c in 0..k {
        let base = c * size;
        for i in 0..size {
            for j in (i + 1)..size {
                edges.push((NodeId(base + i), NodeId(base + j)));
            }
        }
        edges.push((NodeId(base + size - 1), NodeId(((c + 1) % k) * size)));
    }
    Ok(CsrGraph::from_edge_list((k * size) as usize, &edges)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🦀 trueno-fagso objective comparison\n");

    let graph = ring_of_cliques(8, 6)?;
    println!(
        "📊 Ring of 8 cliques: {} nodes, {} edges\n",
        graph.num_nodes(),
        graph.num_edges()
    );

    println!(
        "{:<22} {:<20} {:>6} {:>12} {:>10}",
        "objective", "similarity", "comms", "quality", "modularity"
    );
    for objective in QualityFunction::ALL {
        for similarity in [SimilarityIndex::Jaccard, SimilarityIndex::Random] {
            let config = OptimizerConfig::default()
                .with_similarity(similarity)
                .with_objective(objective)
                .with_repetitions(10)
                .with_parallel(true)
                .with_seed(7);
            let result = detect_communities(&graph, &config)?;
            println!(
                "{:<22} {:<20} {:>6} {:>12.4} {:>10.4}",
                objective.name(),
                similarity.name(),
                result.num_communities,
                result.quality,
                result.report.modularity
            );
        }
    }

    // Persist the Surprise partition
    let config = OptimizerConfig::default().with_seed(7);
    let result = detect_communities(&graph, &config)?;
    let path = std::env::temp_dir().join("ring_of_cliques.parquet");
    result.partition.write_parquet(&path).await?;
    println!("\n💾 Saved Surprise partition to {}", path.display());

    Ok(())
}
