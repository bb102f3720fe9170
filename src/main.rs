//! trueno-fagso CLI - community detection by greedy Surprise optimization
//!
//! ```text
//! trueno-fagso -s jaccard -m surprise -r 10 -S 42 -o partition.txt network.adj
//! ```
//!
//! Similarity indices and objectives accept either their name or their numeric
//! code (`-s 3` is `common_neighbors`, `-m 3` is `modularity`).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trueno_fagso::{
    detect_communities, read_graph, OptimizerConfig, QualityFunction, SimilarityIndex,
};

/// Fast agglomerative Surprise optimization for community detection
#[derive(Parser, Debug)]
#[command(name = "trueno-fagso")]
#[command(author, about, long_about = None)]
struct Cli {
    /// Graph file (.adj/.csv/.txt adjacency matrix or .dimacs edge list)
    graph: PathBuf,

    /// Edge similarity index (name or code 0-13)
    #[arg(short = 's', long)]
    similarity: Option<SimilarityIndex>,

    /// Objective to maximize (name or code 0-4)
    #[arg(short = 'm', long)]
    objective: Option<QualityFunction>,

    /// Number of independent restarts
    #[arg(short = 'r', long)]
    repetitions: Option<usize>,

    /// Number of ranking blocks to reshuffle
    #[arg(short = 'v', long)]
    kfold: Option<usize>,

    /// Index of the edge the walk starts from
    #[arg(short = 'e', long)]
    first_edge: Option<usize>,

    /// Start from a random partition instead of singletons
    #[arg(short = 'b', long)]
    initial_randomize: bool,

    /// Random seed (clock-derived when absent)
    #[arg(short = 'S', long)]
    seed: Option<u64>,

    /// Verbosity: 0 error, 1 warn, 2 info, 3 debug, 4 trace
    #[arg(short = 'V', long, default_value_t = 0)]
    verbosity: u8,

    /// Write the partition here (.parquet for columnar, text otherwise)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the partition to stdout
    #[arg(short = 'p', long)]
    print: bool,

    /// Run restarts in parallel
    #[arg(long)]
    parallel: bool,

    /// JSON configuration file; explicit flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn optimizer_config(&self) -> Result<OptimizerConfig> {
        let mut config = match &self.config {
            Some(path) => OptimizerConfig::from_json_file(path)?,
            None => OptimizerConfig::default(),
        };

        if let Some(similarity) = self.similarity {
            config.similarity = similarity;
        }
        if let Some(objective) = self.objective {
            config.objective = objective;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(kfold) = self.kfold {
            config.kfold = kfold;
        }
        if let Some(first_edge) = self.first_edge {
            config.first_edge = first_edge;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.initial_randomize |= self.initial_randomize;
        config.parallel |= self.parallel;

        config.validate()?;
        Ok(config)
    }
}

fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level(cli.verbosity).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = cli.optimizer_config()?;

    let graph = read_graph(&cli.graph)?;
    info!(
        path = %cli.graph.display(),
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "graph loaded"
    );

    let started = Instant::now();
    let result = detect_communities(&graph, &config)?;
    let elapsed = started.elapsed();

    println!("Similarity:  {}", config.similarity);
    println!("Objective:   {}", config.objective);
    println!("Seed:        {}", result.seed);
    println!("Communities: {}", result.num_communities);
    println!("Elapsed:     {:.3}s", elapsed.as_secs_f64());
    print!("{}", result.report);

    if cli.print {
        print!("{}", result.partition);
    }

    if let Some(path) = &cli.output {
        let is_parquet = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
        if is_parquet {
            result
                .partition
                .write_parquet(path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        } else {
            result.partition.save(path)?;
        }
        info!(path = %path.display(), "partition written");
    }

    Ok(())
}
