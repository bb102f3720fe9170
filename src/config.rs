//! Optimizer configuration
//!
//! One value type carries every knob of a run. It deserializes from JSON
//! (missing fields fall back to [`OptimizerConfig::default`]) and the
//! command-line flags override it field by field.

use crate::algorithms::{QualityFunction, SimilarityIndex};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Configuration for [`crate::detect_communities`]
///
/// # Example
///
/// ```
/// use trueno_fagso::{OptimizerConfig, QualityFunction, SimilarityIndex};
///
/// let config = OptimizerConfig::default()
///     .with_similarity(SimilarityIndex::CommonNeighbors)
///     .with_objective(QualityFunction::Modularity)
///     .with_repetitions(10)
///     .with_seed(42);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Edge similarity index used to rank merges
    pub similarity: SimilarityIndex,
    /// Objective maximized by the greedy walk
    pub objective: QualityFunction,
    /// Number of ranking blocks to reshuffle (1 = none)
    pub kfold: usize,
    /// Index (mod edge count) of the edge the walk starts from
    pub first_edge: usize,
    /// Number of independent restarts
    pub repetitions: usize,
    /// Start from random labels instead of singletons
    pub initial_randomize: bool,
    /// Master seed; `None` derives one from the clock
    pub seed: Option<u64>,
    /// Run restarts on the rayon pool
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityIndex::Jaccard,
            objective: QualityFunction::Surprise,
            kfold: 1,
            first_edge: 0,
            repetitions: 1,
            initial_randomize: false,
            seed: None,
            parallel: false,
        }
    }
}

impl OptimizerConfig {
    /// Set the similarity index
    #[must_use]
    pub const fn with_similarity(mut self, similarity: SimilarityIndex) -> Self {
        self.similarity = similarity;
        self
    }

    /// Set the objective
    #[must_use]
    pub const fn with_objective(mut self, objective: QualityFunction) -> Self {
        self.objective = objective;
        self
    }

    /// Set the fold count
    #[must_use]
    pub const fn with_kfold(mut self, kfold: usize) -> Self {
        self.kfold = kfold;
        self
    }

    /// Set the first edge index
    #[must_use]
    pub const fn with_first_edge(mut self, first_edge: usize) -> Self {
        self.first_edge = first_edge;
        self
    }

    /// Set the number of restarts
    #[must_use]
    pub const fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Toggle random initial labels
    #[must_use]
    pub const fn with_initial_randomize(mut self, initial_randomize: bool) -> Self {
        self.initial_randomize = initial_randomize;
        self
    }

    /// Fix the master seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Toggle parallel restarts
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the configuration before a run
    ///
    /// # Errors
    ///
    /// Returns error if `kfold` or `repetitions` is zero
    pub fn validate(&self) -> Result<()> {
        ensure!(self.kfold >= 1, "kfold must be at least 1");
        ensure!(self.repetitions >= 1, "repetitions must be at least 1");
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON for this
    /// type, or fails [`OptimizerConfig::validate`]
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
