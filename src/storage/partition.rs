//! Vertex partition with single-step undo
//!
//! A union-find over vertex ids where the cluster of every vertex is stored
//! directly (no parent chains), so `find` is a plain lookup. Merges move the
//! smaller cluster into the larger one and remember exactly what moved, which
//! is enough to reverse the most recent merge without snapshotting the whole
//! partition.
//!
//! # Persisted format
//!
//! ```text
//! 0 0
//! 1 0
//! 2 1
//! ```
//!
//! One `vertexId clusterId` line per vertex, vertex ids ascending.

use crate::storage::NodeId;
use anyhow::{anyhow, ensure, Context, Result};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// What the last merge changed
#[derive(Debug, Clone)]
struct MergeRecord {
    kept: usize,
    absorbed: usize,
    moved: Vec<usize>,
}

/// Partition of `0..n` into disjoint clusters
///
/// # Example
///
/// ```
/// use trueno_fagso::Partition;
///
/// let mut partition = Partition::singletons(4);
/// assert!(partition.add(0, 1));
/// assert!(partition.connected(0, 1));
/// assert_eq!(partition.num_clusters(), 3);
///
/// partition.undo();
/// assert!(!partition.connected(0, 1));
/// ```
#[derive(Debug, Clone)]
pub struct Partition {
    /// vertex -> cluster id
    membership: Vec<usize>,
    /// cluster id -> member vertices (inverse of `membership`)
    clustering: BTreeMap<usize, BTreeSet<usize>>,
    last_merge: Option<MergeRecord>,
}

impl Partition {
    /// Every vertex in its own cluster, cluster id = vertex id
    #[must_use]
    pub fn singletons(num_vertices: usize) -> Self {
        let membership: Vec<usize> = (0..num_vertices).collect();
        let clustering = (0..num_vertices)
            .map(|v| (v, BTreeSet::from([v])))
            .collect();
        Self {
            membership,
            clustering,
            last_merge: None,
        }
    }

    /// Random initial assignment: each vertex draws a label uniformly from `0..n`
    pub fn randomized<R: Rng + ?Sized>(num_vertices: usize, rng: &mut R) -> Self {
        let labels = (0..num_vertices)
            .map(|_| rng.gen_range(0..num_vertices))
            .collect();
        Self::from_membership(labels)
    }

    /// Build a partition from an external labelling
    ///
    /// Labels are kept as cluster ids; they need not be dense.
    #[must_use]
    pub fn from_membership(membership: Vec<usize>) -> Self {
        let mut clustering: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for (vertex, &cluster) in membership.iter().enumerate() {
            clustering.entry(cluster).or_default().insert(vertex);
        }
        Self {
            membership,
            clustering,
            last_merge: None,
        }
    }

    /// Number of vertices covered
    #[must_use]
    pub fn len(&self) -> usize {
        self.membership.len()
    }

    /// Whether the partition covers no vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    /// Cluster id of `vertex`
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is not below [`Partition::len`]
    #[must_use]
    pub fn find(&self, vertex: usize) -> usize {
        self.membership[vertex]
    }

    /// Whether `p` and `q` share a cluster
    #[must_use]
    pub fn connected(&self, p: usize, q: usize) -> bool {
        self.find(p) == self.find(q)
    }

    /// Merge the clusters of `p` and `q`
    ///
    /// The smaller cluster is absorbed into the larger one; on equal sizes the
    /// cluster of `q` is absorbed into the cluster of `p`. Returns `false`
    /// without touching anything when both are already in the same cluster.
    /// A successful merge replaces the undo record.
    pub fn add(&mut self, p: usize, q: usize) -> bool {
        let cp = self.find(p);
        let cq = self.find(q);
        if cp == cq {
            return false;
        }

        let size_p = self.clustering.get(&cp).map_or(0, BTreeSet::len);
        let size_q = self.clustering.get(&cq).map_or(0, BTreeSet::len);
        let (kept, absorbed) = if size_q > size_p { (cq, cp) } else { (cp, cq) };

        let moved_set = self.clustering.remove(&absorbed).unwrap_or_default();
        for &vertex in &moved_set {
            self.membership[vertex] = kept;
        }
        let moved: Vec<usize> = moved_set.iter().copied().collect();
        self.clustering.entry(kept).or_default().extend(moved_set);

        self.last_merge = Some(MergeRecord {
            kept,
            absorbed,
            moved,
        });
        true
    }

    /// Reverse the most recent merge
    ///
    /// Returns `false` if there is no pending merge. Only one level of undo
    /// exists: a second call is a no-op.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.last_merge.take() else {
            return false;
        };

        if let Some(kept) = self.clustering.get_mut(&record.kept) {
            for vertex in &record.moved {
                kept.remove(vertex);
            }
        }
        for &vertex in &record.moved {
            self.membership[vertex] = record.absorbed;
        }
        self.clustering
            .insert(record.absorbed, record.moved.into_iter().collect());
        true
    }

    /// Relabel clusters `0..k` by descending size
    ///
    /// Equal sizes are ordered by their smallest member. Clears the undo
    /// record since old cluster ids no longer exist.
    pub fn sort_by_size(&mut self) {
        let mut clusters: Vec<BTreeSet<usize>> =
            std::mem::take(&mut self.clustering).into_values().collect();
        clusters.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.first().cmp(&b.first()))
        });

        for (label, members) in clusters.into_iter().enumerate() {
            for &vertex in &members {
                self.membership[vertex] = label;
            }
            self.clustering.insert(label, members);
        }
        self.last_merge = None;
    }

    /// Number of non-empty clusters
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.clustering.len()
    }

    /// Members of cluster `id`
    #[must_use]
    pub fn cluster(&self, id: usize) -> Option<&BTreeSet<usize>> {
        self.clustering.get(&id)
    }

    /// Iterate `(cluster id, members)` in ascending id order
    pub fn clusters(&self) -> impl Iterator<Item = (usize, &BTreeSet<usize>)> + '_ {
        self.clustering.iter().map(|(&id, members)| (id, members))
    }

    /// Dense vertex -> cluster mapping
    #[must_use]
    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    /// Clusters as node lists, in ascending cluster id order
    #[must_use]
    pub fn communities(&self) -> Vec<Vec<NodeId>> {
        self.clustering
            .values()
            .map(|members| {
                members
                    .iter()
                    .filter_map(|&v| u32::try_from(v).ok().map(NodeId))
                    .collect()
            })
            .collect()
    }

    /// Write the `vertexId clusterId` listing
    ///
    /// # Errors
    ///
    /// Returns error if the writer fails
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (vertex, cluster) in self.membership.iter().enumerate() {
            writeln!(writer, "{vertex} {cluster}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Save the partition to a text file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_to(BufWriter::new(file))
    }

    /// Read a `vertexId clusterId` listing
    ///
    /// Lines may come in any order but every vertex of `0..n` must appear
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns error on malformed lines, duplicate vertices or gaps
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels: Vec<Option<usize>> = Vec::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let (Some(v), Some(c), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(anyhow!(
                    "line {}: expected `vertex cluster`, found {trimmed:?}",
                    lineno + 1
                ));
            };
            let vertex: usize = v
                .parse()
                .with_context(|| format!("line {}: bad vertex id {v:?}", lineno + 1))?;
            let cluster: usize = c
                .parse()
                .with_context(|| format!("line {}: bad cluster id {c:?}", lineno + 1))?;

            if vertex >= labels.len() {
                labels.resize(vertex + 1, None);
            }
            ensure!(
                labels[vertex].is_none(),
                "line {}: vertex {vertex} listed twice",
                lineno + 1
            );
            labels[vertex] = Some(cluster);
        }

        let membership = labels
            .into_iter()
            .enumerate()
            .map(|(v, label)| label.ok_or_else(|| anyhow!("vertex {v} missing from partition")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_membership(membership))
    }

    /// Load a partition saved by [`Partition::save`]
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is malformed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::read_from(BufReader::new(file))
            .with_context(|| format!("Failed to parse partition {}", path.display()))
    }
}

impl PartialEq for Partition {
    /// Observational equality: the undo record is not compared
    fn eq(&self, other: &Self) -> bool {
        self.membership == other.membership && self.clustering == other.clustering
    }
}

impl Eq for Partition {}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (vertex, cluster) in self.membership.iter().enumerate() {
            writeln!(f, "{vertex} {cluster}")?;
        }
        Ok(())
    }
}
