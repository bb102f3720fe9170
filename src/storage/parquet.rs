//! Parquet I/O for partition persistence
//!
//! Based on `DuckDB` (Raasveldt et al., SIGMOD 2019) columnar storage patterns.
//!
//! # Format
//!
//! A partition is stored as a single Parquet file with two columns,
//! (`vertex`, `cluster`), one row per vertex in ascending vertex order. This is
//! the columnar twin of the `vertexId clusterId` text listing.

use super::Partition;
use anyhow::{anyhow, ensure, Context, Result};
use arrow::array::UInt32Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

impl Partition {
    /// Write the partition to a Parquet file
    ///
    /// # Errors
    ///
    /// Returns error if file I/O fails, Arrow conversion fails, or an id does
    /// not fit in `u32`
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn write_parquet<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let mut vertices = Vec::with_capacity(self.len());
        let mut clusters = Vec::with_capacity(self.len());
        for (vertex, &cluster) in self.membership().iter().enumerate() {
            vertices.push(u32::try_from(vertex).context("Vertex id exceeds u32")?);
            clusters.push(u32::try_from(cluster).context("Cluster id exceeds u32")?);
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("vertex", DataType::UInt32, false),
            Field::new("cluster", DataType::UInt32, false),
        ]));

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(UInt32Array::from(vertices)),
                Arc::new(UInt32Array::from(clusters)),
            ],
        )
        .context("Failed to create partition RecordBatch")?;

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let props = WriterProperties::builder()
            .set_compression(parquet::basic::Compression::ZSTD(
                parquet::basic::ZstdLevel::try_new(3)?,
            ))
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }

    /// Read a partition written by [`Partition::write_parquet`]
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, Arrow conversion fails, or the
    /// rows do not cover every vertex exactly once
    #[allow(clippy::unused_async)] // Async API for future I/O operations
    pub async fn read_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut labels: Vec<Option<usize>> = Vec::new();

        for batch_result in reader {
            let batch: RecordBatch = batch_result?;

            let vertices = batch
                .column(0)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid vertex column type")?;

            let clusters = batch
                .column(1)
                .as_any()
                .downcast_ref::<UInt32Array>()
                .context("Invalid cluster column type")?;

            for i in 0..batch.num_rows() {
                let vertex = vertices.value(i) as usize;
                if vertex >= labels.len() {
                    labels.resize(vertex + 1, None);
                }
                ensure!(labels[vertex].is_none(), "vertex {vertex} stored twice");
                labels[vertex] = Some(clusters.value(i) as usize);
            }
        }

        let membership = labels
            .into_iter()
            .enumerate()
            .map(|(v, label)| label.ok_or_else(|| anyhow!("vertex {v} missing from partition")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_membership(membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_parquet_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partition.parquet");

        let mut partition = Partition::singletons(6);
        partition.add(0, 1);
        partition.add(1, 2);
        partition.add(4, 5);
        partition.sort_by_size();

        partition.write_parquet(&path).await.unwrap();
        let loaded = Partition::read_parquet(&path).await.unwrap();

        assert_eq!(loaded, partition);
        assert_eq!(loaded.num_clusters(), 3);
    }

    #[tokio::test]
    async fn test_empty_partition_parquet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");

        Partition::singletons(0).write_parquet(&path).await.unwrap();

        let loaded = Partition::read_parquet(&path).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        assert!(Partition::read_parquet(dir.path().join("nope.parquet"))
            .await
            .is_err());
    }
}
