//! Local CSV result file.
//!
//! ## File Layout
//!
//! ```text
//! QueryID,Item,Price,Seller
//! 7ioryb7mjb3jz90m,Fabled Earthshaker,"12,000",Bob
//! 9e107d9d372bb6826bd81d3542a419d6,Velium Shard,900,Alice
//! ```
//!
//! Writes are plain truncate/append; readers polling the file may observe a
//! partially written row and are expected to retry.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{HEADER, ResultRow};

/// A CSV result file with a `QueryID,Item,Price,Seller` header.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Truncate the file and write the header row.
    pub async fn reset(&self) -> Result<()> {
        self.ensure_dir().await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(HEADER)?;
        tokio::fs::write(&self.path, finish(writer)?).await?;

        log::debug!("Reset {} to header only", self.path.display());
        Ok(())
    }

    /// Append rows at the end of the file.
    pub async fn append(&self, rows: &[ResultRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = finish(writer)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    /// Rewrite the file without the rows of `query_id`.
    ///
    /// Returns the number of rows removed.
    pub async fn remove_query(&self, query_id: &str) -> Result<usize> {
        let bytes = tokio::fs::read(&self.path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        if headers.is_empty() {
            writer.write_record(HEADER)?;
        } else {
            writer.write_record(&headers)?;
        }

        let mut removed = 0;
        for record in reader.records() {
            let record = record?;
            if record.get(0) == Some(query_id) {
                removed += 1;
            } else {
                writer.write_record(&record)?;
            }
        }

        tokio::fs::write(&self.path, finish(writer)?).await?;
        Ok(removed)
    }

    /// Read every data row.
    pub async fn load(&self) -> Result<Vec<ResultRow>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut rows: Vec<ResultRow> = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}
