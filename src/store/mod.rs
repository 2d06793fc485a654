//! Loader for the pre-aggregated tables in the output directory.
//!
//! Each table is decoded once and kept in memory. A later load re-reads the
//! file only when its modification time differs from the one recorded at
//! decode time.

pub mod frame;

use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode table: {0}")]
    Decode(#[from] PolarsError),

    #[error("Table {table} has no column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table {table} has a null '{column}' at row {row}")]
    NullValue {
        table: String,
        column: String,
        row: usize,
    },
}

struct CachedTable {
    modified: SystemTime,
    frame: Arc<DataFrame>,
}

/// Summary of one table file, reported by the status endpoint and CLI.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub present: bool,
    pub cached: bool,
    pub rows: Option<usize>,
}

pub struct TableStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, CachedTable>>,
}

impl TableStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns the decoded table, reloading it if the file changed on disk.
    pub fn load(&self, name: &str) -> Result<Arc<DataFrame>, TableError> {
        let path = self.path_for(name);
        let modified = modified_time(&path)?;

        {
            let cache = self.cache.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(entry) = cache.get(name)
                && entry.modified == modified
            {
                metrics::counter!("table_cache_hits_total", "table" => name.to_string())
                    .increment(1);
                return Ok(Arc::clone(&entry.frame));
            }
        }

        let frame = Arc::new(read_parquet(&path)?);
        metrics::counter!("table_loads_total", "table" => name.to_string()).increment(1);
        info!(table = %name, rows = frame.height(), "Loaded table");

        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.insert(
            name.to_string(),
            CachedTable {
                modified,
                frame: Arc::clone(&frame),
            },
        );

        Ok(frame)
    }

    /// Drops every cached table.
    pub fn invalidate_all(&self) {
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(tables = cache.len(), "Invalidating table cache");
        cache.clear();
    }

    #[must_use]
    pub fn describe(&self, names: &[&str]) -> Vec<TableInfo> {
        let cache = self.cache.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        names
            .iter()
            .map(|name| {
                let cached = cache.get(*name);
                TableInfo {
                    name: (*name).to_string(),
                    present: self.path_for(name).is_file(),
                    cached: cached.is_some(),
                    rows: cached.map(|entry| entry.frame.height()),
                }
            })
            .collect()
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, TableError> {
    let metadata = std::fs::metadata(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            TableError::NotFound(path.to_path_buf())
        } else {
            TableError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    metadata.modified().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_parquet(path: &Path) -> Result<DataFrame, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ParquetReader::new(file).finish()?)
}

pub fn write_parquet(path: &Path, df: &mut DataFrame) -> Result<(), TableError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| TableError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file = File::create(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}
