//! Storage module for persisting fetched pages
//!
//! This module provides the `PageSink` trait consumed by the crawler and
//! its implementations:
//! - `FileSink`: a single shared file or one file per page
//! - `SqliteSink`: rows in a SQLite database

mod file;
mod schema;
mod sqlite;
mod traits;

pub use file::{file_name_for, FileSink};
pub use sqlite::{SqliteSink, StoredPage};
pub use traits::{PageSink, WriteError, WriteResult};

use crate::config::{OutputConfig, OutputKind};
use std::path::Path;
use std::sync::Arc;

/// Builds the sink described by the output configuration
///
/// # Arguments
///
/// * `config` - The output section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn PageSink>)` - Ready-to-use sink
/// * `Err(WriteError)` - The database could not be opened
pub fn open_sink(config: &OutputConfig) -> WriteResult<Arc<dyn PageSink>> {
    let sink: Arc<dyn PageSink> = match config.kind {
        OutputKind::SharedFile => Arc::new(FileSink::shared(&config.path)),
        OutputKind::PerPage => Arc::new(FileSink::per_page(&config.path)),
        OutputKind::Sqlite => {
            let sink = SqliteSink::new(Path::new(&config.path)).map_err(|source| {
                WriteError::Database {
                    name: config.path.clone(),
                    source,
                }
            })?;
            Arc::new(sink)
        }
    };
    Ok(sink)
}
