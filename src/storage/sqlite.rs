//! SQLite page sink
//!
//! Stores the latest body of every fetched URL in a `pages` table. Rows are
//! keyed by URL, so the sink never needs the crawl gate to stay consistent.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageSink, WriteError, WriteResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// A stored page as read back from the database
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub url: String,
    pub body: Vec<u8>,
    pub size: u64,
    pub fetched_at: String,
}

/// SQLite-backed page sink
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn store(&self, url: &str, bytes: &[u8]) -> WriteResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| WriteError::Unavailable("database connection poisoned".to_string()))?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO pages (url, body, size, fetched_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET body = excluded.body,
                 size = excluded.size, fetched_at = excluded.fetched_at",
            params![url, bytes, bytes.len() as i64, now],
        )
        .map_err(|source| WriteError::Database {
            name: url.to_string(),
            source,
        })?;

        Ok(())
    }

    /// Reads back a stored page
    pub fn get_page(&self, url: &str) -> WriteResult<Option<StoredPage>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| WriteError::Unavailable("database connection poisoned".to_string()))?;

        conn.query_row(
            "SELECT url, body, size, fetched_at FROM pages WHERE url = ?1",
            params![url],
            |row| {
                Ok(StoredPage {
                    url: row.get(0)?,
                    body: row.get(1)?,
                    size: row.get::<_, i64>(2)? as u64,
                    fetched_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|source| WriteError::Database {
            name: url.to_string(),
            source,
        })
    }

    /// Counts stored pages
    pub fn count_pages(&self) -> WriteResult<u64> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| WriteError::Unavailable("database connection poisoned".to_string()))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .map_err(|source| WriteError::Database {
                name: "pages".to_string(),
                source,
            })?;
        Ok(count as u64)
    }
}

#[async_trait]
impl PageSink for SqliteSink {
    async fn write(&self, name: &str, bytes: &[u8]) -> WriteResult<()> {
        self.store(name, bytes)
    }
}
