use std::str::FromStr;
use std::time::Duration;

use futures::StreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, SqlitePool, TypeInfo, ValueRef};
use thiserror::Error;

use super::rows::{Row, RowSet};

/// Failure to open the store. Fatal to any operation that would have
/// depended on the handle; nothing else in this layer raises.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Handle to the SQLite store.
///
/// Cheap to clone; all clones share one connection pool, which serializes
/// concurrent access from the engine and consumer contexts.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if necessary) the store at `path` in read-write mode.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout: wait for competing writers instead of surfacing
        // SQLITE_BUSY to every caller during transient contention.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|source| StoreError::Open {
                path: path.to_owned(),
                source,
            })?
            .pragma("busy_timeout", "5000");

        // An in-memory store only exists within a single connection, so it
        // must not be spread across a pool. File stores get a small pool
        // covering concurrent engine fetches plus consumer reads.
        let max_connections = if path == ":memory:" { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Open {
                path: path.to_owned(),
                source,
            })?;

        Ok(Self { pool })
    }

    /// Runs `sql` with `params` bound positionally as text and returns every
    /// result row as an ordered column-name→value mapping.
    ///
    /// No error crosses this boundary: a statement failure is logged and
    /// yields an empty row set, and a row that fails mid-iteration is logged
    /// and skipped. Persistence problems are recoverable by retry on a later
    /// cycle, never fatal to the process.
    pub async fn execute(&self, sql: &str, params: &[&str]) -> RowSet {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(*param);
        }

        let mut rows = RowSet::new();
        let mut stream = query.fetch(&self.pool);
        while let Some(item) = stream.next().await {
            match item {
                Ok(row) => rows.push(materialize(&row)),
                Err(e) => {
                    tracing::warn!(error = %e, sql, "statement step failed");
                }
            }
        }
        rows
    }

    /// Fire-and-forget statement execution (DDL, bulk update). Failures are
    /// logged; nothing is returned.
    pub async fn execute_no_result(&self, sql: &str) {
        if let Err(e) = sqlx::query(sql).execute(&self.pool).await {
            tracing::warn!(error = %e, sql, "statement failed");
        }
    }

    /// Closes the pool. Safe to call more than once.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn materialize(row: &SqliteRow) -> Row {
    let mut out = Row::default();
    for (idx, column) in row.columns().iter().enumerate() {
        out.push(column.name().to_owned(), column_text(row, idx));
    }
    out
}

/// Text rendering of one column, coercing the way the underlying engine
/// does: NULL reads as empty, numbers as their decimal form.
fn column_text(row: &SqliteRow, idx: usize) -> String {
    let value = match row.try_get_raw(idx) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "column read failed");
            return String::new();
        }
    };
    if value.is_null() {
        return String::new();
    }
    match value.type_info().name() {
        "INTEGER" => row
            .try_get::<i64, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        "REAL" => row
            .try_get::<f64, _>(idx)
            .map(|v| v.to_string())
            .unwrap_or_default(),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|v| String::from_utf8_lossy(&v).into_owned())
            .unwrap_or_default(),
        _ => row.try_get::<String, _>(idx).unwrap_or_default(),
    }
}
