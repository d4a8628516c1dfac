//! SQLite access for the visit tables
//!
//! Every operation opens its own connection through [`TraceDb::connect`] and
//! drops it when the returned [`DbSession`] goes out of scope, on success and
//! on every error path.

use crate::error::{Result, ResultExt, TagTraceError};
use crate::types::{WorkInfo, WorkTrace};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Number;
use std::path::{Path, PathBuf};

/// Schema for a fresh database
///
/// `work_info` is maintained outside this program; `work_trace` is append-only.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS work_info (
    id     TEXT PRIMARY KEY,
    name   TEXT NOT NULL,
    height NUMERIC NOT NULL,
    weight NUMERIC NOT NULL
);
CREATE TABLE IF NOT EXISTS work_trace (
    id      TEXT NOT NULL,
    name    TEXT NOT NULL,
    machine TEXT NOT NULL,
    date    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_work_trace_id_date ON work_trace (id, date);
";

/// Location of the visit database
#[derive(Debug, Clone)]
pub struct TraceDb {
    path: PathBuf,
}

impl TraceDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection for one operation
    pub fn connect(&self) -> Result<DbSession> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to open database {:?}", self.path))?;
        Ok(DbSession { conn })
    }

    /// Create the tables if they are missing
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory {:?}", parent))?;
            }
        }

        let session = self.connect()?;
        session
            .conn
            .execute_batch(SCHEMA)
            .context("Failed to create visit tables")?;
        tracing::info!("Visit database ready at {:?}", self.path);
        Ok(())
    }
}

/// One open connection, closed on drop
pub struct DbSession {
    conn: Connection,
}

impl DbSession {
    /// First `work_info` row for `id`
    pub fn find_work_info(&self, id: &str) -> Result<Option<WorkInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, height, weight FROM work_info WHERE id = ?1")?;

        let mut rows = stmt.query(params![id])?;
        let info = match rows.next()? {
            Some(row) => Some(map_work_info(row)?),
            None => None,
        };
        Ok(info)
    }

    /// Append a trace row and commit
    pub fn insert_trace(&mut self, trace: &WorkTrace) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO work_trace (id, name, machine, date) VALUES (?1, ?2, ?3, ?4)",
            params![trace.id, trace.name, trace.machine, trace.date],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Newest trace row for `id`
    pub fn latest_trace(&self, id: &str) -> Result<Option<WorkTrace>> {
        let trace = self
            .conn
            .query_row(
                "SELECT id, name, machine, date FROM work_trace
                 WHERE id = ?1
                 ORDER BY date DESC
                 LIMIT 1",
                params![id],
                map_work_trace,
            )
            .optional()?;
        Ok(trace)
    }

    /// Number of trace rows for `id`
    pub fn count_traces(&self, id: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM work_trace WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Insert or replace a registered tag holder
    pub fn upsert_work_info(&self, info: &WorkInfo) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO work_info (id, name, height, weight) VALUES (?1, ?2, ?3, ?4)",
            params![
                info.id,
                info.name,
                number_to_sql(&info.height)?,
                number_to_sql(&info.weight)?
            ],
        )?;
        Ok(())
    }
}

fn map_work_info(row: &Row) -> Result<WorkInfo> {
    Ok(WorkInfo {
        id: row.get("id")?,
        name: row.get("name")?,
        height: number_column(row, "height")?,
        weight: number_column(row, "weight")?,
    })
}

fn map_work_trace(row: &Row) -> rusqlite::Result<WorkTrace> {
    Ok(WorkTrace {
        id: row.get("id")?,
        name: row.get("name")?,
        machine: row.get("machine")?,
        date: row.get("date")?,
    })
}

/// Read a numeric column, keeping integers as integers
fn number_column(row: &Row, column: &str) -> Result<Number> {
    match row.get_ref(column)? {
        ValueRef::Integer(i) => Ok(Number::from(i)),
        ValueRef::Real(f) => Number::from_f64(f).ok_or_else(|| {
            TagTraceError::InvalidRecord(format!("{} is not a finite number", column))
        }),
        ValueRef::Text(text) => {
            let text = String::from_utf8_lossy(text);
            text.trim().parse::<Number>().map_err(|_| {
                TagTraceError::InvalidRecord(format!("{} is not numeric: {:?}", column, text))
            })
        }
        other => Err(TagTraceError::InvalidRecord(format!(
            "{} has unexpected type {}",
            column,
            other.data_type()
        ))),
    }
}

fn number_to_sql(number: &Number) -> Result<rusqlite::types::Value> {
    use rusqlite::types::Value;

    if let Some(i) = number.as_i64() {
        Ok(Value::Integer(i))
    } else if let Some(f) = number.as_f64() {
        Ok(Value::Real(f))
    } else {
        Err(TagTraceError::InvalidRecord(format!(
            "{} does not fit in SQLite",
            number
        )))
    }
}
