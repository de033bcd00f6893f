//! SQLite persistence for the patient queue
//!
//! One table, `patient_records`, created on open if missing. Every failure is
//! logged where it happens and returned as a typed [`TriageError`].

use std::path::{Path, PathBuf};

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, error, info};

use crate::error::{Result, TriageError};
use crate::model::{NewPatient, PatientRecord, QueueCounts, Status};

/// Owned handle to the patient store
pub struct PatientStore {
    conn: Connection,
    path: PathBuf,
}

impl PatientStore {
    /// Open or create the store at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!(path = %path.display(), error = %e, "cannot create patient store directory");
                TriageError::storage_unavailable(&path, e)
            })?;
        }

        let conn = Connection::open(&path).map_err(|e| {
            error!(path = %path.display(), error = %e, "cannot open patient store");
            TriageError::storage_unavailable(&path, e)
        })?;

        let store = Self { conn, path };
        store.register_functions()?;
        store.run_migrations()?;

        info!(path = %store.path.display(), "patient store ready");
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory()
            .map_err(|e| TriageError::storage_unavailable(&path, e))?;
        let store = Self { conn, path };
        store.register_functions()?;
        store.run_migrations()?;
        Ok(store)
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `fold_case(text)`: Unicode lowercase, matching the queue's name filter.
    /// SQLite's own `lower()` only folds ASCII.
    fn register_functions(&self) -> Result<()> {
        self.conn
            .create_scalar_function(
                "fold_case",
                1,
                FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
                |ctx| {
                    let text: Option<String> = ctx.get(0)?;
                    Ok(text.map(|t| t.to_lowercase()))
                },
            )
            .map_err(|e| {
                error!(path = %self.path.display(), error = %e, "failed to register functions");
                TriageError::storage_unavailable(&self.path, e)
            })
    }

    /// Create the table and indexes if they do not exist yet
    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .and_then(|_| self.conn.execute_batch(INDEXES))
            .map_err(|e| {
                error!(path = %self.path.display(), error = %e, "failed to create schema");
                TriageError::storage_unavailable(&self.path, e)
            })
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Append a waiting record; returns the store-assigned id
    pub fn insert(&self, patient: &NewPatient) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO patient_records (name, age, severity, checkup, status) VALUES (?, ?, ?, ?, ?)",
                params![
                    patient.name,
                    patient.age,
                    patient.severity,
                    patient.checkup,
                    Status::Waiting
                ],
            )
            .map_err(write_failed("insert"))?;

        let id = self.conn.last_insert_rowid();
        debug!(id, severity = patient.severity, "inserted patient");
        Ok(id)
    }

    /// Mark a waiting record served. Returns false if no waiting record has that id.
    pub fn mark_served(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE patient_records SET status = ? WHERE id = ? AND status = ?",
                params![Status::Served, id, Status::Waiting],
            )
            .map_err(write_failed("mark_served"))?;

        if changed == 0 {
            debug!(id, "mark_served: no waiting record");
        }
        Ok(changed > 0)
    }

    /// Serve every waiting record in one statement; returns how many changed
    pub fn mark_all_served(&self) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE patient_records SET status = ? WHERE status = ?",
                params![Status::Served, Status::Waiting],
            )
            .map_err(write_failed("mark_all_served"))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Waiting records, most severe first, first-come-first-served within a severity
    pub fn load_waiting(&self) -> Result<Vec<PatientRecord>> {
        self.select(
            &format!(
                "SELECT {COLUMNS} FROM patient_records WHERE status = ? ORDER BY severity DESC, id ASC"
            ),
            params![Status::Waiting],
        )
    }

    /// All records, most recent visit first. `None` or `Some(0)` means no cap.
    pub fn load_history(&self, limit: Option<usize>) -> Result<Vec<PatientRecord>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit
            .filter(|&n| n > 0)
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        self.select(
            &format!(
                "SELECT {COLUMNS} FROM patient_records ORDER BY visit_time DESC, id DESC LIMIT ?"
            ),
            params![limit],
        )
    }

    /// Case-insensitive substring match on name, most recent visit first
    pub fn search_by_name(&self, query: &str) -> Result<Vec<PatientRecord>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        self.select(
            &format!(
                r"SELECT {COLUMNS} FROM patient_records
                  WHERE fold_case(name) LIKE ? ESCAPE '\'
                  ORDER BY visit_time DESC, id DESC"
            ),
            params![pattern],
        )
    }

    pub fn get(&self, id: i64) -> Result<Option<PatientRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM patient_records WHERE id = ?"),
                params![id],
                map_record,
            )
            .optional()
            .map_err(query_failed("get"))
    }

    /// Waiting and served totals
    pub fn counts(&self) -> Result<QueueCounts> {
        self.conn
            .query_row(
                "SELECT COALESCE(SUM(status = 'waiting'), 0), COALESCE(SUM(status = 'served'), 0)
                 FROM patient_records",
                [],
                |row| {
                    Ok(QueueCounts {
                        waiting: row.get::<_, i64>(0)?.max(0) as usize,
                        served: row.get::<_, i64>(1)?.max(0) as usize,
                    })
                },
            )
            .map_err(query_failed("counts"))
    }

    fn select(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<PatientRecord>> {
        let mut stmt = self.conn.prepare(sql).map_err(query_failed("prepare"))?;

        let records = stmt
            .query_map(params, map_record)
            .map_err(query_failed("select"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_failed("select"))?;

        Ok(records)
    }
}

const COLUMNS: &str = "id, name, age, severity, checkup, visit_time, status";

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS patient_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    age INTEGER,
    severity INTEGER,
    checkup TEXT,
    visit_time TEXT DEFAULT (datetime('now','localtime')),
    status TEXT DEFAULT 'waiting'
);
"#;

const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_patient_records_queue ON patient_records(status, severity DESC, id);
CREATE INDEX IF NOT EXISTS idx_patient_records_visit ON patient_records(visit_time DESC);
"#;

// ============================================================================
// Helpers
// ============================================================================

fn map_record(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
    Ok(PatientRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
        severity: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        checkup: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        visit_time: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        status: row.get::<_, Option<Status>>(6)?.unwrap_or(Status::Waiting),
    })
}

fn write_failed(op: &'static str) -> impl Fn(rusqlite::Error) -> TriageError {
    move |e| {
        error!(op, error = %e, "patient store write failed");
        TriageError::write(e)
    }
}

fn query_failed(op: &'static str) -> impl Fn(rusqlite::Error) -> TriageError {
    move |e| {
        error!(op, error = %e, "patient store query failed");
        TriageError::query(e)
    }
}

/// Escape LIKE wildcards so the query matches as a literal substring
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
