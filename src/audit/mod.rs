//! SQLite-backed decision audit log.
//!
//! Every pipeline outcome can be recorded with its timestamp, destination
//! URL, decision (`prepared`, `denied`, `restricted`), and reason. Rows are
//! expected to be redacted before insert — [`Pipeline::decision_record`]
//! builds them that way — so the audit trail obeys the same hygiene
//! guarantee as every other outbound text. The database is accessed through
//! an [`r2d2`] connection pool ([`DbPool`]) for thread-safe concurrent
//! writes.
//!
//! The [`export`] submodule provides JSON and CSV export of all records.
//!
//! [`Pipeline::decision_record`]: crate::pipeline::Pipeline::decision_record

pub mod export;

use rusqlite::Connection;

use crate::error::Result;

/// Decision value stored for a request that passed every stage.
pub const DECISION_PREPARED: &str = "prepared";
/// Decision value stored for a global filter denial.
pub const DECISION_DENIED: &str = "denied";
/// Decision value stored for a URL restriction violation.
pub const DECISION_RESTRICTED: &str = "restricted";

/// SQLite connection pool type alias (r2d2 + r2d2-sqlite).
pub type DbPool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

/// Open a connection pool for the given database file path.
///
/// Creates the database and `decisions` table if they don't exist.
/// The pool is configured with a maximum of 4 connections.
pub fn open_pool(path: &std::path::Path) -> Result<DbPool> {
    let manager = r2d2_sqlite::SqliteConnectionManager::file(path);
    let pool = r2d2::Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| crate::error::VaultgateError::Pool(e.to_string()))?;
    let conn = pool
        .get()
        .map_err(|e| crate::error::VaultgateError::Pool(e.to_string()))?;
    init_db(&conn)?;
    Ok(pool)
}

/// Open an in-memory connection pool (for testing).
pub fn open_memory_pool() -> Result<DbPool> {
    let manager = r2d2_sqlite::SqliteConnectionManager::memory();
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| crate::error::VaultgateError::Pool(e.to_string()))?;
    let conn = pool
        .get()
        .map_err(|e| crate::error::VaultgateError::Pool(e.to_string()))?;
    init_db(&conn)?;
    Ok(pool)
}

/// A single audited pipeline decision stored in the `decisions` table.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    /// Auto-incremented row ID (`None` for new records before insert).
    pub id: Option<i64>,
    /// ISO 8601 timestamp (e.g., `"2026-08-06T10:00:00Z"`).
    pub timestamp: String,
    /// Destination URL, redacted.
    pub url: String,
    /// Decision taken: `"prepared"`, `"denied"`, or `"restricted"`.
    pub decision: String,
    /// Human-readable reason, redacted.
    pub reason: String,
}

/// Initialize the SQLite database and create the decisions table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS decisions (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            url       TEXT NOT NULL,
            decision  TEXT NOT NULL,
            reason    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_decisions_timestamp ON decisions(timestamp);
        CREATE INDEX IF NOT EXISTS idx_decisions_decision ON decisions(decision);",
    )?;
    Ok(())
}

/// Insert a decision record.
pub fn log_decision(conn: &Connection, record: &DecisionRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO decisions (timestamp, url, decision, reason)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            record.timestamp,
            record.url,
            record.decision,
            record.reason,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Query the most recent N decision records.
pub fn query_recent(conn: &Connection, limit: usize) -> Result<Vec<DecisionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, url, decision, reason
         FROM decisions ORDER BY id DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(rusqlite::params![limit as i64], |row| {
        Ok(DecisionRecord {
            id: Some(row.get(0)?),
            timestamp: row.get(1)?,
            url: row.get(2)?,
            decision: row.get(3)?,
            reason: row.get(4)?,
        })
    })?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

/// Aggregated decision counts from the `decisions` table.
#[derive(Debug, Clone, Default)]
pub struct DecisionStats {
    /// Total number of audited decisions.
    pub total: usize,
    /// Requests that passed every stage.
    pub prepared: usize,
    /// Requests denied by the global URL filter.
    pub denied: usize,
    /// Requests aborted by a URL restriction violation.
    pub restricted: usize,
}

/// Query aggregated counts grouped by decision.
pub fn query_stats(conn: &Connection) -> Result<DecisionStats> {
    let mut stmt = conn.prepare("SELECT decision, COUNT(*) FROM decisions GROUP BY decision")?;
    let rows = stmt.query_map([], |row| {
        let decision: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        Ok((decision, count as usize))
    })?;

    let mut stats = DecisionStats::default();
    for row in rows {
        let (decision, count) = row?;
        stats.total += count;
        match decision.as_str() {
            DECISION_PREPARED => stats.prepared = count,
            DECISION_DENIED => stats.denied = count,
            DECISION_RESTRICTED => stats.restricted = count,
            _ => {} // unknown decisions still count in total
        }
    }
    Ok(stats)
}

/// Open or create a SQLite database at the given path.
pub fn open_db(path: &std::path::Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing).
pub fn open_memory_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_db(&conn)?;
    Ok(conn)
}
