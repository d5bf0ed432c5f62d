//! SQLite cleanup history.
//!
//! Records real cleanup runs in two tables:
//! - sessions: id, timestamp, totals and outcome counts
//! - outcomes: session_id, path, category, outcome, reason, bytes freed
//!
//! Dry runs are never recorded.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::clean::{CleanupResult, ItemOutcome, Outcome};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: i64,
    pub timestamp: i64,
    pub total_bytes_freed: u64,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Default database location (~/.local/share/uncruft/history.db or platform equivalent).
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "uncruft").ok_or_else(|| Error::Config {
        path: PathBuf::from("history.db"),
        message: "could not determine data directory".to_string(),
    })?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("history.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            total_bytes_freed INTEGER NOT NULL,
            deleted INTEGER NOT NULL,
            skipped INTEGER NOT NULL,
            failed INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS outcomes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            path TEXT NOT NULL,
            category_id TEXT NOT NULL,
            outcome TEXT NOT NULL,
            reason TEXT,
            bytes_freed INTEGER NOT NULL,
            FOREIGN KEY(session_id) REFERENCES sessions(id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_outcomes_session_id ON outcomes(session_id)",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    pub fn open_default() -> Result<Self> {
        Store::open(&default_path()?)
    }

    /// Records a real cleanup run. Returns `None` for dry runs.
    pub fn record(&mut self, result: &CleanupResult, timestamp: i64) -> Result<Option<i64>> {
        if result.dry_run {
            return Ok(None);
        }

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO sessions (timestamp, total_bytes_freed, deleted, skipped, failed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp,
                result.total_bytes_freed as i64,
                result.count(Outcome::Deleted) as i64,
                result.count(Outcome::Skipped) as i64,
                result.count(Outcome::Failed) as i64,
            ],
        )?;

        let session_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO outcomes (session_id, position, path, category_id, outcome, reason, bytes_freed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for (position, outcome) in result.outcomes.iter().enumerate() {
                stmt.execute(params![
                    session_id,
                    position as i64,
                    outcome.path.to_string_lossy().into_owned(),
                    outcome.category_id,
                    outcome.outcome.as_str(),
                    outcome.reason.as_deref(),
                    outcome.bytes_freed as i64,
                ])?;
            }
        }

        tx.commit()?;
        Ok(Some(session_id))
    }

    /// All sessions, newest first.
    pub fn sessions(&self) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, total_bytes_freed, deleted, skipped, failed
             FROM sessions
             ORDER BY timestamp DESC, id DESC",
        )?;

        let sessions = stmt
            .query_map([], |row| {
                Ok(Session {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    total_bytes_freed: row.get::<_, i64>(2)? as u64,
                    deleted: row.get::<_, i64>(3)? as usize,
                    skipped: row.get::<_, i64>(4)? as usize,
                    failed: row.get::<_, i64>(5)? as usize,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(sessions)
    }

    /// Per-item outcomes of one session, in their original order.
    pub fn outcomes(&self, session_id: i64) -> Result<Vec<ItemOutcome>> {
        let mut stmt = self.conn.prepare(
            "SELECT path, category_id, outcome, reason, bytes_freed
             FROM outcomes
             WHERE session_id = ?1
             ORDER BY position",
        )?;

        let outcomes = stmt
            .query_map(params![session_id], |row| {
                let outcome: String = row.get(2)?;
                let outcome = outcome.parse::<Outcome>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;

                Ok(ItemOutcome {
                    path: PathBuf::from(row.get::<_, String>(0)?),
                    category_id: row.get(1)?,
                    outcome,
                    reason: row.get(3)?,
                    bytes_freed: row.get::<_, i64>(4)? as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(dry_run: bool) -> CleanupResult {
        CleanupResult::new(
            vec![
                ItemOutcome {
                    path: PathBuf::from("/u/.npm/_cacache"),
                    category_id: "npm_cache".to_string(),
                    outcome: if dry_run { Outcome::WouldDelete } else { Outcome::Deleted },
                    reason: None,
                    bytes_freed: 500,
                },
                ItemOutcome {
                    path: PathBuf::from("/u/gone"),
                    category_id: "pip_cache".to_string(),
                    outcome: Outcome::Skipped,
                    reason: Some("no longer present".to_string()),
                    bytes_freed: 0,
                },
            ],
            dry_run,
        )
    }

    #[test]
    fn records_and_reloads_sessions() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("history.db")).unwrap();

        let first = store.record(&result(false), 1_700_000_000).unwrap().unwrap();
        let second = store.record(&result(false), 1_700_000_100).unwrap().unwrap();

        let sessions = store.sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second);
        assert_eq!(sessions[1].id, first);
        assert_eq!(sessions[0].total_bytes_freed, 500);
        assert_eq!((sessions[0].deleted, sessions[0].skipped, sessions[0].failed), (1, 1, 0));

        let outcomes = store.outcomes(first).unwrap();
        assert_eq!(outcomes, result(false).outcomes);
    }

    #[test]
    fn dry_runs_are_not_recorded() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("history.db")).unwrap();

        assert_eq!(store.record(&result(true), 1_700_000_000).unwrap(), None);
        assert!(store.sessions().unwrap().is_empty());
    }
}
