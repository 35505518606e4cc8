pub mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core::{AttackAttempt, EvaluationResult, ScenarioType};

/// A persisted attack attempt as read back from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub scenario_type: String,
    pub attacker_model: String,
    pub attack_data_json: String,
    pub suspicion_score: i32,
    pub decision: String,
    pub success: bool,
    pub attacker_reasoning: String,
    pub defender_reasoning: String,
    pub created_at: String,
}

pub struct Database {
    conn: Connection,
}

/// Thread-safe wrapper around Database.
#[derive(Clone)]
pub struct SharedDatabase {
    inner: Arc<Mutex<Database>>,
}

impl SharedDatabase {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let db = Database::open(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(db)),
        })
    }

    /// Open an existing database read-only, so every write fails. Lets tests
    /// drive the sink's failure path deterministically.
    #[cfg(test)]
    pub(crate) fn open_read_only(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Database { conn })),
        })
    }

    /// Persist one evaluated attempt. Best-effort: callers log failures and
    /// never let them reach the evaluation path.
    pub fn store_attempt(
        &self,
        attack: &AttackAttempt,
        result: &EvaluationResult,
    ) -> Result<(), rusqlite::Error> {
        let db = self.inner.lock().unwrap();
        db.store_attempt(attack, result)
    }

    /// Most recent attempts, newest first.
    pub fn recent_attempts(&self, limit: usize) -> Result<Vec<AttemptRecord>, rusqlite::Error> {
        let db = self.inner.lock().unwrap();
        db.recent_attempts(limit)
    }

    /// Total stored attempts.
    pub fn attempt_count(&self) -> Result<usize, rusqlite::Error> {
        let db = self.inner.lock().unwrap();
        db.attempt_count()
    }

    /// Fraction of approved (successful) attempts for a scenario, if any.
    pub fn approval_rate(&self, scenario: ScenarioType) -> Result<Option<f64>, rusqlite::Error> {
        let db = self.inner.lock().unwrap();
        db.approval_rate(scenario)
    }
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::migrate(&conn)?;
        Ok(Self { conn })
    }

    pub fn store_attempt(
        &self,
        attack: &AttackAttempt,
        result: &EvaluationResult,
    ) -> Result<(), rusqlite::Error> {
        let attack_data =
            serde_json::to_string(&attack.record).unwrap_or_else(|_| "{}".to_string());
        self.conn.execute(
            "INSERT INTO attack_attempts (scenario_type, attacker_model, attack_data,
                suspicion_score, decision, success, attacker_reasoning, defender_reasoning, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))",
            rusqlite::params![
                attack.scenario_type.as_str(),
                attack.model,
                attack_data,
                result.suspicion_score,
                result.decision.as_str(),
                result.success as i32,
                attack.reasoning,
                result.reasoning,
            ],
        )?;
        Ok(())
    }

    pub fn recent_attempts(&self, limit: usize) -> Result<Vec<AttemptRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scenario_type, attacker_model, attack_data, suspicion_score,
                    decision, success, attacker_reasoning, defender_reasoning, created_at
             FROM attack_attempts ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(rusqlite::params![limit as i64], Self::row_to_attempt)?;
        let mut attempts = Vec::new();
        for attempt in rows {
            attempts.push(attempt?);
        }
        Ok(attempts)
    }

    pub fn attempt_count(&self) -> Result<usize, rusqlite::Error> {
        self.conn
            .query_row("SELECT COUNT(*) FROM attack_attempts", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
    }

    pub fn approval_rate(&self, scenario: ScenarioType) -> Result<Option<f64>, rusqlite::Error> {
        let (total, approved): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(success), 0) FROM attack_attempts
             WHERE scenario_type = ?1",
            rusqlite::params![scenario.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if total == 0 {
            Ok(None)
        } else {
            Ok(Some(approved as f64 / total as f64))
        }
    }

    fn row_to_attempt(row: &rusqlite::Row) -> rusqlite::Result<AttemptRecord> {
        let success: i32 = row.get(6)?;
        Ok(AttemptRecord {
            id: row.get(0)?,
            scenario_type: row.get(1)?,
            attacker_model: row.get(2)?,
            attack_data_json: row.get(3)?,
            suspicion_score: row.get(4)?,
            decision: row.get(5)?,
            success: success != 0,
            attacker_reasoning: row.get(7)?,
            defender_reasoning: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}
