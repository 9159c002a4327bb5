//! SQLite Database
//!
//! Durable analysis history using rusqlite with r2d2 connection pooling.

use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use uuid::Uuid;

use deeptrust_core::{AnalysisResult, CoreError, HistoryEntry, Signal};

use crate::services::history::HistoryPersistence;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::history_db_path;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

const SCHEMA_VERSION: i64 = 1;

/// Raw history row from the database
#[derive(Debug, Clone)]
struct HistoryRow {
    id: String,
    media_type: String,
    filename: String,
    created_at: String,
    status: String,
    score: Option<i64>,
    risk_level: Option<String>,
    tier: Option<String>,
    signals_json: Option<String>,
}

impl HistoryRow {
    /// Rebuild the entry, re-checking the score/risk invariant.
    fn into_entry(self) -> AppResult<HistoryEntry> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| CoreError::parse(format!("invalid entry id '{}': {}", self.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| CoreError::parse(format!("invalid timestamp '{}': {}", self.created_at, e)))?
            .with_timezone(&Utc);

        let result = match (self.score, self.risk_level, self.tier) {
            (Some(score), Some(risk_level), Some(tier)) => {
                let score = u8::try_from(score)
                    .map_err(|_| CoreError::validation(format!("stored score {} out of range", score)))?;
                let signals: Vec<Signal> = match self.signals_json {
                    Some(json) => serde_json::from_str(&json)?,
                    None => Vec::new(),
                };
                Some(AnalysisResult::new(
                    score,
                    risk_level.parse()?,
                    signals,
                    tier.parse()?,
                )?)
            }
            (None, None, None) => None,
            _ => {
                return Err(AppError::database(format!(
                    "history row {} has a partial result",
                    self.id
                )))
            }
        };

        Ok(HistoryEntry::restore(
            id,
            self.media_type.parse()?,
            self.filename,
            created_at,
            self.status.parse()?,
            result,
        ))
    }
}

/// SQLite-backed history persistence
#[derive(Clone)]
pub struct SqliteHistory {
    pool: DbPool,
}

impl SqliteHistory {
    /// Open the default database at ~/.deeptrust/history.db
    pub fn new() -> AppResult<Self> {
        Self::open(&history_db_path()?)
    }

    /// Open (or create) a database file
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database for testing.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analysis_history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                media_type TEXT NOT NULL,
                filename TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL,
                score INTEGER,
                risk_level TEXT,
                tier TEXT,
                signals_json TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_media_type ON analysis_history(media_type)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )",
            [],
        )?;

        let current_version: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM history_schema_version",
            [],
            |row| row.get(0),
        )?;

        if current_version < SCHEMA_VERSION {
            conn.execute(
                "INSERT INTO history_schema_version (version, applied_at) VALUES (?1, ?2)",
                params![SCHEMA_VERSION, Utc::now().timestamp()],
            )?;
        }

        Ok(())
    }

    pub fn schema_version(&self) -> AppResult<i64> {
        let conn = self.get_connection()?;
        let version = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM history_schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }
}

impl HistoryPersistence for SqliteHistory {
    fn append(&self, entry: &HistoryEntry) -> AppResult<()> {
        let conn = self.get_connection()?;
        let result = entry.result();
        let signals_json = result
            .map(|r| serde_json::to_string(r.signals()))
            .transpose()?;

        conn.execute(
            "INSERT INTO analysis_history
                (id, media_type, filename, created_at, status, score, risk_level, tier, signals_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id().to_string(),
                entry.media_type().as_str(),
                entry.filename(),
                entry.created_at().to_rfc3339(),
                entry.status().as_str(),
                result.map(|r| r.score() as i64),
                result.map(|r| r.risk_level().as_str()),
                result.map(|r| r.tier().as_str()),
                signals_json,
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> AppResult<Vec<HistoryEntry>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, media_type, filename, created_at, status, score, risk_level, tier, signals_json
             FROM analysis_history ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(HistoryRow {
                    id: row.get(0)?,
                    media_type: row.get(1)?,
                    filename: row.get(2)?,
                    created_at: row.get(3)?,
                    status: row.get(4)?,
                    score: row.get(5)?,
                    risk_level: row.get(6)?,
                    tier: row.get(7)?,
                    signals_json: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }
}
