//! SQLite Database
//!
//! Embedded database for events and AI suggestions using rusqlite with r2d2
//! connection pooling.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Row};
use serde_json::Value;

use nexus_core::AnalysisResult;

use crate::models::event::{generate_id, EventRecord, NewEvent, SuggestionRecord};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::ensure_parent;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

const EVENT_COLUMNS: &str =
    "id, tenant_id, service, ts, type, trace_id, meta_info, payload, processed";

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create an in-memory database for testing.
    ///
    /// Uses an in-memory SQLite database with the same schema as the
    /// file-backed database.
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

    /// Open (or create) a database file with connection pooling
    pub fn new(path: &Path) -> AppResult<Self> {
        ensure_parent(path)?;

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                service TEXT NOT NULL,
                ts TEXT NOT NULL,
                type TEXT NOT NULL,
                trace_id TEXT,
                meta_info TEXT,
                payload TEXT,
                processed INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_tenant ON events(tenant_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_trace ON events(trace_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS ai_suggestions (
                id TEXT PRIMARY KEY,
                event_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                analysis TEXT NOT NULL,
                suggestion TEXT NOT NULL,
                provider TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_ai_suggestions_event ON ai_suggestions(event_id)",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Round-trip a trivial query
    pub fn ping(&self) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }


    /// Store a new event, generating an id when none was supplied
    pub fn insert_event(&self, event: NewEvent) -> AppResult<EventRecord> {
        event.validate()?;

        let record = EventRecord {
            id: event
                .id
                .map(|id| id.trim().to_string())
                .unwrap_or_else(|| generate_id("ev")),
            tenant_id: event.tenant_id,
            service: event.service,
            ts: chrono::Utc::now().to_rfc3339(),
            event_type: event.event_type,
            trace_id: event.trace_id,
            meta_info: event.meta_info,
            payload: event.payload,
            processed: false,
        };

        let meta_json = encode_json(record.meta_info.as_ref())?;
        let payload_json = encode_json(record.payload.as_ref())?;

        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO events (id, tenant_id, service, ts, type, trace_id, meta_info, payload, processed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)",
            params![
                record.id,
                record.tenant_id,
                record.service,
                record.ts,
                record.event_type,
                record.trace_id,
                meta_json,
                payload_json
            ],
        )?;

        Ok(record)
    }

    /// Get an event by id
    pub fn get_event(&self, id: &str) -> AppResult<Option<EventRecord>> {
        let conn = self.get_connection()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS),
            params![id],
            Self::row_to_event,
        );

        match result {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// Flag an event as analyzed. Returns false when no such event exists.
    pub fn mark_event_processed(&self, id: &str) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let updated = conn.execute(
            "UPDATE events SET processed = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(updated > 0)
    }

    /// Most recent events first
    pub fn list_recent_events(&self, limit: usize) -> AppResult<Vec<EventRecord>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM events ORDER BY ts DESC, rowid DESC LIMIT ?1",
            EVENT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![limit as i64], Self::row_to_event)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Store an analysis result for an event, returning the new row id
    pub fn insert_suggestion(&self, event_id: &str, result: &AnalysisResult) -> AppResult<String> {
        let id = generate_id("as");
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO ai_suggestions (id, event_id, created_at, analysis, suggestion, provider)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                event_id,
                chrono::Utc::now().to_rfc3339(),
                result.analysis,
                result.suggestion,
                result.provider
            ],
        )?;
        Ok(id)
    }

    /// Suggestions for an event, oldest first
    pub fn list_suggestions(&self, event_id: &str) -> AppResult<Vec<SuggestionRecord>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, event_id, created_at, analysis, suggestion, provider
             FROM ai_suggestions WHERE event_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let rows = stmt
            .query_map(params![event_id], |row| {
                Ok(SuggestionRecord {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    created_at: row.get(2)?,
                    analysis: row.get(3)?,
                    suggestion: row.get(4)?,
                    provider: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn row_to_event(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
        let meta_info: Option<String> = row.get(6)?;
        let payload: Option<String> = row.get(7)?;
        let processed: i64 = row.get(8)?;
        Ok(EventRecord {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            service: row.get(2)?,
            ts: row.get(3)?,
            event_type: row.get(4)?,
            trace_id: row.get(5)?,
            meta_info: decode_json(meta_info.as_deref()),
            payload: decode_json(payload.as_deref()),
            processed: processed != 0,
        })
    }
}

fn encode_json(value: Option<&Value>) -> AppResult<Option<String>> {
    value.map(serde_json::to_string).transpose().map_err(AppError::from)
}

/// Stored JSON that no longer parses is kept as a raw string.
fn decode_json(raw: Option<&str>) -> Option<Value> {
    raw.map(|s| serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string())))
}
