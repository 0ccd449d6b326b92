//! SQLite-based store implementation

use attend_util::SessionToken;
use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Session token (single row)
            CREATE TABLE IF NOT EXISTS session_token (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| attend_util::now());
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn load_token(&self) -> StoreResult<Option<SessionToken>> {
        let conn = self.conn()?;

        let token: Option<String> = conn
            .query_row("SELECT token FROM session_token WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(token.and_then(SessionToken::new))
    }

    fn save_token(&self, token: &SessionToken) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO session_token (id, token, saved_at)
            VALUES (1, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET token = excluded.token, saved_at = excluded.saved_at
            "#,
            params![token.expose(), attend_util::now().to_rfc3339()],
        )?;

        debug!("Session token saved");
        Ok(())
    }

    fn clear_token(&self) -> StoreResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM session_token WHERE id = 1", [])?;
        Ok(removed > 0)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attend_util::SessionId;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();
        let session_id = SessionId::new();

        store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStarted))
            .unwrap();
        store
            .append_audit(AuditEvent::new(AuditEventType::CheckedIn {
                session_id: session_id.clone(),
                date: "2025-03-10".into(),
                distance_meters: 12.5,
            }))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert!(matches!(events[0].event, AuditEventType::CheckedIn { .. }));
        assert!(matches!(events[1].event, AuditEventType::ServiceStarted));

        let limited = store.get_recent_audits(1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_token_lifecycle() {
        let store = SqliteStore::in_memory().unwrap();

        // No token initially
        assert!(store.load_token().unwrap().is_none());
        assert!(!store.clear_token().unwrap());

        let token = SessionToken::new("first").unwrap();
        store.save_token(&token).unwrap();
        assert_eq!(store.load_token().unwrap(), Some(token));

        // Saving again replaces
        let token = SessionToken::new("second").unwrap();
        store.save_token(&token).unwrap();
        assert_eq!(store.load_token().unwrap().unwrap().expose(), "second");

        assert!(store.clear_token().unwrap());
        assert!(store.load_token().unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendd.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save_token(&SessionToken::new("kept").unwrap()).unwrap();
            store
                .append_audit(AuditEvent::new(AuditEventType::TokenSaved))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_token().unwrap().unwrap().expose(), "kept");
        assert_eq!(store.get_recent_audits(10).unwrap().len(), 1);
    }
}
