//! Conversation transcript.
//!
//! Persists every turn of every conversation to a local SQLite file so an
//! operator can read back what was said.  The responder never depends on it:
//! [`TranscriptLog::log`] swallows failures after reporting them through
//! `tracing`.
//!
//! # Storage layout
//!
//! | column    | type    | description                          |
//! |-----------|---------|--------------------------------------|
//! | id        | TEXT    | UUID v4 primary key                  |
//! | session   | TEXT    | Conversation identifier              |
//! | timestamp | TEXT    | RFC-3339 creation time (UTC)         |
//! | speaker   | TEXT    | `user` or `eliza`                    |
//! | text      | TEXT    | Utterance or reply                   |
//!
//! # Example
//!
//! ```rust
//! use eliza_memory::{Speaker, TranscriptLog};
//!
//! let log = TranscriptLog::open_in_memory().unwrap();
//! log.log("session-1", Speaker::User, "hello");
//! log.log("session-1", Speaker::Eliza, "Hello. What is your name?");
//!
//! let turns = log.session("session-1").unwrap();
//! assert_eq!(turns.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt transcript row: {0}")]
    Corrupt(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// TranscriptEntry
// ─────────────────────────────────────────────────────────────────────────────

/// Who produced a line of the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Eliza,
}

impl Speaker {
    fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Eliza => "eliza",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Speaker::User),
            "eliza" => Some(Speaker::Eliza),
            _ => None,
        }
    }
}

/// One stored line of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: Uuid,
    pub session: String,
    pub timestamp: DateTime<Utc>,
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(session: &str, speaker: Speaker, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            session: session.to_string(),
            timestamp: Utc::now(),
            speaker,
            text: text.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TranscriptLog
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite-backed transcript store.
pub struct TranscriptLog {
    conn: Connection,
}

impl TranscriptLog {
    /// Open (or create) a transcript database at `path`.
    pub fn open(path: &str) -> Result<Self, TranscriptError> {
        let conn = Connection::open(path)?;
        let log = Self { conn };
        log.init_schema()?;
        Ok(log)
    }

    /// Open a temporary in-memory database.
    pub fn open_in_memory() -> Result<Self, TranscriptError> {
        let conn = Connection::open_in_memory()?;
        let log = Self { conn };
        log.init_schema()?;
        Ok(log)
    }

    fn init_schema(&self) -> Result<(), TranscriptError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS transcript (
                id        TEXT NOT NULL PRIMARY KEY,
                session   TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                speaker   TEXT NOT NULL,
                text      TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Append an entry.
    pub fn append(&self, entry: &TranscriptEntry) -> Result<(), TranscriptError> {
        self.conn.execute(
            "INSERT INTO transcript (id, session, timestamp, speaker, text)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id.to_string(),
                entry.session,
                entry.timestamp.to_rfc3339(),
                entry.speaker.as_str(),
                entry.text,
            ],
        )?;
        Ok(())
    }

    /// Fire-and-forget append.  A failed write is logged and dropped.
    pub fn log(&self, session: &str, speaker: Speaker, text: &str) {
        let entry = TranscriptEntry::new(session, speaker, text);
        if let Err(e) = self.append(&entry) {
            warn!(error = %e, session, "transcript write failed; continuing without it");
        }
    }

    /// Every entry of `session`, oldest first.
    pub fn session(&self, session: &str) -> Result<Vec<TranscriptEntry>, TranscriptError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session, timestamp, speaker, text
             FROM transcript
             WHERE session = ?1
             ORDER BY timestamp ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![session], |row| {
            let id: String = row.get(0)?;
            let session: String = row.get(1)?;
            let ts: String = row.get(2)?;
            let speaker: String = row.get(3)?;
            let text: String = row.get(4)?;
            Ok((id, session, ts, speaker, text))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, session, ts, speaker, text) = row?;
            let id = Uuid::parse_str(&id).map_err(|e| TranscriptError::Corrupt(e.to_string()))?;
            let timestamp = ts
                .parse::<DateTime<Utc>>()
                .map_err(|e| TranscriptError::Corrupt(e.to_string()))?;
            let speaker = Speaker::parse(&speaker)
                .ok_or_else(|| TranscriptError::Corrupt(format!("unknown speaker '{speaker}'")))?;
            entries.push(TranscriptEntry {
                id,
                session,
                timestamp,
                speaker,
                text,
            });
        }
        Ok(entries)
    }

    /// Total number of stored lines across all sessions.
    pub fn len(&self) -> Result<usize, TranscriptError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM transcript", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
