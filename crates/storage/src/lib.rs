use chrono::{DateTime, Utc};
use clipkeep_history::{
    ClipFilter, ClipId, ClipRecord, ClipRepository, ContentType, ExclusionEntry,
    ExclusionRepository, HistorySettings, NewClip, SettingsRepository, DEFAULT_EXCLUDED_APPS,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("database connection lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StorageError>;

const DATABASE_FILE: &str = "clipkeep.db";
const HISTORY_SETTINGS_KEY: &str = "history_settings";
const EXCLUSIONS_SEEDED_KEY: &str = "exclusions_seeded";

const CLIP_COLUMNS: &str =
    "id, content, content_type, source_app, timestamp, is_pinned, preview_image, metadata";

pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipkeep")
}

pub fn default_database_path() -> PathBuf {
    data_dir().join(DATABASE_FILE)
}

/// SQLite-backed history store.
///
/// One connection behind one mutex: every operation, read or write, runs
/// to completion before the next starts, so readers always observe a
/// consistent snapshot and the watcher and presentation layer can share
/// a single instance.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "opened history database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clips (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                content_type TEXT NOT NULL,
                source_app TEXT,
                timestamp INTEGER NOT NULL,
                is_pinned INTEGER NOT NULL DEFAULT 0,
                preview_image BLOB,
                metadata TEXT
            );

            CREATE TABLE IF NOT EXISTS exclusions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                app_identifier TEXT NOT NULL UNIQUE,
                app_name TEXT,
                added_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_clips_timestamp ON clips(timestamp DESC);
            CREATE INDEX IF NOT EXISTS idx_clips_type ON clips(content_type);
            CREATE INDEX IF NOT EXISTS idx_clips_pinned ON clips(is_pinned DESC);
            "#,
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    /// Insert the built-in credential-manager exclusions, once per database.
    ///
    /// Later calls are no-ops, so entries the user removed stay removed.
    /// Returns the number of entries inserted.
    pub fn seed_default_exclusions(&self) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let seeded: Option<String> = tx
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [EXCLUSIONS_SEEDED_KEY],
                |row| row.get(0),
            )
            .optional()?;
        if seeded.is_some() {
            return Ok(0);
        }

        let now = Utc::now().timestamp_millis();
        let mut inserted = 0;
        for (bundle_id, name) in DEFAULT_EXCLUDED_APPS {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO exclusions (app_identifier, app_name, added_at) VALUES (?1, ?2, ?3)",
                (bundle_id, name, now),
            )?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (EXCLUSIONS_SEEDED_KEY, "1"),
        )?;
        tx.commit()?;

        tracing::info!(inserted, "seeded default exclusions");
        Ok(inserted)
    }
}

struct ClipRow {
    id: i64,
    content: String,
    content_type: String,
    source_app: Option<String>,
    timestamp: i64,
    is_pinned: bool,
    preview_image: Option<Vec<u8>>,
    metadata: Option<String>,
}

impl ClipRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            content_type: row.get(2)?,
            source_app: row.get(3)?,
            timestamp: row.get(4)?,
            is_pinned: row.get(5)?,
            preview_image: row.get(6)?,
            metadata: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<ClipRecord> {
        let content_type: ContentType = self
            .content_type
            .parse()
            .map_err(|e| StorageError::InvalidData(format!("clip {}: {e}", self.id)))?;
        let captured_at = millis_to_datetime(self.timestamp)?;
        let metadata = self
            .metadata
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()?;

        Ok(ClipRecord {
            id: self.id,
            content: self.content,
            content_type,
            source_app: self.source_app,
            captured_at,
            pinned: self.is_pinned,
            preview_bytes: self.preview_image,
            metadata,
        })
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::InvalidData(format!("timestamp out of range: {ms}")))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl ClipRepository for Database {
    type Error = StorageError;

    fn append(&self, clip: NewClip) -> Result<ClipRecord> {
        let metadata = clip
            .metadata
            .as_ref()
            .map(|value| serde_json::to_string(value))
            .transpose()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clips (content, content_type, source_app, timestamp, is_pinned, preview_image, metadata) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
            params![
                &clip.content,
                clip.content_type.as_str(),
                &clip.source_app,
                clip.captured_at.timestamp_millis(),
                clip.preview_bytes.as_deref(),
                metadata,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        Ok(ClipRecord::from_new(id, clip))
    }

    fn get(&self, id: ClipId) -> Result<ClipRecord> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {CLIP_COLUMNS} FROM clips WHERE id = ?1"),
                [id],
                ClipRow::from_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StorageError::NotFound(format!("clip {id}")),
                other => StorageError::DatabaseError(other),
            })?;
        row.into_record()
    }

    fn list(&self, filter: &ClipFilter, limit: usize) -> Result<Vec<ClipRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Keyword matching is Unicode-aware and done here, so SQL only
        // limits rows when no keyword narrows the result afterwards.
        let has_keyword = filter.normalized_keyword().is_some();
        let sql_cap = if has_keyword { -1 } else { sql_limit(limit) };

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CLIP_COLUMNS} FROM clips WHERE (?1 IS NULL OR content_type = ?1) ORDER BY is_pinned DESC, timestamp DESC, id DESC LIMIT ?2"
        ))?;
        // Content is checked before the row is decoded, so preview blobs of
        // non-matching rows are never read.
        let rows = stmt.query_map(
            params![filter.content_type.map(|t| t.as_str()), sql_cap],
            |row| {
                if has_keyword {
                    let content: String = row.get(1)?;
                    if !filter.matches_content(&content) {
                        return Ok(None);
                    }
                }
                ClipRow::from_row(row).map(Some)
            },
        )?;

        let mut records = Vec::new();
        for row in rows {
            let Some(row) = row? else {
                continue;
            };
            records.push(row.into_record()?);
            if records.len() >= limit {
                break;
            }
        }
        Ok(records)
    }

    fn recent(&self, limit: usize) -> Result<Vec<ClipRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CLIP_COLUMNS} FROM clips ORDER BY timestamp DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([sql_limit(limit)], ClipRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn set_pinned(&self, id: ClipId, pinned: bool) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute(
            "UPDATE clips SET is_pinned = ?1 WHERE id = ?2",
            params![pinned, id],
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("clip {id}")));
        }
        Ok(())
    }

    fn delete(&self, id: ClipId) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM clips WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("clip {id}")));
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM clips", [])?;
        tracing::info!(removed, "cleared clipboard history");
        Ok(removed)
    }

    fn purge_older_than(&self, threshold: DateTime<Utc>) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM clips WHERE is_pinned = 0 AND timestamp < ?1",
            [threshold.timestamp_millis()],
        )?;
        if removed > 0 {
            tracing::debug!(removed, %threshold, "purged expired clips");
        }
        Ok(removed)
    }

    fn trim_to(&self, max_items: usize) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM clips WHERE id IN (
                SELECT id FROM clips WHERE is_pinned = 0
                ORDER BY timestamp DESC, id DESC
                LIMIT -1 OFFSET ?1
            )",
            [sql_limit(max_items)],
        )?;
        if removed > 0 {
            tracing::debug!(removed, max_items, "trimmed clipboard history");
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM clips", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl ExclusionRepository for Database {
    type Error = StorageError;

    fn add_exclusion(&self, app_identifier: &str, display_name: Option<&str>) -> Result<bool> {
        let app_identifier = app_identifier.trim();
        if app_identifier.is_empty() {
            return Err(StorageError::InvalidData(
                "exclusion requires an application identifier".to_string(),
            ));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO exclusions (app_identifier, app_name, added_at) VALUES (?1, ?2, ?3)",
            params![app_identifier, display_name, Utc::now().timestamp_millis()],
        )?;
        if inserted > 0 {
            tracing::info!(app = app_identifier, "added capture exclusion");
        }
        Ok(inserted > 0)
    }

    fn remove_exclusion(&self, app_identifier: &str) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM exclusions WHERE app_identifier = ?1",
            [app_identifier.trim()],
        )?;
        if removed > 0 {
            tracing::info!(app = app_identifier, "removed capture exclusion");
        }
        Ok(removed > 0)
    }

    fn list_exclusions(&self) -> Result<Vec<ExclusionEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, app_identifier, app_name, added_at FROM exclusions ORDER BY added_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let app_identifier: String = row.get(1)?;
            let display_name: Option<String> = row.get(2)?;
            let added_at: i64 = row.get(3)?;
            Ok((id, app_identifier, display_name, added_at))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, app_identifier, display_name, added_at) = row?;
            entries.push(ExclusionEntry {
                id,
                app_identifier,
                display_name,
                added_at: millis_to_datetime(added_at)?,
            });
        }
        Ok(entries)
    }

    fn is_excluded(&self, app_identifier: &str) -> Result<bool> {
        if app_identifier.is_empty() {
            return Ok(false);
        }
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM exclusions WHERE app_identifier = ?1)",
            [app_identifier],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn clear_exclusions(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM exclusions", [])?)
    }
}

impl SettingsRepository for Database {
    type Error = StorageError;

    fn history_settings(&self) -> Result<HistorySettings> {
        match self.get_setting(HISTORY_SETTINGS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(HistorySettings::default()),
        }
    }

    fn save_history_settings(&self, settings: &HistorySettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.set_setting(HISTORY_SETTINGS_KEY, &json)
    }
}
