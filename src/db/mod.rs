use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Error::FromSqlConversionFailure;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::ShortLink;
use crate::shortener::{
    Allocator, DEFAULT_CONFLICT_RETRIES, DEFAULT_WORD_COUNT, LinkStore, StoreError, WordGenerator,
};

/// Config key: number of words in generated short paths.
pub const CONFIG_WORDS: &str = "words";
/// Config key: fresh allocation rounds after an insert-time conflict.
pub const CONFIG_CONFLICT_RETRIES: &str = "conflict_retries";

pub struct Database {
    conn: Connection,
}

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(format!("query error: {e}"))
}

fn row_err(e: rusqlite::Error) -> StoreError {
    StoreError::Unavailable(format!("row error: {e}"))
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("failed to open database: {e}")))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(|e| StoreError::Unavailable(format!("failed to set pragmas: {e}")))?;

        Ok(Database { conn })
    }

    /// Open a database that `wl init` has already created. A missing file is
    /// reported instead of being created empty.
    pub fn open_existing(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Unavailable(format!(
                "database not initialized at {} (run wl init)",
                path.display()
            )));
        }
        Self::open(path)
    }

    /// Open a private, schema-initialized database that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("failed to open database: {e}")))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Create the schema tables if they don't exist, then run any pending version-gated migrations.
    pub fn migrate(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS links (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                short_path   TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                created_at   TEXT NOT NULL
            );
            ",
            )
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {e}")))?;

        // Fresh databases start at version 0.
        self.conn
            .execute(
                "INSERT OR IGNORE INTO config (key, value) VALUES ('schema_version', '0')",
                [],
            )
            .map_err(|e| StoreError::Unavailable(format!("failed to seed schema_version: {e}")))?;

        run_migrations(&self.conn)
    }

    // -- Config --

    pub fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| StoreError::Unavailable(format!("failed to set config: {e}")))?;
        Ok(())
    }

    pub fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM config WHERE key = ?1")
            .map_err(query_err)?;
        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .map_err(query_err)?;
        match rows.next() {
            Some(Ok(v)) => Ok(Some(v)),
            Some(Err(e)) => Err(query_err(e)),
            None => Ok(None),
        }
    }

    /// Read a numeric config value, falling back to `default` when unset.
    pub fn get_config_u32(&self, key: &str, default: u32) -> Result<u32, StoreError> {
        match self.get_config(key)? {
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| StoreError::Unavailable(format!("invalid config value for {key}: {e}"))),
            None => Ok(default),
        }
    }

    // -- Links --

    pub fn link_exists(&self, short_path: &str) -> Result<bool, StoreError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM links WHERE short_path = ?1",
                params![short_path],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n > 0)
            .map_err(query_err)
    }

    /// Insert a link. A clash on `short_path` comes back as [`StoreError::Duplicate`].
    pub fn insert_link(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError> {
        // Fixed-width timestamps so `created_at` sorts lexically.
        let now = Utc::now().trunc_subsecs(6);
        let result = self.conn.execute(
            "INSERT INTO links (short_path, original_url, created_at) VALUES (?1, ?2, ?3)",
            params![
                short_path,
                original_url,
                now.to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        );

        match result {
            Ok(_) => Ok(ShortLink {
                id: self.conn.last_insert_rowid(),
                short_path: short_path.to_string(),
                original_url: original_url.to_string(),
                created_at: now,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::Duplicate(short_path.to_string()))
            }
            Err(e) => Err(StoreError::Unavailable(format!("failed to insert link: {e}"))),
        }
    }

    pub fn get_link(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, short_path, original_url, created_at FROM links WHERE short_path = ?1",
            )
            .map_err(query_err)?;

        let mut rows = stmt
            .query_map(params![short_path], row_to_link)
            .map_err(query_err)?;

        match rows.next() {
            Some(Ok(link)) => Ok(Some(link)),
            Some(Err(e)) => Err(query_err(e)),
            None => Ok(None),
        }
    }

    /// Most recent links first; ties on `created_at` fall back to insertion order.
    pub fn list_links(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, short_path, original_url, created_at FROM links
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )
            .map_err(query_err)?;

        let rows = stmt.query_map(params![limit], row_to_link).map_err(query_err)?;

        let mut links = Vec::new();
        for row in rows {
            links.push(row.map_err(row_err)?);
        }
        Ok(links)
    }

    pub fn link_count(&self) -> Result<i64, StoreError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .map_err(query_err)
    }
}

/// Read the current schema version from the config table.
fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    let mut stmt = conn
        .prepare("SELECT value FROM config WHERE key = 'schema_version'")
        .map_err(|e| StoreError::Unavailable(format!("failed to read schema_version: {e}")))?;
    let mut rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| StoreError::Unavailable(format!("failed to query schema_version: {e}")))?;
    match rows.next() {
        Some(Ok(v)) => v
            .parse::<i32>()
            .map_err(|e| StoreError::Unavailable(format!("invalid schema_version value: {e}"))),
        Some(Err(e)) => Err(StoreError::Unavailable(format!(
            "failed to read schema_version row: {e}"
        ))),
        None => Ok(0),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO config (key, value) VALUES ('schema_version', ?1)",
        params![version.to_string()],
    )
    .map_err(|e| StoreError::Unavailable(format!("failed to set schema_version: {e}")))?;
    Ok(())
}

/// Run all pending schema migrations in order.
///
/// Version 0 is the baseline created by `migrate()`. Each later step is an
/// `if version < N` block that runs inside its own transaction.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version = get_schema_version(conn)?;

    if version < 1 {
        conn.execute_batch(
            "BEGIN;
             CREATE INDEX IF NOT EXISTS idx_links_created ON links(created_at);
             COMMIT;",
        )
        .map_err(|e| StoreError::Unavailable(format!("migration v1 failed: {e}")))?;
        set_schema_version(conn, 1)?;
    }

    Ok(())
}

fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<ShortLink> {
    let created_str: String = row.get(3)?;
    Ok(ShortLink {
        id: row.get(0)?,
        short_path: row.get(1)?,
        original_url: row.get(2)?,
        created_at: DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
    })
}

/// [`LinkStore`] over a shared SQLite connection.
///
/// Every call takes the lock on its own, so an `exists` followed by an
/// `insert` is two separate round-trips; uniqueness rests on the table's
/// `UNIQUE` constraint.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        SqliteStore { db: Mutex::new(db) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }
}

impl LinkStore for SqliteStore {
    fn exists(&self, short_path: &str) -> Result<bool, StoreError> {
        self.lock()?.link_exists(short_path)
    }

    fn insert(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError> {
        self.lock()?.insert_link(short_path, original_url)
    }

    fn get(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError> {
        self.lock()?.get_link(short_path)
    }

    fn list(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError> {
        self.lock()?.list_links(limit)
    }

    fn count(&self) -> Result<i64, StoreError> {
        self.lock()?.link_count()
    }
}

/// Build an allocator over `db` using the settings stored by `init`.
pub fn allocator_for(db: Database) -> Result<Allocator, StoreError> {
    let words = db.get_config_u32(CONFIG_WORDS, DEFAULT_WORD_COUNT as u32)?;
    let conflict_retries = db.get_config_u32(CONFIG_CONFLICT_RETRIES, DEFAULT_CONFLICT_RETRIES)?;
    let store = Arc::new(SqliteStore::new(db));
    let generator = Arc::new(WordGenerator::new(words as usize));
    Ok(Allocator::new(store, generator).with_conflict_retries(conflict_retries))
}
