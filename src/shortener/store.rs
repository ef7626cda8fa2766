use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::models::ShortLink;

/// Failure reported by a [`LinkStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The insert hit the uniqueness constraint on `short_path`.
    #[error("short path already taken: {0}")]
    Duplicate(String),

    /// Anything else: connection, I/O, malformed rows, poisoned locks.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable short path → URL table.
///
/// Implementations must enforce uniqueness of `short_path` themselves; callers
/// treat [`StoreError::Duplicate`] from `insert` as the only authoritative
/// answer to "is this path free".
pub trait LinkStore: Send + Sync {
    fn exists(&self, short_path: &str) -> Result<bool, StoreError>;

    /// Insert a new mapping; the store assigns `id` and `created_at`.
    fn insert(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError>;

    fn get(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError>;

    /// Most recently created links first.
    fn list(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError>;

    fn count(&self) -> Result<i64, StoreError>;
}

#[derive(Default)]
struct MemoryTable {
    next_id: i64,
    rows: HashMap<String, ShortLink>,
}

/// In-process [`LinkStore`] backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryStore {
    table: Mutex<MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl LinkStore for MemoryStore {
    fn exists(&self, short_path: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.rows.contains_key(short_path))
    }

    fn insert(&self, short_path: &str, original_url: &str) -> Result<ShortLink, StoreError> {
        let mut table = self.lock()?;
        if table.rows.contains_key(short_path) {
            return Err(StoreError::Duplicate(short_path.to_string()));
        }
        table.next_id += 1;
        let link = ShortLink {
            id: table.next_id,
            short_path: short_path.to_string(),
            original_url: original_url.to_string(),
            created_at: Utc::now(),
        };
        table.rows.insert(short_path.to_string(), link.clone());
        Ok(link)
    }

    fn get(&self, short_path: &str) -> Result<Option<ShortLink>, StoreError> {
        Ok(self.lock()?.rows.get(short_path).cloned())
    }

    fn list(&self, limit: u32) -> Result<Vec<ShortLink>, StoreError> {
        let table = self.lock()?;
        let mut links: Vec<ShortLink> = table.rows.values().cloned().collect();
        links.sort_by(|a, b| b.id.cmp(&a.id));
        links.truncate(limit as usize);
        Ok(links)
    }

    fn count(&self) -> Result<i64, StoreError> {
        Ok(self.lock()?.rows.len() as i64)
    }
}
